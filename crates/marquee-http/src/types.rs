//! Request/response types for the Marquee HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters of the title search.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TitleQuery {
    /// Exact, case-sensitive title to look up.
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Server status ("ok").
    pub status: String,
    /// Server version.
    pub version: String,
    /// Configured API version.
    pub api_version: String,
    /// Number of movies in the catalog.
    pub movies: usize,
    /// Server uptime in seconds.
    pub uptime_seconds: u64,
}
