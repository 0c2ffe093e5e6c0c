//! HTTP application state: wraps `ServiceState` with HTTP-specific fields.
//!
//! `AppState` provides transparent access to all `ServiceState` methods
//! via `Deref`, and adds the API version stamped on error responses and
//! the CORS origins.

use std::ops::Deref;
use std::sync::Arc;

use marquee_service::ServiceState;
use marquee_service::store::MovieStore;

/// API version reported when none is configured.
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Shared HTTP application state, cloneable across handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppInner>,
}

struct AppInner {
    service: ServiceState,
    api_version: String,
    cors_origins: Vec<String>,
}

impl Deref for AppState {
    type Target = ServiceState;

    fn deref(&self) -> &ServiceState {
        &self.inner.service
    }
}

impl AppState {
    /// Creates a new HTTP application state.
    pub fn new(
        service: ServiceState,
        api_version: impl Into<String>,
        cors_origins: Vec<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppInner {
                service,
                api_version: api_version.into(),
                cors_origins,
            }),
        }
    }

    /// Creates a state with an empty catalog (for tests and ephemeral use).
    pub fn new_in_memory(api_version: impl Into<String>) -> Self {
        Self::new(ServiceState::new(), api_version, vec![])
    }

    /// Creates a state around a pre-filled catalog (for tests).
    pub fn with_store(store: MovieStore, api_version: impl Into<String>) -> Self {
        Self::new(ServiceState::with_store(store), api_version, vec![])
    }

    /// Returns the API version stamped on every error response.
    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    /// Returns the configured CORS allowed origins.
    pub fn cors_origins(&self) -> &[String] {
        &self.inner.cors_origins
    }
}
