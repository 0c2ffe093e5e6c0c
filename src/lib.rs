//! Marquee Server - movie catalog served over HTTP.
//!
//! The catalog and its failure taxonomy live in `marquee-service`; the
//! REST surface and the error-response builder live in `marquee-http`.
//! This crate adds configuration and the process entry point.

pub mod config;

pub use marquee_http::{AppState, router};

use config::Config;
use marquee_service::ServiceState;

/// Builds the application state described by `config`, with an empty catalog.
pub fn app_state(config: &Config) -> AppState {
    AppState::new(
        ServiceState::new(),
        config.api_version.clone(),
        config.cors_origins.clone(),
    )
}
