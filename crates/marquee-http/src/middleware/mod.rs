//! HTTP middleware: request ID tracking.
//!
//! Error rendering lives in [`crate::error::render_error_middleware`] next
//! to the builder it drives.

pub mod request_id;
