//! Extractors whose rejections are [`ApiError`]s.
//!
//! axum's own extractors reject with plain-text bodies. These wrappers
//! route the rejection through the error-response builder instead, so a
//! malformed body, path or query string gets the same JSON error shape as
//! every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// Typed query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);
