//! Request correlation: every request and response carries `x-request-id`.

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Reuses the caller's `x-request-id` or assigns a UUID v4, echoes it on
/// the response and runs the request inside a span tagged with it.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = match req.headers().get(&X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
        Some(existing) if !existing.is_empty() => existing.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };
    let value = HeaderValue::from_str(&id).ok();

    if let Some(value) = &value {
        req.headers_mut().insert(X_REQUEST_ID.clone(), value.clone());
    }

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    let mut response = next.run(req).instrument(span).await;

    if let Some(value) = value {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}
