//! Error-response construction for the HTTP layer.
//!
//! Every failure that reaches a client goes through [`ApiError::classify`],
//! which maps the failure kind to a status code, a summary message and a
//! list of [`Cause`]s. The classification is rendered into an
//! [`ErrorResponse`] along one of two paths:
//!
//! - **local**: a handler that matched on its own result calls
//!   [`ApiError::respond`] with the request path and API version;
//! - **global**: an `ApiError` returned from a handler, an extractor or the
//!   fallback becomes a bare response carrying its [`Classified`] value in
//!   the response extensions, and [`render_error_middleware`] attaches the
//!   body on the way out.
//!
//! Both paths render the same `Classified` value, so the body for a given
//! failure does not depend on where it was caught.

use std::any::Any;
use std::error::Error as StdError;

use axum::extract::rejection::{
    FailedToDeserializePathParams, FailedToDeserializeQueryString, JsonDataError,
    JsonRejection, JsonSyntaxError, MissingJsonContentType, PathRejection, QueryRejection,
};
use axum::extract::{OriginalUri, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use marquee_service::error::ServiceError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Message used when a failure carries no text of its own.
pub const FALLBACK_MESSAGE: &str = "Error while performing request";

/// Summary message for a rejected save.
pub const SAVE_ERROR_MESSAGE: &str = "Error while saving movie";

/// Summary message for a record that failed validation.
pub const VALIDATION_ERROR_MESSAGE: &str = "Validation error while saving movie";

/// Any failure that can end a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A catalog operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A title search found nothing.
    #[error("Movie with title {0} was not found")]
    TitleNotFound(String),

    /// The request body could not be read as JSON.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// A path parameter could not be parsed.
    #[error(transparent)]
    Path(#[from] PathRejection),

    /// The query string could not be parsed.
    #[error(transparent)]
    Query(#[from] QueryRejection),

    /// No route matches the request path.
    #[error("No route for {method} {path}")]
    NoRoute { method: Method, path: String },

    /// The path exists but not for this method.
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: Method, path: String },

    /// Any other failure, wrapped with its cause chain intact.
    #[error("{0}")]
    Unhandled(Box<dyn StdError + Send + Sync>),

    /// Internal server error, optionally with a message.
    #[error("{}", .0.as_deref().unwrap_or(FALLBACK_MESSAGE))]
    Internal(Option<String>),
}

/// Structured error body returned on every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Configured API version of the server.
    pub api_version: String,
    /// HTTP status code, repeated from the response line.
    pub status: u16,
    /// Human-readable summary.
    pub message: String,
    /// Request path that failed.
    pub path: String,
    /// Contributing failures.
    pub causes: Vec<Cause>,
}

/// One contributing failure in an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cause {
    /// Symbolic name of the failure kind, if known.
    pub exception: Option<String>,
    /// Detail text.
    pub message: Option<String>,
}

impl Cause {
    pub fn new(exception: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            exception: exception.map(str::to_owned),
            message: Some(message.into()),
        }
    }

    /// Describes a single error, without following its source.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self::new(exception_name(err), err.to_string())
    }
}

/// Status, message and causes of a failure, before the request-specific
/// fields are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub status: StatusCode,
    pub message: String,
    pub causes: Vec<Cause>,
}

impl Classified {
    fn new(status: StatusCode, message: impl Into<String>, causes: Vec<Cause>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_owned()
        } else {
            message
        };
        Self {
            status,
            message,
            causes,
        }
    }

    /// Attaches the request path and API version.
    pub fn render(self, path: &str, api_version: &str) -> ErrorResponse {
        ErrorResponse {
            api_version: api_version.to_owned(),
            status: self.status.as_u16(),
            message: self.message,
            path: path.to_owned(),
            causes: self.causes,
        }
    }

    /// Renders a complete JSON response.
    pub fn into_response_for(self, path: &str, api_version: &str) -> Response {
        let status = self.status;
        (status, axum::Json(self.render(path, api_version))).into_response()
    }
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(Some(msg.into()))
    }

    pub fn unhandled(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Unhandled(Box::new(err))
    }

    /// Maps this failure to its status, message and causes.
    ///
    /// The status depends only on the failure kind.
    pub fn classify(&self) -> Classified {
        match self {
            Self::Service(err @ ServiceError::NotFound { .. }) => {
                Classified::new(StatusCode::NOT_FOUND, err.to_string(), cause_chain(err))
            }
            Self::Service(err @ ServiceError::AlreadyExists { .. }) => Classified::new(
                StatusCode::CONFLICT,
                SAVE_ERROR_MESSAGE,
                vec![Cause::new(Some(err.kind_name()), err.to_string())],
            ),
            Self::Service(err @ ServiceError::ValidationFailed { violations }) => {
                let causes = violations
                    .iter()
                    .map(|v| Cause::new(Some(err.kind_name()), v.message.clone()))
                    .collect();
                Classified::new(StatusCode::BAD_REQUEST, VALIDATION_ERROR_MESSAGE, causes)
            }
            Self::TitleNotFound(_) => {
                Classified::new(StatusCode::NOT_FOUND, self.to_string(), Vec::new())
            }
            Self::Json(rejection) => {
                Classified::new(rejection.status(), rejection.body_text(), cause_chain(rejection))
            }
            Self::Path(rejection) => {
                Classified::new(rejection.status(), rejection.body_text(), cause_chain(rejection))
            }
            Self::Query(rejection) => {
                Classified::new(rejection.status(), rejection.body_text(), cause_chain(rejection))
            }
            Self::NoRoute { .. } => {
                Classified::new(StatusCode::NOT_FOUND, self.to_string(), Vec::new())
            }
            Self::MethodNotAllowed { .. } => {
                Classified::new(StatusCode::METHOD_NOT_ALLOWED, self.to_string(), Vec::new())
            }
            Self::Unhandled(err) => Classified::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                cause_chain(&**err),
            ),
            Self::Internal(_) => {
                Classified::new(StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), Vec::new())
            }
        }
    }

    /// Renders this failure in place, for handlers that catch their own
    /// errors.
    pub fn respond(&self, path: &str, api_version: &str) -> Response {
        let classified = self.classify();
        log_failure(&classified, path);
        classified.into_response_for(path, api_version)
    }
}

impl IntoResponse for ApiError {
    /// Produces a bodiless response tagged with the classification; the
    /// body is attached by [`render_error_middleware`].
    fn into_response(self) -> Response {
        let classified = self.classify();
        let mut response = classified.status.into_response();
        response.extensions_mut().insert(classified);
        response
    }
}

/// Walks the `source()` links of `err`, one [`Cause`] per link, innermost
/// first.
///
/// `err` itself is not included. The walk stops at the first missing link
/// or at a link that points back to an error already visited; causes
/// collected up to that point are returned.
pub fn cause_chain(err: &(dyn StdError + 'static)) -> Vec<Cause> {
    let mut visited: Vec<&(dyn StdError + 'static)> = vec![err];
    let mut causes = Vec::new();
    let mut current = err;

    while let Some(next) = current.source() {
        // A newtype shares its address with its inner error; only the same
        // address with the same vtable is a revisit.
        if visited.iter().any(|seen| std::ptr::eq(*seen, next)) {
            tracing::debug!(depth = causes.len(), "cycle in error source chain");
            break;
        }
        visited.push(next);
        causes.push(Cause::from_error(next));
        current = next;
    }

    causes.reverse();
    causes
}

/// Symbolic name for the error types this crate knows about.
fn exception_name(err: &(dyn StdError + 'static)) -> Option<&'static str> {
    if let Some(service) = err.downcast_ref::<ServiceError>() {
        return Some(service.kind_name());
    }
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return match api {
            ApiError::Service(service) => Some(service.kind_name()),
            _ => Some("ApiError"),
        };
    }

    let name = if err.is::<JsonRejection>() {
        "JsonRejection"
    } else if err.is::<JsonSyntaxError>() {
        "JsonSyntaxError"
    } else if err.is::<JsonDataError>() {
        "JsonDataError"
    } else if err.is::<MissingJsonContentType>() {
        "MissingJsonContentType"
    } else if err.is::<PathRejection>() {
        "PathRejection"
    } else if err.is::<FailedToDeserializePathParams>() {
        "FailedToDeserializePathParams"
    } else if err.is::<QueryRejection>() {
        "QueryRejection"
    } else if err.is::<FailedToDeserializeQueryString>() {
        "FailedToDeserializeQueryString"
    } else if err.is::<serde_json::Error>() {
        "serde_json::Error"
    } else if err.is::<std::io::Error>() {
        "std::io::Error"
    } else if err.is::<axum::Error>() {
        "axum::Error"
    } else {
        return None;
    };
    Some(name)
}

fn log_failure(classified: &Classified, path: &str) {
    if classified.status.is_server_error() {
        tracing::error!(
            status = classified.status.as_u16(),
            message = %classified.message,
            path,
            "request failed",
        );
    } else {
        tracing::debug!(
            status = classified.status.as_u16(),
            message = %classified.message,
            path,
            "request rejected",
        );
    }
}

/// Renders the body of any response tagged by [`ApiError::into_response`].
///
/// Sits outside every route and the fallback, so failures that were not
/// caught by their handler still get an [`ErrorResponse`] with the request
/// path and configured API version.
pub async fn render_error_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| req.uri().path().to_owned(), |uri| uri.path().to_owned());

    let mut response = next.run(req).await;
    let Some(classified) = response.extensions_mut().remove::<Classified>() else {
        return response;
    };

    log_failure(&classified, &path);
    let (parts, _) = response.into_parts();
    let mut rendered = classified.into_response_for(&path, state.api_version());
    for (name, value) in &parts.headers {
        if !rendered.headers().contains_key(name) {
            rendered.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rendered
}

/// Turns a handler panic into an internal error.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    tracing::error!(%detail, "handler panicked");
    ApiError::Internal(None).into_response()
}

/// Router fallback for unmatched paths.
pub async fn no_route(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NoRoute {
        method,
        path: uri.path().to_owned(),
    }
}

/// Fallback for known paths requested with an unsupported method.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::MethodNotAllowed {
        method,
        path: uri.path().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use marquee_service::types::Violation;

    use super::*;

    #[derive(Debug)]
    struct Link {
        msg: &'static str,
        next: Option<&'static Link>,
    }

    impl fmt::Display for Link {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl StdError for Link {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.next.map(|n| n as &(dyn StdError + 'static))
        }
    }

    #[derive(Debug)]
    struct Ouroboros;

    impl fmt::Display for Ouroboros {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("eats itself")
        }
    }

    impl StdError for Ouroboros {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self)
        }
    }

    static ROOT: Link = Link {
        msg: "disk on fire",
        next: None,
    };
    static MIDDLE: Link = Link {
        msg: "write failed",
        next: Some(&ROOT),
    };
    static TOP: Link = Link {
        msg: "save aborted",
        next: Some(&MIDDLE),
    };

    static PING: Link = Link {
        msg: "ping",
        next: Some(&PONG),
    };
    static PONG: Link = Link {
        msg: "pong",
        next: Some(&PING),
    };
    static SERVE: Link = Link {
        msg: "serve",
        next: Some(&PING),
    };

    fn messages(causes: &[Cause]) -> Vec<&str> {
        causes
            .iter()
            .map(|c| c.message.as_deref().unwrap_or_default())
            .collect()
    }

    #[test]
    fn chain_lists_root_cause_first() {
        let causes = cause_chain(&TOP);
        assert_eq!(messages(&causes), ["disk on fire", "write failed"]);
        assert!(causes.iter().all(|c| c.exception.is_none()));
    }

    #[test]
    fn chain_without_source_is_empty() {
        assert!(cause_chain(&ROOT).is_empty());
    }

    #[test]
    fn self_referential_source_terminates() {
        assert!(cause_chain(&Ouroboros).is_empty());
    }

    #[test]
    fn cycle_keeps_causes_collected_before_it() {
        assert_eq!(messages(&cause_chain(&PING)), ["pong"]);
        assert_eq!(messages(&cause_chain(&SERVE)), ["pong", "ping"]);
    }

    #[test]
    fn chain_names_service_errors() {
        let err = ApiError::unhandled(Wrapper(ServiceError::NotFound { id: 3 }));
        let classified = err.classify();
        assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classified.message, "wrapped");
        assert_eq!(
            classified.causes,
            vec![Cause::new(
                Some("MovieNotFoundException"),
                "Movie with [id=3] was not found."
            )]
        );
    }

    #[test]
    fn newtype_source_at_same_address_is_not_a_cycle() {
        let wrapped = Wrapper(ServiceError::NotFound { id: 3 });
        let causes = cause_chain(&wrapped);
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].exception.as_deref(), Some("MovieNotFoundException"));

        let read = ReadConfig(std::io::Error::other("disk gone"));
        assert_eq!(messages(&cause_chain(&read)), ["disk gone"]);
    }

    #[test]
    fn nested_newtypes_keep_every_link() {
        let outer = Outer(ReadConfig(std::io::Error::other("disk gone")));
        assert_eq!(messages(&cause_chain(&outer)), ["disk gone", "reading config"]);
    }

    #[derive(Debug)]
    struct ReadConfig(std::io::Error);

    impl fmt::Display for ReadConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("reading config")
        }
    }

    impl StdError for ReadConfig {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[derive(Debug)]
    struct Outer(ReadConfig);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("startup failed")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[derive(Debug)]
    struct Wrapper(ServiceError);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("wrapped")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn not_found_maps_to_404() {
        let classified = ApiError::from(ServiceError::NotFound { id: 100 }).classify();
        assert_eq!(classified.status, StatusCode::NOT_FOUND);
        assert_eq!(classified.message, "Movie with [id=100] was not found.");
        assert!(classified.causes.is_empty());
    }

    #[test]
    fn already_exists_maps_to_409_with_one_cause() {
        let classified = ApiError::from(ServiceError::AlreadyExists {
            title: "New movie".to_owned(),
        })
        .classify();
        assert_eq!(classified.status, StatusCode::CONFLICT);
        assert_eq!(classified.message, "Error while saving movie");
        assert_eq!(
            classified.causes,
            vec![Cause::new(
                Some("MovieAlreadyExistsException"),
                "Movie with [title=New movie] already exists"
            )]
        );
    }

    #[test]
    fn validation_failure_maps_to_400_with_cause_per_violation() {
        let violation = |message: &str| Violation {
            field: "title".to_owned(),
            rule: "NotBlank".to_owned(),
            message: message.to_owned(),
        };
        let classified = ApiError::from(ServiceError::ValidationFailed {
            violations: vec![violation("first"), violation("second")],
        })
        .classify();
        assert_eq!(classified.status, StatusCode::BAD_REQUEST);
        assert_eq!(classified.message, "Validation error while saving movie");
        assert_eq!(
            classified.causes,
            vec![
                Cause::new(Some("MethodArgumentNotValidException"), "first"),
                Cause::new(Some("MethodArgumentNotValidException"), "second"),
            ]
        );
    }

    #[test]
    fn title_miss_maps_to_404() {
        let classified = ApiError::TitleNotFound("Third".to_owned()).classify();
        assert_eq!(classified.status, StatusCode::NOT_FOUND);
        assert_eq!(classified.message, "Movie with title Third was not found");
        assert!(classified.causes.is_empty());
    }

    #[test]
    fn internal_without_message_uses_fallback() {
        let classified = ApiError::Internal(None).classify();
        assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classified.message, FALLBACK_MESSAGE);

        let classified = ApiError::internal("  ").classify();
        assert_eq!(classified.message, FALLBACK_MESSAGE);

        let classified = ApiError::internal("store poisoned").classify();
        assert_eq!(classified.message, "store poisoned");
    }

    #[test]
    fn routing_failures_map_by_kind() {
        let no_route = ApiError::NoRoute {
            method: Method::GET,
            path: "/nope".to_owned(),
        }
        .classify();
        assert_eq!(no_route.status, StatusCode::NOT_FOUND);
        assert_eq!(no_route.message, "No route for GET /nope");

        let not_allowed = ApiError::MethodNotAllowed {
            method: Method::DELETE,
            path: "/movies".to_owned(),
        }
        .classify();
        assert_eq!(not_allowed.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn unhandled_self_cycle_still_classifies() {
        let classified = ApiError::unhandled(Ouroboros).classify();
        assert_eq!(classified.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classified.message, "eats itself");
        assert!(classified.causes.is_empty());
    }

    #[test]
    fn render_attaches_path_and_version() {
        let body = ApiError::from(ServiceError::NotFound { id: 100 })
            .classify()
            .render("/movies/100", "2.1");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "apiVersion": "2.1",
                "status": 404,
                "message": "Movie with [id=100] was not found.",
                "path": "/movies/100",
                "causes": [],
            })
        );
    }

    #[test]
    fn cause_serializes_absent_fields_as_null() {
        let cause = Cause {
            exception: None,
            message: Some("detail".to_owned()),
        };
        assert_eq!(
            serde_json::to_value(&cause).unwrap(),
            serde_json::json!({ "exception": null, "message": "detail" })
        );
    }

    #[test]
    fn into_response_tags_classification() {
        let response = ApiError::from(ServiceError::NotFound { id: 9 }).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let classified = response.extensions().get::<Classified>().unwrap();
        assert_eq!(classified.message, "Movie with [id=9] was not found.");
    }

    #[test]
    fn panic_handler_yields_internal_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let classified = response.extensions().get::<Classified>().unwrap();
        assert_eq!(classified.message, FALLBACK_MESSAGE);
    }
}
