//! Marquee HTTP: REST API transport adapter for the movie catalog.
//!
//! Provides the HTTP/REST interface including:
//! - Movie endpoints (fetch by id, search by title, create)
//! - System/health endpoint
//! - OpenAPI/Swagger UI
//! - Structured error responses for every failure, including unrouted
//!   paths, malformed requests and handler panics
//! - Request-ID middleware

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use error::{Cause, ErrorResponse};
use types::HealthResponse;

pub use error::ApiError;
pub use state::AppState;

// ---------------------------------------------------------------------------
// OpenAPI
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marquee API",
        description = "HTTP API for the Marquee movie catalog.\n\nEvery failed request returns an `ErrorResponse` carrying the API version, status, message, request path and a list of causes.",
        license(name = "Apache-2.0"),
    ),
    paths(
        routes::movies::get_movie,
        routes::movies::find_movie,
        routes::movies::create_movie,
        routes::system::health,
    ),
    components(
        schemas(
            marquee_service::types::Movie, ErrorResponse, Cause, HealthResponse,
        )
    ),
    tags(
        (name = "Movies", description = "Movie catalog"),
        (name = "System", description = "System and health endpoints"),
    )
)]
struct ApiDoc;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Builds the HTTP API router.
///
/// Call this from the binary crate to get a fully-wired axum `Router`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Movies
        .route(
            "/movies",
            get(routes::movies::find_movie).post(routes::movies::create_movie),
        )
        .route("/movies/{id}", get(routes::movies::get_movie))
        // System
        .route("/health", get(routes::system::health))
        // OpenAPI
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()));

    with_error_handling(api, state)
}

/// Wraps `routes` with the fallbacks and middleware that turn every failure
/// into an [`ErrorResponse`].
///
/// Unmatched paths, unsupported methods, handler panics and errors returned
/// by handlers or extractors all end up in the same builder.
pub fn with_error_handling(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .method_not_allowed_fallback(error::method_not_allowed)
        .fallback(error::no_route)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            error::render_error_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            middleware::request_id::request_id_middleware,
        ))
        .layer(cors_layer(&state))
        .with_state(state)
}

/// Serve the HTTP router on the given listener with graceful shutdown.
pub async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = state.cors_origins();

    // No origins configured → no CORS headers (deny cross-origin by default).
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let x_request_id = middleware::request_id::X_REQUEST_ID.clone();
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, x_request_id.clone()])
        .expose_headers([x_request_id]);

    if origins.len() == 1 && origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard origin; all cross-origin requests allowed");
        return base.allow_origin(tower_http::cors::Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}
