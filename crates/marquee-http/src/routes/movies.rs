//! Movie catalog endpoints.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marquee_service::types::Movie;

use crate::error::{ApiError, ErrorResponse};
use crate::extract::{Json, Path, Query};
use crate::state::AppState;
use crate::types::TitleQuery;

/// Get a movie by id.
///
/// A missing id propagates as an error and is rendered by the global
/// error middleware.
#[utoipa::path(
    get,
    path = "/movies/{id}",
    params(
        ("id" = u64, Path, description = "Movie id"),
    ),
    responses(
        (status = 200, description = "The movie", body = Movie),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
    ),
    tag = "Movies"
)]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<axum::Json<Movie>, ApiError> {
    let movie = state.store().get_by_id(id)?;
    Ok(axum::Json(movie))
}

/// Search for a movie by exact title.
///
/// A miss is not a store failure; the 404 body is built here.
#[utoipa::path(
    get,
    path = "/movies",
    params(TitleQuery),
    responses(
        (status = 200, description = "The movie", body = Movie),
        (status = 400, description = "Missing title", body = ErrorResponse),
        (status = 404, description = "No movie with that title", body = ErrorResponse),
    ),
    tag = "Movies"
)]
pub async fn find_movie(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<TitleQuery>,
) -> Response {
    match state.store().get_by_title(&query.title) {
        Some(movie) => axum::Json(movie).into_response(),
        None => ApiError::TitleNotFound(query.title).respond(uri.path(), state.api_version()),
    }
}

/// Add a movie to the catalog.
///
/// The record is validated before the store is touched; validation and
/// duplicate-title failures are rendered here.
#[utoipa::path(
    post,
    path = "/movies",
    request_body = Movie,
    responses(
        (status = 200, description = "Movie saved"),
        (status = 400, description = "Invalid movie", body = ErrorResponse),
        (status = 409, description = "Title already exists", body = ErrorResponse),
    ),
    tag = "Movies"
)]
pub async fn create_movie(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(movie): Json<Movie>,
) -> Response {
    match state.create_movie(movie) {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err) => ApiError::from(err).respond(uri.path(), state.api_version()),
    }
}
