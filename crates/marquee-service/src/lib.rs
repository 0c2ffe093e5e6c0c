//! Marquee Service: core business logic for the Marquee movie catalog.
//!
//! This crate contains all transport-agnostic logic: the movie record,
//! the in-memory catalog store, structural validation and the failure
//! taxonomy raised by catalog operations.
//!
//! No transport dependencies: no axum, no HTTP types.

pub mod error;
pub mod store;
pub mod types;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use error::ServiceError;
use store::MovieStore;
use types::Movie;

/// Shared service state, cloneable across all transport handlers.
///
/// Owns the catalog for the lifetime of the process. Transport crates
/// receive a clone and delegate all logic to it.
#[derive(Clone)]
pub struct ServiceState {
    inner: Arc<Inner>,
}

struct Inner {
    store: MovieStore,
    start_time: Instant,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceState {
    /// Creates a service state with an empty catalog.
    pub fn new() -> Self {
        Self::with_store(MovieStore::new())
    }

    /// Creates a service state around an existing catalog (seeding, tests).
    pub fn with_store(store: MovieStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                start_time: Instant::now(),
            }),
        }
    }

    // --- Accessors ---

    pub fn store(&self) -> &MovieStore {
        &self.inner.store
    }

    pub fn uptime_secs(&self) -> u64 {
        self.inner.start_time.elapsed().as_secs()
    }

    // --- Operations ---

    /// Validates `movie` and, if it breaks no rule, saves it.
    ///
    /// Validation short-circuits: a record with violations never reaches
    /// the store, so a blank duplicate title reports `ValidationFailed`.
    pub fn create_movie(&self, movie: Movie) -> Result<Movie, ServiceError> {
        let violations = validation::validate(&movie);
        if !violations.is_empty() {
            return Err(ServiceError::ValidationFailed { violations });
        }
        self.store().save(movie)
    }
}
