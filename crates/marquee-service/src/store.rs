//! In-memory movie catalog.
//!
//! Append-only: records are never updated or removed, so a movie's id is
//! its 1-based position in insertion order.

use parking_lot::RwLock;

use crate::error::ServiceError;
use crate::types::Movie;

/// Thread-safe in-memory catalog of movies.
///
/// Reads share a read lock. `save` holds the write lock across the title
/// uniqueness check and the append, so two concurrent saves of the same
/// title cannot both succeed.
pub struct MovieStore {
    movies: RwLock<Vec<Movie>>,
}

impl Default for MovieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieStore {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            movies: RwLock::new(Vec::new()),
        }
    }

    /// Creates a catalog seeded with `movies` in order.
    ///
    /// Ids are assigned by position (1, 2, ...) as `save` would; any id on
    /// the seed records is ignored.
    pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let movies = movies
            .into_iter()
            .zip(1u64..)
            .map(|(movie, id)| Movie {
                id: Some(id),
                title: movie.title,
            })
            .collect();
        Self {
            movies: RwLock::new(movies),
        }
    }

    /// Fetches a movie by id.
    pub fn get_by_id(&self, id: u64) -> Result<Movie, ServiceError> {
        self.movies
            .read()
            .iter()
            .find(|m| m.id == Some(id))
            .cloned()
            .ok_or(ServiceError::NotFound { id })
    }

    /// Searches for a movie by exact, case-sensitive title.
    pub fn get_by_title(&self, title: &str) -> Option<Movie> {
        self.movies
            .read()
            .iter()
            .find(|m| m.title == title)
            .cloned()
    }

    /// Stores `movie` under the next sequential id and returns the stored
    /// record. Any id on the incoming record is ignored.
    pub fn save(&self, movie: Movie) -> Result<Movie, ServiceError> {
        let mut movies = self.movies.write();
        if movies.iter().any(|m| m.title == movie.title) {
            tracing::debug!(title = %movie.title, "duplicate title rejected");
            return Err(ServiceError::AlreadyExists { title: movie.title });
        }

        let id = movies.len() as u64 + 1;
        let stored = Movie {
            id: Some(id),
            title: movie.title,
        };
        movies.push(stored.clone());
        drop(movies);

        tracing::info!(id, title = %stored.title, "movie saved");
        Ok(stored)
    }

    /// Snapshot of all movies in insertion order.
    pub fn all(&self) -> Vec<Movie> {
        self.movies.read().clone()
    }

    pub fn len(&self) -> usize {
        self.movies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.read().is_empty()
    }
}
