//! Transport-agnostic types shared by the service and transport layers.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::not_blank;

/// A movie in the catalog.
///
/// `id` is `None` on submission and assigned by the store on save. Once
/// stored, a movie is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Movie {
    /// Catalog identifier, assigned on save.
    #[serde(default)]
    pub id: Option<u64>,
    /// Movie title. Must not be blank; unique across the catalog.
    #[validate(custom(function = "not_blank"))]
    pub title: String,
}

impl Movie {
    /// Creates an unsaved movie with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
        }
    }

    /// Creates a movie with an already-assigned id (seeding and tests).
    pub fn with_id(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: title.into(),
        }
    }
}

/// One violated rule on one field of a submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Violation {
    /// Name of the offending field.
    pub field: String,
    /// Symbolic rule name (e.g. "NotBlank").
    pub rule: String,
    /// Human-readable message for the violation.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_json_shape() {
        let json = serde_json::to_value(Movie::with_id(1, "First")).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "title": "First"}));
    }

    #[test]
    fn movie_id_may_be_null_or_absent() {
        let with_null: Movie = serde_json::from_str(r#"{"id":null,"title":"New movie"}"#).unwrap();
        let without: Movie = serde_json::from_str(r#"{"title":"New movie"}"#).unwrap();
        assert_eq!(with_null, Movie::new("New movie"));
        assert_eq!(without, Movie::new("New movie"));
    }
}
