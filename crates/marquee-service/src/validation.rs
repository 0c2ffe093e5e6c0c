//! Structural validation of submitted records.
//!
//! Rules are declared on the types with `validator` derives; `validate`
//! flattens the `ValidationErrors` map into an ordered list of
//! [`Violation`]s.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::types::Violation;

/// Rule name reported for blank titles.
pub const NOT_BLANK: &str = "NotBlank";

/// Message reported for blank titles.
pub const BLANK_TITLE_MESSAGE: &str = "Movie title can not be blank";

/// Rejects empty and whitespace-only titles.
pub fn not_blank(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new(NOT_BLANK);
        err.message = Some(Cow::Borrowed(BLANK_TITLE_MESSAGE));
        return Err(err);
    }
    Ok(())
}

/// Validates `value` and returns every violated rule.
///
/// An empty vector means the value is valid. Fields are reported in name
/// order, rules within a field in declaration order.
pub fn validate<T: Validate>(value: &T) -> Vec<Violation> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten(&errors),
    }
}

fn flatten(errors: &ValidationErrors) -> Vec<Violation> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| Violation {
                field: field.to_string(),
                rule: e.code.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), |m| m.to_string()),
            })
        })
        .collect()
}
