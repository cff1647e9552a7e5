//! Mapping raw relation tokens to canonical relation names.
//!
//! Clients may spell a relation in `snake_case`, in plural or in singular form
//! (`book_authors`, `bookAuthor`, ...). The resolver tries, in order:
//!
//! 1. the token camel-cased as given
//! 2. the camel-cased plural
//! 3. the camel-cased singular
//!
//! and returns the first one the model declares.

use heck::ToLowerCamelCase;

use crate::errors::QueryError;
use crate::inflector;
use crate::model::ApiModel;

/// `lowerCamelCase` a relation token, keeping `.` path separators intact
#[must_use]
pub fn camel(token: &str) -> String {
    token
        .split('.')
        .map(|segment| segment.to_lower_camel_case())
        .collect::<Vec<_>>()
        .join(".")
}

/// Candidate canonical names for `raw`, in resolution order
fn candidates(raw: &str) -> [String; 3] {
    [
        camel(raw),
        camel(&inflector::pluralize(raw)),
        camel(&inflector::singularize(raw)),
    ]
}

/// Resolve `raw` to a relation the model declares, if any
#[must_use]
pub fn try_resolve(raw: &str, model: &dyn ApiModel) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    candidates(raw)
        .into_iter()
        .find(|candidate| model.relation(candidate).is_some())
}

/// Resolve `raw` to the canonical relation name declared on `model`.
///
/// # Errors
///
/// Returns [`QueryError::RelationNotFound`] when neither the direct, plural nor
/// singular form names a relation on the model.
pub fn resolve(raw: &str, model: &dyn ApiModel) -> Result<String, QueryError> {
    try_resolve(raw, model).ok_or_else(|| QueryError::relation_not_found(raw))
}
