//! Lexical validation of column names coming from request parameters.
//!
//! A column path is made of `.`-separated segments (table or relation
//! traversal) where each segment may carry a `->`-separated structured-field
//! path, e.g. `users.settings->theme`. Every atomic piece must:
//!
//! - be at most [`MAX_COLUMN_NAME_LENGTH`] bytes long
//! - contain only `A-Z`, `a-z`, `0-9`, `_` and `-`
//! - not start with a digit
//!
//! This is a pure syntax check. Whether a column may be queried is decided by
//! the model's allow-lists, see [`crate::model::ApiModel`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ColumnNameViolation, QueryError};

/// Based on the maximum identifier length of `MySQL`.
pub const MAX_COLUMN_NAME_LENGTH: usize = 64;

static VALID_COLUMN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z_-][A-Za-z0-9_-]*)?$").expect("valid column regex"));

/// Validate a single atomic column token.
///
/// # Errors
///
/// Returns [`QueryError::InvalidColumnName`] if the token is too long or
/// contains anything but alphanumerics, `_` and `-`, or starts with a digit.
pub fn sanitize(column: &str) -> Result<&str, QueryError> {
    if column.len() > MAX_COLUMN_NAME_LENGTH {
        return Err(QueryError::invalid_column(column, ColumnNameViolation::TooLong));
    }
    if !VALID_COLUMN_NAME.is_match(column) {
        return Err(QueryError::invalid_column(
            column,
            ColumnNameViolation::InvalidCharacters,
        ));
    }
    Ok(column)
}

/// Validate a column path such as `users.data->address->city`.
///
/// Each piece between `.` and `->` separators is checked on its own and the
/// path is returned unchanged.
///
/// # Errors
///
/// Returns the first [`QueryError::InvalidColumnName`] encountered.
pub fn sanitize_path(path: &str) -> Result<&str, QueryError> {
    for segment in path.split('.') {
        for piece in segment.split("->") {
            sanitize(piece)?;
        }
    }
    Ok(path)
}

/// Validate a flat list of atomic tokens, failing on the first invalid one.
///
/// # Errors
///
/// Returns the first [`QueryError::InvalidColumnName`] encountered.
pub fn sanitize_many<S: AsRef<str>>(columns: &[S]) -> Result<Vec<String>, QueryError> {
    columns
        .iter()
        .map(|column| sanitize(column.as_ref()).map(str::to_string))
        .collect()
}

/// Path-aware variant of [`sanitize_many`], used for selects and groupings.
///
/// # Errors
///
/// Returns the first [`QueryError::InvalidColumnName`] encountered.
pub fn sanitize_paths<S: AsRef<str>>(columns: &[S]) -> Result<Vec<String>, QueryError> {
    columns
        .iter()
        .map(|column| sanitize_path(column.as_ref()).map(str::to_string))
        .collect()
}
