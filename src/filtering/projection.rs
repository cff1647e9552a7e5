use serde_json::Value;

use super::Scope;
use crate::errors::QueryError;
use crate::params;
use crate::sanitizer::sanitize_paths;

fn tokens(value: &Value) -> Vec<String> {
    params::string_list(value)
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect()
}

/// Plain columns to select, prefixed with the model table.
///
/// Dotted paths are left to [`super::relations::eager_loads`].
///
/// # Errors
///
/// [`QueryError::InvalidColumnName`] if any requested path is malformed,
/// including the dotted ones.
pub fn select(scope: &Scope<'_>, value: &Value) -> Result<Vec<String>, QueryError> {
    let model = scope.model();
    let plain: Vec<String> = sanitize_paths(&tokens(value))?
        .into_iter()
        .filter(|column| !column.contains('.'))
        .collect();

    Ok(model
        .validated_fields(&plain)
        .into_iter()
        .map(|column| format!("{}.{column}", model.table_name()))
        .collect())
}

/// Grouping columns. Only sanitized, grouping is not subject to the field
/// allow-list.
///
/// # Errors
///
/// [`QueryError::InvalidColumnName`] for malformed columns.
pub fn group_by(value: &Value) -> Result<Vec<String>, QueryError> {
    sanitize_paths(&tokens(value))
}

/// Positive integer limit, `None` for anything else
#[must_use]
pub fn limit(value: &Value) -> Option<u64> {
    let limit = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    limit.filter(|limit| *limit > 0)
}
