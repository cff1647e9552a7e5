use serde_json::Value;

use super::operators::{Family, Operator};
use super::{Scope, existence, search};
use crate::errors::QueryError;
use crate::model::field_allowed;
use crate::params::{self, Key};
use crate::query::{Boolean, Comparison, DatePart, Filter, PredicateKind};
use crate::sanitizer::sanitize_path;

/// Compile the operator keys of `params` into `target`.
///
/// Nothing is added when `params` has no operator key. Otherwise everything is
/// wrapped in one `AND` group so constraints added to `target` later cannot be
/// bypassed by an `orWhere` from the request.
///
/// # Errors
///
/// Fails on invalid column names, unknown relations, malformed search options
/// and parameters nested deeper than the configured limit.
pub fn compile(scope: &Scope<'_>, params: &Value, target: &mut Filter) -> Result<(), QueryError> {
    if !has_operator(params) {
        return Ok(());
    }

    let mut group = Filter::new();
    walk(scope, params, None, &mut group)?;
    target.push_group(Boolean::And, group);
    Ok(())
}

fn has_operator(params: &Value) -> bool {
    params::entries(params)
        .iter()
        .any(|(key, _)| key.name().and_then(Operator::parse).is_some())
}

/// Inside a `where` / `orWhere` context, open a group joined by the context's
/// boolean. Operator keys recurse, plain keys become `column = value`.
/// Without a context only operator keys are read.
fn walk(
    scope: &Scope<'_>,
    params: &Value,
    context: Option<Operator>,
    target: &mut Filter,
) -> Result<(), QueryError> {
    let Some(operator) = context else {
        for (key, payload) in params::entries(params) {
            if let Some(operator) = key.name().and_then(Operator::parse) {
                perform_nested(scope, operator, payload, target)?;
            }
        }
        return Ok(());
    };

    let inner = scope.nested()?;
    let mut group = Filter::new();
    for (key, value) in params::entries(params) {
        match key.name().and_then(Operator::parse) {
            Some(nested) => perform_nested(&inner, nested, value, &mut group)?,
            None => perform(&inner, operator, key, value, &mut group)?,
        }
    }
    target.push_group(operator.boolean(), group);
    Ok(())
}

/// Dispatch one operator key and its payload
pub(super) fn perform_nested(
    scope: &Scope<'_>,
    operator: Operator,
    payload: &Value,
    target: &mut Filter,
) -> Result<(), QueryError> {
    match operator.family() {
        Family::Comparison => walk(scope, payload, Some(operator), target),
        Family::Search => search::perform(scope, payload, target),
        Family::Null { .. } | Family::Existence { .. } => {
            for (key, value) in params::entries_or_list(payload) {
                perform(scope, operator, key, &value, target)?;
            }
            Ok(())
        }
        Family::DatePart(_) | Family::Membership { .. } | Family::Range { .. } => {
            for (key, value) in params::entries(payload) {
                perform(scope, operator, key, value, target)?;
            }
            Ok(())
        }
    }
}

/// Apply a single `(operator, key, value)` entry
pub(super) fn perform(
    scope: &Scope<'_>,
    operator: Operator,
    key: Key<'_>,
    value: &Value,
    target: &mut Filter,
) -> Result<(), QueryError> {
    let boolean = operator.boolean();
    match operator.family() {
        Family::Comparison => compare(scope, boolean, None, &key.as_text(), value, target),
        Family::DatePart(part) => compare(scope, boolean, Some(part), &key.as_text(), value, target),
        Family::Membership { negated } => {
            let Some(column) = resolve_column(scope, &key.as_text())? else {
                return Ok(());
            };
            target.push(
                boolean,
                PredicateKind::In {
                    column,
                    values: set_values(value),
                    negated,
                },
            );
            Ok(())
        }
        Family::Range { negated } => {
            let Some(column) = resolve_column(scope, &key.as_text())? else {
                return Ok(());
            };
            target.push(
                boolean,
                PredicateKind::Between {
                    column,
                    values: set_values(value),
                    negated,
                },
            );
            Ok(())
        }
        Family::Null { negated } => {
            let Some(raw) = params::scalar_text(value) else {
                return Ok(());
            };
            let Some(column) = resolve_column(scope, &raw)? else {
                return Ok(());
            };
            target.push(boolean, PredicateKind::Null { column, negated });
            Ok(())
        }
        Family::Existence { negated } => {
            existence::perform(scope, boolean, negated, key, value, target)
        }
        Family::Search => search::perform(scope, value, target),
    }
}

/// Sanitize and authorize a column, qualifying it inside relation scopes.
/// `None` when the model does not permit it.
pub(super) fn resolve_column(scope: &Scope<'_>, raw: &str) -> Result<Option<String>, QueryError> {
    sanitize_path(raw)?;
    if !field_allowed(scope.model(), raw) {
        tracing::debug!(column = raw, table = scope.model().table_name(), "Dropping unauthorized column");
        return Ok(None);
    }
    Ok(Some(scope.qualify(raw)))
}

fn compare(
    scope: &Scope<'_>,
    boolean: Boolean,
    part: Option<DatePart>,
    raw: &str,
    value: &Value,
    target: &mut Filter,
) -> Result<(), QueryError> {
    let Some(column) = resolve_column(scope, raw)? else {
        return Ok(());
    };

    let (comparison, value) = match value {
        Value::Object(map) => {
            let (Some(operator), Some(value)) = (
                map.get("operator").filter(|v| !v.is_null()),
                map.get("value").filter(|v| !v.is_null()),
            ) else {
                return Ok(());
            };
            let Some(comparison) = operator.as_str().and_then(Comparison::parse) else {
                tracing::debug!(column = %column, operator = %operator, "Dropping unknown comparison operator");
                return Ok(());
            };
            (comparison, params::coerce(value))
        }
        Value::Array(_) => return Ok(()),
        scalar => (Comparison::Eq, params::coerce(scalar)),
    };

    let kind = match part {
        Some(part) => PredicateKind::DatePart {
            part,
            column,
            comparison,
            value,
        },
        None => PredicateKind::Compare {
            column,
            comparison,
            value,
        },
    };
    target.push(boolean, kind);
    Ok(())
}

/// A single string is a comma-joined list; sequences are taken as given
fn set_values(value: &Value) -> Vec<Value> {
    match value {
        Value::String(joined) => joined
            .split(',')
            .map(|item| Value::String(item.to_string()))
            .collect(),
        Value::Array(items) => items.clone(),
        Value::Object(_) => params::entries(value)
            .into_iter()
            .map(|(_, item)| item.clone())
            .collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar.clone()],
    }
}
