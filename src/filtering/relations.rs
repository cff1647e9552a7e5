//! Eager loads (`with`, combined with dotted `select` paths) and relation
//! counts (`counts`).

use heck::ToSnakeCase;
use serde_json::Value;

use super::Scope;
use super::conditions;
use crate::errors::QueryError;
use crate::model::{ApiModel, RelationDef, relation_allowed};
use crate::params::{self, Key};
use crate::query::{Correlation, EagerLoad, Filter, RelationCount};
use crate::relations::{self, camel};
use crate::sanitizer::sanitize_path;

/// Walk a dotted relation path, resolving and authorizing every segment
/// against the model that owns it. `None` when a segment is not permitted.
fn authorized_path(
    model: &dyn ApiModel,
    path: &str,
) -> Result<Option<(String, RelationDef)>, QueryError> {
    let mut names = Vec::new();
    let mut current: Option<RelationDef> = None;

    for segment in path.split('.') {
        let next = {
            let owner = current.as_ref().map_or(model, RelationDef::target);
            let name = relations::resolve(segment, owner)?;
            if !relation_allowed(owner, &name) {
                tracing::debug!(relation = %name, table = owner.table_name(), "Dropping unauthorized eager load");
                return Ok(None);
            }
            owner
                .relation(&name)
                .ok_or_else(|| QueryError::relation_not_found(segment))?
        };
        names.push(next.name());
        current = Some(next);
    }

    Ok(current.map(|relation| (names.join("."), relation)))
}

/// Canonical form of a relation path, without authorization
fn canonical_path(model: &dyn ApiModel, path: &str) -> Option<String> {
    let mut names = Vec::new();
    let mut current: Option<RelationDef> = None;

    for segment in path.split('.') {
        let owner = current.as_ref().map_or(model, RelationDef::target);
        let name = relations::try_resolve(segment, owner)?;
        let next = owner.relation(&name)?;
        names.push(name);
        current = Some(next);
    }
    Some(names.join("."))
}

/// Relations to eager-load.
///
/// `select` entries of the form `relation.column` restrict the columns loaded
/// for that relation, authorized against the related model. When none survive
/// the relation is loaded without a column restriction.
///
/// # Errors
///
/// [`QueryError::RelationNotFound`] for unknown relation tokens and
/// [`QueryError::InvalidColumnName`] for malformed relation columns.
pub fn eager_loads(
    scope: &Scope<'_>,
    with: &Value,
    select: Option<&Value>,
) -> Result<Vec<EagerLoad>, QueryError> {
    let model = scope.model();
    let relation_selects: Vec<(String, String)> = select
        .map(params::string_list)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|path| {
            let (relation, column) = path.rsplit_once('.')?;
            Some((relation.to_string(), column.to_string()))
        })
        .collect();

    let mut loads: Vec<EagerLoad> = Vec::new();
    for token in params::string_list(with) {
        if token.is_empty() {
            continue;
        }
        let Some((path, relation)) = authorized_path(model, &token)? else {
            continue;
        };
        if loads.iter().any(|load| load.relation == path) {
            continue;
        }

        let target = relation.target();
        let mut requested = Vec::new();
        for (raw_relation, column) in &relation_selects {
            if canonical_path(model, raw_relation).as_deref() != Some(path.as_str()) {
                continue;
            }
            sanitize_path(column)?;
            if !requested.contains(column) {
                requested.push(column.clone());
            }
        }
        let columns = target
            .validated_fields(&requested)
            .into_iter()
            .map(|column| format!("{}.{column}", target.table_name()))
            .collect();

        loads.push(EagerLoad {
            relation: path,
            columns,
        });
    }
    Ok(loads)
}

/// Relation counts.
///
/// A string is a comma-joined list of relations. In the map form the key
/// names the relation (or the value does, for positional keys); a map value
/// is compiled as a constraint inside the count's subquery.
///
/// # Errors
///
/// [`QueryError::RelationNotFound`] for permitted counts the model does not
/// declare, plus any error from compiling count constraints.
pub fn counts(scope: &Scope<'_>, value: &Value) -> Result<Vec<RelationCount>, QueryError> {
    let model = scope.model();
    let requested: Vec<(String, Option<&Value>)> = match value {
        Value::String(joined) => joined
            .split(',')
            .filter(|token| !token.is_empty())
            .map(|token| (camel(token), None))
            .collect(),
        Value::Object(_) | Value::Array(_) => params::entries(value)
            .into_iter()
            .filter_map(|(key, item)| match key {
                Key::Name(name) => Some((camel(name), Some(item))),
                Key::Index(_) => params::scalar_text(item).map(|name| (camel(&name), None)),
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut counts: Vec<RelationCount> = Vec::new();
    for (name, constraints) in requested {
        if !model.validated_counts(&[name.clone()]).contains(&name) {
            tracing::debug!(relation = %name, "Dropping unauthorized relation count");
            continue;
        }
        let relation = model
            .relation(&name)
            .ok_or_else(|| QueryError::relation_not_found(name.clone()))?;

        let mut filter = Filter::new();
        if let Some(constraints) = constraints.filter(|item| item.is_object() || item.is_array()) {
            let child = scope.related(relation.target())?;
            conditions::compile(&child, constraints, &mut filter)?;
        }

        counts.push(RelationCount {
            alias: format!("{}_count", name.to_snake_case()),
            correlation: Correlation::new(model, &relation),
            relation: name,
            constraints: filter,
        });
    }
    Ok(counts)
}
