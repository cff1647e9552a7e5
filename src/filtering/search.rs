use serde_json::Value;

use super::Scope;
use super::conditions::resolve_column;
use crate::errors::QueryError;
use crate::params;
use crate::query::{Boolean, Comparison, Filter, PredicateKind};

/// Keywords to look for, one per term when `split` is set
fn keywords(value: &str, split: bool) -> Vec<&str> {
    if split {
        value.split(' ').filter(|keyword| !keyword.is_empty()).collect()
    } else {
        vec![value]
    }
}

/// Fuzzy "contains" search over several columns.
///
/// Adds one isolated group OR-ing `column LIKE %keyword%` for every column and
/// keyword. With `json` set both sides are lower-cased instead of relying on
/// the column collation.
///
/// # Errors
///
/// [`QueryError::SearchValueMissing`] and [`QueryError::SearchColumnsMissing`]
/// for incomplete options; invalid column names abort as everywhere else.
pub(super) fn perform(scope: &Scope<'_>, options: &Value, target: &mut Filter) -> Result<(), QueryError> {
    let value = params::get(options, "value")
        .and_then(params::scalar_text)
        .filter(|value| !value.is_empty())
        .ok_or(QueryError::SearchValueMissing)?;

    let columns: Vec<String> = params::get(options, "columns")
        .map(params::string_list)
        .unwrap_or_default()
        .into_iter()
        .filter(|column| !column.is_empty())
        .collect();
    if columns.is_empty() {
        return Err(QueryError::SearchColumnsMissing);
    }

    let split = params::is_truthy(options.get("split"));
    let case_insensitive = params::is_truthy(options.get("json"));
    let keywords = keywords(&value, split);

    let mut group = Filter::new();
    for raw in &columns {
        let Some(column) = resolve_column(scope, raw)? else {
            continue;
        };
        for keyword in &keywords {
            let (comparison, pattern) = if case_insensitive {
                (Comparison::ILike, format!("%{}%", keyword.to_lowercase()))
            } else {
                (Comparison::Like, format!("%{keyword}%"))
            };
            group.push(
                Boolean::Or,
                PredicateKind::Compare {
                    column: column.clone(),
                    comparison,
                    value: Value::String(pattern),
                },
            );
        }
    }

    target.push_group(Boolean::And, group);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryBuilderConfig;
    use crate::model::{AllowedFields, ApiModel};
    use serde_json::json;

    struct User;

    impl ApiModel for User {
        fn table_name(&self) -> &str {
            "users"
        }

        fn allowed_fields(&self) -> AllowedFields {
            AllowedFields::Only(vec!["first_name", "last_name", "data->name"])
        }
    }

    fn searched(options: &Value) -> Result<Vec<PredicateKind>, QueryError> {
        let config = QueryBuilderConfig::default();
        let mut filter = Filter::new();
        perform(&Scope::root(&User, &config), options, &mut filter)?;
        Ok(match filter.predicates().first().map(|p| &p.kind) {
            Some(PredicateKind::Group(group)) => {
                group.predicates().iter().map(|p| p.kind.clone()).collect()
            }
            _ => Vec::new(),
        })
    }

    fn like(column: &str, pattern: &str) -> PredicateKind {
        PredicateKind::Compare {
            column: column.to_string(),
            comparison: Comparison::Like,
            value: json!(pattern),
        }
    }

    #[test]
    fn test_split_keywords_cross_columns() {
        let terms = searched(&json!({
            "value": "Jesper Bjerke",
            "columns": "first_name,last_name",
            "split": "true"
        }))
        .unwrap();
        assert_eq!(
            terms,
            vec![
                like("first_name", "%Jesper%"),
                like("first_name", "%Bjerke%"),
                like("last_name", "%Jesper%"),
                like("last_name", "%Bjerke%"),
            ]
        );
    }

    #[test]
    fn test_unsplit_value_is_one_keyword() {
        let terms = searched(&json!({"value": "Jesper Bjerke", "columns": ["first_name"]})).unwrap();
        assert_eq!(terms, vec![like("first_name", "%Jesper Bjerke%")]);
    }

    #[test]
    fn test_json_search_lower_cases() {
        let terms = searched(&json!({"value": "JeSper", "columns": "data->name", "json": true})).unwrap();
        assert_eq!(
            terms,
            vec![PredicateKind::Compare {
                column: "data->name".into(),
                comparison: Comparison::ILike,
                value: json!("%jesper%"),
            }]
        );
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(
            searched(&json!({"columns": "first_name"})),
            Err(QueryError::SearchValueMissing)
        );
        assert_eq!(
            searched(&json!({"value": "", "columns": "first_name"})),
            Err(QueryError::SearchValueMissing)
        );
    }

    #[test]
    fn test_missing_columns() {
        assert_eq!(
            searched(&json!({"value": "x"})),
            Err(QueryError::SearchColumnsMissing)
        );
        assert_eq!(
            searched(&json!({"value": "x", "columns": ""})),
            Err(QueryError::SearchColumnsMissing)
        );
    }

    #[test]
    fn test_unauthorized_columns_skipped() {
        let terms = searched(&json!({"value": "x", "columns": "first_name,password"})).unwrap();
        assert_eq!(terms, vec![like("first_name", "%x%")]);

        let terms = searched(&json!({"value": "x", "columns": "password"})).unwrap();
        assert!(terms.is_empty());
    }

    #[test]
    fn test_invalid_search_column_fatal() {
        let err = searched(&json!({"value": "x", "columns": "first_name,bad column"})).unwrap_err();
        assert!(matches!(err, QueryError::InvalidColumnName { .. }));
    }
}
