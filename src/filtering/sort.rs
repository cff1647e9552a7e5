//! `orderBy` / `order_by`.
//!
//! Accepted forms:
//!
//! ```text
//! orderBy=name,desc                       one pair
//! orderBy[name]=desc&orderBy[age]=asc     several pairs
//! orderBy[]=name,desc&orderBy[]=age,asc   several pairs, positional
//! orderBy[author.name]=localizedasc       column of a related row
//! ```
//!
//! Unlike every other clause an invalid direction fails the whole request.

use serde_json::Value;

use super::Scope;
use crate::errors::QueryError;
use crate::model::relation_allowed;
use crate::params::{self, Key};
use crate::query::{Correlation, Direction, OrderBy, OrderTarget};
use crate::relations;
use crate::sanitizer::sanitize_path;

/// Parse a direction; the bool is set for the `localized` variants
fn parse_direction(direction: &str) -> Result<(Direction, bool), QueryError> {
    match direction.to_lowercase().as_str() {
        "asc" => Ok((Direction::Asc, false)),
        "desc" => Ok((Direction::Desc, false)),
        "localizedasc" => Ok((Direction::Asc, true)),
        "localizeddesc" => Ok((Direction::Desc, true)),
        _ => Err(QueryError::invalid_sort_order(direction)),
    }
}

/// Compile the orderings requested in `value`.
///
/// # Errors
///
/// [`QueryError::InvalidSortOrder`] for a missing or unknown direction,
/// [`QueryError::RelationNotFound`] for an unknown relation in a dotted column
/// and [`QueryError::InvalidColumnName`] for malformed columns.
pub fn order_by(
    scope: &Scope<'_>,
    value: &Value,
    locale: Option<&str>,
) -> Result<Vec<OrderBy>, QueryError> {
    let mut orders = Vec::new();
    let mut push = |column: &str, direction: &str| -> Result<(), QueryError> {
        if let Some(order) = order(scope, column, direction, locale)? {
            orders.push(order);
        }
        Ok(())
    };

    match value {
        Value::String(pair) => {
            let (column, direction) = split_pair(pair);
            push(column, direction)?;
        }
        Value::Object(_) | Value::Array(_) => {
            for (key, direction) in params::entries(value) {
                match (key, direction) {
                    (Key::Index(_), Value::String(pair)) => {
                        let (column, direction) = split_pair(pair);
                        push(column, direction)?;
                    }
                    (key, direction) => {
                        let direction = params::scalar_text(direction).unwrap_or_default();
                        push(&key.as_text(), &direction)?;
                    }
                }
            }
        }
        _ => {}
    }
    Ok(orders)
}

/// `"name,desc"` → `("name", "desc")`. A missing direction is empty.
fn split_pair(pair: &str) -> (&str, &str) {
    let mut parts = pair.split(',');
    let column = parts.next().unwrap_or_default();
    let direction = parts.next().unwrap_or_default();
    (column, direction)
}

fn order(
    scope: &Scope<'_>,
    column: &str,
    direction: &str,
    locale: Option<&str>,
) -> Result<Option<OrderBy>, QueryError> {
    let (direction, localized) = parse_direction(direction)?;
    if column.is_empty() {
        tracing::debug!("Dropping ordering without a column");
        return Ok(None);
    }

    let target = match column.split_once('.') {
        Some((raw_relation, rest)) => {
            let model = scope.model();
            let name = relations::resolve(raw_relation, model)?;
            if !relation_allowed(model, &name) {
                tracing::debug!(relation = %name, "Dropping ordering on unauthorized relation");
                return Ok(None);
            }
            let relation = model
                .relation(&name)
                .ok_or_else(|| QueryError::relation_not_found(raw_relation))?;
            let sub_column = rest.split('.').next().unwrap_or_default();
            sanitize_path(sub_column)?;
            if sub_column.is_empty() {
                tracing::debug!(relation = %name, "Dropping relation ordering without a column");
                return Ok(None);
            }

            OrderTarget::Relation {
                correlation: Correlation::new(model, &relation),
                relation: name,
                column: sub_column.to_string(),
            }
        }
        None => OrderTarget::Column(sanitize_path(column)?.to_string()),
    };

    let collation = localized.then(|| scope.config().collation_for(locale).to_string());
    Ok(Some(OrderBy {
        target,
        direction,
        collation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryBuilderConfig;
    use crate::model::{ApiModel, RelationDef};
    use serde_json::json;

    struct Author;

    impl ApiModel for Author {
        fn table_name(&self) -> &str {
            "authors"
        }
    }

    struct Publisher;

    impl ApiModel for Publisher {
        fn table_name(&self) -> &str {
            "publishers"
        }
    }

    struct Book;

    impl ApiModel for Book {
        fn table_name(&self) -> &str {
            "books"
        }

        fn relations(&self) -> Vec<RelationDef> {
            vec![
                RelationDef::belongs_to("author", Author, "author_id"),
                RelationDef::belongs_to("publisher", Publisher, "publisher_id"),
            ]
        }

        fn allowed_relations(&self) -> Vec<&'static str> {
            vec!["author"]
        }
    }

    fn ordered(value: &Value, locale: Option<&str>) -> Result<Vec<OrderBy>, QueryError> {
        let config = QueryBuilderConfig::default();
        order_by(&Scope::root(&Book, &config), value, locale)
    }

    fn column(name: &str, direction: Direction) -> OrderBy {
        OrderBy {
            target: OrderTarget::Column(name.to_string()),
            direction,
            collation: None,
        }
    }

    #[test]
    fn test_string_pair() {
        assert_eq!(
            ordered(&json!("title,DESC"), None).unwrap(),
            vec![column("title", Direction::Desc)]
        );
    }

    #[test]
    fn test_map_form_keeps_order() {
        assert_eq!(
            ordered(&json!({"title": "asc", "year": "desc"}), None).unwrap(),
            vec![column("title", Direction::Asc), column("year", Direction::Desc)]
        );
    }

    #[test]
    fn test_positional_pairs() {
        assert_eq!(
            ordered(&json!(["title,asc", "year,desc"]), None).unwrap(),
            vec![column("title", Direction::Asc), column("year", Direction::Desc)]
        );
    }

    #[test]
    fn test_invalid_direction_fatal() {
        assert_eq!(
            ordered(&json!("name,bogus"), None),
            Err(QueryError::invalid_sort_order("bogus"))
        );
        assert_eq!(
            ordered(&json!("name"), None),
            Err(QueryError::invalid_sort_order(""))
        );
        assert!(ordered(&json!({"name": ["asc"]}), None).is_err());
    }

    #[test]
    fn test_localized_direction_uses_locale_collation() {
        let orders = ordered(&json!("title,localizedasc"), Some("sv")).unwrap();
        assert_eq!(orders[0].direction, Direction::Asc);
        assert_eq!(orders[0].collation.as_deref(), Some("utf8mb4_swedish_ci"));

        let orders = ordered(&json!("title,LocalizedDesc"), Some("fr")).unwrap();
        assert_eq!(orders[0].direction, Direction::Desc);
        assert_eq!(orders[0].collation.as_deref(), Some("utf8mb4_unicode_ci"));
    }

    #[test]
    fn test_relation_column() {
        let orders = ordered(&json!({"authors.name": "asc"}), None).unwrap();
        let OrderTarget::Relation {
            relation,
            column,
            correlation,
        } = &orders[0].target
        else {
            panic!("expected relation ordering");
        };
        assert_eq!(relation, "author");
        assert_eq!(column, "name");
        assert_eq!(correlation.parent_column, "author_id");
        assert_eq!(correlation.related_table, "authors");
    }

    #[test]
    fn test_unauthorized_relation_dropped() {
        assert!(ordered(&json!({"publisher.name": "asc"}), None).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_relation_fatal() {
        assert_eq!(
            ordered(&json!({"editor.name": "asc"}), None),
            Err(QueryError::relation_not_found("editor"))
        );
    }

    #[test]
    fn test_empty_column_dropped() {
        assert!(ordered(&json!(",asc"), None).unwrap().is_empty());
        assert!(ordered(&json!({"author.": "desc"}), None).unwrap().is_empty());
        assert_eq!(
            ordered(&json!(["title,asc", ",desc"]), None).unwrap(),
            vec![column("title", Direction::Asc)]
        );
        assert_eq!(
            ordered(&json!(",sideways"), None),
            Err(QueryError::invalid_sort_order("sideways"))
        );
    }

    #[test]
    fn test_direction_checked_before_column() {
        assert_eq!(
            ordered(&json!({"bad column": "up"}), None),
            Err(QueryError::invalid_sort_order("up"))
        );
        assert!(matches!(
            ordered(&json!({"bad column": "asc"}), None),
            Err(QueryError::InvalidColumnName { .. })
        ));
    }
}
