use serde_json::Value;

use crate::config::QueryBuilderConfig;
use crate::errors::QueryError;
use crate::filtering::{self, Scope, projection, relations, sort};
use crate::model::ApiModel;
use crate::params;
use crate::query::Query;

/// Compiles request parameters against a model.
///
/// ```rust,ignore
/// let query = ApiQueryBuilder::new(&User, &params)
///     .locale("sv")
///     .config(&state.query_config)
///     .build()?;
/// ```
///
/// Without [`ApiQueryBuilder::config`] the defaults of
/// [`QueryBuilderConfig::default`] apply.
#[derive(Clone, Copy)]
pub struct ApiQueryBuilder<'a> {
    model: &'a dyn ApiModel,
    params: &'a Value,
    locale: Option<&'a str>,
    config: Option<&'a QueryBuilderConfig>,
}

impl<'a> ApiQueryBuilder<'a> {
    #[must_use]
    pub fn new(model: &'a dyn ApiModel, params: &'a Value) -> Self {
        Self {
            model,
            params,
            locale: None,
            config: None,
        }
    }

    /// Active locale, used to pick the collation of localized orderings
    #[must_use]
    pub const fn locale(mut self, locale: &'a str) -> Self {
        self.locale = Some(locale);
        self
    }

    #[must_use]
    pub const fn config(mut self, config: &'a QueryBuilderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Compile every clause of the request.
    ///
    /// Either the whole request compiles or nothing is returned.
    ///
    /// # Errors
    ///
    /// Any [`QueryError`]: malformed columns, unknown relations, invalid sort
    /// directions, broken search options or excessive nesting.
    pub fn build(&self) -> Result<Query, QueryError> {
        let default_config;
        let config = if let Some(config) = self.config {
            config
        } else {
            default_config = QueryBuilderConfig::default();
            &default_config
        };

        let model = self.model;
        let params = self.params;
        let scope = Scope::root(model, config);
        let mut query = Query::new(model.table_name());

        filtering::compile(&scope, params, query.filter_mut())?;

        if let Some(with) = params::get(params, "with") {
            for load in relations::eager_loads(&scope, with, params::get(params, "select"))? {
                query.with(load);
            }
        }

        if let Some(appends) = params::get(params, "appends") {
            let requested: Vec<String> = params::string_list(appends)
                .into_iter()
                .filter(|name| !name.is_empty())
                .collect();
            let permitted = model.validated_appends(&requested);
            if permitted.len() < requested.len() {
                tracing::debug!(table = model.table_name(), requested = ?requested, permitted = ?permitted, "Dropping unauthorized appends");
            }
            query.appends_mut().merge_appends(model, permitted);
        }

        if let Some(select) = params::get(params, "select") {
            query.select(projection::select(&scope, select)?);
        }

        if let Some(counts) = params::get(params, "counts") {
            for count in relations::counts(&scope, counts)? {
                query.with_count(count);
            }
        }

        if let Some(order) = params::get(params, "orderBy").or_else(|| params::get(params, "order_by")) {
            for order in sort::order_by(&scope, order, self.locale)? {
                query.order_by(order);
            }
        }

        if let Some(groups) = params::get(params, "groupBy").or_else(|| params::get(params, "group_by")) {
            query.group_by(projection::group_by(groups)?);
        }

        if let Some(limit) = params::get(params, "limit").and_then(projection::limit) {
            query.set_limit(limit);
        }

        tracing::debug!(
            table = model.table_name(),
            predicates = query.filter().len(),
            orders = query.orders().len(),
            "Compiled query parameters"
        );
        Ok(query)
    }
}

/// Compile `params` against `model` with the default configuration.
///
/// # Errors
///
/// See [`ApiQueryBuilder::build`].
pub fn build(model: &dyn ApiModel, params: &Value) -> Result<Query, QueryError> {
    ApiQueryBuilder::new(model, params).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AllowedFields, RelationDef};
    use crate::query::{Direction, OrderTarget};
    use serde_json::json;

    struct Booking;

    impl ApiModel for Booking {
        fn table_name(&self) -> &str {
            "bookings"
        }
    }

    struct User;

    impl ApiModel for User {
        fn table_name(&self) -> &str {
            "users"
        }

        fn relations(&self) -> Vec<RelationDef> {
            vec![RelationDef::has_many("bookings", Booking, "user_id")]
        }

        fn allowed_fields(&self) -> AllowedFields {
            AllowedFields::Only(vec!["id", "name", "status"])
        }

        fn allowed_relations(&self) -> Vec<&'static str> {
            vec!["bookings"]
        }

        fn allowed_appends(&self) -> Vec<&'static str> {
            vec!["full_name"]
        }

        fn allowed_counts(&self) -> Vec<&'static str> {
            vec!["bookings"]
        }
    }

    #[test]
    fn test_no_operators_no_filter() {
        let query = build(&User, &json!({"limit": 5, "unknown": "x"})).unwrap();
        assert!(query.filter().is_empty());
        assert_eq!(query.limit(), Some(5));
    }

    #[test]
    fn test_operators_wrapped_in_one_group() {
        let query = build(
            &User,
            &json!({"where": {"name": "Jesper"}, "orWhere": {"status": "active"}}),
        )
        .unwrap();
        assert_eq!(query.filter().len(), 1);
    }

    #[test]
    fn test_all_clauses() {
        let params = json!({
            "with": "bookings",
            "select": "id,name,password",
            "appends": "full_name,secret",
            "counts": "bookings",
            "orderBy": "name,desc",
            "groupBy": "status",
            "limit": "20",
        });
        let query = build(&User, &params).unwrap();

        assert_eq!(query.eager_loads().len(), 1);
        assert_eq!(query.selects(), ["users.id", "users.name"]);
        assert_eq!(query.appends().effective(&User), vec!["full_name".to_string()]);
        assert_eq!(query.counts()[0].alias, "bookings_count");
        assert_eq!(query.orders()[0].direction, Direction::Desc);
        assert_eq!(query.orders()[0].target, OrderTarget::Column("name".into()));
        assert_eq!(query.groups(), ["status"]);
        assert_eq!(query.limit(), Some(20));
    }

    #[test]
    fn test_snake_case_aliases() {
        let query = build(&User, &json!({"order_by": "name,asc", "group_by": ["status"]})).unwrap();
        assert_eq!(query.orders().len(), 1);
        assert_eq!(query.groups(), ["status"]);
    }

    #[test]
    fn test_locale_and_config() {
        let config = QueryBuilderConfig::default().with_collation("da", "utf8mb4_danish_ci");
        let params = json!({"orderBy": "name,localizedAsc"});
        let query = ApiQueryBuilder::new(&User, &params)
            .locale("da")
            .config(&config)
            .build()
            .unwrap();
        assert_eq!(query.orders()[0].collation.as_deref(), Some("utf8mb4_danish_ci"));
    }

    #[test]
    fn test_fatal_errors_return_nothing() {
        let err = build(&User, &json!({"where": {"name": "x"}, "orderBy": "name,bogus"})).unwrap_err();
        assert_eq!(err, QueryError::invalid_sort_order("bogus"));
    }

    #[test]
    fn test_compiling_twice_is_identical() {
        let params = json!({
            "where": {"name": "Jesper"},
            "whereHas": {"bookings": {"where": {"status": "active"}}},
            "orderBy": {"name": "asc"},
        });
        assert_eq!(build(&User, &params).unwrap(), build(&User, &params).unwrap());
    }

    #[test]
    fn test_null_parameters_are_absent() {
        let query = build(&User, &json!({"limit": null, "select": null})).unwrap();
        assert!(query.limit().is_none());
        assert!(query.selects().is_empty());
    }
}
