//! Compiled query.
//!
//! A [`Query`] is the result of compiling request parameters: a predicate tree
//! ([`Filter`]) plus the projection, eager-load, count, ordering, grouping and
//! limit clauses. It holds no database handle. Use the methods in
//! [`crate::database`] to turn it into an executable statement.
//!
//! Callers can add their own constraints through [`Query::filter_mut`].
//! Everything compiled from the request sits inside a single group, so a
//! caller's `AND` constraint can never be bypassed by an `orWhere` from the
//! request.

use serde_json::Value;

use crate::appends::Appends;
use crate::model::{ApiModel, RelationDef};

/// How a predicate joins the predicates before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolean {
    And,
    Or,
}

/// Explicit comparison operators accepted in `{operator, value}` maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    /// Case-insensitive LIKE, done by lower-casing both sides
    ILike,
    NotILike,
}

impl Comparison {
    /// Parse an operator from request input, case-insensitively
    #[must_use]
    pub fn parse(operator: &str) -> Option<Self> {
        match operator.trim().to_lowercase().as_str() {
            "=" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "like" => Some(Self::Like),
            "not like" => Some(Self::NotLike),
            "ilike" => Some(Self::ILike),
            "not ilike" => Some(Self::NotILike),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::ILike => "ilike",
            Self::NotILike => "not ilike",
        }
    }
}

/// Part of a date/time column compared by the `whereDate` family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Day,
    Month,
    Year,
    Time,
}

/// Correlates a related table with its parent:
/// `related_table.related_column = parent_table.parent_column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub parent_table: String,
    pub parent_column: String,
    pub related_table: String,
    pub related_column: String,
}

impl Correlation {
    #[must_use]
    pub fn new(parent: &dyn ApiModel, relation: &RelationDef) -> Self {
        Self {
            parent_table: parent.table_name().to_string(),
            parent_column: relation.parent_column().to_string(),
            related_table: relation.target().table_name().to_string(),
            related_column: relation.related_column().to_string(),
        }
    }
}

/// `EXISTS` / `NOT EXISTS` over a relation, optionally constrained
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsClause {
    pub relation: String,
    pub negated: bool,
    pub correlation: Correlation,
    pub constraints: Filter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateKind {
    Compare {
        column: String,
        comparison: Comparison,
        value: Value,
    },
    DatePart {
        part: DatePart,
        column: String,
        comparison: Comparison,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },
    /// Bounds are kept as received; anything but two elements is the
    /// storage layer's problem
    Between {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },
    Null {
        column: String,
        negated: bool,
    },
    Group(Filter),
    Exists(ExistsClause),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub boolean: Boolean,
    pub kind: PredicateKind,
}

/// Ordered list of predicates, each joined to its predecessors by its
/// [`Boolean`]. The boolean of the first predicate is not rendered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, boolean: Boolean, kind: PredicateKind) {
        self.predicates.push(Predicate { boolean, kind });
    }

    /// Add a nested group. Empty groups are not added.
    pub fn push_group(&mut self, boolean: Boolean, group: Self) {
        if !group.is_empty() {
            self.push(boolean, PredicateKind::Group(group));
        }
    }

    pub fn push_exists(&mut self, boolean: Boolean, clause: ExistsClause) {
        self.push(boolean, PredicateKind::Exists(clause));
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }
}

/// Relation to eager-load, optionally restricted to some columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerLoad {
    /// Canonical relation path, segments joined with `.`
    pub relation: String,
    /// Qualified columns to load. Empty means all columns.
    pub columns: Vec<String>,
}

/// Related-row count added to the projection as `alias`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationCount {
    pub relation: String,
    pub alias: String,
    pub correlation: Correlation,
    pub constraints: Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTarget {
    /// Sanitized column path on the queried table
    Column(String),
    /// Column of the first related row
    Relation {
        relation: String,
        column: String,
        correlation: Correlation,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub target: OrderTarget,
    pub direction: Direction,
    /// Set for `localizedasc` / `localizeddesc`
    pub collation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    filter: Filter,
    selects: Vec<String>,
    eager_loads: Vec<EagerLoad>,
    counts: Vec<RelationCount>,
    orders: Vec<OrderBy>,
    groups: Vec<String>,
    limit: Option<u64>,
    appends: Appends,
}

impl Query {
    /// Empty query over `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: Filter::new(),
            selects: Vec::new(),
            eager_loads: Vec::new(),
            counts: Vec::new(),
            orders: Vec::new(),
            groups: Vec::new(),
            limit: None,
            appends: Appends::default(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut Filter {
        &mut self.filter
    }

    #[must_use]
    pub fn selects(&self) -> &[String] {
        &self.selects
    }

    pub fn select(&mut self, columns: Vec<String>) {
        self.selects.extend(columns);
    }

    #[must_use]
    pub fn eager_loads(&self) -> &[EagerLoad] {
        &self.eager_loads
    }

    pub fn with(&mut self, load: EagerLoad) {
        self.eager_loads.push(load);
    }

    #[must_use]
    pub fn counts(&self) -> &[RelationCount] {
        &self.counts
    }

    pub fn with_count(&mut self, count: RelationCount) {
        self.counts.push(count);
    }

    #[must_use]
    pub fn orders(&self) -> &[OrderBy] {
        &self.orders
    }

    pub fn order_by(&mut self, order: OrderBy) {
        self.orders.push(order);
    }

    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn group_by(&mut self, columns: Vec<String>) {
        self.groups.extend(columns);
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    /// Appended attributes of this request
    #[must_use]
    pub const fn appends(&self) -> &Appends {
        &self.appends
    }

    pub fn appends_mut(&mut self) -> &mut Appends {
        &mut self.appends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn equals(column: &str, value: Value) -> PredicateKind {
        PredicateKind::Compare {
            column: column.to_string(),
            comparison: Comparison::Eq,
            value,
        }
    }

    #[test]
    fn test_comparison_parse() {
        assert_eq!(Comparison::parse(">="), Some(Comparison::Gte));
        assert_eq!(Comparison::parse("LIKE"), Some(Comparison::Like));
        assert_eq!(Comparison::parse(" not like "), Some(Comparison::NotLike));
        assert_eq!(Comparison::parse("<>"), Some(Comparison::Ne));
        assert_eq!(Comparison::parse("; drop"), None);
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        let mut filter = Filter::new();
        filter.push_group(Boolean::And, Filter::new());
        assert!(filter.is_empty());

        let mut inner = Filter::new();
        inner.push(Boolean::And, equals("a", json!(1)));
        filter.push_group(Boolean::Or, inner);
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.predicates()[0].boolean, Boolean::Or);
    }

    #[test]
    fn test_query_clauses_accumulate() {
        let mut query = Query::new("users");
        query.select(vec!["users.id".to_string()]);
        query.group_by(vec!["status".to_string()]);
        query.set_limit(5);
        query.filter_mut().push(Boolean::And, equals("id", json!(1)));

        assert_eq!(query.table(), "users");
        assert_eq!(query.selects(), ["users.id".to_string()]);
        assert_eq!(query.groups(), ["status".to_string()]);
        assert_eq!(query.limit(), Some(5));
        assert_eq!(query.filter().len(), 1);
    }
}
