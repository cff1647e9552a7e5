use sea_orm::{
    Condition, DatabaseBackend,
    sea_query::{
        Alias, Expr, Func, MysqlQueryBuilder, PostgresQueryBuilder, Query as SelectQuery,
        SelectStatement, SimpleExpr, SqliteQueryBuilder, SubQueryStatement, Value as SqlValue,
    },
};
use serde_json::Value;

use super::identifiers::{column_sql, date_part_sql, quote};
use crate::params;
use crate::query::{
    Boolean, Comparison, Correlation, DatePart, Filter, OrderBy, OrderTarget, Predicate,
    PredicateKind, Query, RelationCount,
};

/// Bind value for a request value. Lists and maps are bound as their JSON text.
fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::String(None),
        Value::Bool(flag) => (*flag).into(),
        Value::Number(number) => number.as_i64().map_or_else(
            || {
                number
                    .as_u64()
                    .map_or_else(|| number.as_f64().into(), Into::into)
            },
            Into::into,
        ),
        Value::String(text) => text.clone().into(),
        other => other.to_string().into(),
    }
}

fn text(value: &Value) -> String {
    params::scalar_text(value).unwrap_or_else(|| value.to_string())
}

fn compare(column: SimpleExpr, comparison: Comparison, value: &Value) -> SimpleExpr {
    let expr = Expr::expr(column.clone());
    if value.is_null() {
        match comparison {
            Comparison::Eq => return expr.is_null(),
            Comparison::Ne => return expr.is_not_null(),
            _ => {}
        }
    }

    match comparison {
        Comparison::Eq => expr.eq(sql_value(value)),
        Comparison::Ne => expr.ne(sql_value(value)),
        Comparison::Lt => expr.lt(sql_value(value)),
        Comparison::Lte => expr.lte(sql_value(value)),
        Comparison::Gt => expr.gt(sql_value(value)),
        Comparison::Gte => expr.gte(sql_value(value)),
        Comparison::Like => expr.like(text(value)),
        Comparison::NotLike => expr.not_like(text(value)),
        Comparison::ILike => Expr::expr(Func::lower(column)).like(text(value).to_lowercase()),
        Comparison::NotILike => {
            Expr::expr(Func::lower(column)).not_like(text(value).to_lowercase())
        }
    }
}

/// Date-part values as each backend compares them
fn date_part_value(part: DatePart, value: &Value, backend: DatabaseBackend) -> Value {
    let raw = text(value);
    match (backend, part) {
        (DatabaseBackend::Sqlite, DatePart::Day | DatePart::Month) => {
            Value::String(format!("{raw:0>2}"))
        }
        (DatabaseBackend::Sqlite, _) => Value::String(raw),
        (_, DatePart::Day | DatePart::Month | DatePart::Year) => raw
            .trim()
            .parse::<i64>()
            .map_or_else(|_| value.clone(), Value::from),
        _ => value.clone(),
    }
}

fn column_expr(column: &str, backend: DatabaseBackend) -> SimpleExpr {
    Expr::cust(column_sql(column, backend))
}

/// `related.related_column = parent.parent_column`
fn correlated(correlation: &Correlation) -> SimpleExpr {
    Expr::col((
        Alias::new(&correlation.related_table),
        Alias::new(&correlation.related_column),
    ))
    .equals((
        Alias::new(&correlation.parent_table),
        Alias::new(&correlation.parent_column),
    ))
}

/// `SELECT .. FROM related WHERE correlation AND constraints`, without a projection
fn related_select(
    correlation: &Correlation,
    constraints: &Filter,
    backend: DatabaseBackend,
) -> SelectStatement {
    let mut condition = Condition::all().add(correlated(correlation));
    if !constraints.is_empty() {
        condition = condition.add(filter_condition(constraints, backend));
    }

    let mut select = SelectQuery::select();
    select
        .from(Alias::new(&correlation.related_table))
        .cond_where(condition);
    select
}

fn sub_query(select: SelectStatement) -> SimpleExpr {
    SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(select)))
}

fn predicate_condition(kind: &PredicateKind, backend: DatabaseBackend) -> Condition {
    let expr = match kind {
        PredicateKind::Group(group) => return filter_condition(group, backend),
        PredicateKind::Compare {
            column,
            comparison,
            value,
        } => compare(column_expr(column, backend), *comparison, value),
        PredicateKind::DatePart {
            part,
            column,
            comparison,
            value,
        } => compare(
            Expr::cust(date_part_sql(*part, &column_sql(column, backend), backend)),
            *comparison,
            &date_part_value(*part, value, backend),
        ),
        PredicateKind::In {
            column,
            values,
            negated,
        } => {
            let expr = Expr::expr(column_expr(column, backend));
            let values = values.iter().map(sql_value);
            if *negated {
                expr.is_not_in(values)
            } else {
                expr.is_in(values)
            }
        }
        PredicateKind::Between {
            column,
            values,
            negated,
        } => {
            let expr = Expr::expr(column_expr(column, backend));
            let low = sql_value(values.first().unwrap_or(&Value::Null));
            let high = sql_value(values.get(1).unwrap_or(&Value::Null));
            if *negated {
                expr.not_between(low, high)
            } else {
                expr.between(low, high)
            }
        }
        PredicateKind::Null { column, negated } => {
            let expr = Expr::expr(column_expr(column, backend));
            if *negated {
                expr.is_not_null()
            } else {
                expr.is_null()
            }
        }
        PredicateKind::Exists(clause) => {
            let mut select = related_select(&clause.correlation, &clause.constraints, backend);
            select.expr(Expr::cust("1"));
            let exists = Expr::exists(select);
            if clause.negated { exists.not() } else { exists }
        }
    };
    Condition::all().add(expr)
}

/// Render a predicate list.
///
/// Each `OR` predicate starts a new conjunction, so `a AND b OR c` becomes
/// `(a AND b) OR c`, the precedence SQL gives the same clause list.
#[must_use]
pub fn filter_condition(filter: &Filter, backend: DatabaseBackend) -> Condition {
    let mut runs: Vec<Vec<&Predicate>> = Vec::new();
    for predicate in filter.predicates() {
        if predicate.boolean == Boolean::Or || runs.is_empty() {
            runs.push(Vec::new());
        }
        if let Some(run) = runs.last_mut() {
            run.push(predicate);
        }
    }

    let mut conjunctions: Vec<Condition> = runs
        .into_iter()
        .map(|run| {
            run.into_iter()
                .fold(Condition::all(), |condition, predicate| {
                    condition.add(predicate_condition(&predicate.kind, backend))
                })
        })
        .collect();

    if conjunctions.len() == 1 {
        return conjunctions.pop().unwrap_or_else(Condition::all);
    }
    conjunctions
        .into_iter()
        .fold(Condition::any(), |any, conjunction| any.add(conjunction))
}

fn render(select: &SelectStatement, backend: DatabaseBackend) -> String {
    match backend {
        DatabaseBackend::MySql => select.to_string(MysqlQueryBuilder),
        DatabaseBackend::Postgres => select.to_string(PostgresQueryBuilder),
        _ => select.to_string(SqliteQueryBuilder),
    }
}

fn count_expr(count: &RelationCount, backend: DatabaseBackend) -> SimpleExpr {
    let mut select = related_select(&count.correlation, &count.constraints, backend);
    select.expr(Expr::cust("COUNT(*)"));
    sub_query(select)
}

/// Ordering expression without the direction
pub(super) fn order_expression(order: &OrderBy, backend: DatabaseBackend) -> String {
    let expression = match &order.target {
        OrderTarget::Column(column) => column_sql(column, backend),
        OrderTarget::Relation {
            column,
            correlation,
            ..
        } => {
            let mut select = related_select(correlation, &Filter::new(), backend);
            select
                .expr(Expr::cust(column_sql(
                    &format!("{}.{column}", correlation.related_table),
                    backend,
                )))
                .limit(1);
            format!("({})", render(&select, backend))
        }
    };

    match &order.collation {
        Some(collation) => format!("{expression} COLLATE {collation}"),
        None => expression,
    }
}

/// The full `SELECT` for a compiled query
#[must_use]
pub fn select_statement(query: &Query, backend: DatabaseBackend) -> SelectStatement {
    let mut select = SelectQuery::select();
    select.from(Alias::new(query.table()));

    if query.selects().is_empty() {
        select.expr(Expr::cust(format!("{}.*", quote(query.table(), backend))));
    } else {
        for column in query.selects() {
            select.expr(column_expr(column, backend));
        }
    }

    for count in query.counts() {
        select.expr_as(count_expr(count, backend), Alias::new(&count.alias));
    }

    if !query.filter().is_empty() {
        select.cond_where(filter_condition(query.filter(), backend));
    }

    if !query.groups().is_empty() {
        select.add_group_by(
            query
                .groups()
                .iter()
                .map(|column| column_expr(column, backend)),
        );
    }

    for order in query.orders() {
        select.order_by_expr(
            Expr::cust(order_expression(order, backend)),
            order.direction.into(),
        );
    }

    if let Some(limit) = query.limit() {
        select.limit(limit);
    }
    select
}
