//! # Executable Statements
//!
//! Renders a compiled [`Query`] into sea-query / sea-orm statements for one
//! [`DatabaseBackend`]. Request values are always bound as parameters; only
//! sanitized identifiers and configured collations are written into the SQL
//! text.
//!
//! ```rust,ignore
//! use querycrate::build;
//! use sea_orm::{DbBackend, EntityTrait, QueryFilter};
//!
//! let query = build(&User, &params)?;
//!
//! // Raw statement for `query_all`
//! let rows = db.query_all(query.to_statement(DbBackend::Sqlite)).await?;
//!
//! // Or only the predicate tree, on top of an entity query
//! let users = user::Entity::find()
//!     .filter(query.condition(DbBackend::Sqlite))
//!     .all(&db)
//!     .await?;
//! ```

mod identifiers;
mod statement;

pub use identifiers::{column_sql, quote};

use sea_orm::{
    Condition, DatabaseBackend, Statement,
    sea_query::{Order, SelectStatement},
};

use crate::query::{Direction, OrderBy, Query};

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Self::Asc,
            Direction::Desc => Self::Desc,
        }
    }
}

impl OrderBy {
    /// Raw ordering clause, e.g. `` `name` COLLATE utf8mb4_swedish_ci asc ``
    #[must_use]
    pub fn to_sql(&self, backend: DatabaseBackend) -> String {
        format!(
            "{} {}",
            statement::order_expression(self, backend),
            self.direction.as_str()
        )
    }
}

impl Query {
    /// Full `SELECT` statement, projections, counts and orderings included
    #[must_use]
    pub fn to_select_statement(&self, backend: DatabaseBackend) -> SelectStatement {
        statement::select_statement(self, backend)
    }

    /// Statement with bound values, ready for `ConnectionTrait::query_all`
    #[must_use]
    pub fn to_statement(&self, backend: DatabaseBackend) -> Statement {
        backend.build(&self.to_select_statement(backend))
    }

    /// The predicate tree alone, for `QueryFilter::filter`.
    ///
    /// Columns are rendered qualified as compiled; an empty filter yields an
    /// empty (always true) condition.
    #[must_use]
    pub fn condition(&self, backend: DatabaseBackend) -> Condition {
        if self.filter().is_empty() {
            return Condition::all();
        }
        statement::filter_condition(self.filter(), backend)
    }
}
