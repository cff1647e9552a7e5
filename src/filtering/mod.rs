//! # Parameter Compilation
//!
//! Walks the untrusted parameter tree and produces the predicate tree and the
//! other clauses of a [`crate::Query`].
//!
//! ## Query Parameter Examples
//!
//! ```text
//! // Equality, explicit comparison and type coercion
//! ?where[first_name]=Jesper
//! ?where[age][operator]=>=&where[age][value]=18
//! ?where[active]=true
//!
//! // Nested groups
//! ?where[status]=active&orWhere[where][status]=pending&orWhere[where][priority]=high
//!
//! // Sets, ranges, nulls and date parts
//! ?whereIn[id]=1,2,3
//! ?whereBetween[created_at]=2017-01-01,2018-01-01
//! ?whereNull[]=deleted_at
//! ?whereYear[created_at]=2024
//!
//! // Relation existence
//! ?whereHas[]=bookings
//! ?whereHas[bookings][where][status]=active
//! ?whereDoesntHave[][bookings][id]=1
//!
//! // Search
//! ?search[value]=Jesper Bjerke&search[columns]=first_name,last_name&search[split]=true
//! ```
//!
//! ## Security
//!
//! - Every column is checked by the [`crate::sanitizer`] before use; failures
//!   abort the request
//! - Columns, relations and counts outside the model's allow-lists are dropped
//! - Nesting is bounded by [`crate::QueryBuilderConfig::max_depth`]

mod conditions;
mod existence;
mod operators;
pub mod projection;
pub mod relations;
mod search;
pub mod sort;

pub use conditions::compile;
pub use operators::{Family, Operator};

use crate::config::QueryBuilderConfig;
use crate::errors::QueryError;
use crate::model::ApiModel;

/// The model a group of parameters is compiled against
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    model: &'a dyn ApiModel,
    /// Prefixed to unqualified columns inside relation sub-queries
    qualifier: Option<&'a str>,
    depth: usize,
    config: &'a QueryBuilderConfig,
}

impl<'a> Scope<'a> {
    /// Top-level scope of a request
    #[must_use]
    pub fn root(model: &'a dyn ApiModel, config: &'a QueryBuilderConfig) -> Self {
        Self {
            model,
            qualifier: None,
            depth: 0,
            config,
        }
    }

    #[must_use]
    pub fn model(&self) -> &'a dyn ApiModel {
        self.model
    }

    #[must_use]
    pub const fn config(&self) -> &'a QueryBuilderConfig {
        self.config
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Same model, one level deeper
    pub(crate) fn nested(&self) -> Result<Self, QueryError> {
        Ok(Self {
            depth: self.next_depth()?,
            ..*self
        })
    }

    /// Scope of a relation sub-query over `target`, one level deeper
    pub(crate) fn related<'b>(&self, target: &'b dyn ApiModel) -> Result<Scope<'b>, QueryError>
    where
        'a: 'b,
    {
        Ok(Scope {
            model: target,
            qualifier: Some(target.table_name()),
            depth: self.next_depth()?,
            config: self.config,
        })
    }

    fn next_depth(&self) -> Result<usize, QueryError> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(QueryError::NestingTooDeep {
                max_depth: self.config.max_depth,
            });
        }
        Ok(depth)
    }

    /// Prefix `column` with the relation table unless it is already qualified
    pub(crate) fn qualify(&self, column: &str) -> String {
        match self.qualifier {
            Some(table) if !column.contains('.') => format!("{table}.{column}"),
            _ => column.to_string(),
        }
    }
}
