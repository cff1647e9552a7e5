//! Relation existence (`whereHas`, `whereDoesntHave` and their `or` forms).
//!
//! Three payload shapes share one entry point:
//!
//! ```text
//! whereHas[]=bookings                        simple: positional key, relation in the value
//! whereHas[bookings][where][status]=active   complex: relation in the key, constraints in the value
//! whereHas[][bookings][id]=1                 multi: positional key, map of relation → constraints
//! ```
//!
//! Unknown relation tokens are fatal. Relations outside the allow-list are
//! skipped without a trace in the predicate tree.

use serde_json::Value;

use super::conditions;
use super::operators::Operator;
use super::Scope;
use crate::errors::QueryError;
use crate::model::relation_allowed;
use crate::params::{self, Key};
use crate::query::{Boolean, Correlation, ExistsClause, Filter};
use crate::relations;

pub(super) fn perform(
    scope: &Scope<'_>,
    boolean: Boolean,
    negated: bool,
    key: Key<'_>,
    payload: &Value,
    target: &mut Filter,
) -> Result<(), QueryError> {
    let shape = Shape {
        boolean,
        negated,
    };
    match key {
        Key::Name(relation) => shape.constrained(scope, relation, payload, target),
        Key::Index(_) => match payload {
            Value::String(relation) => shape.constrained(scope, relation, &Value::Null, target),
            Value::Object(_) | Value::Array(_) => {
                for (relation, constraints) in params::entries(payload) {
                    shape.constrained(scope, &relation.as_text(), constraints, target)?;
                }
                Ok(())
            }
            _ => Ok(()),
        },
    }
}

#[derive(Clone, Copy)]
struct Shape {
    boolean: Boolean,
    negated: bool,
}

impl Shape {
    /// Existence clause over `raw`, constrained by the entries of `payload`
    fn constrained(
        self,
        scope: &Scope<'_>,
        raw: &str,
        payload: &Value,
        target: &mut Filter,
    ) -> Result<(), QueryError> {
        let name = relations::resolve(raw, scope.model())?;
        if !relation_allowed(scope.model(), &name) {
            tracing::debug!(relation = %name, "Dropping unauthorized relation existence check");
            return Ok(());
        }
        let relation = scope
            .model()
            .relation(&name)
            .ok_or_else(|| QueryError::relation_not_found(raw))?;

        let child = scope.related(relation.target())?;
        let mut constraints = Filter::new();
        for (key, value) in params::entries(payload) {
            match key.name().and_then(Operator::parse) {
                Some(operator) => conditions::perform_nested(&child, operator, value, &mut constraints)?,
                None => conditions::perform(&child, Operator::Where, key, value, &mut constraints)?,
            }
        }

        target.push_exists(
            self.boolean,
            ExistsClause {
                correlation: Correlation::new(scope.model(), &relation),
                relation: name,
                negated: self.negated,
                constraints,
            },
        );
        Ok(())
    }
}
