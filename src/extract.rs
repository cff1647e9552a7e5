//! Axum extractor for raw API parameters.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use querycrate::{ApiParameters, QueryError, build};
//!
//! async fn list_users(ApiParameters(params): ApiParameters) -> Result<String, QueryError> {
//!     let query = build(&User, &params)?;
//!     Ok(query.to_statement(DbBackend::Postgres).to_string())
//! }
//!
//! let app: Router = Router::new().route("/users", get(list_users));
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde_json::Value;
use std::convert::Infallible;

use crate::params::parse_query_string;

/// The request's query string decoded into a parameter tree.
///
/// Never rejects: a request without a query string yields an empty map.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiParameters(pub Value);

impl ApiParameters {
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl<S> FromRequestParts<S> for ApiParameters
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        Ok(Self(parse_query_string(query)))
    }
}
