//! # Query Compilation Errors
//!
//! Every error in this module is caused by the client: a malformed column
//! name, an unknown relation, an invalid sort direction or a broken search
//! request. All of them map to `400 Bad Request`.
//!
//! Requests for fields, relations, appends or counts that exist but are not
//! permitted are **not** errors. They are dropped while compiling so that the
//! response never reveals which names are forbidden.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use querycrate::{ApiParameters, QueryError, build};
//!
//! async fn list_users(ApiParameters(params): ApiParameters) -> Result<String, QueryError> {
//!     let query = build(&User, &params)?;
//!     Ok(query.to_statement(DbBackend::MySql).to_string())
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::sanitizer::MAX_COLUMN_NAME_LENGTH;

/// Why a column token was rejected by the sanitizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnNameViolation {
    /// Longer than [`MAX_COLUMN_NAME_LENGTH`]
    TooLong,
    /// Contains characters outside `[A-Za-z0-9_-]` or starts with a digit
    InvalidCharacters,
}

/// Fatal errors raised while compiling request parameters into a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A column or path segment failed lexical validation
    InvalidColumnName {
        /// The offending segment
        column: String,
        /// Which rule it broke
        violation: ColumnNameViolation,
    },

    /// No relation accessor matches the token in any inflected form
    RelationNotFound {
        /// The raw token from the request
        relation: String,
    },

    /// Order direction is not one of `asc`, `desc`, `localizedasc`, `localizeddesc`
    InvalidSortOrder {
        /// The direction as received
        order: String,
    },

    /// `search[value]` absent or empty
    SearchValueMissing,

    /// `search[columns]` absent or empty
    SearchColumnsMissing,

    /// Parameters nest deeper than the configured limit
    NestingTooDeep {
        /// The configured limit
        max_depth: usize,
    },
}

impl QueryError {
    pub fn invalid_column(column: impl Into<String>, violation: ColumnNameViolation) -> Self {
        Self::InvalidColumnName {
            column: column.into(),
            violation,
        }
    }

    pub fn relation_not_found(relation: impl Into<String>) -> Self {
        Self::RelationNotFound {
            relation: relation.into(),
        }
    }

    pub fn invalid_sort_order(order: impl Into<String>) -> Self {
        Self::InvalidSortOrder {
            order: order.into(),
        }
    }

    /// HTTP status for this error. Every compilation error is the client's fault.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Message safe to send to the client
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidColumnName {
                column,
                violation: ColumnNameViolation::TooLong,
            } => format!(
                "Given column name `{column}` exceeds the maximum column name length of {MAX_COLUMN_NAME_LENGTH} characters."
            ),
            Self::InvalidColumnName {
                column,
                violation: ColumnNameViolation::InvalidCharacters,
            } => format!(
                "Given column name `{column}` may contain only alphanumerics or underscores, and may not begin with a digit."
            ),
            Self::RelationNotFound { relation } => format!("Relation {relation} not found"),
            Self::InvalidSortOrder { .. } => "Sort order must be asc or desc".to_string(),
            Self::SearchValueMissing => "Search value missing".to_string(),
            Self::SearchColumnsMissing => "Search columns missing".to_string(),
            Self::NestingTooDeep { max_depth } => {
                format!("Query parameters may not be nested deeper than {max_depth} levels")
            }
        }
    }
}

/// Error response sent to clients
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.user_message();

        tracing::debug!(error = %error, status = %status, "Rejected query parameters");

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for QueryError {}
