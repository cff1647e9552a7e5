pub mod appends;
pub mod builder;
pub mod config;
pub mod database;
pub mod errors;
pub mod extract;
pub mod filtering;
pub mod inflector;
pub mod model;
pub mod params;
pub mod query;
pub mod relations;
pub mod sanitizer;

pub use appends::Appends;
pub use builder::{ApiQueryBuilder, build};
pub use config::QueryBuilderConfig;
pub use errors::{ColumnNameViolation, QueryError};
pub use extract::ApiParameters;
pub use model::{AllowedFields, ApiModel, RelationDef};
pub use params::parse_query_string;
pub use query::{
    Boolean, Comparison, Correlation, DatePart, Direction, EagerLoad, ExistsClause, Filter,
    OrderBy, OrderTarget, Predicate, PredicateKind, Query, RelationCount,
};
