#![allow(dead_code)]

use querycrate::{AllowedFields, ApiModel, Filter, PredicateKind, RelationDef};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

pub struct User;

impl ApiModel for User {
    fn table_name(&self) -> &str {
        "users"
    }

    fn relations(&self) -> Vec<RelationDef> {
        vec![
            RelationDef::has_many("bookings", Booking, "user_id"),
            RelationDef::belongs_to("company", Company, "company_id"),
            RelationDef::has_many("apiTokens", ApiToken, "user_id"),
        ]
    }

    fn allowed_fields(&self) -> AllowedFields {
        AllowedFields::Only(vec![
            "id",
            "first_name",
            "last_name",
            "email",
            "status",
            "age",
            "active",
            "data->city",
            "created_at",
            "deleted_at",
        ])
    }

    fn allowed_relations(&self) -> Vec<&'static str> {
        vec!["bookings", "company"]
    }

    fn allowed_appends(&self) -> Vec<&'static str> {
        vec!["full_name", "avatar_url"]
    }

    fn allowed_counts(&self) -> Vec<&'static str> {
        vec!["bookings"]
    }

    fn default_appends(&self) -> Vec<&'static str> {
        vec!["avatar_url"]
    }
}

pub struct Booking;

impl ApiModel for Booking {
    fn table_name(&self) -> &str {
        "bookings"
    }

    fn relations(&self) -> Vec<RelationDef> {
        vec![RelationDef::belongs_to("user", User, "user_id")]
    }

    fn allowed_fields(&self) -> AllowedFields {
        AllowedFields::Only(vec!["id", "user_id", "status", "starts_at"])
    }

    fn allowed_relations(&self) -> Vec<&'static str> {
        vec!["user"]
    }
}

pub struct Company;

impl ApiModel for Company {
    fn table_name(&self) -> &str {
        "companies"
    }
}

/// Declared on [`User`] but never exposed
pub struct ApiToken;

impl ApiModel for ApiToken {
    fn table_name(&self) -> &str {
        "api_tokens"
    }
}

const SCHEMA: &str = r"
CREATE TABLE companies (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    company_id INTEGER REFERENCES companies (id),
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    status TEXT NOT NULL,
    age INTEGER NOT NULL,
    active INTEGER NOT NULL,
    data TEXT,
    created_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE TABLE bookings (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users (id),
    status TEXT NOT NULL,
    starts_at TEXT NOT NULL
);
CREATE TABLE api_tokens (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users (id),
    token TEXT NOT NULL
);
";

const SEED: &str = r#"
INSERT INTO companies (id, name) VALUES (1, 'Acme'), (2, 'Bolt');
INSERT INTO users (id, company_id, first_name, last_name, email, status, age, active, data, created_at, deleted_at) VALUES
    (1, 2, 'Jesper', 'Bjerke', 'jesper@example.com', 'active', 34, 1, '{"city": "Oslo"}', '2023-05-14 09:30:00', NULL),
    (2, 1, 'Anna', 'Larsen', 'anna@example.com', 'pending', 17, 0, '{"city": "Bergen"}', '2024-01-02 12:00:00', NULL),
    (3, 1, 'Ola', 'Nordmann', 'ola@example.com', 'active', 52, 1, '{"city": "Oslo"}', '2024-03-01 18:45:00', '2024-06-01 00:00:00'),
    (4, NULL, 'Kari', 'Bjerke', 'kari@example.com', 'banned', 25, 0, NULL, '2024-03-15 08:00:00', NULL);
INSERT INTO bookings (id, user_id, status, starts_at) VALUES
    (1, 1, 'active', '2024-04-01'),
    (2, 1, 'cancelled', '2024-04-02'),
    (3, 2, 'active', '2024-04-03'),
    (4, 3, 'cancelled', '2024-04-04');
INSERT INTO api_tokens (id, user_id, token) VALUES (1, 4, 'secret');
"#;

/// In-memory database with the fixture schema and rows
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    db.execute_unprepared(SCHEMA).await?;
    db.execute_unprepared(SEED).await?;
    Ok(db)
}

/// Predicates of `filter` with every group flattened away
pub fn leaves(filter: &Filter) -> Vec<&PredicateKind> {
    let mut found = Vec::new();
    for predicate in filter.predicates() {
        match &predicate.kind {
            PredicateKind::Group(group) => found.extend(leaves(group)),
            other => found.push(other),
        }
    }
    found
}
