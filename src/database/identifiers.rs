use sea_orm::DatabaseBackend;

use crate::query::DatePart;

const fn quote_char(backend: DatabaseBackend) -> char {
    match backend {
        DatabaseBackend::MySql => '`',
        _ => '"',
    }
}

/// Quote a single identifier for `backend`
#[must_use]
pub fn quote(identifier: &str, backend: DatabaseBackend) -> String {
    let quote = quote_char(backend);
    let escaped = identifier.replace(quote, &format!("{quote}{quote}"));
    format!("{quote}{escaped}{quote}")
}

/// Escape text placed inside a single-quoted SQL literal
fn literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// `$."a"."b"` path used by `json_extract`
fn json_path(keys: &[&str]) -> String {
    let mut path = String::from("$");
    for key in keys {
        path.push_str(&format!(".\"{}\"", literal(key).replace('"', "\\\"")));
    }
    path
}

/// SQL expression for a sanitized column path.
///
/// `.` separates table and column, `->` walks into a JSON document:
///
/// | path              | `MySQL`                                              | `PostgreSQL`              | `SQLite`                          |
/// |-------------------|------------------------------------------------------|---------------------------|-----------------------------------|
/// | `users.name`      | `` `users`.`name` ``                                 | `"users"."name"`          | `"users"."name"`                  |
/// | `data->a->b`      | `` json_unquote(json_extract(`data`, '$."a"."b"')) `` | `"data"->'a'->>'b'`       | `json_extract("data", '$."a"."b"')` |
#[must_use]
pub fn column_sql(path: &str, backend: DatabaseBackend) -> String {
    let mut pieces = path.split("->");
    let base = pieces.next().unwrap_or_default();
    let column = base
        .split('.')
        .map(|segment| quote(segment, backend))
        .collect::<Vec<_>>()
        .join(".");

    let keys: Vec<&str> = pieces.collect();
    let Some((last, walk)) = keys.split_last() else {
        return column;
    };

    match backend {
        DatabaseBackend::MySql => {
            format!("json_unquote(json_extract({column}, '{}'))", json_path(&keys))
        }
        DatabaseBackend::Postgres => {
            let mut sql = column;
            for key in walk {
                sql.push_str(&format!("->'{}'", literal(key)));
            }
            sql.push_str(&format!("->>'{}'", literal(last)));
            sql
        }
        _ => format!("json_extract({column}, '{}')", json_path(&keys)),
    }
}

/// Expression extracting `part` from a date/time column expression
#[must_use]
pub fn date_part_sql(part: DatePart, column: &str, backend: DatabaseBackend) -> String {
    match backend {
        DatabaseBackend::MySql => {
            let function = match part {
                DatePart::Date => "DATE",
                DatePart::Day => "DAY",
                DatePart::Month => "MONTH",
                DatePart::Year => "YEAR",
                DatePart::Time => "TIME",
            };
            format!("{function}({column})")
        }
        DatabaseBackend::Postgres => match part {
            DatePart::Date => format!("({column})::date::text"),
            DatePart::Time => format!("({column})::time::text"),
            DatePart::Day => format!("extract(day from {column})"),
            DatePart::Month => format!("extract(month from {column})"),
            DatePart::Year => format!("extract(year from {column})"),
        },
        _ => {
            let format = match part {
                DatePart::Date => "%Y-%m-%d",
                DatePart::Day => "%d",
                DatePart::Month => "%m",
                DatePart::Year => "%Y",
                DatePart::Time => "%H:%M:%S",
            };
            format!("strftime('{format}', {column})")
        }
    }
}
