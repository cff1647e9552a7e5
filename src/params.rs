//! Raw request parameters.
//!
//! Parameters are a tree of [`serde_json::Value`]: scalars, ordered lists and
//! ordered maps (`serde_json` is built with `preserve_order`). Maps whose keys
//! are plain non-negative integers are treated like lists, so
//! `{"0": "bookings"}` and `["bookings"]` mean the same thing.
//!
//! [`parse_query_string`] decodes bracket notation into that tree:
//!
//! ```text
//! where[first_name]=Jesper            {"where": {"first_name": "Jesper"}}
//! whereIn[id]=1,2,3                   {"whereIn": {"id": "1,2,3"}}
//! whereHas[]=bookings                 {"whereHas": ["bookings"]}
//! whereHas[][bookings][id]=1          {"whereHas": [{"bookings": {"id": "1"}}]}
//! ```

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Key of one entry in a parameter map or list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// Positional entry (list element or integer map key)
    Index(usize),
    /// Named entry
    Name(&'a str),
}

impl<'a> Key<'a> {
    fn parse(key: &'a str) -> Self {
        match key.parse::<usize>() {
            Ok(index) if index.to_string() == key => Self::Index(index),
            _ => Self::Name(key),
        }
    }

    /// Name of a named entry
    #[must_use]
    pub const fn name(&self) -> Option<&'a str> {
        match *self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    /// The key as it appeared in the request
    #[must_use]
    pub fn as_text(&self) -> Cow<'a, str> {
        match *self {
            Self::Name(name) => Cow::Borrowed(name),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

/// Entries of a map or list in request order. Scalars have no entries.
#[must_use]
pub fn entries(value: &Value) -> Vec<(Key<'_>, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (Key::parse(k), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (Key::Index(index), item))
            .collect(),
        _ => Vec::new(),
    }
}

/// Like [`entries`], but a scalar string is read as a comma-joined list of
/// positional entries.
#[must_use]
pub fn entries_or_list(value: &Value) -> Vec<(Key<'_>, Cow<'_, Value>)> {
    match value {
        Value::String(joined) => joined
            .split(',')
            .filter(|item| !item.is_empty())
            .enumerate()
            .map(|(index, item)| (Key::Index(index), Cow::Owned(Value::String(item.to_string()))))
            .collect(),
        _ => entries(value)
            .into_iter()
            .map(|(key, item)| (key, Cow::Borrowed(item)))
            .collect(),
    }
}

/// Scalar as text. Maps, lists and null have no text form.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// A comma-joined string or a sequence of scalars, as a list of strings
#[must_use]
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(joined) => joined.split(',').map(str::to_string).collect(),
        Value::Array(_) | Value::Object(_) => entries(value)
            .into_iter()
            .filter_map(|(_, item)| scalar_text(item))
            .collect(),
        Value::Number(_) | Value::Bool(_) => scalar_text(value).into_iter().collect(),
        Value::Null => Vec::new(),
    }
}

/// Turn the literals `"true"`, `"false"` and `"null"` into their typed values.
///
/// Only scalar strings are coerced; lists and maps are returned unchanged.
#[must_use]
pub fn coerce(value: &Value) -> Value {
    match value {
        Value::String(text) => match text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Boolean-ish flag: `true`, `"true"`, `"1"` or `1`
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text == "true" || text == "1",
        Some(Value::Number(number)) => number.as_i64() == Some(1),
        _ => false,
    }
}

/// Top-level parameter, absent when missing or null
#[must_use]
pub fn get<'a>(params: &'a Value, key: &str) -> Option<&'a Value> {
    params.get(key).filter(|value| !value.is_null())
}

/// Bracket segments accepted after the base name of a query-string key
pub const MAX_KEY_NESTING: usize = 64;

/// Decode a URL query string written in bracket notation.
#[must_use]
pub fn parse_query_string(query: &str) -> Value {
    let mut root = Value::Object(Map::new());

    for (raw_key, raw_value) in url::form_urlencoded::parse(query.as_bytes()) {
        let Some((base, segments)) = split_key(&raw_key) else {
            continue;
        };
        let mut path = Vec::with_capacity(segments.len() + 1);
        path.push(Some(base));
        path.extend(segments);
        insert(&mut root, &path, Value::String(raw_value.into_owned()));
    }

    normalize(root)
}

/// `a[b][]` → `("a", [Some("b"), None])`. Malformed brackets keep the whole key.
/// Keys nested deeper than [`MAX_KEY_NESTING`] are dropped.
fn split_key(key: &str) -> Option<(&str, Vec<Option<&str>>)> {
    let (base, mut rest) = match key.find('[') {
        Some(open) => key.split_at(open),
        None => (key, ""),
    };
    if base.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            return Some((key, Vec::new()));
        };
        let segment = &stripped[..close];
        if segments.len() == MAX_KEY_NESTING {
            tracing::debug!(base, max = MAX_KEY_NESTING, "Dropping over-nested query parameter");
            return None;
        }
        segments.push((!segment.is_empty()).then_some(segment));
        rest = &stripped[close + 1..];
    }
    if !rest.is_empty() {
        return Some((key, Vec::new()));
    }
    Some((base, segments))
}

fn insert(root: &mut Value, path: &[Option<&str>], value: Value) {
    let mut container = root;
    for head in path {
        if !container.is_object() {
            *container = Value::Object(into_map(container.take()));
        }
        let Value::Object(map) = container else {
            return;
        };
        let key = head.map_or_else(|| next_index(map).to_string(), str::to_string);
        container = map.entry(key).or_insert(Value::Null);
    }
    *container = value;
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn next_index(map: &Map<String, Value>) -> usize {
    map.keys()
        .filter_map(|key| match Key::parse(key) {
            Key::Index(index) => Some(index + 1),
            Key::Name(_) => None,
        })
        .max()
        .unwrap_or(0)
}

/// Maps keyed `0..n` in order become lists
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sequential = map
                .keys()
                .enumerate()
                .all(|(position, key)| Key::parse(key) == Key::Index(position));
            if sequential && !map.is_empty() {
                Value::Array(map.into_iter().map(|(_, item)| normalize(item)).collect())
            } else {
                Value::Object(map.into_iter().map(|(k, v)| (k, normalize(v))).collect())
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}
