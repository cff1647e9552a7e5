use querycrate::{Boolean, Comparison, PredicateKind, QueryError, build};
use serde_json::json;

mod common;
use common::{User, leaves};

fn patterns(kinds: &[&PredicateKind]) -> Vec<(String, Comparison, String)> {
    kinds
        .iter()
        .filter_map(|kind| match kind {
            PredicateKind::Compare {
                column,
                comparison,
                value,
            } => Some((
                column.clone(),
                *comparison,
                value.as_str().unwrap_or_default().to_string(),
            )),
            _ => None,
        })
        .collect()
}

#[test]
fn test_split_search_is_columns_times_keywords() {
    let query = build(
        &User,
        &json!({"search": {
            "value": "Jesper Bjerke",
            "columns": "first_name,last_name",
            "split": "true",
        }}),
    )
    .unwrap();

    let terms = patterns(&leaves(query.filter()));
    assert_eq!(terms.len(), 4);
    assert_eq!(
        terms[0],
        ("first_name".to_string(), Comparison::Like, "%Jesper%".to_string())
    );
    assert_eq!(
        terms[3],
        ("last_name".to_string(), Comparison::Like, "%Bjerke%".to_string())
    );
}

#[test]
fn test_unsplit_search_keeps_whole_value() {
    let query = build(
        &User,
        &json!({"search": {"value": "Jesper Bjerke", "columns": ["first_name"]}}),
    )
    .unwrap();
    assert_eq!(
        patterns(&leaves(query.filter())),
        vec![(
            "first_name".to_string(),
            Comparison::Like,
            "%Jesper Bjerke%".to_string()
        )]
    );
}

#[test]
fn test_json_search_lower_cases() {
    let query = build(
        &User,
        &json!({"search": {"value": "OSLO", "columns": "data->city", "json": "1"}}),
    )
    .unwrap();
    assert_eq!(
        patterns(&leaves(query.filter())),
        vec![("data->city".to_string(), Comparison::ILike, "%oslo%".to_string())]
    );
}

#[test]
fn test_terms_are_or_ed_inside_an_isolated_group() {
    let query = build(
        &User,
        &json!({
            "where": {"status": "active"},
            "search": {"value": "a b", "columns": "first_name", "split": true},
        }),
    )
    .unwrap();

    let PredicateKind::Group(wrapper) = &query.filter().predicates()[0].kind else {
        panic!("expected the request group");
    };
    let search = &wrapper.predicates()[1];
    assert_eq!(search.boolean, Boolean::And);
    let PredicateKind::Group(terms) = &search.kind else {
        panic!("search terms must be grouped");
    };
    assert_eq!(terms.len(), 2);
    assert!(
        terms
            .predicates()
            .iter()
            .all(|term| term.boolean == Boolean::Or)
    );
}

#[test]
fn test_unauthorized_search_columns_skipped() {
    let query = build(
        &User,
        &json!({"search": {"value": "x", "columns": "password,email"}}),
    )
    .unwrap();
    let terms = patterns(&leaves(query.filter()));
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].0, "email");
}

#[test]
fn test_missing_options_are_fatal() {
    assert_eq!(
        build(&User, &json!({"search": {"columns": "email"}})).unwrap_err(),
        QueryError::SearchValueMissing
    );
    assert_eq!(
        build(&User, &json!({"search": {"value": "", "columns": "email"}})).unwrap_err(),
        QueryError::SearchValueMissing
    );
    assert_eq!(
        build(&User, &json!({"search": {"value": "x"}})).unwrap_err(),
        QueryError::SearchColumnsMissing
    );
    assert_eq!(
        build(&User, &json!({"search": {"value": "x", "columns": ""}})).unwrap_err(),
        QueryError::SearchColumnsMissing
    );
}

#[test]
fn test_search_columns_are_sanitized() {
    let err = build(
        &User,
        &json!({"search": {"value": "x", "columns": "email,1=1"}}),
    )
    .unwrap_err();
    assert!(matches!(err, QueryError::InvalidColumnName { .. }));
}
