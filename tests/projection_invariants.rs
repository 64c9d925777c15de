//! Projection Invariant Tests
//!
//! Tests for the `only`/`hidden` projection stage:
//! - Projection is idempotent
//! - Multiplexed results keep their order
//! - `*` passes bodies through untouched
//! - Hidden statements never reach the response
//! - Faults abort the whole query

use restgate::domain::{
    Details, DoneResource, Query, ResourceId, ResourceValue, Resources, ResponseBody, Selector,
    Statement,
};
use restgate::projection::{
    apply_filters, apply_hidden, project, FilterError, FilterErrorCode, FilterTree,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn done(body: Value) -> ResourceValue {
    ResourceValue::Done(DoneResource::new(
        Details {
            status: 200,
            success: true,
            ..Default::default()
        },
        body,
    ))
}

fn body(resources: &Resources, id: &str) -> Value {
    resources[&ResourceId::from(id)]
        .as_done()
        .unwrap()
        .result
        .unmarshal()
}

fn hero() -> Value {
    json!({"name": "x", "tags": ["apple", "berry"], "id": 1})
}

// =============================================================================
// Projection Scenarios
// =============================================================================

/// Named fields and match rules combine.
#[test]
fn test_name_and_tag_match() {
    let tree = FilterTree::build(&[Selector::path("name"), Selector::matching("tags", "^a")])
        .unwrap();

    assert_eq!(
        project(&tree, &hero()).unwrap(),
        json!({"name": "x", "tags": ["apple"]})
    );
}

/// An array match with no hits under `*` keeps the copied original.
#[test]
fn test_select_all_keeps_unmatched_array() {
    let tree =
        FilterTree::build(&[Selector::path("*"), Selector::matching("tags", "^z")]).unwrap();

    assert_eq!(project(&tree, &hero()).unwrap(), hero());
}

/// Wildcard over a mapping returns it unchanged.
#[test]
fn test_wildcard_passthrough() {
    let value = json!({
        "name": "batman",
        "hero": {"id": 1, "powers": [{"name": "money"}, {"name": "gadgets"}]},
        "active": true,
        "rank": null
    });

    assert_eq!(project(&FilterTree::select_all(), &value).unwrap(), value);
}

/// `*` keeps the node it sits on; array elements get the named rules only.
#[test]
fn test_select_all_with_array_body() {
    let query = Query::new(vec![Statement::new("heroes")
        .with_only(vec![Selector::path("*"), Selector::path("name")])]);
    let mut resources = Resources::new();
    resources.insert(
        ResourceId::from("heroes"),
        done(json!([{"name": "a", "id": 1}, {"name": "b", "id": 2}])),
    );

    let result = apply_filters(&query, &resources).unwrap();
    assert_eq!(body(&result, "heroes"), json!([{"name": "a"}, {"name": "b"}]));
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Projecting an already projected value changes nothing.
#[test]
fn test_projection_is_idempotent() {
    let tree = FilterTree::build(&[
        Selector::path("name"),
        Selector::path("hero.id"),
        Selector::matching("tags", "^a"),
    ])
    .unwrap();
    let value = json!({
        "name": "x",
        "tags": ["apple", "avocado", "berry"],
        "hero": [{"id": 1, "secret": "a"}, {"id": 2, "secret": "b"}],
        "id": 1
    });

    let once = project(&tree, &value).unwrap();
    let twice = project(&tree, &once).unwrap();
    assert_eq!(once, twice);
}

/// Same query over the same resources always gives the same result.
#[test]
fn test_apply_filters_is_deterministic() {
    let query = Query::new(vec![
        Statement::new("heroes").with_only(vec![Selector::path("name")]),
        Statement::new("villains"),
    ]);
    let mut resources = Resources::new();
    resources.insert(ResourceId::from("heroes"), done(hero()));
    resources.insert(ResourceId::from("villains"), done(json!({"name": "joker"})));

    let first = apply_filters(&query, &resources).unwrap();
    for _ in 0..20 {
        assert_eq!(apply_filters(&query, &resources).unwrap(), first);
    }
}

/// Multiplexed results come back in their original order.
#[test]
fn test_multiplexed_order_preserved() {
    let stmt = Statement::new("heroes").with_only(vec![Selector::path("id")]);
    let list: Vec<_> = (0..10).map(|id| done(json!({"id": id, "x": "y"}))).collect();
    let mut resources = Resources::new();
    resources.insert(stmt.resource_id(), ResourceValue::Multiplexed(list));

    let result = apply_filters(&Query::new(vec![stmt.clone()]), &resources).unwrap();
    match &result[&stmt.resource_id()] {
        ResourceValue::Multiplexed(items) => {
            let ids: Vec<Value> = items
                .iter()
                .map(|item| item.as_done().unwrap().result.unmarshal()["id"].clone())
                .collect();
            assert_eq!(ids, (0..10).map(|id| json!(id)).collect::<Vec<_>>());
        }
        other => panic!("expected multiplexed result, got {}", other.type_name()),
    }
}

/// The caller's resources are never modified.
#[test]
fn test_input_resources_untouched() {
    let query = Query::new(vec![Statement::new("heroes").with_only(vec![Selector::path("id")])]);
    let mut resources = Resources::new();
    resources.insert(ResourceId::from("heroes"), done(hero()));
    let before = resources.clone();

    apply_filters(&query, &resources).unwrap();
    assert_eq!(resources, before);
}

// =============================================================================
// Hidden Statement Tests
// =============================================================================

/// Hidden statements are absent from the response.
#[test]
fn test_hidden_excluded() {
    let query = Query::new(vec![
        Statement::new("heroes"),
        Statement::new("heroes").with_alias("sidekicks").hidden(),
        Statement::new("villains").hidden(),
    ]);
    let mut resources = Resources::new();
    resources.insert(ResourceId::from("heroes"), done(json!(1)));
    resources.insert(ResourceId::from("sidekicks"), done(json!(2)));
    resources.insert(ResourceId::from("villains"), done(json!(3)));

    let visible = apply_hidden(&query, apply_filters(&query, &resources).unwrap());
    assert_eq!(visible.len(), 1);
    assert_eq!(body(&visible, "heroes"), json!(1));
}

/// Results not named by any statement are dropped too.
#[test]
fn test_hidden_drops_unknown_results() {
    let query = Query::new(vec![Statement::new("heroes")]);
    let mut resources = Resources::new();
    resources.insert(ResourceId::from("heroes"), done(json!(1)));
    resources.insert(ResourceId::from("orphan"), done(json!(2)));

    let visible = apply_hidden(&query, resources);
    assert!(!visible.contains_key(&ResourceId::from("orphan")));
}

// =============================================================================
// Fault Tests
// =============================================================================

/// An invalid regex aborts projection of the whole query.
#[test]
fn test_invalid_regex_aborts_query() {
    let query = Query::new(vec![
        Statement::new("heroes").with_only(vec![Selector::path("name")]),
        Statement::new("villains").with_only(vec![Selector::matching("name", "(")]),
    ]);
    let mut resources = Resources::new();
    resources.insert(ResourceId::from("heroes"), done(hero()));
    resources.insert(ResourceId::from("villains"), done(json!({"name": "joker"})));

    let err = apply_filters(&query, &resources).unwrap_err();
    assert_eq!(err.code(), FilterErrorCode::GateFilterInvalid);
    assert_eq!(err.resource_id, ResourceId::from("villains"));
    assert!(err.resource.is_some());
    assert!(!err.cause.is_retryable());
}

/// A statement still pending at projection time is a data fault.
#[test]
fn test_pending_statement_is_data_fault() {
    let stmt = Statement::new("heroes").with_only(vec![Selector::path("name")]);
    let mut resources = Resources::new();
    resources.insert(stmt.resource_id(), ResourceValue::Pending(stmt.clone()));

    let err = apply_filters(&Query::new(vec![stmt]), &resources).unwrap_err();
    assert_eq!(err.code(), FilterErrorCode::GateDataInconsistent);
    assert!(matches!(err.cause, FilterError::UnknownResultShape { .. }));
}

/// Bodies that are not valid JSON are matched as plain text.
#[test]
fn test_invalid_json_body_projects_as_string() {
    let query = Query::new(vec![Statement::new("heroes").with_only(vec![Selector::path("name")])]);
    let mut resources = Resources::new();
    resources.insert(
        ResourceId::from("heroes"),
        ResourceValue::Done(DoneResource::new(
            Details::default(),
            ResponseBody::raw("not json"),
        )),
    );

    let result = apply_filters(&query, &resources).unwrap();
    assert_eq!(body(&result, "heroes"), json!("not json"));
}
