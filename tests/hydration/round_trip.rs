//! Round Trip Tests
//!
//! `hydrate(dehydrate(component))` reproduces every property kind.

use crate::common::*;
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use serde_json::json;
use wirestate::{
    Component, DateFlavor, DateValue, DeclaredType, DynamicComponent, Entity, EntityCollection, MemoryStore,
    PropertyValue,
};

#[test]
fn primitives_round_trip() {
    let component = DynamicComponent::new("counter")
        .with_property("count", 42)
        .with_property("big", i64::MAX)
        .with_property("ratio", 0.1)
        .with_property("label", "hello")
        .with_property("empty", "")
        .with_property("enabled", false)
        .with_property("nothing", PropertyValue::Null);

    let (state, restored) = round_trip(&codec(), &component, &MemoryStore::new());
    assert!(state.meta.is_empty());
    assert_same_properties(&component, &restored);
}

#[test]
fn plain_structures_round_trip() {
    let component = DynamicComponent::new("form")
        .with_property("list", json!([1, "two", null, [3]]))
        .with_property("map", json!({"a": {"b": [1, 2]}, "c": null}))
        .with_property("empty_list", json!([]))
        .with_property("empty_map", json!({}));

    let (state, restored) = round_trip(&codec(), &component, &MemoryStore::new());
    assert!(state.meta.is_empty());
    assert_same_properties(&component, &restored);
}

#[test]
fn dates_keep_their_flavor() {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let native = offset.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    let utc = Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap();
    let naive = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_nano_opt(12, 30, 15, 123_456_789)
        .unwrap();

    let component = DynamicComponent::new("calendar")
        .with_property("starts", DateValue::Native(native))
        .with_property("created", DateValue::Utc(utc))
        .with_property("reminder", DateValue::Naive(naive));

    let (state, restored) = round_trip(&codec(), &component, &MemoryStore::new());
    assert_eq!(state.meta.dates.get("starts"), Some(&DateFlavor::Native));
    assert_eq!(state.meta.dates.get("created"), Some(&DateFlavor::Utc));
    assert_eq!(state.meta.dates.get("reminder"), Some(&DateFlavor::Naive));
    assert_eq!(state.data["starts"], json!("2024-02-29T23:59:59-05:00"));
    assert_eq!(state.data["reminder"], json!("2024-06-01T12:30:15.123456789"));
    assert_same_properties(&component, &restored);
}

#[test]
fn collections_text_and_wireables_round_trip() {
    let component = DynamicComponent::new("checkout")
        .with_property(
            "lines",
            PropertyValue::Collection(vec![json!({"sku": "a", "qty": 1}), json!({"sku": "b", "qty": 2})]),
        )
        .with_property("empty_lines", PropertyValue::Collection(vec![]))
        .with_property("note", PropertyValue::Text("Leave at door".to_string()))
        .with_typed_property(
            "total",
            DeclaredType::strict("Money"),
            PropertyValue::wireable(Money::eur(1999)),
        );

    let (state, restored) = round_trip(&codec(), &component, &MemoryStore::new());
    assert_eq!(state.meta.collections, vec!["lines".to_string(), "empty_lines".to_string()]);
    assert_eq!(state.meta.stringables, vec!["note".to_string()]);
    assert_eq!(state.meta.wireables, vec!["total".to_string()]);
    assert_same_properties(&component, &restored);

    let total = restored.get("total").and_then(|v| v.as_wireable()).unwrap();
    assert_eq!(total.downcast_ref::<Money>(), Some(&Money::eur(1999)));
    assert!(matches!(restored.get("note"), Some(PropertyValue::Text(_))));
}

#[test]
fn persisted_entity_round_trips_through_store() {
    let component = DynamicComponent::new("editor")
        .with_property("post", post(2, "Second"))
        .with_rules(["post.title", "post.meta.views"]);

    let store = store();
    let (state, restored) = round_trip(&codec(), &component, &store);
    assert_eq!(state.data["post"], json!({"title": "Second", "meta": {"views": 20}}));
    assert_same_properties(&component, &restored);
    assert_eq!(store.fetch_count(), 1);
}

#[test]
fn property_order_survives_round_trip() {
    let component = DynamicComponent::new("sorted")
        .with_property("zeta", 1)
        .with_property("alpha", 2)
        .with_property("mid", "x");

    let (state, restored) = round_trip(&codec(), &component, &MemoryStore::new());
    let sent: Vec<&str> = state.data.keys().map(String::as_str).collect();
    assert_eq!(sent, vec!["zeta", "alpha", "mid"]);
    let names: Vec<&str> = restored.properties().names().collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(restored.properties(), component.properties());
}

#[test]
fn projected_key_is_not_written_back_as_attribute() {
    let component = DynamicComponent::new("editor")
        .with_property("post", post(2, "Second"))
        .with_rules(["post.id", "post.title"]);

    let store = store();
    let (state, restored) = round_trip(&codec(), &component, &store);
    assert_eq!(state.data["post"], json!({"id": 2, "title": "Second"}));
    let restored_post = restored.get("post").and_then(|p| p.as_entity()).unwrap();
    assert!(restored_post.attribute("id").is_none());
    assert_same_properties(&component, &restored);
}

#[test]
fn unsaved_entity_round_trips_from_dirty_data() {
    let draft = Entity::new("Post").with_attribute("title", "Untitled");
    let component = DynamicComponent::new("composer")
        .with_property("draft", draft)
        .with_rule("draft.title");

    let store = store();
    let (state, restored) = round_trip(&codec(), &component, &store);
    assert_eq!(
        serde_json::to_value(&state.meta).unwrap(),
        json!({"models": {"draft": {"class": "Post"}}})
    );
    assert_same_properties(&component, &restored);
    assert_eq!(store.fetch_count(), 0);
}

#[test]
fn entity_collection_round_trips_in_order() {
    let posts = EntityCollection::from_entities(
        "Post",
        vec![post(3, "Third"), post(1, "First"), post(2, "Second")],
    );
    let component = DynamicComponent::new("feed")
        .with_property("posts", posts)
        .with_rule("posts.*.title");

    let (state, restored) = round_trip(&codec(), &component, &store());
    assert_eq!(
        state.data["posts"],
        json!([{"title": "Third"}, {"title": "First"}, {"title": "Second"}])
    );
    assert_same_properties(&component, &restored);
}

#[test]
fn mixed_component_round_trips() {
    let component = DynamicComponent::new("dashboard")
        .with_property("title", "Overview")
        .with_property("page", 2)
        .with_property("since", DateValue::Utc(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
        .with_property("filters", PropertyValue::Collection(vec![json!("open")]))
        .with_property("featured", post(1, "First"))
        .with_property(
            "recent",
            EntityCollection::from_entities("Post", vec![post(2, "Second"), post(3, "Third")]),
        )
        .with_rules(["featured.title", "recent.*.title"]);

    let (_, restored) = round_trip(&codec(), &component, &store());
    assert_same_properties(&component, &restored);
}
