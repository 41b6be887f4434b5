//! Error Handling Tests
//!
//! Fatal errors halt the pass without partial output; malformed sidecar
//! entries fall back to raw assignment.

use crate::common::*;
use serde_json::json;
use wirestate::{
    CodecConfig, Component, DeclaredType, DynamicComponent, EntityCollection, Error, MemoryStore,
    PropertyValue, ValueCodec, WireState,
};

#[derive(Debug)]
#[allow(dead_code)]
struct FileHandle {
    fd: i32,
}

#[test]
fn unsupported_value_halts_dehydration() {
    let component = DynamicComponent::new("uploader")
        .with_property("name", "report.csv")
        .with_property("handle", PropertyValue::opaque(&FileHandle { fd: 7 }))
        .with_property("size", 1024);

    match codec().dehydrate(&component) {
        Err(Error::PropertyTypeNotAllowed { component, property, value }) => {
            assert_eq!(component, "uploader");
            assert_eq!(property, "handle");
            assert!(value.contains("fd: 7"));
        }
        other => panic!("expected PropertyTypeNotAllowed, got {:?}", other),
    }
}

#[test]
fn infinite_float_is_not_wire_safe() {
    let component = DynamicComponent::new("c").with_property("ratio", f64::INFINITY);
    let err = codec().dehydrate(&component).unwrap_err();
    assert!(err.to_string().contains("ratio"));
}

#[test]
fn heterogeneous_collection_is_rejected() {
    let mixed = EntityCollection::from_entities("Post", vec![post(1, "First"), user(1, "Ada")]);
    let component = DynamicComponent::new("c").with_property("items", mixed);
    assert!(matches!(
        codec().dehydrate(&component),
        Err(Error::HeterogeneousEntityCollection { .. })
    ));
}

#[test]
fn mixed_connections_are_rejected() {
    let mixed = EntityCollection::from_entities(
        "Post",
        vec![
            post(1, "First").with_connection("primary"),
            post(2, "Second").with_connection("archive"),
        ],
    );
    let component = DynamicComponent::new("c").with_property("posts", mixed);
    match codec().dehydrate(&component) {
        Err(Error::MixedEntityConnections { first, second, .. }) => {
            assert_eq!(first.as_deref(), Some("primary"));
            assert_eq!(second.as_deref(), Some("archive"));
        }
        other => panic!("expected MixedEntityConnections, got {:?}", other),
    }
}

#[test]
fn missing_entity_fails_and_assigns_nothing() {
    let component = DynamicComponent::new("c")
        .with_property("count", 1)
        .with_property("post", post(99, "Ghost"));
    let state = codec().dehydrate(&component).unwrap();

    let mut target = DynamicComponent::new("c").with_property("count", 0);
    let err = codec().hydrate(&mut target, &state, &store()).unwrap_err();
    assert!(matches!(err, Error::EntityResolutionFailed { ref class, ref id } if class == "Post" && id == "99"));
    assert!(err.is_resolution_failure());
    assert_eq!(target.get("count"), Some(&PropertyValue::Int(0)));
    assert!(target.get("post").is_none());
}

#[test]
fn wireable_needs_declared_and_registered_type() {
    let state = WireState::from_json(json!({
        "data": {"total": {"cents": 100, "currency": "EUR"}},
        "dataMeta": {"wireables": ["total"]}
    }))
    .unwrap();
    let store = MemoryStore::new();

    let mut undeclared = DynamicComponent::new("checkout");
    assert!(matches!(
        codec().hydrate(&mut undeclared, &state, &store),
        Err(Error::UnknownWireableType { .. })
    ));

    let mut unregistered =
        DynamicComponent::new("checkout").with_declared_type("total", DeclaredType::strict("Money"));
    assert!(matches!(
        ValueCodec::new().hydrate(&mut unregistered, &state, &store),
        Err(Error::UnknownWireableType { ref type_name, .. }) if type_name == "Money"
    ));

    let mut declared =
        DynamicComponent::new("checkout").with_declared_type("total", DeclaredType::strict("Money"));
    codec().hydrate(&mut declared, &state, &store).unwrap();
    let total = declared.get("total").and_then(|v| v.as_wireable()).unwrap();
    assert_eq!(total.downcast_ref::<Money>(), Some(&Money::eur(100)));
}

#[test]
fn rejected_wireable_value_is_a_conversion_error() {
    let state = WireState::from_json(json!({
        "data": {"total": {"cents": "lots"}},
        "dataMeta": {"wireables": ["total"]}
    }))
    .unwrap();
    let mut component =
        DynamicComponent::new("checkout").with_declared_type("total", DeclaredType::strict("Money"));
    match codec().hydrate(&mut component, &state, &MemoryStore::new()) {
        Err(Error::WireableConversion { property, message }) => {
            assert_eq!(property, "total");
            assert!(message.contains("cents"));
        }
        other => panic!("expected WireableConversion, got {:?}", other),
    }
}

#[test]
fn tagged_values_of_the_wrong_shape_are_rejected() {
    let store = MemoryStore::new();
    for (data, meta) in [
        (json!({"at": 17}), json!({"dates": {"at": "utc"}})),
        (json!({"at": "not a date"}), json!({"dates": {"at": "naive"}})),
        (json!({"tags": {"a": 1}}), json!({"collections": ["tags"]})),
        (json!({"note": ["x"]}), json!({"stringables": ["note"]})),
    ] {
        let state = WireState::from_json(json!({"data": data, "dataMeta": meta})).unwrap();
        let mut component = DynamicComponent::new("c");
        assert!(matches!(
            codec().hydrate(&mut component, &state, &store),
            Err(Error::InvalidWireValue { .. })
        ));
        assert!(component.properties().is_empty());
    }
}

#[test]
fn malformed_sidecar_entries_fall_back_to_raw() {
    let state = WireState::from_json(json!({
        "data": {"at": "2024-01-01", "post": {"title": "x"}, "tags": ["a"]},
        "dataMeta": {
            "dates": {"at": "lunar"},
            "models": {"post": {"id": 1}},
            "collections": "tags",
            "somethingNew": {"at": true}
        }
    }))
    .unwrap();
    let mut component = DynamicComponent::new("c");
    codec()
        .hydrate(&mut component, &state, &MemoryStore::new())
        .unwrap();

    assert_eq!(component.get("at"), Some(&PropertyValue::from("2024-01-01")));
    assert_eq!(component.get("post"), Some(&PropertyValue::from(json!({"title": "x"}))));
    assert_eq!(component.get("tags"), Some(&PropertyValue::Array(vec![json!("a")])));
}

#[test]
fn strict_null_is_suppressed_only_for_non_nullable() {
    let mut component = DynamicComponent::new("profile")
        .with_typed_property("age", DeclaredType::strict("i64"), 30)
        .with_typed_property("nickname", DeclaredType::nullable("String"), "Al");
    let state = WireState::from_json(json!({
        "data": {"age": null, "nickname": null, "extra": null}
    }))
    .unwrap();
    codec()
        .hydrate(&mut component, &state, &MemoryStore::new())
        .unwrap();

    assert_eq!(component.get("age"), Some(&PropertyValue::Int(30)));
    assert_eq!(component.get("nickname"), Some(&PropertyValue::Null));
    assert_eq!(component.get("extra"), Some(&PropertyValue::Null));
}

#[test]
fn strict_null_suppression_follows_config() {
    let codec = ValueCodec::with_config(CodecConfig {
        suppress_typed_nulls: false,
        ..CodecConfig::default()
    });
    let mut component =
        DynamicComponent::new("profile").with_typed_property("age", DeclaredType::strict("i64"), 30);
    let state = WireState::from_json(json!({"data": {"age": null}})).unwrap();
    codec
        .hydrate(&mut component, &state, &MemoryStore::new())
        .unwrap();
    assert_eq!(component.get("age"), Some(&PropertyValue::Null));
}

#[test]
fn envelope_data_must_be_a_map() {
    assert!(matches!(
        WireState::from_json(json!({"data": "oops"})),
        Err(Error::InvalidWireValue { .. })
    ));
    assert!(matches!(
        WireState::from_json(json!({"data": null})),
        Ok(state) if state.data.is_empty()
    ));
}
