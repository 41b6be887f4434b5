//! Entity Reference Tests
//!
//! Restoring entities through the store: unsaved entities, null slots,
//! relation reloading, connections and dirty data.

use crate::common::*;
use serde_json::json;
use wirestate::{
    DynamicComponent, Entity, EntityCollection, EntityId, MemoryStore, PropertyValue, WireState,
};

fn hydrate(state: &WireState, template: &DynamicComponent, store: &MemoryStore) -> DynamicComponent {
    let mut component = template.blank();
    codec().hydrate(&mut component, state, store).unwrap();
    component
}

fn entity<'a>(component: &'a DynamicComponent, name: &str) -> &'a Entity {
    component.get(name).and_then(PropertyValue::as_entity).unwrap()
}

fn entities<'a>(component: &'a DynamicComponent, name: &str) -> &'a EntityCollection {
    component.get(name).and_then(PropertyValue::as_entities).unwrap()
}

#[test]
fn absent_id_yields_fresh_entity_without_fetch() {
    let component = DynamicComponent::new("composer").with_property("draft", Entity::new("Comment"));
    let store = store();
    let state = codec().dehydrate(&component).unwrap();
    let restored = hydrate(&state, &component, &store);

    assert_eq!(entity(&restored, "draft"), &Entity::new("Comment"));
    assert!(!entity(&restored, "draft").is_persisted());
    assert_eq!(store.fetch_count(), 0);
}

#[test]
fn collection_null_slots_keep_order() {
    let posts = EntityCollection::from_entities(
        "Post",
        vec![post(1, "First"), Entity::new("Post"), post(2, "Second")],
    );
    let component = DynamicComponent::new("feed").with_property("posts", posts);
    let store = store();

    let state = codec().dehydrate(&component).unwrap();
    assert_eq!(
        serde_json::to_value(&state.meta).unwrap(),
        json!({"modelCollections": {"posts": {"class": "Post", "id": [1, null, 2]}}})
    );

    let restored = hydrate(&state, &component, &store);
    let restored_posts = entities(&restored, "posts");
    assert_eq!(restored_posts.len(), 3);
    assert_eq!(
        restored_posts.keys(),
        vec![Some(EntityId::Int(1)), None, Some(EntityId::Int(2))]
    );
    assert_eq!(restored_posts.get(1), Some(&Entity::new("Post")));

    let fetches = store.fetches();
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].ids, vec![EntityId::Int(1), EntityId::Int(2)]);
}

#[test]
fn loaded_relations_are_requested_again() {
    let first = post(1, "First").with_many(
        "comments",
        vec![
            comment(10, "Nice", user(1, "Ada")),
            comment(11, "Meh", user(2, "Bob")),
        ],
    );
    let component = DynamicComponent::new("thread").with_property("post", first.clone());
    let store = store();

    let state = codec().dehydrate(&component).unwrap();
    assert_eq!(
        state.meta.models["post"].relations,
        vec!["comments".to_string(), "comments.author".to_string()]
    );

    let restored = hydrate(&state, &component, &store);
    assert_eq!(entity(&restored, "post"), &first);
    assert_eq!(
        store.fetches()[0].relations,
        vec!["comments".to_string(), "comments.author".to_string()]
    );
}

#[test]
fn unloaded_relations_stay_unloaded() {
    let component = DynamicComponent::new("c").with_property("post", post(1, "First"));
    let store = store();
    let state = codec().dehydrate(&component).unwrap();
    let restored = hydrate(&state, &component, &store);
    assert!(!entity(&restored, "post").relation_loaded("comments"));
}

#[test]
fn connection_is_carried_to_the_store() {
    let component = DynamicComponent::new("c")
        .with_property("post", post(2, "Second").with_connection("replica"));
    let store = store();
    let state = codec().dehydrate(&component).unwrap();
    assert_eq!(state.meta.models["post"].connection(), Some("replica"));

    hydrate(&state, &component, &store);
    assert_eq!(store.fetches()[0].connection.as_deref(), Some("replica"));
}

#[test]
fn client_edits_are_reapplied_as_dirty_data() {
    let component = DynamicComponent::new("editor")
        .with_property("post", post(2, "Second"))
        .with_rules(["post.title", "post.meta.seo.slug"]);
    let store = store();

    let mut state = codec().dehydrate(&component).unwrap();
    assert_eq!(
        state.data["post"],
        json!({"title": "Second", "meta": {"seo": {"slug": "post-2"}}})
    );

    // The client edits the title and the slug
    state.data["post"]["title"] = json!("Second, revised");
    state.data["post"]["meta"]["seo"]["slug"] = json!("second-revised");

    let restored = hydrate(&state, &component, &store);
    let restored_post = entity(&restored, "post");
    assert_eq!(restored_post.attribute("title"), Some(&json!("Second, revised")));
    assert_eq!(restored_post.attribute("secret"), Some(&json!("draft-notes-2")));
    assert_eq!(
        restored_post.attribute("meta"),
        Some(&json!({"views": 20, "seo": {"slug": "second-revised", "index": true}}))
    );
}

#[test]
fn dirty_data_is_partial() {
    let mut address_book = Entity::persisted("User", 1)
        .with_attribute("name", "Ada")
        .with_attribute("address", json!({"city": "London", "zip": "N1", "street": "Baker"}));
    let overrides = json!({"address": {"city": "X"}});
    wirestate::apply_dirty_data(&mut address_book, overrides.as_object().unwrap());

    assert_eq!(address_book.attribute("name"), Some(&json!("Ada")));
    assert_eq!(
        address_book.attribute("address"),
        Some(&json!({"city": "X", "zip": "N1", "street": "Baker"}))
    );
}

#[test]
fn dirty_data_reaches_relation_members() {
    let first = post(1, "First").with_many(
        "comments",
        vec![
            comment(10, "Nice", user(1, "Ada")),
            comment(11, "Meh", user(2, "Bob")),
        ],
    );
    let component = DynamicComponent::new("thread")
        .with_property("post", first)
        .with_rules(["post.comments.*.body"]);
    let store = store();

    let mut state = codec().dehydrate(&component).unwrap();
    state.data["post"]["comments"][1]["body"] = json!("Actually great");

    let restored = hydrate(&state, &component, &store);
    let comments = match entity(&restored, "post").relation("comments") {
        Some(wirestate::Relation::Many(items)) => items.clone(),
        other => panic!("comments not loaded: {:?}", other),
    };
    assert_eq!(comments[0].attribute("body"), Some(&json!("Nice")));
    assert_eq!(comments[1].attribute("body"), Some(&json!("Actually great")));
    assert_eq!(comments[1].attribute("spam"), Some(&json!(false)));
}

#[test]
fn dirty_data_reaches_collection_members_by_position() {
    let posts = EntityCollection::from_entities(
        "Post",
        vec![post(1, "First"), Entity::new("Post"), post(3, "Third")],
    );
    let component = DynamicComponent::new("feed")
        .with_property("posts", posts)
        .with_rule("posts.*.title");
    let store = store();

    let mut state = codec().dehydrate(&component).unwrap();
    state.data["posts"][1]["title"] = json!("Fresh");
    state.data["posts"][2]["title"] = json!("Third!");

    let restored = hydrate(&state, &component, &store);
    let restored_posts = entities(&restored, "posts");
    assert_eq!(restored_posts.get(0).unwrap().attribute("title"), Some(&json!("First")));
    assert_eq!(restored_posts.get(1).unwrap().attribute("title"), Some(&json!("Fresh")));
    assert!(!restored_posts.get(1).unwrap().is_persisted());
    assert_eq!(restored_posts.get(2).unwrap().attribute("title"), Some(&json!("Third!")));
}
