//! Projection Tests
//!
//! What an entity property puts on the wire is decided by the component's
//! rule paths for that property.

use crate::common::*;
use serde_json::json;
use wirestate::{compile, extract, DynamicComponent, Entity, EntityCollection};

fn dehydrated(component: &DynamicComponent, property: &str) -> serde_json::Value {
    codec().dehydrate(component).unwrap().data[property].clone()
}

#[test]
fn wildcard_fan_out_drops_unlisted_fields() {
    let tree = compile(["items.*.name", "items.*.price"]);
    let data = json!({"items": [
        {"name": "a", "price": 1, "secret": "x"},
        {"name": "b", "price": 2, "secret": "y"}
    ]});
    assert_eq!(
        extract(&data, &tree),
        json!({"items": [{"name": "a", "price": 1}, {"name": "b", "price": 2}]})
    );
}

#[test]
fn bare_wildcard_is_suppressed_by_finer_rule() {
    let tree = compile(["items.*", "items.name"]);
    let data = json!({"items": {"name": "a", "extra": "z"}});
    assert_eq!(extract(&data, &tree), json!({"items": {"name": "a"}}));
}

#[test]
fn entity_without_rules_sends_empty_container() {
    let component = DynamicComponent::new("c")
        .with_property("post", post(1, "First"))
        .with_property(
            "posts",
            EntityCollection::from_entities("Post", vec![post(2, "Second")]),
        );
    assert_eq!(dehydrated(&component, "post"), json!({}));
    assert_eq!(dehydrated(&component, "posts"), json!([]));
}

#[test]
fn plain_property_rule_sends_whole_array_form() {
    let component = DynamicComponent::new("c")
        .with_property("author", user(1, "Ada"))
        .with_rule("author");
    assert_eq!(
        dehydrated(&component, "author"),
        json!({"id": 1, "name": "Ada", "email": "ada@example.com"})
    );
}

#[test]
fn nested_relation_fan_out() {
    let first = post(1, "First").with_many(
        "comments",
        vec![
            comment(10, "Nice", user(1, "Ada")),
            comment(11, "Meh", user(2, "Bob")),
        ],
    );
    let component = DynamicComponent::new("thread")
        .with_property("post", first)
        .with_rules([
            "post.title",
            "post.comments.*.body",
            "post.comments.*.author.name",
        ]);

    assert_eq!(
        dehydrated(&component, "post"),
        json!({
            "title": "First",
            "comments": [
                {"body": "Nice", "author": {"name": "Ada"}},
                {"body": "Meh", "author": {"name": "Bob"}}
            ]
        })
    );
}

#[test]
fn terminal_wildcard_takes_whole_nested_value() {
    let component = DynamicComponent::new("c")
        .with_property("post", post(4, "Fourth"))
        .with_rule("post.meta.*");
    assert_eq!(
        dehydrated(&component, "post"),
        json!({"meta": {"views": 40, "seo": {"slug": "post-4", "index": true}}})
    );

    let narrowed = DynamicComponent::new("c")
        .with_property("post", post(4, "Fourth"))
        .with_rules(["post.meta.*", "post.meta.seo.slug"]);
    assert_eq!(
        dehydrated(&narrowed, "post"),
        json!({"meta": {"seo": {"slug": "post-4"}}})
    );
}

#[test]
fn absent_fields_are_omitted_not_nulled() {
    let component = DynamicComponent::new("c")
        .with_property("post", post(1, "First"))
        .with_rules(["post.subtitle", "post.author.name", "post.tags.*.label"]);
    assert_eq!(dehydrated(&component, "post"), json!({}));
}

#[test]
fn rules_do_not_leak_between_properties() {
    let component = DynamicComponent::new("c")
        .with_property("post", post(1, "First"))
        .with_property("other", post(2, "Second"))
        .with_rules(["post.title", "poster.secret"]);
    assert_eq!(dehydrated(&component, "post"), json!({"title": "First"}));
    assert_eq!(dehydrated(&component, "other"), json!({}));
}

#[test]
fn unsaved_entity_projects_without_id() {
    let component = DynamicComponent::new("c")
        .with_property("draft", Entity::new("Post").with_attribute("title", "New"))
        .with_rule("draft.*");
    assert_eq!(dehydrated(&component, "draft"), json!({"title": "New"}));
}

#[test]
fn collection_projection_keeps_null_slot_positions() {
    let posts = EntityCollection::from_entities(
        "Post",
        vec![
            post(1, "First"),
            Entity::new("Post").with_attribute("title", "Draft"),
            post(2, "Second"),
        ],
    );
    let component = DynamicComponent::new("feed")
        .with_property("posts", posts)
        .with_rules(["posts.*.id", "posts.*.title"]);
    assert_eq!(
        dehydrated(&component, "posts"),
        json!([
            {"id": 1, "title": "First"},
            {"title": "Draft"},
            {"id": 2, "title": "Second"}
        ])
    );
}
