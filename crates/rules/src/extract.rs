//! Shape-preserving projection
//!
//! [`extract`] walks a JSON value and a [`RuleTree`] together and returns a
//! filtered copy:
//!
//! - arrays stay arrays and maps stay maps;
//! - a key absent from the source (or `null` where nested rules expect
//!   structure) is omitted from the result, never written as `null`;
//! - `*` fans a subtree out over every element of a sequence;
//! - a terminal `*` takes the whole value at its level, replacing whatever
//!   was collected so far.
//!
//! Extraction is total: any data and any tree produce a result.

use crate::tree::{RuleNode, RuleTree};
use serde_json::{Map, Value};
use wirestate_core::json::{empty_like, get_key, push, set_key};

/// Project `data` through `tree`
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wirestate_rules::{compile, extract};
///
/// let tree = compile(["items.*.name", "items.*.price"]);
/// let data = json!({"items": [
///     {"name": "a", "price": 1, "secret": "x"},
///     {"name": "b", "price": 2, "secret": "y"}
/// ]});
///
/// assert_eq!(
///     extract(&data, &tree),
///     json!({"items": [{"name": "a", "price": 1}, {"name": "b", "price": 2}]})
/// );
/// ```
pub fn extract(data: &Value, tree: &RuleTree) -> Value {
    let mut out = if data.is_array() || tree.is_fan_out() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    };

    for node in tree.nodes() {
        match node {
            RuleNode::Each(sub) => match data {
                Value::Array(items) => {
                    for item in items {
                        push(&mut out, extract(item, sub));
                    }
                }
                Value::Object(entries) => {
                    for item in entries.values() {
                        push(&mut out, extract(item, sub));
                    }
                }
                _ => {}
            },
            RuleNode::Nested(key, sub) => match get_key(data, key) {
                Some(child) if !child.is_null() => set_key(&mut out, key, extract(child, sub)),
                _ => {}
            },
            RuleNode::Everything => out = data.clone(),
            RuleNode::Field(name) => {
                if let Some(value) = get_key(data, name) {
                    set_key(&mut out, name, value.clone());
                }
            }
        }
    }

    out
}

/// Project the value of one property through the rules declared for it
///
/// `rules` is the compiled tree of every rule rooted at `property`:
/// - a nested group for `property` projects `data` through that group;
/// - a plain rule naming `property` allows the whole value;
/// - no rule at all yields an empty container of the same shape.
///
/// ```
/// use serde_json::json;
/// use wirestate_rules::{compile, project_property};
///
/// let data = json!({"title": "Hi", "draft": true});
///
/// let rules = compile(["post.title"]);
/// assert_eq!(project_property("post", &data, &rules), json!({"title": "Hi"}));
///
/// let rules = compile(["other.title"]);
/// assert_eq!(project_property("post", &data, &rules), json!({}));
/// ```
pub fn project_property(property: &str, data: &Value, rules: &RuleTree) -> Value {
    match rules.get(property) {
        Some(RuleNode::Nested(_, sub)) => extract(data, sub),
        Some(_) => data.clone(),
        None => empty_like(data),
    }
}
