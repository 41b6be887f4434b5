//! JSON container helpers
//!
//! Wire payloads are plain `serde_json::Value` trees. This module holds the
//! small set of container operations the projection and dirty-merge code
//! share:
//! - [`get_key`]: read a child by map key or array index
//! - [`set_key`]: write a child, materializing a container when needed
//! - [`push`]: append to a sequence
//! - [`merge_dirty`]: partial, recursive overwrite of nested fields
//!
//! None of these operations fail. A target that cannot hold the requested
//! child is replaced by one that can, matching how loosely typed payloads
//! behave on the client side.

use serde_json::{Map, Value};

// =============================================================================
// Inspection
// =============================================================================

/// Type name of a JSON value, for diagnostics
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An empty container with the same shape as `value`
///
/// Arrays map to `[]`; everything else maps to `{}`.
pub fn empty_like(value: &Value) -> Value {
    match value {
        Value::Array(_) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}

/// Parse a key as an array index
///
/// Only canonical decimal forms are indices: `"0"`, `"17"`. `"01"` and `"-1"`
/// are plain keys.
pub fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

// =============================================================================
// Access
// =============================================================================

/// Get the child of `value` at `key`
///
/// Objects are accessed by key, arrays by index. Scalars have no children.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wirestate_core::json::get_key;
///
/// let doc = json!({"tags": ["a", "b"], "name": "x"});
/// assert_eq!(get_key(&doc, "name"), Some(&json!("x")));
///
/// let tags = get_key(&doc, "tags").unwrap();
/// assert_eq!(get_key(tags, "1"), Some(&json!("b")));
/// assert_eq!(get_key(tags, "5"), None);
/// ```
pub fn get_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(obj) => obj.get(key),
        Value::Array(arr) => parse_index(key).and_then(|idx| arr.get(idx)),
        _ => None,
    }
}

/// Get a mutable child of `value` at `key`
pub fn get_key_mut<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(obj) => obj.get_mut(key),
        Value::Array(arr) => parse_index(key).and_then(move |idx| arr.get_mut(idx)),
        _ => None,
    }
}

// =============================================================================
// Mutation
// =============================================================================

/// Set `child` at `key` inside `target`
///
/// - Object: the key is inserted or replaced.
/// - Array: an in-range index replaces, the next index appends. Any other key
///   turns the array into an object keyed by position before inserting.
/// - Scalar or null: replaced with a fresh object holding only `key`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wirestate_core::json::set_key;
///
/// let mut seq = json!(["a"]);
/// set_key(&mut seq, "1", json!("b"));
/// assert_eq!(seq, json!(["a", "b"]));
///
/// set_key(&mut seq, "name", json!("c"));
/// assert_eq!(seq, json!({"0": "a", "1": "b", "name": "c"}));
/// ```
pub fn set_key(target: &mut Value, key: &str, child: Value) {
    if let Value::Array(arr) = target {
        match parse_index(key) {
            Some(idx) if idx < arr.len() => {
                arr[idx] = child;
                return;
            }
            Some(idx) if idx == arr.len() => {
                arr.push(child);
                return;
            }
            _ => {
                let keyed: Map<String, Value> = std::mem::take(arr)
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect();
                *target = Value::Object(keyed);
            }
        }
    }

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(obj) = target {
        obj.insert(key.to_string(), child);
    }
}

/// Append `child` to the sequence `target`
///
/// An object receives the next positional key. A scalar or null is replaced
/// with a one-element array.
pub fn push(target: &mut Value, child: Value) {
    match target {
        Value::Array(arr) => arr.push(child),
        Value::Object(obj) => {
            let key = obj.len().to_string();
            obj.insert(key, child);
        }
        _ => *target = Value::Array(vec![child]),
    }
}

/// Apply nested overrides onto `target`, touching only the named fields
///
/// For every `(key, value)` in `overrides`:
/// - a map value recurses into `target[key]`, first replacing it with `{}` when
///   it is missing or not a map;
/// - any other value (including `null` and arrays) overwrites `target[key]`.
///
/// Unlike a JSON merge patch, `null` is written through rather than deleting
/// the key: it is a legitimate client-side edit.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wirestate_core::json::merge_dirty;
///
/// let mut user = json!({"name": "Ada", "address": {"city": "London", "zip": "N1"}});
/// let overrides = json!({"address": {"city": "Paris"}});
/// merge_dirty(&mut user, overrides.as_object().unwrap());
/// assert_eq!(user, json!({"name": "Ada", "address": {"city": "Paris", "zip": "N1"}}));
/// ```
pub fn merge_dirty(target: &mut Value, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        match value {
            Value::Object(nested) => {
                let has_container = matches!(
                    get_key(target, key),
                    Some(Value::Object(_)) | Some(Value::Array(_))
                );
                if !has_container {
                    set_key(target, key, Value::Object(Map::new()));
                }
                if let Some(slot) = get_key_mut(target, key) {
                    merge_dirty(slot, nested);
                }
            }
            other => set_key(target, key, other.clone()),
        }
    }
}
