//! Metadata sidecar
//!
//! The wire payload carries no type tags. Instead every property whose
//! runtime type is not JSON-native is listed in exactly one category of the
//! sidecar:
//!
//! | Category | Entry |
//! |----------|-------|
//! | `dates` | property → date flavor |
//! | `collections` | property name |
//! | `models` | property → single entity reference |
//! | `modelCollections` | property → collection reference |
//! | `stringables` | property name |
//! | `wireables` | property name |
//!
//! Empty categories are left out when serializing. Parsing is permissive:
//! each category and each entry is read on its own, anything malformed is
//! logged and skipped, and unknown categories are ignored. A property whose
//! entry was skipped simply hydrates from its raw wire value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use wirestate_core::{DateFlavor, EntityRef, RefIds};

/// Decode path chosen for one property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category<'a> {
    /// Date-time of the given flavor
    Date(DateFlavor),
    /// Ordered collection
    Collection,
    /// Single entity
    Model(&'a EntityRef),
    /// Entity collection
    ModelCollection(&'a EntityRef),
    /// Text wrapper
    Stringable,
    /// Custom wireable
    Wireable,
}

/// Type metadata accompanying a wire payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Metadata {
    /// Date properties and their flavor
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dates: BTreeMap<String, DateFlavor>,
    /// Ordered-collection properties
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<String>,
    /// Single-entity properties and their references
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, EntityRef>,
    /// Entity-collection properties and their references
    #[serde(rename = "modelCollections", skip_serializing_if = "BTreeMap::is_empty")]
    pub model_collections: BTreeMap<String, EntityRef>,
    /// Text-wrapper properties
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stringables: Vec<String>,
    /// Custom wireable properties
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wireables: Vec<String>,
}

impl Metadata {
    /// An empty sidecar
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no category has any entry
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
            && self.collections.is_empty()
            && self.models.is_empty()
            && self.model_collections.is_empty()
            && self.stringables.is_empty()
            && self.wireables.is_empty()
    }

    /// The category deciding how `property` is decoded
    ///
    /// Categories are checked in the order dates, collections, models,
    /// modelCollections, stringables, wireables; the first match wins.
    ///
    /// ```
    /// use wirestate_codec::{Category, Metadata};
    ///
    /// let mut meta = Metadata::new();
    /// meta.collections.push("tags".to_string());
    /// meta.stringables.push("tags".to_string());
    ///
    /// assert_eq!(meta.category_of("tags"), Some(Category::Collection));
    /// assert_eq!(meta.category_of("title"), None);
    /// ```
    pub fn category_of(&self, property: &str) -> Option<Category<'_>> {
        if let Some(flavor) = self.dates.get(property) {
            return Some(Category::Date(*flavor));
        }
        if self.collections.iter().any(|p| p == property) {
            return Some(Category::Collection);
        }
        if let Some(reference) = self.models.get(property) {
            return Some(Category::Model(reference));
        }
        if let Some(reference) = self.model_collections.get(property) {
            return Some(Category::ModelCollection(reference));
        }
        if self.stringables.iter().any(|p| p == property) {
            return Some(Category::Stringable);
        }
        if self.wireables.iter().any(|p| p == property) {
            return Some(Category::Wireable);
        }
        None
    }

    /// Parse a sidecar, skipping whatever is malformed
    pub fn from_json(value: &Value) -> Self {
        let mut meta = Metadata::new();
        let Value::Object(categories) = value else {
            if !value.is_null() {
                warn!(target: "wirestate::metadata", found = %value, "Ignoring non-object metadata");
            }
            return meta;
        };

        for (category, entries) in categories {
            match category.as_str() {
                "dates" => meta.dates = parse_dates(entries),
                "collections" => meta.collections = parse_names(category, entries),
                "models" => meta.models = parse_refs(category, entries, false),
                "modelCollections" => meta.model_collections = parse_refs(category, entries, true),
                "stringables" => meta.stringables = parse_names(category, entries),
                "wireables" => meta.wireables = parse_names(category, entries),
                other => {
                    debug!(target: "wirestate::metadata", category = other, "Ignoring unknown metadata category");
                }
            }
        }
        meta
    }
}

impl From<Value> for Metadata {
    fn from(value: Value) -> Self {
        Metadata::from_json(&value)
    }
}

// =============================================================================
// Permissive category parsers
// =============================================================================

fn entries_of<'a>(category: &str, value: &'a Value) -> Option<&'a serde_json::Map<String, Value>> {
    match value {
        Value::Object(entries) => Some(entries),
        // An empty category may arrive as an empty list
        Value::Array(items) if items.is_empty() => None,
        other => {
            warn!(target: "wirestate::metadata", category, found = %other, "Ignoring malformed metadata category");
            None
        }
    }
}

fn parse_dates(value: &Value) -> BTreeMap<String, DateFlavor> {
    let mut dates = BTreeMap::new();
    let Some(entries) = entries_of("dates", value) else {
        return dates;
    };
    for (property, flavor) in entries {
        match flavor.as_str().map(str::parse::<DateFlavor>) {
            Some(Ok(flavor)) => {
                dates.insert(property.clone(), flavor);
            }
            _ => {
                warn!(target: "wirestate::metadata", %property, found = %flavor, "Skipping date entry with unknown flavor");
            }
        }
    }
    dates
}

fn parse_names(category: &str, value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        warn!(target: "wirestate::metadata", category, found = %value, "Ignoring malformed metadata category");
        return Vec::new();
    };
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(name) if !names.iter().any(|n| n == name) => names.push(name.to_string()),
            Some(_) => {}
            None => {
                warn!(target: "wirestate::metadata", category, found = %item, "Skipping non-string metadata entry");
            }
        }
    }
    names
}

fn parse_refs(category: &str, value: &Value, collection: bool) -> BTreeMap<String, EntityRef> {
    let mut refs = BTreeMap::new();
    let Some(entries) = entries_of(category, value) else {
        return refs;
    };
    for (property, raw) in entries {
        let reference = match EntityRef::deserialize(raw) {
            Ok(reference) => reference,
            Err(e) => {
                warn!(target: "wirestate::metadata", category, %property, error = %e, "Skipping malformed entity reference");
                continue;
            }
        };
        let shape_ok = match &reference.id {
            Some(RefIds::Many(_)) => collection,
            Some(RefIds::One(_)) | None => !collection,
        };
        if !shape_ok {
            warn!(target: "wirestate::metadata", category, %property, "Skipping entity reference of the wrong shape");
            continue;
        }
        refs.insert(property.clone(), reference);
    }
    refs
}
