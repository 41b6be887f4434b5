//! Runtime property values
//!
//! This module defines:
//! - PropertyValue: the closed set of value kinds a component property may hold
//! - DateValue / DateFlavor: date-time values and the flavor recorded on the wire
//! - PropertyBag: the ordered name → value map owned by a component
//!
//! ## Classification Order
//!
//! A value is classified into exactly one wire category. The order in which
//! categories are checked is part of the contract, because a value could
//! structurally satisfy more than one of them:
//!
//! 1. Primitives and plain JSON structures (pass through)
//! 2. Single entity
//! 3. Entity collection
//! 4. Ordered collection
//! 5. Date-time
//! 6. Text wrapper
//! 7. Custom wireable
//!
//! Anything else is [`PropertyValue::Opaque`] and cannot be dehydrated.

use crate::entity::{Entity, EntityCollection};
use crate::traits::Wireable;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Dates
// ============================================================================

/// Which concrete date-time type a `dates` sidecar entry rebuilds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFlavor {
    /// Date-time carrying its own UTC offset
    Native,
    /// Date-time normalized to UTC
    Utc,
    /// Wall-clock date-time without a zone
    Naive,
}

impl DateFlavor {
    /// Name used in the metadata sidecar
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFlavor::Native => "native",
            DateFlavor::Utc => "utc",
            DateFlavor::Naive => "naive",
        }
    }
}

impl fmt::Display for DateFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(DateFlavor::Native),
            "utc" => Ok(DateFlavor::Utc),
            "naive" => Ok(DateFlavor::Naive),
            other => Err(format!("unknown date flavor '{}'", other)),
        }
    }
}

/// A date-time property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// Offset-carrying date-time
    Native(DateTime<FixedOffset>),
    /// UTC date-time
    Utc(DateTime<Utc>),
    /// Zone-less date-time
    Naive(NaiveDateTime),
}

impl DateValue {
    /// The flavor recorded in the sidecar for this value
    pub fn flavor(&self) -> DateFlavor {
        match self {
            DateValue::Native(_) => DateFlavor::Native,
            DateValue::Utc(_) => DateFlavor::Utc,
            DateValue::Naive(_) => DateFlavor::Naive,
        }
    }
}

// ============================================================================
// Opaque values
// ============================================================================

/// Description of a value that has no wire representation
///
/// Holds the Rust type name and a debug rendering, enough to produce a
/// useful error when the codec rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueValue {
    type_name: &'static str,
    repr: String,
}

impl OpaqueValue {
    /// Rust type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.repr)
    }
}

// ============================================================================
// PropertyValue
// ============================================================================

/// A value held by a component property
///
/// The first seven variants are JSON-native and cross the wire verbatim.
/// The rest are recorded in the metadata sidecar so hydration can rebuild
/// the exact runtime type.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point; must be finite to cross the wire
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Plain JSON array
    Array(Vec<serde_json::Value>),
    /// Plain JSON object
    Object(serde_json::Map<String, serde_json::Value>),
    /// Ordered collection of JSON-compatible values
    Collection(Vec<serde_json::Value>),
    /// Date-time
    Date(DateValue),
    /// Text wrapper around a string
    Text(String),
    /// Custom type with its own wire conversion
    Wireable(Box<dyn Wireable>),
    /// Single entity
    Entity(Entity),
    /// Homogeneous collection of entities
    Entities(EntityCollection),
    /// A value with no wire representation
    Opaque(OpaqueValue),
}

impl PropertyValue {
    /// Wrap an arbitrary value that cannot cross the wire
    ///
    /// ```
    /// use wirestate_core::PropertyValue;
    ///
    /// #[derive(Debug)]
    /// struct FileHandle(i32);
    ///
    /// let value = PropertyValue::opaque(&FileHandle(3));
    /// assert!(value.is_opaque());
    /// ```
    pub fn opaque<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        PropertyValue::Opaque(OpaqueValue {
            type_name: std::any::type_name::<T>(),
            repr: format!("{:?}", value),
        })
    }

    /// Wrap a custom wireable value
    pub fn wireable<W: Wireable + 'static>(value: W) -> Self {
        PropertyValue::Wireable(Box::new(value))
    }

    /// Get the kind name as a string
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::Array(_) => "array",
            PropertyValue::Object(_) => "object",
            PropertyValue::Collection(_) => "collection",
            PropertyValue::Date(_) => "date",
            PropertyValue::Text(_) => "text",
            PropertyValue::Wireable(_) => "wireable",
            PropertyValue::Entity(_) => "entity",
            PropertyValue::Entities(_) => "entities",
            PropertyValue::Opaque(_) => "opaque",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Check if this value has no wire representation
    pub fn is_opaque(&self) -> bool {
        matches!(self, PropertyValue::Opaque(_))
    }

    /// Get as &str if this is a String or Text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the entity if this is an Entity value
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            PropertyValue::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Get the entity collection if this is an Entities value
    pub fn as_entities(&self) -> Option<&EntityCollection> {
        match self {
            PropertyValue::Entities(c) => Some(c),
            _ => None,
        }
    }

    /// Get the date if this is a Date value
    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            PropertyValue::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Get the wireable if this is a Wireable value
    pub fn as_wireable(&self) -> Option<&(dyn Wireable + 'static)> {
        match self {
            PropertyValue::Wireable(w) => Some(w.as_ref()),
            _ => None,
        }
    }
}

// Wireables compare by their wire form; everything else structurally
impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        use PropertyValue as P;
        match (self, other) {
            (P::Null, P::Null) => true,
            (P::Bool(a), P::Bool(b)) => a == b,
            (P::Int(a), P::Int(b)) => a == b,
            (P::Float(a), P::Float(b)) => a == b,
            (P::String(a), P::String(b)) => a == b,
            (P::Array(a), P::Array(b)) => a == b,
            (P::Object(a), P::Object(b)) => a == b,
            (P::Collection(a), P::Collection(b)) => a == b,
            (P::Date(a), P::Date(b)) => a == b,
            (P::Text(a), P::Text(b)) => a == b,
            (P::Wireable(a), P::Wireable(b)) => a.to_wire() == b.to_wire(),
            (P::Entity(a), P::Entity(b)) => a == b,
            (P::Entities(a), P::Entities(b)) => a == b,
            (P::Opaque(a), P::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<DateValue> for PropertyValue {
    fn from(d: DateValue) -> Self {
        PropertyValue::Date(d)
    }
}

impl From<Entity> for PropertyValue {
    fn from(e: Entity) -> Self {
        PropertyValue::Entity(e)
    }
}

impl From<EntityCollection> for PropertyValue {
    fn from(c: EntityCollection) -> Self {
        PropertyValue::Entities(c)
    }
}

// ============================================================================
// serde_json interop: raw wire values
// ============================================================================

impl From<serde_json::Value> for PropertyValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Int(i)
                } else {
                    // u64 beyond i64 range lands here as well
                    PropertyValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => PropertyValue::String(s),
            serde_json::Value::Array(arr) => PropertyValue::Array(arr),
            serde_json::Value::Object(obj) => PropertyValue::Object(obj),
        }
    }
}

// ============================================================================
// PropertyBag
// ============================================================================

/// Ordered mapping from property name to value
///
/// Insertion order is kept so dehydration visits properties in declaration
/// order. Re-inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property, returning the previous value
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Get a mutable property value
    pub fn get_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Remove a property
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Whether a property is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterate over property names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

impl IntoIterator for PropertyBag {
    type Item = (String, PropertyValue);
    type IntoIter = std::vec::IntoIter<(String, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
