//! Collaborator traits
//!
//! This module defines the seams between the codec and the outside world:
//! - Component: the instance whose public properties are hydrated
//! - EntityStore: batched lookup of persisted entities
//! - Wireable / FromWire: custom types with their own wire conversion

use crate::entity::{Entity, EntityId};
use crate::error::Result;
use crate::value::{PropertyBag, PropertyValue};
use std::any::Any;
use std::fmt;

// ============================================================================
// Component
// ============================================================================

/// Declared static type of a component property
///
/// This is the codec's view of reflection: the component tells it what type a
/// property was declared with, rather than the codec guessing from the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    /// Type identifier, e.g. `"Money"` or `"i64"`
    pub type_name: String,
    /// Whether `null` is an acceptable value
    pub nullable: bool,
}

impl DeclaredType {
    /// A non-nullable declared type
    pub fn strict(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            nullable: false,
        }
    }

    /// A nullable declared type
    pub fn nullable(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            nullable: true,
        }
    }
}

/// A stateful component whose public properties cross the wire
pub trait Component {
    /// Component name, used in diagnostics
    fn name(&self) -> &str;

    /// Public properties, in declaration order
    fn properties(&self) -> &PropertyBag;

    /// Assign a property
    fn set_property(&mut self, name: &str, value: PropertyValue);

    /// Declared static type of a property
    ///
    /// `None` means the property is untyped or virtual (not declared at all).
    fn declared_type(&self, _property: &str) -> Option<&DeclaredType> {
        None
    }

    /// Every rule path the component declares
    fn rules(&self) -> Vec<String> {
        Vec::new()
    }

    /// Rule paths governing one entity-typed property
    ///
    /// Defaults to the declared rules rooted at `property`.
    fn rules_for(&self, property: &str) -> Vec<String> {
        let prefix = format!("{}.", property);
        self.rules()
            .into_iter()
            .filter(|rule| rule == property || rule.starts_with(&prefix))
            .collect()
    }
}

// ============================================================================
// EntityStore
// ============================================================================

/// A batched fetch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityQuery<'a> {
    /// Entity class
    pub class: &'a str,
    /// Identifiers to fetch, in order
    pub ids: &'a [EntityId],
    /// Relations to load alongside
    pub relations: &'a [String],
    /// Connection label; `None` is the store default
    pub connection: Option<&'a str>,
}

/// Store of persisted entities
///
/// Implementations are called at most once per entity reference during
/// hydration. The codec checks results against the requested identifiers,
/// so a store may return entities in any order.
pub trait EntityStore {
    /// Fetch every identified entity in one batch
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. Missing identifiers are
    /// simply absent from the result.
    fn fetch(&self, query: &EntityQuery<'_>) -> Result<Vec<Entity>>;

    /// Load the named relations on `entities` where not already loaded
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_missing(
        &self,
        entities: &mut [Entity],
        relations: &[String],
        connection: Option<&str>,
    ) -> Result<()>;

    /// A fresh, empty instance of `class`
    fn instantiate(&self, class: &str) -> Entity {
        Entity::new(class)
    }
}

// ============================================================================
// Wireable
// ============================================================================

/// A custom value type with its own wire conversion
///
/// Implement this together with [`FromWire`] and register the type with the
/// codec's registry under the identifier components declare it with.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use wirestate_core::{FromWire, Wireable};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Money { cents: i64 }
///
/// impl Wireable for Money {
///     fn to_wire(&self) -> Value {
///         json!({ "cents": self.cents })
///     }
/// }
///
/// impl FromWire for Money {
///     fn from_wire(value: &Value) -> Result<Self, String> {
///         value["cents"].as_i64()
///             .map(|cents| Money { cents })
///             .ok_or_else(|| "missing cents".to_string())
///     }
/// }
///
/// let money = Money { cents: 250 };
/// assert_eq!(Money::from_wire(&money.to_wire()).unwrap(), money);
/// ```
pub trait Wireable: fmt::Debug + DynWireable {
    /// Deterministic wire form of this value
    fn to_wire(&self) -> serde_json::Value;
}

/// Object-safety helpers for [`Wireable`]
///
/// Implemented automatically for every `Wireable + Clone + 'static` type.
pub trait DynWireable {
    /// Clone into a new box
    fn clone_box(&self) -> Box<dyn Wireable>;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

impl<T: Wireable + Clone + 'static> DynWireable for T {
    fn clone_box(&self) -> Box<dyn Wireable> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn Wireable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl<'a> dyn Wireable + 'a {
    /// Downcast to a concrete wireable type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Inverse of [`Wireable::to_wire`]
pub trait FromWire: Wireable + Sized {
    /// Rebuild a value from its wire form
    ///
    /// # Errors
    ///
    /// Returns a message describing why the wire value was rejected.
    fn from_wire(value: &serde_json::Value) -> std::result::Result<Self, String>;
}
