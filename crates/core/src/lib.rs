//! Core types and traits for wirestate
//!
//! This crate defines the foundational types shared by the rule engine and
//! the codec:
//! - PropertyValue / PropertyBag: runtime property model
//! - DateValue / DateFlavor: date-time values and their sidecar flavor
//! - Entity / EntityCollection / EntityId: persisted domain objects
//! - EntityRef: wire-safe entity identity
//! - Error: error type hierarchy
//! - Traits: collaborator seams (Component, EntityStore, Wireable, FromWire)
//! - JSON helpers: keyed set, positional push, dirty merge
//! - DynamicComponent / MemoryStore: data-driven reference collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod component;
pub mod entity;
pub mod entity_ref;
pub mod error;
pub mod json;
pub mod memory;
pub mod traits;
pub mod value;

// Re-export commonly used types and traits
pub use component::DynamicComponent;
pub use entity::{Entity, EntityCollection, EntityId, Relation, KEY_ATTRIBUTE};
pub use entity_ref::{EntityRef, RefIds};
pub use error::{Error, Result};
pub use memory::{FetchRecord, MemoryStore};
pub use traits::{
    Component, DeclaredType, DynWireable, EntityQuery, EntityStore, FromWire, Wireable,
};
pub use value::{DateFlavor, DateValue, OpaqueValue, PropertyBag, PropertyValue};
