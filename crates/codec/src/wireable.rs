//! Registry of wireable constructors
//!
//! A wireable property is rebuilt from its wire value by the constructor
//! registered under the property's declared type identifier.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use wirestate_core::{FromWire, Wireable};

type Constructor = fn(&Value) -> Result<Box<dyn Wireable>, String>;

fn construct_as<T: FromWire + Clone + 'static>(value: &Value) -> Result<Box<dyn Wireable>, String> {
    T::from_wire(value).map(|v| Box::new(v) as Box<dyn Wireable>)
}

/// Wireable constructors keyed by declared type identifier
#[derive(Clone, Default)]
pub struct WireableRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl WireableRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `type_name`, replacing any earlier registration
    pub fn register<T: FromWire + Clone + 'static>(&mut self, type_name: impl Into<String>) {
        self.constructors.insert(type_name.into(), construct_as::<T>);
    }

    /// Whether a constructor is registered for `type_name`
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Rebuild a value of the type registered under `type_name`
    ///
    /// Returns `None` when nothing is registered under that name, and the
    /// type's own rejection message when it refuses the value.
    pub fn construct(
        &self,
        type_name: &str,
        value: &Value,
    ) -> Option<Result<Box<dyn Wireable>, String>> {
        self.constructors.get(type_name).map(|construct| construct(value))
    }

    /// Registered type identifiers
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl fmt::Debug for WireableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}
