//! A data-driven component
//!
//! [`DynamicComponent`] implements [`Component`] from plain data: a name, a
//! property bag, declared types and rule paths. Hosts that describe their
//! components at runtime use it directly; tests use it as a fixture.

use crate::traits::{Component, DeclaredType};
use crate::value::{PropertyBag, PropertyValue};
use std::collections::BTreeMap;

/// Component described entirely by data
#[derive(Debug, Clone, Default)]
pub struct DynamicComponent {
    name: String,
    properties: PropertyBag,
    declared: BTreeMap<String, DeclaredType>,
    rules: Vec<String>,
}

impl DynamicComponent {
    /// Create an empty component
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an untyped property (builder form)
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
        self
    }

    /// Add a typed property (builder form)
    pub fn with_typed_property(
        mut self,
        name: impl Into<String>,
        declared: DeclaredType,
        value: impl Into<PropertyValue>,
    ) -> Self {
        let name = name.into();
        self.declared.insert(name.clone(), declared);
        self.properties.insert(name, value);
        self
    }

    /// Declare a property's type without giving it a value (builder form)
    pub fn with_declared_type(mut self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.declared.insert(name.into(), declared);
        self
    }

    /// Add a rule path (builder form)
    pub fn with_rule(mut self, path: impl Into<String>) -> Self {
        self.rules.push(path.into());
        self
    }

    /// Add several rule paths (builder form)
    pub fn with_rules<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// A copy of this component with no property values
    ///
    /// Declared types and rules are kept, as they would be on a freshly
    /// constructed instance awaiting hydration.
    pub fn blank(&self) -> Self {
        Self {
            name: self.name.clone(),
            properties: PropertyBag::new(),
            declared: self.declared.clone(),
            rules: self.rules.clone(),
        }
    }
}

impl Component for DynamicComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name, value);
    }

    fn declared_type(&self, property: &str) -> Option<&DeclaredType> {
        self.declared.get(property)
    }

    fn rules(&self) -> Vec<String> {
        self.rules.clone()
    }
}
