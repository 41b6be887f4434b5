//! Value codec
//!
//! [`ValueCodec`] moves a component's public properties across the wire.
//!
//! ## Dehydrate
//!
//! Each property value is classified into exactly one wire category, in this
//! order:
//!
//! 1. null, bool, int, float, string, plain array, plain object: verbatim
//! 2. single entity: reference under `models`, projected array form as data
//! 3. entity collection: reference under `modelCollections`, projected data
//! 4. ordered collection: array, listed under `collections`
//! 5. date-time: formatted string, flavor under `dates`
//! 6. text wrapper: the string, listed under `stringables`
//! 7. custom wireable: its wire form, listed under `wireables`
//!
//! Opaque values and non-finite floats fail the whole call with
//! [`Error::PropertyTypeNotAllowed`].
//!
//! ## Hydrate
//!
//! The sidecar picks the decode path (see [`Metadata::category_of`]). An
//! untagged property gets its raw wire value, except that a raw `null` is not
//! assigned to a property declared with a non-nullable type. Entity
//! properties are restored through the store and then receive their wire
//! value as dirty data.
//!
//! Every value is decoded before any is assigned, so a failed hydrate leaves
//! the component untouched.

use crate::config::CodecConfig;
use crate::metadata::{Category, Metadata};
use crate::resolver::{
    apply_dirty_data, apply_dirty_items, restore_collection, restore_entity, serialize_collection,
    serialize_entity,
};
use crate::wireable::WireableRegistry;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;
use wirestate_core::json::value_type_name;
use wirestate_core::{
    Component, DateFlavor, DateValue, EntityStore, Error, FromWire, PropertyValue, Result,
};
use wirestate_rules::{compile, project_property};

/// Placeholder type name reported for a wireable property with no declared type
const UNDECLARED: &str = "<undeclared>";

// =============================================================================
// WireState
// =============================================================================

/// Wire payload together with its metadata sidecar
///
/// Serializes as the `{"data": ..., "dataMeta": ...}` envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireState {
    /// Property name to wire value
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Type metadata for non-native values
    #[serde(rename = "dataMeta", default)]
    pub meta: Metadata,
}

impl WireState {
    /// Pair a payload with its sidecar
    pub fn new(data: Map<String, Value>, meta: Metadata) -> Self {
        Self { data, meta }
    }

    /// Parse an envelope
    ///
    /// # Errors
    ///
    /// Fails when `data` is present but not a map. A malformed `dataMeta`
    /// is tolerated, entry by entry.
    pub fn from_json(value: Value) -> Result<Self> {
        if let Some(data) = value.get("data") {
            if !data.is_object() && !data.is_null() {
                return Err(Error::invalid_wire_value("data", "object", value_type_name(data)));
            }
        }
        let data = match value.get("data") {
            Some(Value::Object(data)) => data.clone(),
            _ => Map::new(),
        };
        let meta = value
            .get("dataMeta")
            .map(Metadata::from_json)
            .unwrap_or_default();
        Ok(Self { data, meta })
    }
}

// =============================================================================
// ValueCodec
// =============================================================================

/// Converts component properties to and from their wire form
#[derive(Debug, Clone, Default)]
pub struct ValueCodec {
    config: CodecConfig,
    wireables: WireableRegistry,
}

impl ValueCodec {
    /// A codec with default configuration and no wireable types
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec with the given configuration
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            wireables: WireableRegistry::new(),
        }
    }

    /// Register a wireable type under its declared type identifier (builder form)
    pub fn with_wireable<T: FromWire + Clone + 'static>(mut self, type_name: impl Into<String>) -> Self {
        self.wireables.register::<T>(type_name);
        self
    }

    /// Register a wireable type under its declared type identifier
    pub fn register_wireable<T: FromWire + Clone + 'static>(&mut self, type_name: impl Into<String>) {
        self.wireables.register::<T>(type_name);
    }

    /// Active configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Registered wireable constructors
    pub fn wireables(&self) -> &WireableRegistry {
        &self.wireables
    }

    // =========================================================================
    // Dehydrate
    // =========================================================================

    /// Encode every public property of `component`
    ///
    /// # Errors
    ///
    /// Fails on the first property that cannot cross the wire; no partial
    /// state is returned.
    pub fn dehydrate<C: Component + ?Sized>(&self, component: &C) -> Result<WireState> {
        let mut state = WireState::default();
        for (name, value) in component.properties().iter() {
            let encoded = self.dehydrate_property(component, name, value, &mut state.meta)?;
            state.data.insert(name.to_string(), encoded);
        }
        debug!(
            target: "wirestate::codec",
            component = %component.name(),
            properties = state.data.len(),
            "Dehydrated component"
        );
        Ok(state)
    }

    fn dehydrate_property<C: Component + ?Sized>(
        &self,
        component: &C,
        name: &str,
        value: &PropertyValue,
        meta: &mut Metadata,
    ) -> Result<Value> {
        let not_allowed = |description: String| Error::PropertyTypeNotAllowed {
            component: component.name().to_string(),
            property: name.to_string(),
            value: description,
        };

        let encoded = match value {
            PropertyValue::Null => Value::Null,
            PropertyValue::Bool(b) => Value::Bool(*b),
            PropertyValue::Int(i) => Value::from(*i),
            PropertyValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .ok_or_else(|| not_allowed(format!("float {}", f)))?,
            PropertyValue::String(s) => Value::String(s.clone()),
            PropertyValue::Array(items) => Value::Array(items.clone()),
            PropertyValue::Object(entries) => Value::Object(entries.clone()),
            PropertyValue::Entity(entity) => {
                meta.models.insert(name.to_string(), serialize_entity(entity));
                let rules = compile(component.rules_for(name));
                project_property(name, &entity.to_array(), &rules)
            }
            PropertyValue::Entities(collection) => {
                let reference = serialize_collection(name, collection)?;
                meta.model_collections.insert(name.to_string(), reference);
                let rules = compile(component.rules_for(name));
                project_property(name, &collection.to_array(), &rules)
            }
            PropertyValue::Collection(items) => {
                meta.collections.push(name.to_string());
                Value::Array(items.clone())
            }
            PropertyValue::Date(date) => {
                meta.dates.insert(name.to_string(), date.flavor());
                Value::String(self.format_date(date))
            }
            PropertyValue::Text(text) => {
                meta.stringables.push(name.to_string());
                Value::String(text.clone())
            }
            PropertyValue::Wireable(wireable) => {
                meta.wireables.push(name.to_string());
                wireable.to_wire()
            }
            PropertyValue::Opaque(opaque) => return Err(not_allowed(opaque.to_string())),
        };
        Ok(encoded)
    }

    // =========================================================================
    // Hydrate
    // =========================================================================

    /// Decode `state` onto `component`
    ///
    /// # Errors
    ///
    /// Fails when an entity cannot be resolved, a tagged value has the wrong
    /// shape, or a wireable cannot be rebuilt. Nothing is assigned on failure.
    pub fn hydrate<C, S>(&self, component: &mut C, state: &WireState, store: &S) -> Result<()>
    where
        C: Component + ?Sized,
        S: EntityStore + ?Sized,
    {
        let mut decoded = Vec::with_capacity(state.data.len());
        for (name, raw) in &state.data {
            if let Some(value) = self.hydrate_property(component, name, raw, &state.meta, store)? {
                decoded.push((name.as_str(), value));
            }
        }

        let assigned = decoded.len();
        for (name, value) in decoded {
            component.set_property(name, value);
        }
        debug!(
            target: "wirestate::codec",
            component = %component.name(),
            assigned,
            skipped = state.data.len() - assigned,
            "Hydrated component"
        );
        Ok(())
    }

    fn hydrate_property<C, S>(
        &self,
        component: &C,
        name: &str,
        raw: &Value,
        meta: &Metadata,
        store: &S,
    ) -> Result<Option<PropertyValue>>
    where
        C: Component + ?Sized,
        S: EntityStore + ?Sized,
    {
        let value = match meta.category_of(name) {
            Some(Category::Date(flavor)) => {
                let text = raw
                    .as_str()
                    .ok_or_else(|| Error::invalid_wire_value(name, "date string", value_type_name(raw)))?;
                PropertyValue::Date(self.parse_date(name, text, flavor)?)
            }
            Some(Category::Collection) => match raw {
                Value::Array(items) => PropertyValue::Collection(items.clone()),
                other => {
                    return Err(Error::invalid_wire_value(name, "array", value_type_name(other)));
                }
            },
            Some(Category::Model(reference)) => {
                let mut entity = restore_entity(store, reference)?;
                if let Value::Object(dirty) = raw {
                    apply_dirty_data(&mut entity, dirty);
                }
                PropertyValue::Entity(entity)
            }
            Some(Category::ModelCollection(reference)) => {
                let mut collection = restore_collection(store, reference)?;
                apply_dirty_items(collection.as_mut_slice(), raw);
                PropertyValue::Entities(collection)
            }
            Some(Category::Stringable) => match raw {
                Value::String(text) => PropertyValue::Text(text.clone()),
                other => {
                    return Err(Error::invalid_wire_value(name, "string", value_type_name(other)));
                }
            },
            Some(Category::Wireable) => PropertyValue::Wireable(self.rebuild_wireable(component, name, raw)?),
            None => {
                if raw.is_null() && self.suppresses_null(component, name) {
                    debug!(target: "wirestate::codec", property = name, "Skipping null for non-nullable property");
                    return Ok(None);
                }
                PropertyValue::from(raw.clone())
            }
        };
        Ok(Some(value))
    }

    fn suppresses_null<C: Component + ?Sized>(&self, component: &C, name: &str) -> bool {
        self.config.suppress_typed_nulls
            && component
                .declared_type(name)
                .map_or(false, |declared| !declared.nullable)
    }

    fn rebuild_wireable<C: Component + ?Sized>(
        &self,
        component: &C,
        name: &str,
        raw: &Value,
    ) -> Result<Box<dyn wirestate_core::Wireable>> {
        let unknown = |type_name: &str| Error::UnknownWireableType {
            component: component.name().to_string(),
            property: name.to_string(),
            type_name: type_name.to_string(),
        };

        let declared = component
            .declared_type(name)
            .ok_or_else(|| unknown(UNDECLARED))?;
        match self.wireables.construct(&declared.type_name, raw) {
            None => Err(unknown(&declared.type_name)),
            Some(Ok(wireable)) => Ok(wireable),
            Some(Err(message)) => Err(Error::WireableConversion {
                property: name.to_string(),
                message,
            }),
        }
    }

    // =========================================================================
    // Dates
    // =========================================================================

    /// Format a date with the configured format for its flavor
    pub fn format_date(&self, date: &DateValue) -> String {
        match date {
            DateValue::Native(dt) => dt.format(&self.config.date_format).to_string(),
            DateValue::Utc(dt) => dt.format(&self.config.date_format).to_string(),
            DateValue::Naive(dt) => dt.format(&self.config.naive_date_format).to_string(),
        }
    }

    /// Parse a date of the given flavor
    ///
    /// The configured format is tried first, then RFC 3339 when
    /// `accept_rfc3339` is set. A naive date parsed from an offset-carrying
    /// string keeps its local wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWireValue`] when no accepted format matches.
    pub fn parse_date(&self, property: &str, text: &str, flavor: DateFlavor) -> Result<DateValue> {
        let parsed = match flavor {
            DateFlavor::Native => self.parse_offset(text).map(DateValue::Native),
            DateFlavor::Utc => self
                .parse_offset(text)
                .map(|dt| DateValue::Utc(dt.with_timezone(&Utc))),
            DateFlavor::Naive => NaiveDateTime::parse_from_str(text, &self.config.naive_date_format)
                .ok()
                .or_else(|| {
                    self.config
                        .accept_rfc3339
                        .then(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_local()))
                        .flatten()
                })
                .map(DateValue::Naive),
        };
        parsed.ok_or_else(|| {
            Error::invalid_wire_value(property, flavor_expectation(flavor), format!("{:?}", text))
        })
    }

    fn parse_offset(&self, text: &str) -> Option<DateTime<chrono::FixedOffset>> {
        DateTime::parse_from_str(text, &self.config.date_format)
            .ok()
            .or_else(|| {
                self.config
                    .accept_rfc3339
                    .then(|| DateTime::parse_from_rfc3339(text).ok())
                    .flatten()
            })
    }
}

fn flavor_expectation(flavor: DateFlavor) -> &'static str {
    match flavor {
        DateFlavor::Native => "native date string",
        DateFlavor::Utc => "utc date string",
        DateFlavor::Naive => "naive date string",
    }
}
