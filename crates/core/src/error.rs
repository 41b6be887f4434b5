//! Error types for wirestate
//!
//! This module defines all error types raised while crossing the
//! hydrate/dehydrate boundary.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for wirestate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for hydration and dehydration
///
/// Every variant is fatal for the request being processed. Projection never
/// produces an error; missing data there is omitted instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A public property holds a value that cannot cross the wire
    #[error("Property type not allowed: component [{component}] property [{property}] holds {value}")]
    PropertyTypeNotAllowed {
        /// Component name
        component: String,
        /// Property name
        property: String,
        /// Description of the offending value
        value: String,
    },

    /// The store returned no entity for a non-null identifier
    #[error("Entity resolution failed: no [{class}] found with id {id}")]
    EntityResolutionFailed {
        /// Entity class
        class: String,
        /// Identifier that could not be resolved
        id: String,
    },

    /// A wireable property's declared type could not be resolved to a constructor
    #[error("Unknown wireable type for component [{component}] property [{property}]: {type_name}")]
    UnknownWireableType {
        /// Component name
        component: String,
        /// Property name
        property: String,
        /// Declared type identifier, or `<undeclared>`
        type_name: String,
    },

    /// An entity collection holds members of more than one class
    #[error("Entity collection [{property}] mixes classes: expected {expected}, found {found}")]
    HeterogeneousEntityCollection {
        /// Property name
        property: String,
        /// Collection class
        expected: String,
        /// Offending member class
        found: String,
    },

    /// An entity collection holds members from more than one connection
    #[error("Entity collection [{property}] mixes connections: {first:?} and {second:?}")]
    MixedEntityConnections {
        /// Property name
        property: String,
        /// First connection seen
        first: Option<String>,
        /// Conflicting connection
        second: Option<String>,
    },

    /// A sidecar-tagged property carries a wire value of the wrong shape
    #[error("Invalid wire value for property [{property}]: expected {expected}, found {found}")]
    InvalidWireValue {
        /// Property name
        property: String,
        /// Expected shape
        expected: &'static str,
        /// Shape or content actually found
        found: String,
    },

    /// A wireable type rejected its wire value
    #[error("Wireable conversion failed for property [{property}]: {message}")]
    WireableConversion {
        /// Property name
        property: String,
        /// Reason reported by the type
        message: String,
    },

    /// Entity store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Create an invalid wire value error
    pub fn invalid_wire_value(
        property: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Error::InvalidWireValue {
            property: property.into(),
            expected,
            found: found.into(),
        }
    }

    /// Whether this error came from entity resolution
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Error::EntityResolutionFailed { .. } | Error::Store(_))
    }
}
