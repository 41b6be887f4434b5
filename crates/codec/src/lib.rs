//! Hydration and dehydration for wirestate
//!
//! This crate moves component state across the request boundary:
//! - ValueCodec: per-property encode/decode driven by the metadata sidecar
//! - WireState: the `{data, dataMeta}` envelope
//! - Metadata: the sidecar itself, parsed permissively
//! - Resolver: entity references, batched restore, dirty-data merge
//! - WireableRegistry: constructors for custom wire types
//! - CodecConfig: date formats and null handling from `wirestate.toml`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod metadata;
pub mod resolver;
pub mod wireable;

pub use codec::{ValueCodec, WireState};
pub use config::{CodecConfig, CONFIG_FILE_NAME};
pub use metadata::{Category, Metadata};
pub use resolver::{
    apply_dirty_data, apply_dirty_items, restore_collection, restore_entity, serialize_collection,
    serialize_entity,
};
pub use wireable::WireableRegistry;
