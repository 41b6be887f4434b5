//! wirestate - Property hydration for stateful server-rendered components
//!
//! A component keeps its typed state between independent requests by
//! dehydrating its public properties into a tag-free JSON payload plus a
//! metadata sidecar, and hydrating them back on the next request.
//!
//! # Quick Start
//!
//! ```
//! use serde_json::json;
//! use wirestate::{DynamicComponent, Entity, MemoryStore, ValueCodec};
//!
//! let store = MemoryStore::new()
//!     .with(Entity::persisted("Post", 1).with_attribute("title", "Hello").with_attribute("draft", true))
//!     .unwrap();
//!
//! let post = Entity::persisted("Post", 1).with_attribute("title", "Hello").with_attribute("draft", true);
//! let component = DynamicComponent::new("editor")
//!     .with_property("post", post)
//!     .with_rule("post.title");
//!
//! let codec = ValueCodec::new();
//! let state = codec.dehydrate(&component).unwrap();
//! assert_eq!(state.data["post"], json!({"title": "Hello"}));
//!
//! let mut restored = component.blank();
//! codec.hydrate(&mut restored, &state, &store).unwrap();
//! assert_eq!(restored.get("post").and_then(|p| p.as_entity()).map(|e| e.class()), Some("Post"));
//! ```
//!
//! # Architecture
//!
//! - `wirestate-core`: property values, entities, references, collaborator traits
//! - `wirestate-rules`: rule path compilation and shape-preserving projection
//! - `wirestate-codec`: the value codec, metadata sidecar and entity resolver

pub use wirestate_codec::*;
pub use wirestate_core::*;
pub use wirestate_rules::*;
