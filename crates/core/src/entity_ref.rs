//! Serialized entity references
//!
//! An [`EntityRef`] stands in for one entity or an ordered collection of
//! entities while they cross the wire. It carries just enough to fetch them
//! again: class, identifier(s), loaded relation paths and connection.
//!
//! ## Shapes
//!
//! | Case | `id` |
//! |------|------|
//! | Unsaved single entity | absent |
//! | Persisted single entity | `7` |
//! | Collection | `[7, null, 9]`, `null` marking an unsaved member |
//!
//! ```
//! use wirestate_core::{EntityId, EntityRef};
//!
//! let r = EntityRef::unsaved("Post");
//! assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"class":"Post"}"#);
//!
//! let r = EntityRef::collection("Post", vec![Some(EntityId::Int(7)), None], vec![], None);
//! assert_eq!(r.ids(), vec![Some(EntityId::Int(7)), None]);
//! ```

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};

/// Identifier slot(s) of a reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefIds {
    /// A single persisted entity
    One(EntityId),
    /// A collection; `None` slots are unsaved members
    Many(Vec<Option<EntityId>>),
}

/// Wire-safe reference to one entity or a collection of entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity class
    pub class: String,
    /// Identifier(s); absent for an unsaved single entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RefIds>,
    /// Relation paths that were loaded when the reference was taken
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<String>,
    /// Connection label; absent means the store default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

impl EntityRef {
    /// Reference to an entity that has never been persisted
    pub fn unsaved(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            id: None,
            relations: Vec::new(),
            connection: None,
        }
    }

    /// Reference to one persisted entity
    pub fn single(
        class: impl Into<String>,
        id: EntityId,
        relations: Vec<String>,
        connection: Option<String>,
    ) -> Self {
        Self {
            class: class.into(),
            id: Some(RefIds::One(id)),
            relations,
            connection,
        }
    }

    /// Reference to an ordered collection
    pub fn collection(
        class: impl Into<String>,
        ids: Vec<Option<EntityId>>,
        relations: Vec<String>,
        connection: Option<String>,
    ) -> Self {
        Self {
            class: class.into(),
            id: Some(RefIds::Many(ids)),
            relations,
            connection,
        }
    }

    /// Whether this refers to a single unsaved entity
    pub fn is_unsaved(&self) -> bool {
        self.id.is_none()
    }

    /// Identifier slots in order
    ///
    /// A single reference yields one slot; an unsaved single reference yields
    /// one empty slot.
    pub fn ids(&self) -> Vec<Option<EntityId>> {
        match &self.id {
            None => vec![None],
            Some(RefIds::One(id)) => vec![Some(id.clone())],
            Some(RefIds::Many(ids)) => ids.clone(),
        }
    }

    /// Connection label, if any
    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }
}
