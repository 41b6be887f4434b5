//! Entity model
//!
//! Persisted domain objects as the codec sees them: a class name, an optional
//! persisted identity, a bag of JSON attributes, and loaded relations.
//!
//! ## Identity
//!
//! An entity with `key() == None` has never been persisted. It cannot be
//! fetched, so references to it carry only the class name and hydration
//! builds a fresh instance instead.
//!
//! ## Array form
//!
//! [`Entity::to_array`] is the JSON view that projection rules are applied
//! to: the key under `"id"`, then attributes, then each loaded relation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute name the persisted key appears under in the array form
pub const KEY_ATTRIBUTE: &str = "id";

// ============================================================================
// EntityId
// ============================================================================

/// Persisted identifier of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer key
    Int(i64),
    /// String key (UUIDs, slugs, ...)
    Str(String),
}

impl EntityId {
    /// JSON form of this identifier
    pub fn to_json(&self) -> Value {
        match self {
            EntityId::Int(i) => Value::from(*i),
            EntityId::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(i) => write!(f, "{}", i),
            EntityId::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(i: i64) -> Self {
        EntityId::Int(i)
    }
}

impl From<i32> for EntityId {
    fn from(i: i32) -> Self {
        EntityId::Int(i as i64)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Str(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId::Str(s)
    }
}

// ============================================================================
// Relation
// ============================================================================

/// A loaded relation
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// To-one relation; `None` when loaded but empty
    One(Option<Box<Entity>>),
    /// To-many relation
    Many(Vec<Entity>),
}

impl Relation {
    /// JSON form used by the entity's array view
    pub fn to_array(&self) -> Value {
        match self {
            Relation::One(Some(entity)) => entity.to_array(),
            Relation::One(None) => Value::Null,
            Relation::Many(entities) => Value::Array(entities.iter().map(Entity::to_array).collect()),
        }
    }

    /// Loaded relation paths below this relation
    ///
    /// For a to-many relation only paths loaded on every member count.
    fn nested_paths(&self) -> Vec<String> {
        match self {
            Relation::One(Some(entity)) => entity.loaded_relations(),
            Relation::One(None) => Vec::new(),
            Relation::Many(entities) => common_relations(entities),
        }
    }

    pub(crate) fn retain_paths(&mut self, paths: &[String]) {
        match self {
            Relation::One(Some(entity)) => entity.retain_relations(paths),
            Relation::One(None) => {}
            Relation::Many(entities) => {
                for entity in entities {
                    entity.retain_relations(paths);
                }
            }
        }
    }
}

/// Relation paths loaded on every entity of the slice
pub(crate) fn common_relations(entities: &[Entity]) -> Vec<String> {
    let mut iter = entities.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut common = first.loaded_relations();
    for entity in iter {
        let paths = entity.loaded_relations();
        common.retain(|p| paths.contains(p));
    }
    common
}

// ============================================================================
// Entity
// ============================================================================

/// A domain object backed by the entity store
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    class: String,
    key: Option<EntityId>,
    attributes: Map<String, Value>,
    relations: BTreeMap<String, Relation>,
    connection: Option<String>,
}

impl Entity {
    /// A fresh, never-persisted entity
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            key: None,
            attributes: Map::new(),
            relations: BTreeMap::new(),
            connection: None,
        }
    }

    /// A persisted entity with the given key
    pub fn persisted(class: impl Into<String>, key: impl Into<EntityId>) -> Self {
        let mut entity = Self::new(class);
        entity.key = Some(key.into());
        entity
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Set an attribute (builder form)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the connection label (builder form)
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    /// Attach a loaded to-one relation (builder form)
    pub fn with_one(mut self, name: impl Into<String>, related: Option<Entity>) -> Self {
        self.relations
            .insert(name.into(), Relation::One(related.map(Box::new)));
        self
    }

    /// Attach a loaded to-many relation (builder form)
    pub fn with_many(mut self, name: impl Into<String>, related: Vec<Entity>) -> Self {
        self.relations.insert(name.into(), Relation::Many(related));
        self
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Entity class name
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Persisted key, if any
    pub fn key(&self) -> Option<&EntityId> {
        self.key.as_ref()
    }

    /// Whether this entity has a persisted identity
    pub fn is_persisted(&self) -> bool {
        self.key.is_some()
    }

    /// Connection label; `None` is the store default
    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Get an attribute
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(name.into(), value)
    }

    /// All attributes
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// All attributes, mutably
    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Get a loaded relation
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Get a loaded relation, mutably
    pub fn relation_mut(&mut self, name: &str) -> Option<&mut Relation> {
        self.relations.get_mut(name)
    }

    /// Set a loaded relation
    pub fn set_relation(&mut self, name: impl Into<String>, relation: Relation) {
        self.relations.insert(name.into(), relation);
    }

    /// Unload a relation
    pub fn unset_relation(&mut self, name: &str) -> Option<Relation> {
        self.relations.remove(name)
    }

    /// Whether a relation is loaded
    pub fn relation_loaded(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Every loaded relation path, nested paths dotted
    ///
    /// ```
    /// use wirestate_core::Entity;
    ///
    /// let author = Entity::persisted("User", 7);
    /// let comment = Entity::persisted("Comment", 1).with_one("author", Some(author));
    /// let post = Entity::persisted("Post", 3).with_many("comments", vec![comment]);
    ///
    /// assert_eq!(post.loaded_relations(), vec!["comments", "comments.author"]);
    /// ```
    pub fn loaded_relations(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, relation) in &self.relations {
            paths.push(name.clone());
            for nested in relation.nested_paths() {
                paths.push(format!("{}.{}", name, nested));
            }
        }
        paths
    }

    /// Keep only the relations named by `paths`, recursively
    ///
    /// `"comments"` keeps the `comments` relation but unloads everything below
    /// it; `"comments.author"` also keeps each comment's `author`.
    pub fn retain_relations(&mut self, paths: &[String]) {
        let mut wanted: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for path in paths {
            match path.split_once('.') {
                Some((head, rest)) => wanted.entry(head).or_default().push(rest.to_string()),
                None => {
                    wanted.entry(path.as_str()).or_default();
                }
            }
        }

        self.relations.retain(|name, _| wanted.contains_key(name.as_str()));
        for (name, relation) in self.relations.iter_mut() {
            if let Some(nested) = wanted.get(name.as_str()) {
                relation.retain_paths(nested);
            }
        }
    }

    // =========================================================================
    // Array form
    // =========================================================================

    /// JSON view of this entity: key, attributes, then loaded relations
    pub fn to_array(&self) -> Value {
        let mut out = Map::new();
        if let Some(key) = &self.key {
            out.insert(KEY_ATTRIBUTE.to_string(), key.to_json());
        }
        for (name, value) in &self.attributes {
            out.insert(name.clone(), value.clone());
        }
        for (name, relation) in &self.relations {
            out.insert(name.clone(), relation.to_array());
        }
        Value::Object(out)
    }
}

// ============================================================================
// EntityCollection
// ============================================================================

/// Ordered, homogeneous collection of entities
///
/// The collection carries its class so that an empty collection can still be
/// described and rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCollection {
    class: String,
    items: Vec<Entity>,
}

impl EntityCollection {
    /// An empty collection of `class`
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            items: Vec::new(),
        }
    }

    /// A collection of `class` holding `items`
    pub fn from_entities(class: impl Into<String>, items: Vec<Entity>) -> Self {
        Self {
            class: class.into(),
            items,
        }
    }

    /// Collection class
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Append an entity
    pub fn push(&mut self, entity: Entity) {
        self.items.push(entity);
    }

    /// Insert an entity at `index`, shifting later entries
    ///
    /// An index past the end appends.
    pub fn insert(&mut self, index: usize, entity: Entity) {
        let index = index.min(self.items.len());
        self.items.insert(index, entity);
    }

    /// Get an entity by position
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    /// Get an entity by position, mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.items.get_mut(index)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over entities
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.items.iter()
    }

    /// Entities as a slice
    pub fn as_slice(&self) -> &[Entity] {
        &self.items
    }

    /// Entities as a mutable slice
    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.items
    }

    /// Consume into the entity vector
    pub fn into_entities(self) -> Vec<Entity> {
        self.items
    }

    /// Persisted keys, one slot per entity
    pub fn keys(&self) -> Vec<Option<EntityId>> {
        self.items.iter().map(|e| e.key().cloned()).collect()
    }

    /// Relation paths loaded on every member
    pub fn loaded_relations(&self) -> Vec<String> {
        common_relations(&self.items)
    }

    /// JSON view: an array of member array forms
    pub fn to_array(&self) -> Value {
        Value::Array(self.items.iter().map(Entity::to_array).collect())
    }
}

impl<'a> IntoIterator for &'a EntityCollection {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
