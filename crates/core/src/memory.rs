//! In-memory entity store
//!
//! Reference [`EntityStore`] backed by a map of entities per class. Each
//! stored entity keeps every relation it was inserted with; fetches hand out
//! copies with only the requested relations loaded, the way a lazy-loading
//! store would.
//!
//! Every fetch is recorded so callers can check exactly which identifiers
//! were requested.

use crate::entity::{Entity, EntityId, Relation};
use crate::error::{Error, Result};
use crate::traits::{EntityQuery, EntityStore};
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::debug;

/// One recorded fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    /// Requested class
    pub class: String,
    /// Requested identifiers, in order
    pub ids: Vec<EntityId>,
    /// Requested relations
    pub relations: Vec<String>,
    /// Requested connection
    pub connection: Option<String>,
}

/// Entity store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, BTreeMap<EntityId, Entity>>,
    fetches: RefCell<Vec<FetchRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a persisted entity, replacing any entity with the same key
    ///
    /// # Errors
    ///
    /// Returns an error if the entity has no persisted key.
    pub fn insert(&mut self, entity: Entity) -> Result<()> {
        let key = entity
            .key()
            .cloned()
            .ok_or_else(|| Error::store(format!("cannot store unsaved [{}]", entity.class())))?;
        self.tables
            .entry(entity.class().to_string())
            .or_default()
            .insert(key, entity);
        Ok(())
    }

    /// Store a persisted entity (builder form)
    ///
    /// # Errors
    ///
    /// Returns an error if the entity has no persisted key.
    pub fn with(mut self, entity: Entity) -> Result<Self> {
        self.insert(entity)?;
        Ok(self)
    }

    /// Number of stored entities of `class`
    pub fn count(&self, class: &str) -> usize {
        self.tables.get(class).map(BTreeMap::len).unwrap_or(0)
    }

    /// Every fetch made so far
    pub fn fetches(&self) -> Vec<FetchRecord> {
        self.fetches.borrow().clone()
    }

    /// Number of fetches made so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }

    fn stored(&self, class: &str, key: &EntityId) -> Option<&Entity> {
        self.tables.get(class)?.get(key)
    }
}

impl EntityStore for MemoryStore {
    fn fetch(&self, query: &EntityQuery<'_>) -> Result<Vec<Entity>> {
        debug!(target: "wirestate::store", class = query.class, ids = query.ids.len(), "Fetching entities");
        self.fetches.borrow_mut().push(FetchRecord {
            class: query.class.to_string(),
            ids: query.ids.to_vec(),
            relations: query.relations.to_vec(),
            connection: query.connection.map(str::to_string),
        });

        let found = query
            .ids
            .iter()
            .filter_map(|id| self.stored(query.class, id))
            .map(|stored| {
                let mut entity = stored.clone();
                entity.retain_relations(query.relations);
                entity
            })
            .collect();
        Ok(found)
    }

    fn load_missing(
        &self,
        entities: &mut [Entity],
        relations: &[String],
        connection: Option<&str>,
    ) -> Result<()> {
        let wanted = group_paths(relations);
        for entity in entities.iter_mut() {
            for (head, nested) in &wanted {
                if entity.relation_loaded(head) {
                    if !nested.is_empty() {
                        match entity.relation_mut(head) {
                            Some(Relation::One(Some(related))) => {
                                self.load_missing(std::slice::from_mut(&mut **related), nested, connection)?
                            }
                            Some(Relation::Many(related)) => self.load_missing(related, nested, connection)?,
                            _ => {}
                        }
                    }
                    continue;
                }

                let Some(key) = entity.key() else {
                    continue;
                };
                let Some(stored) = self.stored(entity.class(), key) else {
                    continue;
                };
                if let Some(relation) = stored.relation(head) {
                    let mut relation = relation.clone();
                    relation.retain_paths(nested);
                    debug!(target: "wirestate::store", class = entity.class(), relation = %head, "Loading missing relation");
                    entity.set_relation(head.as_str(), relation);
                }
            }
        }
        Ok(())
    }
}

/// Split dotted relation paths into first segment and remainders
fn group_paths(paths: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in paths {
        match path.split_once('.') {
            Some((head, rest)) => grouped.entry(head.to_string()).or_default().push(rest.to_string()),
            None => {
                grouped.entry(path.clone()).or_default();
            }
        }
    }
    grouped
}
