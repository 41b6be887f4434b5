//! Entity reference resolver
//!
//! Turns entities into [`EntityRef`]s on the way out and back into entities
//! on the way in.
//!
//! ## Restoring
//!
//! 1. Every identified slot is fetched in a single batch; a reference with no
//!    identified slot never reaches the store.
//! 2. Results are put back in requested order. An identifier the store did
//!    not return is an [`Error::EntityResolutionFailed`].
//! 3. Unidentified slots get a fresh instance from the store's factory, at
//!    their original position.
//! 4. The recorded relations are requested through `load_missing`, so
//!    relations already loaded are not fetched again.
//!
//! ## Dirty data
//!
//! [`apply_dirty_data`] reapplies client-side edits onto a restored entity.
//! Nested maps descend into loaded relations (to-many relations by element
//! index) or into JSON attributes; anything else overwrites the leaf. An
//! `"id"` override equal to the entity's own key is the projected key coming
//! back and is not written as an attribute.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;
use wirestate_core::json::{merge_dirty, parse_index};
use wirestate_core::{
    Entity, EntityCollection, EntityId, EntityQuery, EntityRef, EntityStore, Error, RefIds,
    Relation, Result, KEY_ATTRIBUTE,
};

// =============================================================================
// Serialize
// =============================================================================

/// Reference to a single entity
///
/// An entity that was never persisted is referenced by class alone.
pub fn serialize_entity(entity: &Entity) -> EntityRef {
    match entity.key() {
        None => EntityRef::unsaved(entity.class()),
        Some(key) => EntityRef::single(
            entity.class(),
            key.clone(),
            entity.loaded_relations(),
            entity.connection().map(str::to_string),
        ),
    }
}

/// Reference to an entity collection
///
/// Unsaved members leave a `null` slot at their position. Only relations
/// loaded on every member are recorded.
///
/// # Errors
///
/// Fails when members differ in class or connection, since one reference
/// cannot describe them.
pub fn serialize_collection(property: &str, collection: &EntityCollection) -> Result<EntityRef> {
    let mut connection: Option<Option<&str>> = None;
    for entity in collection {
        if entity.class() != collection.class() {
            return Err(Error::HeterogeneousEntityCollection {
                property: property.to_string(),
                expected: collection.class().to_string(),
                found: entity.class().to_string(),
            });
        }
        match connection {
            None => connection = Some(entity.connection()),
            Some(first) if first != entity.connection() => {
                return Err(Error::MixedEntityConnections {
                    property: property.to_string(),
                    first: first.map(str::to_string),
                    second: entity.connection().map(str::to_string),
                });
            }
            Some(_) => {}
        }
    }

    Ok(EntityRef::collection(
        collection.class(),
        collection.keys(),
        collection.loaded_relations(),
        connection.flatten().map(str::to_string),
    ))
}

// =============================================================================
// Restore
// =============================================================================

/// Rebuild the entity a single reference points to
///
/// # Errors
///
/// Returns [`Error::EntityResolutionFailed`] when the store has no entity for
/// the identifier, and [`Error::InvalidWireValue`] when handed a collection
/// reference.
pub fn restore_entity<S: EntityStore + ?Sized>(store: &S, reference: &EntityRef) -> Result<Entity> {
    if let Some(RefIds::Many(ids)) = &reference.id {
        return Err(Error::invalid_wire_value(
            reference.class.as_str(),
            "single entity reference",
            format!("{} identifiers", ids.len()),
        ));
    }
    let mut restored = restore_slots(store, reference)?;
    restored
        .pop()
        .ok_or_else(|| Error::store(format!("no [{}] restored", reference.class)))
}

/// Rebuild the collection a reference points to, in recorded order
///
/// # Errors
///
/// Returns [`Error::EntityResolutionFailed`] when the store has no entity for
/// one of the identifiers.
pub fn restore_collection<S: EntityStore + ?Sized>(
    store: &S,
    reference: &EntityRef,
) -> Result<EntityCollection> {
    let entities = restore_slots(store, reference)?;
    Ok(EntityCollection::from_entities(reference.class.as_str(), entities))
}

fn restore_slots<S: EntityStore + ?Sized>(store: &S, reference: &EntityRef) -> Result<Vec<Entity>> {
    let slots = reference.ids();
    let wanted: Vec<EntityId> = slots.iter().flatten().cloned().collect();

    let mut found: BTreeMap<EntityId, Entity> = BTreeMap::new();
    if !wanted.is_empty() {
        debug!(
            target: "wirestate::resolver",
            class = %reference.class,
            ids = wanted.len(),
            slots = slots.len(),
            "Fetching referenced entities"
        );
        let fetched = store.fetch(&EntityQuery {
            class: &reference.class,
            ids: &wanted,
            relations: &reference.relations,
            connection: reference.connection(),
        })?;
        for entity in fetched {
            if let Some(key) = entity.key().cloned() {
                found.insert(key, entity);
            }
        }
    }

    let mut entities = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Some(id) => {
                let entity = found.get(&id).cloned().ok_or_else(|| Error::EntityResolutionFailed {
                    class: reference.class.clone(),
                    id: id.to_string(),
                })?;
                entities.push(entity);
            }
            None => entities.push(store.instantiate(&reference.class)),
        }
    }

    if !reference.relations.is_empty() {
        store.load_missing(&mut entities, &reference.relations, reference.connection())?;
    }
    Ok(entities)
}

// =============================================================================
// Dirty data
// =============================================================================

/// Reapply nested field overrides to an entity
///
/// Only the named fields change; siblings at every level are left alone.
///
/// ```
/// use serde_json::json;
/// use wirestate_codec::apply_dirty_data;
/// use wirestate_core::Entity;
///
/// let mut user = Entity::persisted("User", 1)
///     .with_attribute("name", "Ada")
///     .with_attribute("address", json!({"city": "London", "zip": "N1"}));
///
/// let dirty = json!({"address": {"city": "X"}});
/// apply_dirty_data(&mut user, dirty.as_object().unwrap());
///
/// assert_eq!(user.attribute("address"), Some(&json!({"city": "X", "zip": "N1"})));
/// assert_eq!(user.attribute("name"), Some(&json!("Ada")));
/// ```
pub fn apply_dirty_data(entity: &mut Entity, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        if key == KEY_ATTRIBUTE && entity.key().map(EntityId::to_json).as_ref() == Some(value) {
            continue;
        }

        let descends = value.is_object() || value.is_array();
        if descends {
            if let Some(relation) = entity.relation_mut(key) {
                if apply_to_relation(relation, key, value) {
                    continue;
                }
                // An empty to-one relation has no entity to merge into; the
                // override lands in a fresh attribute map instead.
                entity.unset_relation(key);
            }
        }

        match value {
            Value::Object(nested) => {
                let slot = entity
                    .attributes_mut()
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() && !slot.is_array() {
                    *slot = Value::Object(Map::new());
                }
                merge_dirty(slot, nested);
            }
            other => {
                entity.set_attribute(key.clone(), other.clone());
            }
        }
    }
}

/// Reapply per-element overrides to a collection
///
/// `overrides` is either an array, positionally matched, or a map keyed by
/// element index. Elements without an override, and overrides without an
/// element, are left alone.
pub fn apply_dirty_items(entities: &mut [Entity], overrides: &Value) {
    let mut apply = |index: usize, value: &Value| match (entities.get_mut(index), value) {
        (Some(entity), Value::Object(nested)) => apply_dirty_data(entity, nested),
        (None, _) => {
            debug!(target: "wirestate::resolver", index, "Ignoring override for missing element");
        }
        (Some(_), _) => {
            debug!(target: "wirestate::resolver", index, "Ignoring non-map element override");
        }
    };

    match overrides {
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                apply(index, value);
            }
        }
        Value::Object(entries) => {
            for (key, value) in entries {
                match parse_index(key) {
                    Some(index) => apply(index, value),
                    None => {
                        debug!(target: "wirestate::resolver", %key, "Ignoring non-index element override");
                    }
                }
            }
        }
        _ => {}
    }
}

/// Returns `false` when the relation is empty and the override must be kept elsewhere
fn apply_to_relation(relation: &mut Relation, name: &str, overrides: &Value) -> bool {
    match (relation, overrides) {
        (Relation::One(Some(entity)), Value::Object(nested)) => {
            apply_dirty_data(entity, nested);
            true
        }
        (Relation::Many(entities), _) => {
            apply_dirty_items(entities, overrides);
            true
        }
        (Relation::One(None), _) => {
            debug!(target: "wirestate::resolver", relation = name, "Moving override for empty relation into attributes");
            false
        }
        (Relation::One(Some(_)), _) => {
            debug!(target: "wirestate::resolver", relation = name, "Ignoring non-map override for to-one relation");
            true
        }
    }
}
