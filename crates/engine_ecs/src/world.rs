//! [`World`]: entity liveness, component storage, and queries behind one
//! handle.
//!
//! A world belongs to the simulation and moves with it onto the loop
//! thread. It is never shared between threads.

use engine_component::{Component, EcsError, Entity, Query};

use crate::entities::EntityStore;
use crate::query::QueryIter;
use crate::registry::ComponentRegistry;

/// Entities plus their components.
///
/// Every method validates liveness against the entity store before touching
/// the registry.
#[derive(Debug, Default)]
pub struct World {
    /// Live set and id allocator.
    entities: EntityStore,
    /// Per-type stores and the per-entity attached-type record.
    components: ComponentRegistry,
}

impl World {
    /// Create an empty world. The first entity gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityStore::new(),
            components: ComponentRegistry::new(),
        }
    }

    // -- Entity lifecycle --

    /// Create a new entity with no components.
    pub fn create(&mut self) -> Result<Entity, EcsError> {
        self.entities.create()
    }

    /// Check if an entity is live.
    pub fn exists(&self, entity: Entity) -> bool {
        self.entities.exists(entity)
    }

    /// Destroy an entity, removing all its components.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.entities.destroy(entity, &mut self.components)
    }

    /// Return the count of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Destroy every entity and drop every component store. Ids keep
    /// counting up from where they were.
    pub fn clear(&mut self) {
        self.entities.clear(&mut self.components);
    }

    // -- Component operations --

    /// Attach a component, replacing any existing one of the same type.
    pub fn attach<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<Option<T>, EcsError> {
        self.components.attach(&self.entities, entity, component)
    }

    /// Borrow the `T` attached to a live entity.
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.components.get(&self.entities, entity)
    }

    /// Mutably borrow the `T` attached to a live entity.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.components.get_mut(&self.entities, entity)
    }

    /// Check if a live entity holds a `T`. Never fails.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.components.has::<T>(&self.entities, entity)
    }

    /// Remove a component. Returns `None` if it was not attached.
    pub fn detach<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.components.detach(entity)
    }

    /// Iterate over every `(entity, &T)` pair.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter::<T>()
    }

    // -- Query --

    /// Entities holding every component type named by `query`.
    pub fn query(&self, query: &Query) -> QueryIter {
        self.components.query(&self.entities, query)
    }

    /// Read-only access to the entity store.
    pub fn entity_store(&self) -> &EntityStore {
        &self.entities
    }

    /// Read-only access to the component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.components
    }
}
