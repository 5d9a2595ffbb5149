//! Entity identity and liveness.

use std::collections::BTreeSet;

use engine_component::{EcsError, Entity, EntityAllocator};
use tracing::debug;

use crate::registry::ComponentRegistry;

/// Tracks which entities are live.
///
/// Ids come from an [`EntityAllocator`] and are never reissued, so a stale
/// [`Entity`] can only ever refer to a dead entity, never to a newer one.
#[derive(Debug, Default)]
pub struct EntityStore {
    allocator: EntityAllocator,
    live: BTreeSet<Entity>,
}

impl EntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            live: BTreeSet::new(),
        }
    }

    /// Allocates a new live entity with no components.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if the id space is exhausted.
    pub fn create(&mut self) -> Result<Entity, EcsError> {
        let entity = self.allocator.allocate()?;
        self.live.insert(entity);
        Ok(entity)
    }

    /// Returns `true` if `entity` is live.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.live.contains(&entity)
    }

    /// Destroys `entity`, detaching every component it holds first.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if `entity` is not live.
    pub fn destroy(
        &mut self,
        entity: Entity,
        registry: &mut ComponentRegistry,
    ) -> Result<(), EcsError> {
        if !self.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        let detached = registry.detach_all(entity);
        self.live.remove(&entity);
        debug!(%entity, detached, "entity destroyed");
        Ok(())
    }

    /// Destroys every live entity and drops every component store.
    ///
    /// The allocator is left as is: ids handed out after a clear are still
    /// larger than any issued before it.
    pub fn clear(&mut self, registry: &mut ComponentRegistry) {
        let destroyed = self.live.len();
        self.live.clear();
        registry.clear();
        debug!(destroyed, "entities cleared");
    }

    /// Live entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.iter().copied()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of ids handed out since creation, live or not.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.allocator.count()
    }
}
