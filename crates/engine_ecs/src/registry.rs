//! Component registry: one store per component type, plus the per-entity
//! record of which types are attached.
//!
//! The per-entity record is what makes cascading removal cheap: destroying an
//! entity walks only the stores it actually appears in.

use std::collections::{BTreeSet, HashMap};

use engine_component::{
    Component, ComponentStore, ComponentTypeId, EcsError, Entity, ErasedStore,
};

use crate::entities::EntityStore;

/// Owns every component store, keyed by [`ComponentTypeId`].
#[derive(Default)]
pub struct ComponentRegistry {
    /// Stores are created lazily on first attach and never dropped.
    stores: HashMap<ComponentTypeId, Box<dyn ErasedStore>>,
    /// Component types currently attached to each entity.
    attached: HashMap<Entity, BTreeSet<ComponentTypeId>>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stores: HashMap::new(),
            attached: HashMap::new(),
        }
    }

    /// Attaches `component` to `entity`, replacing any component of the same
    /// type. Returns the replaced component, if any.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if `entity` is not live,
    /// [`EcsError::TypeMismatch`] if another type already owns `T`'s id.
    pub fn attach<T: Component>(
        &mut self,
        entities: &EntityStore,
        entity: Entity,
        component: T,
    ) -> Result<Option<T>, EcsError> {
        if !entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        let type_id = T::component_type_id();
        let store = self
            .stores
            .entry(type_id)
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()));
        let previous = downcast_mut::<T>(type_id, &mut **store)?.insert(entity, component);
        self.attached.entry(entity).or_default().insert(type_id);
        Ok(previous)
    }

    /// Returns the `T` attached to `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if `entity` is not live,
    /// [`EcsError::MissingComponent`] if it holds no `T`.
    pub fn get<T: Component>(&self, entities: &EntityStore, entity: Entity) -> Result<&T, EcsError> {
        if !entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        self.store::<T>()?
            .and_then(|store| store.get(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Mutable counterpart of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<T: Component>(
        &mut self,
        entities: &EntityStore,
        entity: Entity,
    ) -> Result<&mut T, EcsError> {
        if !entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        self.store_mut::<T>()?
            .and_then(|store| store.get_mut(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Returns `true` if live `entity` holds a `T`. Never fails.
    ///
    /// Agrees with [`get`](Self::get): `false` whenever another type owns
    /// `T`'s id.
    #[must_use]
    pub fn has<T: Component>(&self, entities: &EntityStore, entity: Entity) -> bool {
        entities.exists(entity)
            && self
                .store::<T>()
                .ok()
                .flatten()
                .is_some_and(|store| store.contains(entity))
    }

    /// Type-erased form of [`has`](Self::has), keyed by id alone.
    #[must_use]
    pub fn has_id(&self, entities: &EntityStore, entity: Entity, type_id: ComponentTypeId) -> bool {
        entities.exists(entity)
            && self
                .stores
                .get(&type_id)
                .is_some_and(|store| store.contains(entity))
    }

    /// Removes and returns the `T` attached to `entity`. Detaching a type that
    /// is not attached is a no-op.
    pub fn detach<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let type_id = T::component_type_id();
        let removed = self
            .stores
            .get_mut(&type_id)
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<T>>())
            .and_then(|store| store.remove(entity));
        if removed.is_some() {
            self.forget(entity, type_id);
        }
        removed
    }

    /// Type-erased form of [`detach`](Self::detach). Returns `true` if a
    /// component was removed.
    pub fn detach_id(&mut self, entity: Entity, type_id: ComponentTypeId) -> bool {
        let removed = self
            .stores
            .get_mut(&type_id)
            .is_some_and(|store| store.remove_entity(entity));
        if removed {
            self.forget(entity, type_id);
        }
        removed
    }

    /// Detaches every component attached to `entity`. Returns how many were
    /// removed.
    pub fn detach_all(&mut self, entity: Entity) -> usize {
        let Some(types) = self.attached.remove(&entity) else {
            return 0;
        };
        types
            .iter()
            .filter(|&&type_id| {
                self.stores
                    .get_mut(&type_id)
                    .is_some_and(|store| store.remove_entity(entity))
            })
            .count()
    }

    /// Drops every store and every attached-type record.
    pub fn clear(&mut self) {
        self.stores.clear();
        self.attached.clear();
    }

    /// Component types currently attached to `entity`.
    pub fn attached_types(&self, entity: Entity) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.attached.get(&entity).into_iter().flatten().copied()
    }

    /// Iterates over every `(entity, &T)` pair in the `T` store.
    ///
    /// Yields nothing if no `T` has ever been attached or if another type
    /// owns `T`'s id.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.store::<T>().ok().flatten().into_iter().flat_map(ComponentStore::iter)
    }

    /// Type-erased store for `type_id`, if any component of that type has
    /// ever been attached.
    pub(crate) fn erased(&self, type_id: ComponentTypeId) -> Option<&dyn ErasedStore> {
        self.stores.get(&type_id).map(|store| &**store)
    }

    /// Number of distinct component types with a store.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    fn store<T: Component>(&self) -> Result<Option<&ComponentStore<T>>, EcsError> {
        let type_id = T::component_type_id();
        self.stores
            .get(&type_id)
            .map(|store| {
                store
                    .as_any()
                    .downcast_ref::<ComponentStore<T>>()
                    .ok_or_else(|| mismatch::<T>(type_id, store.type_name()))
            })
            .transpose()
    }

    fn store_mut<T: Component>(&mut self) -> Result<Option<&mut ComponentStore<T>>, EcsError> {
        let type_id = T::component_type_id();
        self.stores
            .get_mut(&type_id)
            .map(|store| downcast_mut::<T>(type_id, &mut **store))
            .transpose()
    }

    fn forget(&mut self, entity: Entity, type_id: ComponentTypeId) {
        if let Some(types) = self.attached.get_mut(&entity) {
            types.remove(&type_id);
            if types.is_empty() {
                self.attached.remove(&entity);
            }
        }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("stores", &self.stores.len())
            .field("entities", &self.attached.len())
            .finish()
    }
}

fn downcast_mut<'a, T: Component>(
    type_id: ComponentTypeId,
    store: &'a mut (dyn ErasedStore + 'static),
) -> Result<&'a mut ComponentStore<T>, EcsError> {
    let registered = store.type_name();
    store
        .as_any_mut()
        .downcast_mut::<ComponentStore<T>>()
        .ok_or_else(|| mismatch::<T>(type_id, registered))
}

fn mismatch<T: Component>(type_id: ComponentTypeId, registered: &'static str) -> EcsError {
    EcsError::TypeMismatch {
        type_id,
        registered,
        requested: T::type_name(),
    }
}

fn missing<T: Component>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity,
        component: T::type_name(),
    }
}
