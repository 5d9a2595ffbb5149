//! Per-type component storage.
//!
//! A [`ComponentStore<T>`] maps entities to the single `T` each of them owns.
//! [`ErasedStore`] is the object-safe view the registry uses to hold stores
//! of different types side by side and to cascade removals without knowing
//! `T`.

use std::any::Any;
use std::collections::HashMap;

use crate::component::Component;
use crate::entity::Entity;

/// Storage for all components of one type, keyed by entity.
#[derive(Debug)]
pub struct ComponentStore<T: Component> {
    components: HashMap<Entity, T>,
}

impl<T: Component> ComponentStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Inserts a component for `entity`, replacing any previous one.
    ///
    /// Returns the replaced component, if any.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        self.components.insert(entity, component)
    }

    /// Removes and returns the component attached to `entity`.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.components.remove(&entity)
    }

    /// Returns `true` if `entity` has a component in this store.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(&entity)
    }

    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.components.get(&entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(&entity)
    }

    /// Iterates over every `(entity, component)` pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter().map(|(&e, c)| (e, c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased interface over a [`ComponentStore<T>`].
pub trait ErasedStore: Send {
    /// Name of the component type held by this store.
    fn type_name(&self) -> &'static str;

    /// Drops the component attached to `entity`. Returns `true` if one existed.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    fn contains(&self, entity: Entity) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entity holding a component in this store.
    fn entities(&self) -> Box<dyn Iterator<Item = Entity> + '_>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.components.remove(&entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn entities(&self) -> Box<dyn Iterator<Item = Entity> + '_> {
        Box::new(self.components.keys().copied())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
