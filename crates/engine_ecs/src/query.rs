//! Query evaluation.
//!
//! Matching entities are collected eagerly into a snapshot, so the returned
//! [`QueryIter`] stays valid while the caller mutates the world it came from.

use engine_component::{Entity, ErasedStore, Query, Requirement};

use crate::entities::EntityStore;
use crate::registry::ComponentRegistry;

/// Snapshot of the entities matched by a [`Query`], in ascending id order.
#[derive(Debug, Clone)]
pub struct QueryIter {
    matched: std::vec::IntoIter<Entity>,
}

impl QueryIter {
    fn empty() -> Self {
        Self {
            matched: Vec::new().into_iter(),
        }
    }
}

impl Iterator for QueryIter {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        self.matched.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.matched.size_hint()
    }
}

impl ExactSizeIterator for QueryIter {}

impl DoubleEndedIterator for QueryIter {
    fn next_back(&mut self) -> Option<Entity> {
        self.matched.next_back()
    }
}

impl ComponentRegistry {
    /// Evaluates `query` against the live entities in `entities`.
    ///
    /// An empty query yields every live entity. A query naming a type that
    /// has never been attached to anything yields nothing, and so does a typed
    /// term whose id is owned by a differently named store.
    #[must_use]
    pub fn query(&self, entities: &EntityStore, query: &Query) -> QueryIter {
        if query.is_empty() {
            return QueryIter {
                matched: entities.iter().collect::<Vec<_>>().into_iter(),
            };
        }

        let Some(mut stores) = query
            .required()
            .iter()
            .map(|term| self.erased_for(term))
            .collect::<Option<Vec<&dyn ErasedStore>>>()
        else {
            return QueryIter::empty();
        };

        // Drive from the smallest store, look up the rest.
        stores.sort_by_key(|store| store.len());
        let (driver, others) = stores.split_at(1);
        let mut matched: Vec<Entity> = driver[0]
            .entities()
            .filter(|&entity| entities.exists(entity))
            .filter(|&entity| others.iter().all(|store| store.contains(entity)))
            .collect();
        matched.sort_unstable();

        QueryIter {
            matched: matched.into_iter(),
        }
    }

    fn erased_for(&self, term: &Requirement) -> Option<&dyn ErasedStore> {
        self.erased(term.type_id)
            .filter(|store| term.type_name.is_none_or(|name| name == store.type_name()))
    }
}
