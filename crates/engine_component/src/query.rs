//! Query descriptors.
//!
//! A [`Query`] names the component types an entity must hold to be matched.
//! The list is a conjunction: order does not change the result, only the
//! order in which stores are consulted.
//!
//! Terms added with [`Query::with`] also carry the Rust type's declared name,
//! so a store that another type registered under the same id never matches.
//! Terms added by id alone match whatever store owns that id.

use crate::component::{Component, ComponentTypeId};

/// One required component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub type_id: ComponentTypeId,
    /// Declared name the store must report, or `None` for an id-only term.
    pub type_name: Option<&'static str>,
}

/// A conjunctive filter over component types.
///
/// An empty query matches every live entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    required: Vec<Requirement>,
}

impl Query {
    /// Create a new empty query.
    #[must_use]
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
        }
    }

    /// Build a query from an explicit list of type ids.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ComponentTypeId>) -> Self {
        ids.into_iter().fold(Self::new(), Self::with_id)
    }

    /// Require component type `T`.
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.push(Requirement {
            type_id: T::component_type_id(),
            type_name: Some(T::type_name()),
        })
    }

    /// Require whatever component type owns `type_id`.
    ///
    /// Listing a type twice has no effect on the result.
    #[must_use]
    pub fn with_id(self, type_id: ComponentTypeId) -> Self {
        self.push(Requirement {
            type_id,
            type_name: None,
        })
    }

    /// The required component types, in the order they were added.
    #[must_use]
    pub fn required(&self) -> &[Requirement] {
        &self.required
    }

    /// Ids of the required component types, in the order they were added.
    pub fn type_ids(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.required.iter().map(|term| term.type_id)
    }

    fn push(mut self, term: Requirement) -> Self {
        if !self.required.contains(&term) {
            self.required.push(term);
        }
        self
    }

    /// Returns `true` if this query matches every live entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}
