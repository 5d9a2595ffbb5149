//! Entity identifiers and their allocator.

use crate::error::EcsError;

/// Opaque handle naming one entity. Carries no data; components do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub u64);

impl Entity {
    /// Sentinel that no allocator ever issues.
    pub const INVALID: Entity = Entity(0);

    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out ids 1, 2, 3, ... for the life of the process.
///
/// Ids are never reused, even after the entity is destroyed. Running past
/// `u64::MAX` fails with [`EcsError::CapacityExceeded`] instead of wrapping.
#[derive(Debug)]
pub struct EntityAllocator {
    /// `None` once `u64::MAX` has been issued.
    next: Option<u64>,
    issued: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: Some(1),
            issued: 0,
        }
    }

    /// # Errors
    ///
    /// [`EcsError::CapacityExceeded`] when the id space is used up.
    pub fn allocate(&mut self) -> Result<Entity, EcsError> {
        let id = self.next.ok_or(EcsError::CapacityExceeded)?;
        self.next = id.checked_add(1);
        self.issued += 1;
        Ok(Entity(id))
    }

    /// Ids issued so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.issued
    }

    #[cfg(test)]
    pub(crate) fn starting_at(next: u64) -> Self {
        Self {
            next: Some(next),
            issued: 0,
        }
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
