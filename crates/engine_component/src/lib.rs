//! # engine_component
//!
//! Building blocks shared by the ECS:
//!
//! - [`Component`] and [`ComponentTypeId`]: what can be attached and how its
//!   type is keyed.
//! - [`Entity`] and [`EntityAllocator`]: never-recycled `u64` ids.
//! - [`ComponentStore`] and [`ErasedStore`]: entity-keyed storage for one
//!   component type, plus the type-erased view the registry holds.
//! - [`Query`]: conjunctive filter over component types.
//! - [`EcsError`]: failure kinds shared by every ECS operation.

pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod storage;

pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use error::EcsError;
pub use query::{Query, Requirement};
pub use storage::{ComponentStore, ErasedStore};
