//! # engine_ecs
//!
//! Entity lifecycle, per-type component registry, and conjunctive queries.
//!
//! - [`EntityStore`]: allocates ids and tracks which entities are live.
//! - [`ComponentRegistry`]: one store per component type plus the per-entity
//!   attached-type set that drives cascading removal.
//! - [`QueryIter`]: snapshot of the entities matched by a
//!   [`Query`](engine_component::Query).
//! - [`World`]: the three above behind one handle.

pub mod entities;
pub mod query;
pub mod registry;
pub mod world;

pub use engine_component::{Component, ComponentTypeId, EcsError, Entity, Query};
pub use entities::EntityStore;
pub use query::QueryIter;
pub use registry::ComponentRegistry;
pub use world::World;
