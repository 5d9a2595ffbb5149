//! ECS error types.

use crate::component::ComponentTypeId;
use crate::entity::Entity;

/// Errors raised by entity and component operations.
///
/// Every variant is a contract violation by the caller; none of them are
/// transient. The caller decides whether to abort the frame or skip the
/// offending entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity was never allocated or has been destroyed.
    #[error("{0} not found")]
    EntityNotFound(Entity),

    /// The entity is live but holds no component of the requested type.
    #[error("component '{component}' not found on {entity}")]
    MissingComponent {
        /// The entity that was inspected.
        entity: Entity,
        /// Name of the requested component type.
        component: &'static str,
    },

    /// The entity id space is exhausted.
    #[error("entity id space exhausted")]
    CapacityExceeded,

    /// Two different Rust types share one [`ComponentTypeId`].
    #[error(
        "component type id {type_id} is registered as '{registered}' but was accessed as '{requested}'"
    )]
    TypeMismatch {
        /// The colliding type id.
        type_id: ComponentTypeId,
        /// Name of the type the store was created for.
        registered: &'static str,
        /// Name of the type used for this access.
        requested: &'static str,
    },
}
