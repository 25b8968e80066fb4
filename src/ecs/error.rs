use thiserror::Error;

use super::Entity;

/// Failures reported by [`Registry`](super::Registry) operations.
///
/// Every operation checks its inputs before touching storage, so an error
/// always leaves the registry exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    /// The id was never issued by this registry (at or beyond `next_id`).
    #[error("{entity} was not created by this registry (next id is {next_id})")]
    InvalidEntity { entity: Entity, next_id: u64 },
    #[error("{0} does not exist in this registry")]
    UnknownEntity(Entity),
    #[error("no component of type `{0}` has been registered")]
    UnknownComponentType(&'static str),
    #[error("{entity} already carries a `{component}` component")]
    DuplicateComponent {
        entity: Entity,
        component: &'static str,
    },
}
