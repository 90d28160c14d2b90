//! Error types returned by fallible entity, archetype and world operations.
//!
//! Absence on read-only queries (`has_component`, `get_component`, `remove_component`)
//! is not an error; those methods return `bool` or `Option` instead.

use crate::archetype::ArchetypeId;
use crate::comp::ComponentType;
use crate::entity::EntityId;

/// Errors raised by this crate.
///
/// None of these are recovered internally.
/// An operation that returns an error has not modified any state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A component was added to an entity that already has one of the same type.
    #[error("entity {entity} already contains component of type {ty}")]
    DuplicateComponent {
        /// The entity that rejected the component.
        entity: EntityId,
        /// The type of the rejected component.
        ty:     ComponentType,
    },

    /// A batch of components contains two components of the same type.
    #[error("batch contains more than one component of type {ty}")]
    DuplicateInBatch {
        /// The repeated component type.
        ty: ComponentType,
    },

    /// A strict accessor was used on a component type the entity does not have.
    #[error("entity {entity} does not contain component of type {ty}")]
    MissingComponent {
        /// The queried entity.
        entity: EntityId,
        /// The missing component type.
        ty:     ComponentType,
    },

    /// A value passed to `set_component_value` cannot be converted into the component.
    #[error("cannot set value of component {ty} on entity {entity}: {source}")]
    Value {
        /// The entity whose component was being written.
        entity: EntityId,
        /// The component type being written.
        ty:     ComponentType,
        /// The conversion failure.
        #[source]
        source: serde_json::Error,
    },

    /// The entity is not owned by this world.
    #[error("entity {0} does not exist in this world")]
    UnknownEntity(EntityId),

    /// No archetype is registered under this ID.
    #[error("archetype {0} is not registered")]
    UnknownArchetype(ArchetypeId),

    /// An archetype is already registered under this ID.
    #[error("archetype {0} is already registered")]
    DuplicateArchetype(ArchetypeId),
}

/// Shorthand for results with this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
