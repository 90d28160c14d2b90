//! A reactive ECS core with incrementally maintained archetypes.
//!
//! # Entities and components
//! An [`Entity`] is an identity that owns at most one component of each [component
//! type](comp::ComponentType).
//! Component kinds are plain Rust types that implement [`comp::Component`],
//! usually through the [`#[comp]`](comp) attribute,
//! which derives the component type from the type name at compile time.
//! Components can run hooks when they are attached to or detached from an entity,
//! and entities notify their listeners after every add and remove.
//!
//! # Archetypes are live queries
//! An [`Archetype`] is a fixed conjunction of [filters](archetype::Filter)
//! together with the set of entities currently satisfying it.
//! Archetypes never rescan the world.
//! Instead, each change on an entity is forwarded to every archetype,
//! which evaluates its filters against that one entity
//! and grants or revokes membership if the result changed.
//! This makes the cost of a mutation proportional to the number of archetypes,
//! not the number of entities,
//! and reading an archetype is always a plain iteration over its members.
//!
//! # The world is the mutation gateway
//! Entities owned by a [`World`] can only be mutated through [`world::EntityMut`],
//! which performs the forwarding described above,
//! so membership can never silently go stale.
//! Custom filters that read component values stay correct
//! as long as values are written through [`world::EntityMut::modify`]
//! or [`world::EntityMut::set_component_value`].
//!
//! # Listeners
//! All notification is synchronous and happens before the mutating call returns.
//! Listeners only see shared references,
//! so they cannot mutate the world while it is notifying them.
//! See the [`listener`] module for details.
//!
//! # Example
//! ```
//! use archon::archetype::{ArchetypeId, Filter};
//! use archon::comp::Component;
//!
//! #[archon::comp]
//! #[derive(Default)]
//! struct CardComponent;
//! #[archon::comp]
//! struct PositionComponent { x: i32, y: i32 }
//!
//! const CARDS: ArchetypeId = ArchetypeId::new(0);
//!
//! let mut world = archon::World::new();
//! world.register_archetype(CARDS, [Filter::include([CardComponent::TYPE])])?;
//!
//! let id = world.create_entity(archon::comps![PositionComponent { x: 1, y: 2 }, CardComponent])?;
//! assert!(world.get_archetype(CARDS)?.has_entity(id));
//!
//! world.entity_mut(id)?.toggle_component::<CardComponent>(false);
//! assert!(world.get_archetype(CARDS)?.is_empty());
//! # Ok::<(), archon::Error>(())
//! ```

#![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(doc, warn(missing_docs))]

mod macros;
#[doc(inline)]
pub use macros::*;

pub mod tracer;

pub mod archetype;
pub use archetype::Archetype;

pub mod comp;

pub mod entity;
pub use entity::Entity;

mod error;
pub use error::{Error, Result};

pub mod listener;

pub mod world;
pub use world::World;

#[cfg(any(test, feature = "internal-bench"))]
pub mod test_util;
