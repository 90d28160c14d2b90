//! A component is a small data structure that can be attached to an entity.
//!
//! An entity holds at most one component of each [`ComponentType`].
//! The component type is a compile-time constant declared on the component kind,
//! usually derived by the [`#[comp]`](crate::comp) attribute from the type name:
//! a trailing `Component` is stripped and the first letter is lowercased,
//! so `BorderRadiusComponent` has the type `"borderRadius"`.
//!
//! # Lifecycle
//! [`Component::on_attach`] runs once when the component is added to an entity,
//! before any change listener is notified.
//! [`Component::on_detach`] runs once when it is removed,
//! again before listeners are notified.
//! A component is owned by at most one entity at a time,
//! so detach is only ever called after a matching attach.

use std::collections::HashSet;
use std::fmt;

use crate::entity::EntityId;

/// Identifies a component kind.
///
/// This is the key of an entity's component set
/// and the vocabulary of [archetype filters](crate::archetype::Filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentType(&'static str);

impl ComponentType {
    /// Declares a component type.
    ///
    /// # Panics
    /// Panics (at compile time when used in a constant) if `name` is empty.
    pub const fn new(name: &'static str) -> Self {
        assert!(!name.is_empty(), "component type name must not be empty");
        Self(name)
    }

    /// Returns the component type of `C`.
    pub fn of<C: Component>() -> Self { C::TYPE }

    /// Returns the name of this component type.
    pub const fn name(self) -> &'static str { self.0 }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.0) }
}

/// A component kind.
///
/// Use the [`#[comp]`](crate::comp) attribute to implement this trait
/// unless the type name cannot express the desired component type.
pub trait Component: 'static {
    /// The component type of this kind.
    ///
    /// Two kinds must never share the same component type.
    const TYPE: ComponentType;

    /// Called after the component is stored in `entity`
    /// and before change listeners are notified.
    fn on_attach(&mut self, _entity: EntityId) {}

    /// Called after the component is taken out of `entity`
    /// and before change listeners are notified.
    fn on_detach(&mut self, _entity: EntityId) {}
}

mod any;
pub use any::AnyComponent;

pub mod patch;
pub use patch::Patch;

/// An ordered batch of components, usually built with [`comps!`](crate::comps).
pub type Batch = Vec<Box<dyn AnyComponent>>;

/// Finds a component type that occurs more than once in `components`.
pub(crate) fn find_duplicate(components: &[Box<dyn AnyComponent>]) -> Option<ComponentType> {
    let mut seen = HashSet::with_capacity(components.len());
    components.iter().map(|component| component.component_type()).find(|&ty| !seen.insert(ty))
}
