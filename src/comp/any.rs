//! Utilities for dynamic dispatch related to components.

use std::any::{self, Any};
use std::fmt;

use super::{Component, ComponentType};
use crate::entity::EntityId;

/// An object-safe view of a [`Component`].
///
/// This trait is implemented for every [`Component`] and should not be implemented manually.
pub trait AnyComponent: Any {
    /// The component type of the underlying kind.
    fn component_type(&self) -> ComponentType;

    /// The Rust type name of the underlying kind, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Invokes [`Component::on_attach`].
    fn attach(&mut self, entity: EntityId);

    /// Invokes [`Component::on_detach`].
    fn detach(&mut self, entity: EntityId);

    /// Upcasts to [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcasts to [`Any`].
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<C: Component> AnyComponent for C {
    fn component_type(&self) -> ComponentType { C::TYPE }

    fn type_name(&self) -> &'static str { any::type_name::<C>() }

    fn attach(&mut self, entity: EntityId) { self.on_attach(entity) }

    fn detach(&mut self, entity: EntityId) { self.on_detach(entity) }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn into_any(self: Box<Self>) -> Box<dyn Any> { self }
}

impl dyn AnyComponent {
    /// Returns whether the underlying kind is `C`.
    pub fn is<C: Component>(&self) -> bool { self.as_any().is::<C>() }

    /// Downcasts to a concrete component kind.
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> { self.as_any().downcast_ref() }

    /// Downcasts to a concrete component kind.
    pub fn downcast_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.as_any_mut().downcast_mut()
    }

    /// Downcasts an owned component, returning it unchanged if the kind is not `C`.
    pub fn downcast<C: Component>(self: Box<Self>) -> Result<Box<C>, Box<Self>> {
        if self.is::<C>() {
            Ok(self.into_any().downcast().expect("TypeId mismatch"))
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AnyComponent")
            .field("type", &self.component_type())
            .field("kind", &self.type_name())
            .finish()
    }
}
