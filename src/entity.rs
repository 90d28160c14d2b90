//! An entity is an identity that owns at most one component of each type.
//!
//! A standalone [`Entity`] notifies its own change listeners on every add and remove.
//! Entities owned by a [`World`](crate::World) must be mutated through
//! [`World::entity_mut`](crate::World::entity_mut),
//! which also forwards each change to every registered archetype.
//!
//! # Reuse
//! [`Entity::reset`] detaches every component in reverse attachment order,
//! drops all listeners and assigns a fresh ID;
//! [`Entity::renew`] attaches a new batch.
//! Together they let an entity shell be recycled without reallocating its storage.

use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use crate::comp::{self, AnyComponent, Component, ComponentType, Patch};
pub use crate::listener::{ChangeKind, Subscription};
use crate::listener::Listeners;
use crate::{Error, Result};

pub mod ealloc;
pub use ealloc::Ealloc;

/// Identifies an entity.
///
/// IDs are allocated by an [`Ealloc`] and never reused,
/// so an entity that is reset is observed as a different entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Returns the raw ID.
    pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// A component was added to or removed from an entity.
#[derive(Debug, Clone, Copy)]
pub struct Change<'t> {
    /// Whether the component was added or removed.
    pub kind:      ChangeKind,
    /// The changed entity.
    pub entity:    EntityId,
    /// The added or removed component.
    ///
    /// For additions, the attach hook has already run.
    /// For removals, the detach hook has already run.
    pub component: &'t dyn AnyComponent,
}

/// A listener for changes on an entity.
pub type Listener = dyn FnMut(&Change<'_>);

/// A mutable bag of components.
pub struct Entity {
    id:         EntityId,
    components: IndexMap<ComponentType, Box<dyn AnyComponent>>,
    listeners:  Listeners<Listener>,
}

impl Entity {
    /// Creates an entity with no components.
    pub fn new(id: EntityId) -> Self {
        Self { id, components: IndexMap::new(), listeners: Listeners::default() }
    }

    /// Creates an entity with the given components, attached in order.
    pub fn with_components(id: EntityId, components: comp::Batch) -> Result<Self> {
        let mut entity = Self::new(id);
        entity.renew(components)?;
        Ok(entity)
    }

    /// The ID of this entity.
    pub fn id(&self) -> EntityId { self.id }

    /// The number of attached components.
    pub fn len(&self) -> usize { self.components.len() }

    /// Whether no components are attached.
    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    /// The types of the attached components, in attachment order.
    pub fn component_types(
        &self,
    ) -> impl DoubleEndedIterator<Item = ComponentType> + ExactSizeIterator + '_ {
        self.components.keys().copied()
    }

    /// The type of the most recently attached component.
    pub fn last_component_type(&self) -> Option<ComponentType> {
        self.components.keys().next_back().copied()
    }

    /// The attached components, in attachment order.
    pub fn components(&self) -> impl DoubleEndedIterator<Item = &dyn AnyComponent> + '_ {
        self.components.values().map(|component| &**component)
    }

    /// Whether a component of type `ty` is attached.
    pub fn has_component(&self, ty: ComponentType) -> bool { self.components.contains_key(&ty) }

    /// Whether a component of kind `C` is attached.
    pub fn has<C: Component>(&self) -> bool { self.has_component(C::TYPE) }

    /// Whether components of all the given types are attached.
    pub fn has_components(&self, types: impl IntoIterator<Item = ComponentType>) -> bool {
        types.into_iter().all(|ty| self.has_component(ty))
    }

    /// Attaches a component.
    ///
    /// Fails with [`Error::DuplicateComponent`] if a component of the same type is present;
    /// the present component is left untouched.
    pub fn add_component<C: Component>(&mut self, component: C) -> Result<()> {
        self.add_boxed(Box::new(component))
    }

    /// Attaches a type-erased component. See [`add_component`](Self::add_component).
    pub fn add_boxed(&mut self, component: Box<dyn AnyComponent>) -> Result<()> {
        let ty = component.component_type();
        match self.components.entry(ty) {
            Entry::Occupied(_) => return Err(Error::DuplicateComponent { entity: self.id, ty }),
            Entry::Vacant(entry) => entry.insert(component).attach(self.id),
        }

        let component = self.components.get(&ty).expect("component was just inserted");
        let change = Change { kind: ChangeKind::Add, entity: self.id, component: &**component };
        self.listeners.emit(ChangeKind::Add, |listener| listener(&change));
        Ok(())
    }

    /// Detaches the component of type `ty`, returning it.
    ///
    /// Does nothing if no such component is attached.
    pub fn remove_component(&mut self, ty: ComponentType) -> Option<Box<dyn AnyComponent>> {
        let mut component = self.components.shift_remove(&ty)?;
        component.detach(self.id);

        let change = Change { kind: ChangeKind::Remove, entity: self.id, component: &*component };
        self.listeners.emit(ChangeKind::Remove, |listener| listener(&change));
        Some(component)
    }

    /// Detaches the component of kind `C`, returning it.
    ///
    /// # Panics
    /// Panics without detaching anything
    /// if the attached component of type `C::TYPE` is of another kind.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        if !self.holds::<C>() {
            return None;
        }
        let component = self.remove_component(C::TYPE)?;
        Some(*component.downcast::<C>().expect("kind was checked"))
    }

    /// Attaches a default `C` if `predicate` holds and none is attached,
    /// or detaches any `C` if `predicate` does not hold.
    pub fn toggle_component<C: Component + Default>(&mut self, predicate: bool) {
        if predicate {
            if !self.has::<C>() {
                self.add_component(C::default()).expect("absence was checked");
            }
        } else {
            self.remove_component(C::TYPE);
        }
    }

    /// Gets the component of type `ty` if it is attached.
    pub fn get_component(&self, ty: ComponentType) -> Option<&dyn AnyComponent> {
        self.components.get(&ty).map(|component| &**component)
    }

    /// Gets the component of kind `C` if it is attached.
    pub fn get<C: Component>(&self) -> Option<&C> { self.get_component(C::TYPE)?.downcast_ref() }

    /// Gets the component of kind `C` mutably if it is attached.
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.get_mut(&C::TYPE)?.downcast_mut()
    }

    /// Gets the component of kind `C`,
    /// failing with [`Error::MissingComponent`] if it is not attached.
    pub fn get_component_value<C: Component>(&self) -> Result<&C> {
        self.get::<C>().ok_or(Error::MissingComponent { entity: self.id, ty: C::TYPE })
    }

    /// Gets the component of kind `C` mutably,
    /// failing with [`Error::MissingComponent`] if it is not attached.
    pub fn get_component_value_mut<C: Component>(&mut self) -> Result<&mut C> {
        let entity = self.id;
        self.get_mut::<C>().ok_or(Error::MissingComponent { entity, ty: C::TYPE })
    }

    /// Writes the value of the component of kind `C`.
    ///
    /// If `value` serializes to a map, only the fields named by its keys are overwritten
    /// through [`Patch::patch`] and other fields are kept.
    /// Any other value (sequences and scalars included) replaces the current value.
    ///
    /// Fails with [`Error::MissingComponent`] if no `C` is attached,
    /// or with [`Error::Value`] if the value cannot be converted into `C`
    /// or names an unknown field,
    /// in which case the current value is unchanged.
    pub fn set_component_value<C: Patch, V: Serialize>(&mut self, value: V) -> Result<()> {
        let entity = self.id;
        let value_error = |source| Error::Value { entity, ty: C::TYPE, source };

        let current = self.get_component_value_mut::<C>()?;
        match serde_json::to_value(value).map_err(value_error)? {
            serde_json::Value::Object(fields) => current.patch(fields),
            other => serde_json::from_value(other).map(|value| *current = value),
        }
        .map_err(value_error)
    }

    /// Registers a listener for every add and remove on this entity.
    pub fn on_change(&mut self, listener: impl FnMut(&Change<'_>) + 'static) -> Subscription {
        self.listeners.insert(None, Box::new(listener))
    }

    /// Deregisters a listener. Returns `false` if it was not registered on this entity.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.remove(subscription)
    }

    /// Detaches every component, most recently attached first,
    /// then drops all listeners and assigns a fresh ID from `ealloc`.
    ///
    /// Listeners are notified of each removal before they are dropped.
    pub fn reset(&mut self, ealloc: &mut Ealloc) -> EntityId {
        while let Some(ty) = self.last_component_type() {
            self.remove_component(ty);
        }
        self.reassign(ealloc.allocate());
        self.id
    }

    /// Attaches a batch of components in order.
    ///
    /// The batch is checked before anything is attached.
    /// If two components in the batch share a type, this fails with [`Error::DuplicateInBatch`];
    /// if a component duplicates a present one, it fails with [`Error::DuplicateComponent`].
    /// Either way nothing is attached.
    pub fn renew(&mut self, components: comp::Batch) -> Result<()> {
        self.check_batch(&components)?;
        for component in components {
            self.add_boxed(component).expect("batch was checked for duplicates");
        }
        Ok(())
    }

    pub(crate) fn check_batch(&self, components: &[Box<dyn AnyComponent>]) -> Result<()> {
        if let Some(ty) = comp::find_duplicate(components) {
            return Err(Error::DuplicateInBatch { ty });
        }
        let present = components
            .iter()
            .map(|component| component.component_type())
            .find(|&ty| self.has_component(ty));
        match present {
            Some(ty) => Err(Error::DuplicateComponent { entity: self.id, ty }),
            None => Ok(()),
        }
    }

    /// Whether a component of kind `C` is attached.
    ///
    /// # Panics
    /// Panics if the attached component of type `C::TYPE` is of another kind.
    pub(crate) fn holds<C: Component>(&self) -> bool {
        match self.get_component(C::TYPE) {
            Some(component) => {
                assert!(
                    component.is::<C>(),
                    "{} and {} share the component type {}",
                    component.type_name(),
                    std::any::type_name::<C>(),
                    C::TYPE,
                );
                true
            }
            None => false,
        }
    }

    /// Drops all listeners and changes the ID.
    pub(crate) fn reassign(&mut self, id: EntityId) {
        self.clear_listeners();
        self.id = id;
    }

    pub(crate) fn clear_listeners(&mut self) { self.listeners.clear() }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &format_args!("[{}]", self.components.keys().format(", ")))
            .finish()
    }
}
