use std::ops;

use serde::Serialize;

use super::{fan_out, Archetypes, World};
use crate::comp::{self, AnyComponent, Component, ComponentType, Patch};
use crate::entity::{self, Entity, EntityId, Subscription};
use crate::tracer::Tracer;
use crate::Result;

/// Mutable access to an entity owned by a [`World`].
///
/// Every mutation is forwarded to all archetypes of the world before the call returns.
/// Read-only access to the entity is available through [`Deref`](ops::Deref).
pub struct EntityMut<'t> {
    world: &'t mut World,
    index: usize,
}

type Split<'t> = (&'t mut Entity, &'t mut Archetypes, &'t dyn Tracer);

impl<'t> EntityMut<'t> {
    pub(super) fn new(world: &'t mut World, index: usize) -> Self { Self { world, index } }

    fn split(&mut self) -> Split<'_> {
        let World { entities, archetypes, tracer, .. } = &mut *self.world;
        let (_, entity) =
            entities.get_index_mut(self.index).expect("EntityMut points to a live entity");
        (entity, archetypes, &**tracer)
    }

    /// Attaches a component. See [`Entity::add_component`].
    pub fn add_component<C: Component>(&mut self, component: C) -> Result<()> {
        self.add_boxed(Box::new(component))
    }

    /// Attaches a type-erased component. See [`Entity::add_boxed`].
    pub fn add_boxed(&mut self, component: Box<dyn AnyComponent>) -> Result<()> {
        let ty = component.component_type();
        let (entity, archetypes, tracer) = self.split();
        entity.add_boxed(component)?;

        let entity = &*entity;
        let component = entity.get_component(ty).expect("component was just added");
        tracer.component_added(entity.id(), component);
        fan_out(archetypes, tracer, entity, Some(component));
        Ok(())
    }

    /// Detaches a component. See [`Entity::remove_component`].
    pub fn remove_component(&mut self, ty: ComponentType) -> Option<Box<dyn AnyComponent>> {
        let (entity, archetypes, tracer) = self.split();
        let component = entity.remove_component(ty)?;

        tracer.component_removed(entity.id(), &*component);
        fan_out(archetypes, tracer, entity, Some(&*component));
        Some(component)
    }

    /// Detaches the component of kind `C`, returning it. See [`Entity::remove`].
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        if !self.holds::<C>() {
            return None;
        }
        let component = self.remove_component(C::TYPE)?;
        Some(*component.downcast::<C>().expect("kind was checked"))
    }

    /// Attaches or detaches a default `C`. See [`Entity::toggle_component`].
    pub fn toggle_component<C: Component + Default>(&mut self, predicate: bool) {
        if predicate {
            if !self.has::<C>() {
                self.add_component(C::default()).expect("absence was checked");
            }
        } else {
            self.remove_component(C::TYPE);
        }
    }

    /// Attaches a batch of components in order. See [`Entity::renew`].
    ///
    /// Archetypes are notified after each component.
    pub fn renew(&mut self, components: comp::Batch) -> Result<()> {
        self.check_batch(&components)?;
        for component in components {
            self.add_boxed(component).expect("batch was checked for duplicates");
        }
        Ok(())
    }

    /// Detaches every component, most recently attached first,
    /// and moves the entity to a fresh ID.
    ///
    /// Archetypes are notified after each removal.
    /// The old ID then leaves every archetype and is no longer valid in the world;
    /// the emptied entity is evaluated again under the new ID.
    /// Listeners on the entity are dropped.
    pub fn reset(&mut self) -> EntityId {
        while let Some(ty) = self.last_component_type() {
            self.remove_component(ty);
        }

        let World { ealloc, entities, archetypes, tracer, .. } = &mut *self.world;
        let (old_id, mut entity) =
            entities.swap_remove_index(self.index).expect("EntityMut points to a live entity");

        for archetype in archetypes.values_mut() {
            if archetype.handle_entity_remove(&entity, None) {
                tracer.membership_lost(archetype.id(), old_id);
            }
        }

        let new_id = ealloc.allocate();
        entity.reassign(new_id);
        tracer.entity_reset(old_id, new_id);

        let (index, _) = entities.insert_full(new_id, entity);
        self.index = index;
        let (_, entity) = entities.get_index(index).expect("entity was just inserted");
        fan_out(archetypes, &**tracer, entity, None);
        new_id
    }

    /// Writes the value of a component. See [`Entity::set_component_value`].
    ///
    /// Archetypes are notified afterwards,
    /// so custom filters reading the value are re-evaluated.
    pub fn set_component_value<C: Patch, V: Serialize>(&mut self, value: V) -> Result<()> {
        let (entity, archetypes, tracer) = self.split();
        entity.set_component_value::<C, V>(value)?;
        notify_modified(entity, archetypes, tracer, C::TYPE);
        Ok(())
    }

    /// Mutates the component of kind `C` in place.
    ///
    /// Fails with [`Error::MissingComponent`](crate::Error::MissingComponent)
    /// if no `C` is attached.
    /// Archetypes are notified afterwards,
    /// so custom filters reading the value are re-evaluated.
    pub fn modify<C: Component, R>(&mut self, f: impl FnOnce(&mut C) -> R) -> Result<R> {
        let (entity, archetypes, tracer) = self.split();
        let ret = f(entity.get_component_value_mut::<C>()?);
        notify_modified(entity, archetypes, tracer, C::TYPE);
        Ok(ret)
    }

    /// Re-evaluates every archetype against this entity.
    pub fn refresh(&mut self) {
        let (entity, archetypes, tracer) = self.split();
        fan_out(archetypes, tracer, entity, None);
    }

    /// Registers a listener for every add and remove on this entity.
    pub fn on_change(&mut self, listener: impl FnMut(&entity::Change<'_>) + 'static) -> Subscription {
        self.split().0.on_change(listener)
    }

    /// Deregisters a listener on this entity.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.split().0.unsubscribe(subscription)
    }
}

fn notify_modified(
    entity: &Entity,
    archetypes: &mut Archetypes,
    tracer: &dyn Tracer,
    ty: ComponentType,
) {
    tracer.component_modified(entity.id(), ty);
    fan_out(archetypes, tracer, entity, entity.get_component(ty));
}

impl<'t> ops::Deref for EntityMut<'t> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        let (_, entity) =
            self.world.entities.get_index(self.index).expect("EntityMut points to a live entity");
        entity
    }
}
