//! The world owns all entities and archetypes.
//!
//! Every component mutation on an entity owned by a world goes through [`EntityMut`],
//! which forwards the change to every registered archetype
//! so that archetype membership is always current when the mutating call returns.
//! Mutating an entity without the world knowing is not possible through the public API.

use indexmap::IndexMap;

use crate::archetype::{Archetype, ArchetypeId, ChangeKind, Filter};
use crate::comp::{self, AnyComponent};
use crate::entity::{Ealloc, Entity, EntityId};
use crate::tracer::Tracer;
use crate::{Error, Result};

mod builder;
pub use builder::Builder;

mod entity_mut;
pub use entity_mut::EntityMut;

type Archetypes = IndexMap<ArchetypeId, Archetype>;

/// The registry of entities and archetypes.
pub struct World {
    ealloc:        Ealloc,
    entities:      IndexMap<EntityId, Entity>,
    archetypes:    Archetypes,
    /// Retired entity shells, most recently retired last.
    pool:          Vec<Entity>,
    pool_capacity: usize,
    tracer:        Box<dyn Tracer>,
}

impl Default for World {
    fn default() -> Self { Builder::default().build() }
}

impl World {
    /// Creates an empty world with the default configuration.
    pub fn new() -> Self { Self::default() }

    /// Starts configuring a world.
    pub fn builder() -> Builder { Builder::default() }

    /// Registers an archetype.
    ///
    /// Entities already in the world are evaluated once,
    /// so the archetype starts with all matching entities as members.
    /// Listeners added through the returned reference are only notified of later changes.
    ///
    /// Fails with [`Error::DuplicateArchetype`] if the ID is taken.
    pub fn register_archetype(
        &mut self,
        id: impl Into<ArchetypeId>,
        filters: impl IntoIterator<Item = Filter>,
    ) -> Result<&mut Archetype> {
        let id = id.into();
        let archetype = match self.archetypes.entry(id) {
            indexmap::map::Entry::Occupied(_) => return Err(Error::DuplicateArchetype(id)),
            indexmap::map::Entry::Vacant(entry) => entry.insert(Archetype::new(id, filters)),
        };

        for entity in self.entities.values() {
            if archetype.handle_entity_add(entity, None) {
                self.tracer.membership_gained(id, entity.id());
            }
        }

        log::debug!("Registered archetype {} with {} entities", id, archetype.len());
        self.tracer.archetype_registered(id, archetype.len());
        Ok(archetype)
    }

    /// Unregisters an archetype, dropping its listeners.
    pub fn unregister_archetype(&mut self, id: impl Into<ArchetypeId>) -> Result<()> {
        let id = id.into();
        self.archetypes.shift_remove(&id).ok_or(Error::UnknownArchetype(id))?;

        log::debug!("Unregistered archetype {}", id);
        self.tracer.archetype_unregistered(id);
        Ok(())
    }

    /// Gets a registered archetype.
    pub fn get_archetype(&self, id: impl Into<ArchetypeId>) -> Result<&Archetype> {
        let id = id.into();
        self.archetypes.get(&id).ok_or(Error::UnknownArchetype(id))
    }

    /// Gets a registered archetype mutably, e.g. to register listeners.
    ///
    /// Calling [`Archetype::handle_entity_add`] or [`Archetype::handle_entity_remove`]
    /// on a world-owned archetype directly may break its membership.
    pub fn archetype_mut(&mut self, id: impl Into<ArchetypeId>) -> Result<&mut Archetype> {
        let id = id.into();
        self.archetypes.get_mut(&id).ok_or(Error::UnknownArchetype(id))
    }

    /// All registered archetypes, in registration order.
    pub fn archetypes(&self) -> impl ExactSizeIterator<Item = &Archetype> + '_ {
        self.archetypes.values()
    }

    /// Creates an entity with the given components, attached in order.
    ///
    /// Archetypes evaluate the entity once, after all components are attached,
    /// so their events carry no component.
    /// Fails with [`Error::DuplicateInBatch`] without creating anything,
    /// allocating an ID or touching the pool,
    /// if the batch contains two components of the same type.
    pub fn create_entity(&mut self, components: comp::Batch) -> Result<EntityId> {
        if let Some(ty) = comp::find_duplicate(&components) {
            return Err(Error::DuplicateInBatch { ty });
        }

        let id = self.ealloc.allocate();
        let mut entity = match self.pool.pop() {
            Some(mut shell) => {
                shell.reassign(id);
                self.tracer.entity_reused(id);
                shell
            }
            None => Entity::new(id),
        };

        let count = components.len();
        for component in components {
            entity.add_boxed(component).expect("batch was checked for duplicates");
        }
        for component in entity.components() {
            self.tracer.component_added(id, component);
        }
        self.tracer.entity_created(id, count);

        let (index, _) = self.entities.insert_full(id, entity);
        let World { entities, archetypes, tracer, .. } = self;
        let (_, entity) = entities.get_index(index).expect("entity was just inserted");
        fan_out(archetypes, &**tracer, entity, None);

        Ok(id)
    }

    /// Destroys an entity.
    ///
    /// The entity leaves every archetype it belongs to first.
    /// Its components are then detached in reverse attachment order,
    /// notifying the entity listeners but not the archetypes.
    /// The emptied entity is kept for reuse if the pool is not full.
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<()> {
        let mut entity = self.entities.swap_remove(&id).ok_or(Error::UnknownEntity(id))?;

        for archetype in self.archetypes.values_mut() {
            if archetype.handle_entity_remove(&entity, None) {
                self.tracer.membership_lost(archetype.id(), id);
            }
        }

        while let Some(ty) = entity.last_component_type() {
            let component = entity.remove_component(ty).expect("type was just listed");
            self.tracer.component_removed(id, &*component);
        }

        self.tracer.entity_destroyed(id);
        self.retire(entity);
        Ok(())
    }

    fn retire(&mut self, mut entity: Entity) {
        if self.pool.len() < self.pool_capacity {
            entity.clear_listeners();
            self.pool.push(entity);
            log::trace!("Pooled entity shell, {} available", self.pool.len());
            self.tracer.entity_pooled(self.pool.len());
        }
    }

    /// Gets an entity for reading.
    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(&id).ok_or(Error::UnknownEntity(id))
    }

    /// Gets an entity for mutation.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<EntityMut<'_>> {
        let index = self.entities.get_index_of(&id).ok_or(Error::UnknownEntity(id))?;
        Ok(EntityMut::new(self, index))
    }

    /// Whether the entity is owned by this world.
    pub fn contains_entity(&self, id: EntityId) -> bool { self.entities.contains_key(&id) }

    /// All entities, in no particular order.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = &Entity> + '_ { self.entities.values() }

    /// The number of entities.
    pub fn entity_count(&self) -> usize { self.entities.len() }

    /// The number of retired entity shells available for reuse.
    pub fn pooled(&self) -> usize { self.pool.len() }

    /// Re-evaluates every archetype against the entity.
    ///
    /// Only needed if a custom filter depends on state outside the entity.
    pub fn refresh_entity(&mut self, id: EntityId) -> Result<()> {
        self.entity_mut(id)?.refresh();
        Ok(())
    }
}

/// Forwards a change of `entity` to every archetype.
fn fan_out(
    archetypes: &mut Archetypes,
    tracer: &dyn Tracer,
    entity: &Entity,
    component: Option<&dyn AnyComponent>,
) {
    for archetype in archetypes.values_mut() {
        match archetype.handle_entity_change(entity, component) {
            Some(ChangeKind::Add) => {
                log::trace!("Entity {} joined archetype {}", entity.id(), archetype.id());
                tracer.membership_gained(archetype.id(), entity.id());
            }
            Some(ChangeKind::Remove) => {
                log::trace!("Entity {} left archetype {}", entity.id(), archetype.id());
                tracer.membership_lost(archetype.id(), entity.id());
            }
            None => {}
        }
    }
}
