//! An archetype is a live subset of entities that satisfy a fixed filter.
//!
//! It is comparable to a pre-computed query.
//!
//! # Membership
//! The filters of an archetype are fixed when it is created
//! and are combined by logical AND.
//! Membership never changes by rescanning:
//! the owner of the entity calls [`Archetype::handle_entity_change`]
//! after every mutation that may affect the filters,
//! which evaluates the filters against that one entity
//! and grants or revokes membership accordingly.
//! Entities owned by a [`World`](crate::World) are routed automatically.
//!
//! # Order
//! [`Archetype::entities`] yields members in the order membership was granted.

use std::fmt;

use indexmap::IndexSet;

use crate::comp::AnyComponent;
use crate::entity::{Entity, EntityId};
pub use crate::listener::{ChangeKind, Subscription};
use crate::listener::Listeners;

mod filter;
pub use filter::Filter;

/// Identifies an archetype within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// Creates an archetype ID.
    pub const fn new(id: u32) -> Self { Self(id) }

    /// Returns the raw ID.
    pub fn get(self) -> u32 { self.0 }
}

impl From<u32> for ArchetypeId {
    fn from(id: u32) -> Self { Self(id) }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "@{}", self.0) }
}

/// An entity joined or left an archetype.
#[derive(Debug, Clone, Copy)]
pub struct Change<'t> {
    /// Whether the entity joined or left.
    pub kind:      ChangeKind,
    /// The archetype whose membership changed.
    pub archetype: ArchetypeId,
    /// The entity in its current state.
    pub entity:    &'t Entity,
    /// The component whose addition or removal caused the change, if any.
    pub component: Option<&'t dyn AnyComponent>,
}

/// A listener for membership changes.
pub type Listener = dyn FnMut(&Change<'_>);

/// A filter and the entities currently satisfying it.
pub struct Archetype {
    id:        ArchetypeId,
    filters:   Vec<Filter>,
    entities:  IndexSet<EntityId>,
    listeners: Listeners<Listener>,
}

impl Archetype {
    /// Creates an archetype with no members.
    pub fn new(id: ArchetypeId, filters: impl IntoIterator<Item = Filter>) -> Self {
        Self {
            id,
            filters: filters.into_iter().collect(),
            entities: IndexSet::new(),
            listeners: Listeners::default(),
        }
    }

    /// The ID of this archetype.
    pub fn id(&self) -> ArchetypeId { self.id }

    /// The filters of this archetype.
    pub fn filters(&self) -> &[Filter] { &self.filters }

    /// Whether `entity` satisfies every filter.
    ///
    /// This does not read or change the membership.
    pub fn matches_entity(&self, entity: &Entity) -> bool {
        self.filters.iter().all(|filter| filter.matches(entity))
    }

    /// Whether the entity is currently a member.
    pub fn has_entity(&self, id: EntityId) -> bool { self.entities.contains(&id) }

    /// The current members in the order membership was granted.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = EntityId> + DoubleEndedIterator + '_ {
        self.entities.iter().copied()
    }

    /// Gets the member at `index` in grant order.
    pub fn get_index(&self, index: usize) -> Option<EntityId> {
        self.entities.get_index(index).copied()
    }

    /// The number of members.
    pub fn len(&self) -> usize { self.entities.len() }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool { self.entities.is_empty() }

    /// Re-evaluates the filters against `entity` after it has changed.
    ///
    /// A member that no longer matches is removed,
    /// and a non-member that now matches is added.
    /// Returns the kind of membership change, if any.
    pub fn handle_entity_change(
        &mut self,
        entity: &Entity,
        component: Option<&dyn AnyComponent>,
    ) -> Option<ChangeKind> {
        let matches = self.matches_entity(entity);
        match (self.has_entity(entity.id()), matches) {
            (true, false) => {
                self.revoke(entity, component);
                Some(ChangeKind::Remove)
            }
            (false, true) => {
                self.grant(entity, component);
                Some(ChangeKind::Add)
            }
            _ => None,
        }
    }

    /// Adds `entity` to the members if it matches and is not already a member.
    ///
    /// Returns whether it was added.
    pub fn handle_entity_add(
        &mut self,
        entity: &Entity,
        component: Option<&dyn AnyComponent>,
    ) -> bool {
        if self.has_entity(entity.id()) || !self.matches_entity(entity) {
            return false;
        }
        self.grant(entity, component);
        true
    }

    /// Removes `entity` from the members if it is a member.
    ///
    /// Returns whether it was removed.
    pub fn handle_entity_remove(
        &mut self,
        entity: &Entity,
        component: Option<&dyn AnyComponent>,
    ) -> bool {
        if !self.has_entity(entity.id()) {
            return false;
        }
        self.revoke(entity, component);
        true
    }

    fn grant(&mut self, entity: &Entity, component: Option<&dyn AnyComponent>) {
        self.entities.insert(entity.id());
        self.emit(ChangeKind::Add, entity, component);
    }

    fn revoke(&mut self, entity: &Entity, component: Option<&dyn AnyComponent>) {
        self.entities.shift_remove(&entity.id());
        self.emit(ChangeKind::Remove, entity, component);
    }

    fn emit(&mut self, kind: ChangeKind, entity: &Entity, component: Option<&dyn AnyComponent>) {
        let change = Change { kind, archetype: self.id, entity, component };
        self.listeners.emit(kind, |listener| listener(&change));
    }

    /// Registers a listener for entities joining and leaving.
    ///
    /// Listeners registered through [`on_add`](Self::on_add) or [`on_remove`](Self::on_remove)
    /// are notified before listeners registered here.
    pub fn on_change(&mut self, listener: impl FnMut(&Change<'_>) + 'static) -> Subscription {
        self.listeners.insert(None, Box::new(listener))
    }

    /// Registers a listener for entities joining.
    pub fn on_add(&mut self, listener: impl FnMut(&Change<'_>) + 'static) -> Subscription {
        self.listeners.insert(Some(ChangeKind::Add), Box::new(listener))
    }

    /// Registers a listener for entities leaving.
    pub fn on_remove(&mut self, listener: impl FnMut(&Change<'_>) + 'static) -> Subscription {
        self.listeners.insert(Some(ChangeKind::Remove), Box::new(listener))
    }

    /// Deregisters a listener. Returns `false` if it was not registered on this archetype.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.remove(subscription)
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("filters", &self.filters)
            .field("entities", &self.entities)
            .finish()
    }
}
