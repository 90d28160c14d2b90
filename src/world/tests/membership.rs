//! Tests archetype membership maintained through the world.

use std::cell::Cell;
use std::rc::Rc;

use super::{assert_consistent, record, CARDS, NOT_CARDS, ONLY_CARDS};
use crate::archetype::{ArchetypeId, ChangeKind, Filter};
use crate::comp::{Component, ComponentType};
use crate::test_util::*;
use crate::{Error, World};

const CARD: ComponentType = CardComponent::TYPE;

fn card_world() -> World {
    World::builder()
        .archetype(CARDS, [Filter::include([CARD])])
        .archetype(ONLY_CARDS, [Filter::only([CARD])])
        .archetype(NOT_CARDS, [Filter::exclude([CARD])])
        .build()
}

#[test]
fn test_basic_filter() {
    let mut world = card_world();
    let e1 = world
        .create_entity(crate::comps![PositionComponent::default(), CardComponent::default()])
        .expect("create e1");
    assert!(world.get_archetype(CARDS).expect("registered").has_entity(e1));

    let log = record(&mut world, CARDS);
    world.entity_mut(e1).expect("e1 exists").remove_component(CARD).expect("card was attached");

    assert_eq!(*log.borrow(), [(ChangeKind::Remove, e1, Some(CARD))]);
    let cards = world.get_archetype(CARDS).expect("registered");
    assert!(!cards.has_entity(e1));
    assert!(cards.is_empty());
}

#[test]
fn test_only_vs_include() {
    let mut world = card_world();
    let e2 = world
        .create_entity(crate::comps![CardComponent::default(), PlayerComponent::default()])
        .expect("create e2");

    assert!(world.get_archetype(CARDS).expect("registered").has_entity(e2));
    assert!(!world.get_archetype(ONLY_CARDS).expect("registered").has_entity(e2));

    world.entity_mut(e2).expect("e2 exists").remove::<PlayerComponent>().expect("player attached");
    assert!(world.get_archetype(ONLY_CARDS).expect("registered").has_entity(e2));
    assert_consistent(&world);
}

#[test]
fn test_create_evaluates_once() {
    let mut world = card_world();
    let cards = record(&mut world, CARDS);
    let not_cards = record(&mut world, NOT_CARDS);

    let id = world
        .create_entity(crate::comps![PositionComponent::default(), CardComponent::default()])
        .expect("create");

    assert_eq!(*cards.borrow(), [(ChangeKind::Add, id, None)]);
    assert!(not_cards.borrow().is_empty());
}

#[test]
fn test_empty_entity_joins_exclusive() {
    let mut world = card_world();
    let id = world.create_entity(crate::comps![]).expect("create");

    assert!(world.get_archetype(NOT_CARDS).expect("registered").has_entity(id));

    let log = record(&mut world, NOT_CARDS);
    world.entity_mut(id).expect("exists").toggle_component::<CardComponent>(true);
    assert_eq!(*log.borrow(), [(ChangeKind::Remove, id, Some(CARD))]);
    assert_consistent(&world);
}

#[test]
fn test_duplicate_batch_creates_nothing() {
    let mut world = card_world();
    let err = world
        .create_entity(crate::comps![CardComponent::default(), CardComponent::default()])
        .expect_err("duplicate card");

    assert!(matches!(err, Error::DuplicateInBatch { ty: CARD }));
    assert_eq!(world.entity_count(), 0);
    for archetype in world.archetypes() {
        assert!(archetype.is_empty());
    }
}

#[test]
fn test_duplicate_add_keeps_membership() {
    let mut world = card_world();
    let id = world.create_entity(crate::comps![CardComponent { id: 1, cost: 2 }]).expect("create");
    let log = record(&mut world, CARDS);

    let err = world
        .entity_mut(id)
        .expect("exists")
        .add_component(CardComponent { id: 3, cost: 4 })
        .expect_err("duplicate card");

    assert!(matches!(err, Error::DuplicateComponent { entity, ty: CARD } if entity == id));
    let entity = world.entity(id).expect("exists");
    assert_eq!(entity.get::<CardComponent>(), Some(&CardComponent { id: 1, cost: 2 }));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_registration_populates() {
    let mut world = World::new();
    let card = world.create_entity(crate::comps![CardComponent::default()]).expect("create");
    let player = world.create_entity(crate::comps![PlayerComponent::default()]).expect("create");

    let archetype = world.register_archetype(CARDS, [Filter::include([CARD])]).expect("register");
    assert_eq!(archetype.entities().collect::<Vec<_>>(), [card]);
    assert!(!archetype.has_entity(player));
}

#[test]
fn test_archetype_registry() {
    let mut world = card_world();

    let err = world.register_archetype(CARDS, std::iter::empty()).expect_err("already registered");
    assert!(matches!(err, Error::DuplicateArchetype(CARDS)));

    let missing = ArchetypeId::new(99);
    assert!(matches!(world.get_archetype(missing), Err(Error::UnknownArchetype(id)) if id == missing));
    assert!(matches!(world.archetype_mut(missing), Err(Error::UnknownArchetype(_))));

    world.unregister_archetype(NOT_CARDS).expect("registered");
    assert!(world.get_archetype(NOT_CARDS).is_err());
    assert!(matches!(world.unregister_archetype(NOT_CARDS), Err(Error::UnknownArchetype(_))));

    let ids: Vec<_> = world.archetypes().map(|archetype| archetype.id()).collect();
    assert_eq!(ids, [CARDS, ONLY_CARDS]);
}

#[test]
fn test_unregistered_archetype_is_not_notified() {
    let mut world = card_world();
    let log = record(&mut world, CARDS);
    world.unregister_archetype(CARDS).expect("registered");

    world.create_entity(crate::comps![CardComponent::default()]).expect("create");
    assert!(log.borrow().is_empty());
}

#[test]
fn test_custom_filter_follows_values() {
    const FIRST_PLAYER: ArchetypeId = ArchetypeId::new(10);

    let mut world = World::new();
    world
        .register_archetype(
            FIRST_PLAYER,
            [Filter::custom(|entity| {
                entity.get::<PlayerComponent>().map_or(false, |player| player.id == 0)
            })],
        )
        .expect("register");
    let id = world.create_entity(crate::comps![PlayerComponent { id: 1 }]).expect("create");
    assert!(!world.get_archetype(FIRST_PLAYER).expect("registered").has_entity(id));

    world
        .entity_mut(id)
        .expect("exists")
        .modify(|player: &mut PlayerComponent| player.id = 0)
        .expect("player attached");
    assert!(world.get_archetype(FIRST_PLAYER).expect("registered").has_entity(id));

    world
        .entity_mut(id)
        .expect("exists")
        .set_component_value::<PlayerComponent, _>(serde_json::json!({ "id": 2 }))
        .expect("valid value");
    assert!(!world.get_archetype(FIRST_PLAYER).expect("registered").has_entity(id));

    let err = world
        .entity_mut(id)
        .expect("exists")
        .modify(|_: &mut CardComponent| ())
        .expect_err("no card");
    assert!(matches!(err, Error::MissingComponent { ty: CARD, .. }));
}

#[test]
fn test_refresh_external_state() {
    const GATED: ArchetypeId = ArchetypeId::new(10);

    let open = Rc::new(Cell::new(false));
    let gate = Filter::custom({
        let open = Rc::clone(&open);
        move |_| open.get()
    });

    let mut world = World::new();
    world.register_archetype(GATED, [gate]).expect("register");
    let id = world.create_entity(crate::comps![HoverComponent]).expect("create");
    assert!(world.get_archetype(GATED).expect("registered").is_empty());

    open.set(true);
    assert!(world.get_archetype(GATED).expect("registered").is_empty());
    world.refresh_entity(id).expect("exists");
    assert!(world.get_archetype(GATED).expect("registered").has_entity(id));

    let unknown = world.create_entity(crate::comps![]).expect("create");
    world.destroy_entity(unknown).expect("exists");
    assert!(matches!(world.refresh_entity(unknown), Err(Error::UnknownEntity(_))));
}

#[test]
fn test_any_and_conjunction() {
    const TARGETS: ArchetypeId = ArchetypeId::new(10);

    let mut world = World::new();
    world
        .register_archetype(
            TARGETS,
            [Filter::any([CARD, PlayerComponent::TYPE]), Filter::exclude([HoverComponent::TYPE])],
        )
        .expect("register");

    let card = world.create_entity(crate::comps![CardComponent::default()]).expect("create");
    let player = world.create_entity(crate::comps![PlayerComponent::default()]).expect("create");
    let neither = world.create_entity(crate::comps![PositionComponent::default()]).expect("create");

    let members: Vec<_> = world.get_archetype(TARGETS).expect("registered").entities().collect();
    assert_eq!(members, [card, player]);
    assert!(!world.get_archetype(TARGETS).expect("registered").has_entity(neither));

    world.entity_mut(card).expect("exists").toggle_component::<HoverComponent>(true);
    let members: Vec<_> = world.get_archetype(TARGETS).expect("registered").entities().collect();
    assert_eq!(members, [player]);
    assert_consistent(&world);
}

#[test]
fn test_listener_sees_settled_entity() {
    let mut world = card_world();
    let seen = Rc::new(Cell::new(None));
    world.archetype_mut(CARDS).expect("registered").on_add({
        let seen = Rc::clone(&seen);
        move |change| seen.set(change.entity.get::<CardComponent>().map(|card| card.cost))
    });

    let id = world.create_entity(crate::comps![]).expect("create");
    let mut entity = world.entity_mut(id).expect("exists");
    entity.add_component(CardComponent { id: 0, cost: 5 }).expect("add");
    assert_eq!(seen.get(), Some(5));
}
