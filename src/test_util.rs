#![allow(missing_docs)]

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexSet;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::archetype::ChangeKind;
use crate::comp;
use crate::comp::{Component, ComponentType};
use crate::entity::EntityId;

/// Initializes logging for tests. Safe to call more than once.
pub fn init_log() { let _ = env_logger::builder().is_test(true).try_init(); }

/// Records event and ensures that they are in the correct order.
pub struct EventTracer<T: fmt::Debug + Eq + Hash> {
    dependencies: HashMap<T, Vec<T>>,
    seen:         Mutex<IndexSet<T>>,
}

impl<T: fmt::Debug + Eq + Hash> EventTracer<T> {
    /// Creates a new event tracer that ensures `a` happens before `b` for each `(a, b)` input.
    pub fn new(orders: impl IntoIterator<Item = (T, T)>) -> Self {
        let mut dependencies: HashMap<T, Vec<T>> = HashMap::new();
        for (before, after) in orders {
            dependencies.entry(after).or_default().push(before);
        }
        let seen = Mutex::new(IndexSet::new());

        Self { dependencies, seen }
    }

    /// Records that `event` has happened.
    ///
    /// # Panics
    /// Panics if the same `event` was sent twice or a dependency is not satisfied.
    pub fn trace(&self, event: T) {
        let mut seen = self.seen.lock();

        if let Some(deps) = self.dependencies.get(&event) {
            for dep in deps {
                assert!(seen.contains(dep), "{:?} should happen after {:?}", event, dep);
            }
        }

        let (index, new) = seen.insert_full(event);
        assert!(
            new,
            "{:?} is inserted twice",
            seen.get_index(index).expect("insert_full should return valid index")
        );
    }

    /// Returns the events observed so far, in order.
    pub fn events(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.seen.lock().iter().cloned().collect()
    }
}

/// Events observed through component hooks and listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Attach(ComponentType),
    Detach(ComponentType),
    EntityListener(ChangeKind, ComponentType),
    ArchetypeListener(ChangeKind, EntityId),
}

macro_rules! hooked_comps {
    ($($(#[$meta:meta])* $ident:ident;)*) => {
        $(
            $(#[$meta])*
            #[comp(archon_as(crate), attach = Self::trace_attach, detach = Self::trace_detach)]
            pub struct $ident(pub Rc<EventTracer<Event>>);

            impl $ident {
                fn trace_attach(&mut self, _: EntityId) {
                    self.0.trace(Event::Attach(<Self as Component>::TYPE));
                }

                fn trace_detach(&mut self, _: EntityId) {
                    self.0.trace(Event::Detach(<Self as Component>::TYPE));
                }
            }
        )*
    }
}

hooked_comps! {
    /// Traces its hooks as `alpha`.
    AlphaComponent;
    /// Traces its hooks as `beta`.
    BetaComponent;
    /// Traces its hooks as `gamma`.
    GammaComponent;
}

#[comp(archon_as(crate), patch)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionComponent {
    pub x: i32,
    pub y: i32,
}

#[comp(archon_as(crate), patch)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardComponent {
    pub id:   u32,
    pub cost: u32,
}

#[comp(archon_as(crate), patch)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerComponent {
    pub id: u32,
}

/// A range whose bounds may be infinite, which JSON cannot represent.
#[comp(archon_as(crate), patch)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeComponent {
    pub min: f32,
    pub max: f32,
}

/// A component with a renamed field and a field that is never serialized.
#[comp(archon_as(crate), patch)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedComponent {
    pub x:     i32,
    #[serde(rename = "tag")]
    pub label: String,
    #[serde(skip)]
    pub cache: Vec<u32>,
}

/// A marker toggled on and off.
#[comp(archon_as(crate))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverComponent;

/// A sequence-typed component.
#[comp(archon_as(crate), patch)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandComponent(pub Vec<u32>);

#[comp(archon_as(crate), patch)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderRadiusComponent {
    pub value: f32,
}

/// A component whose type does not follow its Rust name.
#[comp(archon_as(crate), name = "tag")]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Label(pub &'static str);

macro_rules! numbered_comps {
    ($($ident:ident)*) => {
        $(
            #[comp(archon_as(crate))]
            #[derive(Debug, Clone, Copy, Default, PartialEq)]
            pub struct $ident(pub i32);
        )*

        /// The component types of all numbered components, in order.
        pub const NUMBERED: &[ComponentType] = &[$(<$ident as Component>::TYPE),*];
    }
}

numbered_comps!(Comp1 Comp2 Comp3 Comp4 Comp5 Comp6 Comp7 Comp8);

/// Creates a batch of the first `n` numbered components.
pub fn numbered_batch(n: usize) -> comp::Batch {
    let all: comp::Batch = crate::comps![
        Comp1(1),
        Comp2(2),
        Comp3(3),
        Comp4(4),
        Comp5(5),
        Comp6(6),
        Comp7(7),
        Comp8(8),
    ];
    all.into_iter().take(n).collect()
}
