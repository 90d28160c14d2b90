use std::fmt;

use itertools::Itertools;

use crate::comp::ComponentType;
use crate::entity::Entity;

/// A predicate over a single entity.
///
/// Filters must be cheap and free of side effects,
/// since they are evaluated again on every notification.
///
/// Filters are only built through their constructors,
/// which normalize the listed types:
/// ```compile_fail
/// use archon::archetype::Filter;
/// let only = Filter::Only(vec![]);
/// ```
pub struct Filter(Repr);

enum Repr {
    Include(Vec<ComponentType>),
    Exclude(Vec<ComponentType>),
    Only(Vec<ComponentType>),
    Any(Vec<ComponentType>),
    Custom(Box<dyn Fn(&Entity) -> bool>),
}

impl Filter {
    /// Matches entities that have every type in `types`.
    ///
    /// Extra components are allowed.
    pub fn include(types: impl IntoIterator<Item = ComponentType>) -> Self {
        Self(Repr::Include(types.into_iter().unique().collect()))
    }

    /// Matches entities that have no type in `types`.
    pub fn exclude(types: impl IntoIterator<Item = ComponentType>) -> Self {
        Self(Repr::Exclude(types.into_iter().unique().collect()))
    }

    /// Matches entities whose component types are exactly `types`.
    ///
    /// Repeated types count once.
    pub fn only(types: impl IntoIterator<Item = ComponentType>) -> Self {
        Self(Repr::Only(types.into_iter().unique().collect()))
    }

    /// Matches entities that have at least one type in `types`.
    ///
    /// An empty `types` matches nothing.
    pub fn any(types: impl IntoIterator<Item = ComponentType>) -> Self {
        Self(Repr::Any(types.into_iter().unique().collect()))
    }

    /// Matches entities for which `predicate` returns true.
    ///
    /// A predicate that reads component values is only re-evaluated
    /// when the world is told about the value change,
    /// e.g. through [`EntityMut::modify`](crate::world::EntityMut::modify).
    pub fn custom(predicate: impl Fn(&Entity) -> bool + 'static) -> Self {
        Self(Repr::Custom(Box::new(predicate)))
    }

    /// Evaluates the filter.
    pub fn matches(&self, entity: &Entity) -> bool {
        match &self.0 {
            Repr::Include(types) => types.iter().all(|&ty| entity.has_component(ty)),
            Repr::Exclude(types) => !types.iter().any(|&ty| entity.has_component(ty)),
            Repr::Only(types) => {
                entity.len() == types.len() && types.iter().all(|&ty| entity.has_component(ty))
            }
            Repr::Any(types) => types.iter().any(|&ty| entity.has_component(ty)),
            Repr::Custom(predicate) => predicate(entity),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (name, types) = match &self.0 {
            Repr::Include(types) => ("include", types),
            Repr::Exclude(types) => ("exclude", types),
            Repr::Only(types) => ("only", types),
            Repr::Any(types) => ("any", types),
            Repr::Custom(_) => return f.write_str("custom(..)"),
        };
        write!(f, "{}({})", name, types.iter().format(", "))
    }
}
