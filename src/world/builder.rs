use indexmap::IndexMap;

use super::World;
use crate::archetype::{ArchetypeId, Filter};
use crate::entity::Ealloc;
use crate::tracer::{self, Tracer};

/// This type is used to configure a world.
pub struct Builder {
    tracer:        Box<dyn Tracer>,
    pool_capacity: usize,
    archetypes:    IndexMap<ArchetypeId, Vec<Filter>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self { tracer: Box::new(tracer::Noop), pool_capacity: 64, archetypes: IndexMap::new() }
    }
}

impl Builder {
    /// Sets the tracer that receives all world events. Defaults to [`tracer::Noop`].
    pub fn tracer(mut self, tracer: impl Tracer + 'static) -> Self {
        self.tracer = Box::new(tracer);
        self
    }

    /// Sets the maximum number of destroyed entity shells kept for reuse.
    ///
    /// Defaults to 64. Zero disables pooling.
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Registers an archetype when the world is built.
    ///
    /// # Panics
    /// Panics if an archetype with the same ID was already added to this builder.
    pub fn archetype(
        mut self,
        id: impl Into<ArchetypeId>,
        filters: impl IntoIterator<Item = Filter>,
    ) -> Self {
        let id = id.into();
        let previous = self.archetypes.insert(id, filters.into_iter().collect());
        assert!(previous.is_none(), "Archetype {} is declared twice", id);
        self
    }

    /// Constructs the world from the builder.
    pub fn build(self) -> World {
        let mut world = World {
            ealloc:        Ealloc::new(),
            entities:      IndexMap::new(),
            archetypes:    IndexMap::new(),
            pool:          Vec::with_capacity(self.pool_capacity),
            pool_capacity: self.pool_capacity,
            tracer:        self.tracer,
        };

        for (id, filters) in self.archetypes {
            world.register_archetype(id, filters).expect("archetype IDs are unique in the builder");
        }

        world
    }
}
