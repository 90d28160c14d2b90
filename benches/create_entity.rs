use archon::archetype::{ArchetypeId, Filter};
use archon::test_util;
use archon::World;
use criterion::*;

/// A world with one include archetype per numbered component.
fn world_with_archetypes() -> World {
    let mut builder = World::builder();
    for (id, &ty) in (0..).zip(test_util::NUMBERED) {
        builder = builder.archetype(ArchetypeId::new(id), [Filter::include([ty])]);
    }
    builder.build()
}

fn create_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("create entity");

    for num_comps in [0, 1, 2, 4, 8] {
        for log_entities in (0..=8).step_by(4) {
            let entities = 1 << log_entities;
            group.throughput(Throughput::Elements(entities));
            group.bench_with_input(
                BenchmarkId::new(format!("{num_comps} components"), format!("{entities} entities")),
                &entities,
                |b, &entities| {
                    b.iter_batched(
                        world_with_archetypes,
                        |mut world| {
                            for _ in 0..entities {
                                world
                                    .create_entity(test_util::numbered_batch(num_comps))
                                    .expect("numbered components are distinct");
                            }
                            world
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
}

criterion_group!(benches, create_entity);
criterion_main!(benches);
