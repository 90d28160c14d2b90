use archon::archetype::{ArchetypeId, Filter};
use archon::test_util;
use archon::World;
use criterion::*;

fn delete_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete entity");

    for num_comps in [0, 1, 2, 4, 8] {
        for log_entities in (0..=8).step_by(4) {
            let entities = 1 << log_entities;
            group.throughput(Throughput::Elements(entities));
            group.bench_with_input(
                BenchmarkId::new(format!("{num_comps} components"), format!("{entities} entities")),
                &entities,
                |b, &entities| {
                    b.iter_batched(
                        || {
                            let mut world = World::builder()
                                .archetype(
                                    ArchetypeId::new(0),
                                    [Filter::exclude([test_util::NUMBERED[0]])],
                                )
                                .archetype(
                                    ArchetypeId::new(1),
                                    [Filter::any(test_util::NUMBERED.iter().copied())],
                                )
                                .build();
                            let ids: Vec<_> = (0..entities)
                                .map(|_| {
                                    world
                                        .create_entity(test_util::numbered_batch(num_comps))
                                        .expect("numbered components are distinct")
                                })
                                .collect();
                            (world, ids)
                        },
                        |(mut world, ids)| {
                            for id in ids {
                                world.destroy_entity(id).expect("entity was created");
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

criterion_group!(benches, delete_entity);
criterion_main!(benches);
