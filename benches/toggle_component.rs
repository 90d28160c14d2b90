use std::time::Duration;

use archon::archetype::{ArchetypeId, Filter};
use archon::comp::Component;
use archon::test_util::{self, Comp1, Comp2};
use archon::World;
use criterion::*;
use rand::Rng;

fn toggle_component(c: &mut Criterion) {
    let mut group = c.benchmark_group("toggle component");
    group.measurement_time(Duration::from_secs(10));

    for num_archetypes in [1, 4, 16] {
        group.bench_with_input(
            BenchmarkId::new("toggle", format!("{num_archetypes} archetypes")),
            &num_archetypes,
            |b, &num_archetypes| {
                let mut builder = World::builder();
                for id in 0..num_archetypes {
                    let filter = match id % 3 {
                        0 => Filter::include([Comp1::TYPE]),
                        1 => Filter::exclude([Comp1::TYPE]),
                        _ => Filter::custom(|entity| {
                            entity.get::<Comp2>().map_or(false, |comp| comp.0 > 0)
                        }),
                    };
                    builder = builder.archetype(ArchetypeId::new(id), [filter]);
                }
                let mut world = builder.build();

                let ids: Vec<_> = (0..1024)
                    .map(|_| {
                        world
                            .create_entity(test_util::numbered_batch(4))
                            .expect("numbered components are distinct")
                    })
                    .collect();
                let mut rng = rand::thread_rng();

                b.iter(|| {
                    let id = ids[rng.gen_range(0..ids.len())];
                    let mut entity = world.entity_mut(id).expect("entity was created");
                    let present = entity.has::<Comp1>();
                    entity.toggle_component::<Comp1>(!present);
                });
            },
        );
    }
}

criterion_group!(benches, toggle_component);
criterion_main!(benches);
