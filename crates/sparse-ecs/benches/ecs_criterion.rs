//! ECS benchmarks using criterion for historical comparison.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sparse_ecs::{Entity, FilterId, SetSize, World};

#[derive(Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

struct Frozen;

fn world_with_pools() -> World {
    let mut world = World::new();
    world.create_pool::<Position>(SetSize::DEFAULT).unwrap();
    world.create_pool::<Velocity>(SetSize::DEFAULT).unwrap();
    world.create_pool::<Frozen>(SetSize::DEFAULT).unwrap();
    world
}

fn moving_filter(world: &mut World) -> FilterId {
    world
        .filter_builder()
        .with::<Position>()
        .with::<Velocity>()
        .without::<Frozen>()
        .build()
}

fn populate(world: &mut World, count: u64) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            let entity = world.create_entity();
            world
                .add_component(
                    entity,
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                )
                .unwrap();
            world
                .add_component(
                    entity,
                    Velocity {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                )
                .unwrap();
            entity
        })
        .collect()
}

fn create_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for count in [1, 100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("empty", count), &count, |b, &count| {
            b.iter(|| {
                let mut world = World::new();
                for _ in 0..count {
                    black_box(world.create_entity());
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("recycled", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || {
                        let mut world = World::new();
                        let entities: Vec<Entity> =
                            (0..count).map(|_| world.create_entity()).collect();
                        for entity in entities {
                            world.remove_entity(entity);
                        }
                        world
                    },
                    |mut world| {
                        for _ in 0..count {
                            black_box(world.create_entity());
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn component_access_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("component_access");

    for count in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("get", count), &count, |b, &count| {
            let mut world = world_with_pools();
            let entities = populate(&mut world, count);

            b.iter(|| {
                for &entity in &entities {
                    black_box(world.get::<Position>(entity));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("get_mut", count), &count, |b, &count| {
            let mut world = world_with_pools();
            let entities = populate(&mut world, count);

            b.iter(|| {
                for &entity in &entities {
                    if let Some(pos) = world.get_mut::<Position>(entity) {
                        pos.x += 1.0;
                    }
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("pool_iter_mut", count),
            &count,
            |b, &count| {
                let mut world = world_with_pools();
                populate(&mut world, count);

                b.iter(|| {
                    if let Some(pool) = world.pool_mut::<Position>() {
                        for pos in pool.items_mut() {
                            pos.y += 1.0;
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

fn filter_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for count in [100, 1000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(
            BenchmarkId::new("add_component", count),
            &count,
            |b, &count| {
                b.iter(|| {
                    let mut world = world_with_pools();
                    black_box(moving_filter(&mut world));
                    populate(&mut world, count);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("toggle_excluded", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || {
                        let mut world = world_with_pools();
                        moving_filter(&mut world);
                        let entities = populate(&mut world, count);
                        (world, entities)
                    },
                    |(mut world, entities)| {
                        for &entity in &entities {
                            world.add_component(entity, Frozen).unwrap();
                        }
                        for &entity in &entities {
                            world.remove_component::<Frozen>(entity).unwrap();
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        group.bench_with_input(BenchmarkId::new("iterate", count), &count, |b, &count| {
            let mut world = world_with_pools();
            let moving = moving_filter(&mut world);
            populate(&mut world, count);

            b.iter(|| {
                for entity in world.filter(moving).iter() {
                    black_box(world.get::<Velocity>(entity));
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("remove_entity", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || {
                        let mut world = world_with_pools();
                        moving_filter(&mut world);
                        let entities = populate(&mut world, count);
                        (world, entities)
                    },
                    |(mut world, entities)| {
                        for entity in entities {
                            world.remove_entity(entity);
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    create_benchmarks,
    component_access_benchmarks,
    filter_benchmarks,
);

criterion_main!(benches);
