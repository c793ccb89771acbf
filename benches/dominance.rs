//! Benchmarks for dominance filtering and engine stepping.

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lineup_evo::{
    compute::evolution::{Engine, non_dominated},
    schema::{Direction, EngineConfig, RunConfig, ScoreVector},
};

fn random_vectors(n: usize, dims: usize, rng: &mut StdRng) -> Vec<ScoreVector> {
    (0..n)
        .map(|_| {
            ScoreVector::from_pairs(
                (0..dims).map(|d| (format!("f{d}"), rng.gen_range(0.0..1.0))),
            )
        })
        .collect()
}

fn bench_non_dominated(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_dominated");
    let mut rng = StdRng::seed_from_u64(7);

    for size in [64, 256, 1024, 4096] {
        let vectors = random_vectors(size, 4, &mut rng);
        let members: Vec<_> = vectors.iter().enumerate().collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| non_dominated(black_box(&members)));
        });
    }

    group.finish();
}

fn bench_engine_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run");

    for interval in [1, 10, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("filter_every_{}", interval)),
            &interval,
            |b, &interval| {
                b.iter(|| {
                    let mut engine = Engine::new(EngineConfig {
                        random_seed: Some(1),
                        ..Default::default()
                    });
                    engine
                        .register_objective("x", Direction::Minimize, |p: &(f64, f64)| Ok(p.0))
                        .unwrap();
                    engine
                        .register_objective("y", Direction::Minimize, |p: &(f64, f64)| Ok(p.1))
                        .unwrap();
                    engine
                        .register_agent("jitter", 1, |inputs: Vec<(f64, f64)>, rng: &mut StdRng| {
                            let (x, y) = inputs[0];
                            let t = rng.gen_range(-1.0..1.0);
                            (x + t, y - t)
                        })
                        .unwrap();
                    engine.seed((0.0, 0.0)).unwrap();

                    let run = RunConfig::new(Duration::from_secs(60), interval).with_max_steps(500);
                    black_box(engine.run(&run).unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_non_dominated, bench_engine_run);
criterion_main!(benches);
