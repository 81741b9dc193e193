//! Resolution pipeline performance benchmarks.
//!
//! Measures grouping + per-group resolution throughput and the censored
//! maximum-likelihood fit in isolation.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::prelude::*;

use alembic::consensus::{PairTolerance, ValueResolver, compact, resolve_groups};
use alembic::stats::{Measurement, fit_group_mean};
use alembic::table::DataTable;

/// Generate a replicate table: `entities` keys with 1-4 replicates each,
/// a tenth of the measurements censored.
fn generate_replicate_table(entities: usize) -> DataTable {
    let mut rng = StdRng::seed_from_u64(42);
    let mut rows = Vec::new();

    for entity in 0..entities {
        let true_value: f64 = rng.gen_range(-3.0..3.0);
        let replicates = rng.gen_range(1..=4);
        for _ in 0..replicates {
            let noise: f64 = rng.gen_range(-0.5..0.5);
            let relation = match rng.gen_range(0..10) {
                0 => "<",
                1 => ">",
                _ => "=",
            };
            rows.push(vec![
                format!("key_{:05}", entity),
                format!("{:.4}", true_value + noise),
                relation.to_string(),
            ]);
        }
    }

    DataTable::new(
        vec![
            "key".to_string(),
            "std_value".to_string(),
            "std_relation".to_string(),
        ],
        rows,
    )
}

fn bench_value_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_resolution");

    for entities in [100, 1_000, 5_000] {
        let table = generate_replicate_table(entities);
        group.throughput(Throughput::Elements(table.row_count() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(entities),
            &table,
            |b, table| {
                b.iter(|| {
                    let resolver = ValueResolver::new(
                        table,
                        "key",
                        "std_value",
                        Some("std_relation"),
                        PairTolerance::NoiseScaled,
                    )
                    .unwrap();
                    let resolution = resolve_groups(table, "key", &resolver).unwrap();
                    black_box(compact(table, &resolution))
                });
            },
        );
    }

    group.finish();
}

fn bench_censored_fit(c: &mut Criterion) {
    let measurements = vec![
        Measurement::exact(5.0),
        Measurement::exact(5.3),
        Measurement::left_censored(6.0),
        Measurement::right_censored(4.0),
        Measurement::exact(4.9),
    ];

    c.bench_function("censored_group_fit", |b| {
        b.iter(|| black_box(fit_group_mean(black_box(&measurements), Some(0.5))));
    });
}

criterion_group!(benches, bench_value_resolution, bench_censored_fit);
criterion_main!(benches);
