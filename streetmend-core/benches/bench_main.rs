use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use streetmend_core::prelude::*;

/// `rows` horizontal and `cols` vertical streets that cross without
/// sharing landmarks
fn synthetic_grid(rows: usize, cols: usize) -> StreetNetwork {
    let spacing = 10.0;
    let width = (cols + 1) as f64 * spacing;
    let height = (rows + 1) as f64 * spacing;

    let mut network = StreetNetwork::default();
    for row in 1..=rows {
        let y = row as f64 * spacing;
        network.add_polyline([(0.0, y), (width, y)]);
    }
    for col in 1..=cols {
        let x = col as f64 * spacing;
        network.add_polyline([(x, 0.0), (x, height)]);
    }
    network
}

fn bench_repair(c: &mut Criterion) {
    let network = synthetic_grid(40, 40);
    let config = RepairConfig::default();

    c.bench_function("repair_grid_40x40", |b| {
        b.iter_batched(
            || network.clone(),
            |mut network| {
                let report = repair_crossings(&mut network, black_box(&config)).unwrap();
                black_box(report.inserted_references);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let network = synthetic_grid(25, 25);
    let config = PipelineConfig::default();

    c.bench_function("pipeline_grid_25x25", |b| {
        b.iter_batched(
            || network.clone(),
            |network| {
                let outcome = run_pipeline(network, black_box(&config)).unwrap();
                black_box(outcome.report.edges);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_repair, bench_pipeline);
criterion_main!(benches);
