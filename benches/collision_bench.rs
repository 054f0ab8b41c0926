use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use disksim::core::{Layout, Simulation};

const DISKS: [usize; 5] = [16, 64, 144, 256, 400];

/// Box side chosen so every size runs at the same area fraction (~0.2).
fn box_side(n: usize) -> f64 {
    (4.0 * n as f64).sqrt().ceil()
}

fn initial_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial collision table");
    for n in DISKS {
        let l = box_side(n);
        group.throughput(Throughput::Elements((n * (n - 1) / 2) as u64));
        group.bench_function(BenchmarkId::new("regular", n), |b| {
            b.iter(|| Simulation::new(black_box(n), [l, l], Layout::Regular, Some(42)));
        });
    }
    group.finish();
}

fn event_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision events");
    for n in DISKS {
        let l = box_side(n);
        let mut sim = Simulation::new(n, [l, l], Layout::Regular, Some(42))
            .expect("benchmark configuration must be valid");
        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("step", n), |b| {
            b.iter(|| sim.step());
        });
    }
    group.finish();
}

criterion_group!(engine, initial_table, event_throughput);
criterion_main!(engine);
