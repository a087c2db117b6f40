use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use objlock_core::service::LockService;
use objlock_core::types::ObjectId;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn populated_service(locked: usize) -> LockService {
    let service = LockService::new();
    for i in 0..locked {
        let id = ObjectId::new(format!("held-{i}"));
        service
            .create_lock(&id, "s-holder", "holder", None, false)
            .expect("seed lock");
    }
    service
}

// ─── Benchmarks ─────────────────────────────────────────────────────────────

fn bench_create_release_cycle(c: &mut Criterion) {
    let service = LockService::new();
    let id = ObjectId::from("bench-object");

    c.bench_function("create_release_cycle", |b| {
        b.iter(|| {
            let lock = service
                .create_lock(black_box(&id), "s1", "bob", Some(1), false)
                .expect("create");
            service.release_lock(&lock);
        })
    });
}

fn bench_contended_create(c: &mut Criterion) {
    let service = populated_service(1);
    let id = ObjectId::from("held-0");

    c.bench_function("contended_create_rejected", |b| {
        b.iter(|| {
            let _ = black_box(service.create_lock(&id, "s2", "intruder", None, false));
        })
    });
}

fn bench_is_locked_for_with_varying_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_locked_for");

    for table_size in [10usize, 100, 1_000] {
        let service = populated_service(table_size);
        let id = ObjectId::from("held-0");

        group.bench_with_input(
            BenchmarkId::from_parameter(table_size),
            &table_size,
            |b, _| {
                b.iter(|| black_box(service.is_locked_for(&id, "s-holder", "holder")))
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_create_release_cycle,
    bench_contended_create,
    bench_is_locked_for_with_varying_table
);
criterion_main!(benches);
