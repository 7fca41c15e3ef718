//! 使用账本性能基准测试

use std::hint::black_box;

use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use secretlinks::analytics::UsageLedger;

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/record");
    let now = Utc::now();

    group.bench_function("creation", |b| {
        let ledger = UsageLedger::new();
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            black_box(ledger.record_creation(&format!("k{i}"), now))
        });
    });

    // 同一 key 的访问序列会持续增长，这里按 key 轮转
    group.bench_function("visit_in_order", |b| {
        let ledger = UsageLedger::new();
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            let key = format!("k{}", i % 1024);
            black_box(ledger.record_visit(&key, now + Duration::milliseconds(i)))
        });
    });

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/report");
    let now = Utc::now();

    for size in [100usize, 10_000] {
        let ledger = UsageLedger::new();
        for i in 0..size {
            let key = format!("k{i}");
            ledger.record_creation(&key, now + Duration::seconds(i as i64));
            ledger.record_visit(&key, now + Duration::seconds(i as i64 + 1));
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.report()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record, bench_report);
criterion_main!(benches);
