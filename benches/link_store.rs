//! 链接存储与服务层性能基准测试

use std::hint::black_box;
use std::sync::Arc;

use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use secretlinks::config::LinksConfig;
use secretlinks::services::{CreateLinkRequest, CreationService, RetrievalService};
use secretlinks::storage::{Link, LinkStore, MemoryLinkStore};
use secretlinks::utils::{RandomKeyGenerator, generate_random_code};

fn link(max_views: u32) -> Link {
    Link::new("ciphertext".into(), Utc::now() + Duration::hours(1), max_views)
}

// ============== MemoryLinkStore 基准测试 ==============

fn bench_memory_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage/memory");

    for size in [1_000usize, 100_000] {
        let store = MemoryLinkStore::new();
        let keys: Vec<String> = (0..size).map(|_| generate_random_code(8)).collect();
        for key in &keys {
            store.create_if_absent(key, link(u32::MAX));
        }

        group.bench_with_input(BenchmarkId::new("get_hit", size), &keys, |b, keys| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % keys.len();
                black_box(store.get(&keys[i]))
            });
        });

        group.bench_with_input(BenchmarkId::new("compare_and_swap", size), &keys, |b, keys| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % keys.len();
                let current = store.get(&keys[i]).unwrap();
                black_box(store.compare_and_swap(&keys[i], &current, current.viewed()))
            });
        });
    }

    group.finish();
}

// ============== 服务层基准测试 ==============

fn bench_services(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("services");

    let store = Arc::new(MemoryLinkStore::new());
    let creation = CreationService::new(
        store.clone(),
        Arc::new(RandomKeyGenerator),
        LinksConfig::default(),
        None,
    );
    let retrieval = RetrievalService::new(store.clone(), None);

    group.bench_function("create", |b| {
        b.to_async(&rt).iter(|| async {
            let req = CreateLinkRequest {
                secret: "ciphertext".into(),
                ttl_minutes: None,
                max_views: None,
            };
            black_box(creation.create(req).await.unwrap())
        });
    });

    store.create_if_absent("benchkey", link(u32::MAX));
    group.bench_function("retrieve", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(retrieval.retrieve("benchkey").await.unwrap()) });
    });

    group.finish();
}

criterion_group!(benches, bench_memory_store, bench_services);
criterion_main!(benches);
