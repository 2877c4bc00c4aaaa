// Unistore - Unified Object Storage
// Copyright (C) 2025 Unistore Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Listing pipeline benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use unistore_storage::mock::{ListingStyle, MockClient};
use unistore_storage::object::sort_objects;
use unistore_storage::{Backend, ListOptions, ObjectInfo, SortBy, SortOrder, StorageBackend};

fn seeded_backend(
    rt: &tokio::runtime::Runtime,
    count: usize,
    style: ListingStyle,
) -> Backend<MockClient> {
    let client = MockClient::new("bench").with_style(style);
    rt.block_on(async {
        for i in 0..count {
            client.insert(&format!("data/{:06}.bin", i), vec![0u8; 16]).await;
        }
    });
    Backend::new(client)
}

fn bench_list_workers(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let backend = seeded_backend(&rt, 10_000, ListingStyle::Stream);

    let mut group = c.benchmark_group("list_workers");

    for workers in [1, 4, 16].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, &workers| {
            let options = ListOptions::new("data").with_concurrency(workers);
            b.to_async(&rt)
                .iter(|| async { black_box(backend.list_objects(&options).await.unwrap()) });
        });
    }

    group.finish();
}

fn bench_list_paged(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let backend = seeded_backend(&rt, 10_000, ListingStyle::Paged);

    let mut group = c.benchmark_group("list_paged");

    for page_size in [100, 1_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(page_size),
            page_size,
            |b, &page_size| {
                let options = ListOptions::new("data")
                    .with_concurrency(4)
                    .with_page_size(page_size);
                b.to_async(&rt)
                    .iter(|| async { black_box(backend.list_objects(&options).await.unwrap()) });
            },
        );
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let objects: Vec<ObjectInfo> = (0..10_000)
        .map(|i| {
            let at = chrono::DateTime::from_timestamp((i * 7919) % 100_000, 0).unwrap_or_default();
            ObjectInfo::new(format!("k/{:06}", (i * 31) % 10_000), i % 97, at)
        })
        .collect();

    let mut group = c.benchmark_group("sort_objects");

    for by in [SortBy::Name, SortBy::Size, SortBy::LastModified] {
        group.bench_function(BenchmarkId::from_parameter(by), |b| {
            b.iter(|| {
                let mut batch = objects.clone();
                sort_objects(&mut batch, by, SortOrder::Descending);
                black_box(batch)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_list_workers, bench_list_paged, bench_sort);
criterion_main!(benches);
