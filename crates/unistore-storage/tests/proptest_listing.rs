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

//! Property-Based Tests for listing and sorting
//!
//! Uses proptest to check, over random key sets:
//! - Listing returns each listable key exactly once, whatever the worker count
//! - Directories never leak into a listing that excludes them
//! - Sorting is stable for equal keys

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use unistore_storage::mock::{ListingStyle, MockClient};
use unistore_storage::object::sort_objects;
use unistore_storage::{Backend, ListOptions, ObjectInfo, SortBy, SortOrder, StorageBackend};

/// Keys under `p/`, some nested one level, some directory markers
fn arb_keys() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::vec(
        ("[a-e]{1,3}(/[a-e]{1,2})?/?", 0usize..4),
        0..40,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, size)| {
                let key = format!("p/{}", key);
                // markers are empty by construction
                let size = if key.ends_with('/') { 0 } else { size + 1 };
                (key, size)
            })
            .collect()
    })
}

fn expected_recursive(keys: &[(String, usize)], include_dirs: bool) -> Vec<String> {
    let mut expected: Vec<String> = keys
        .iter()
        .filter(|(key, _)| include_dirs || !key.ends_with('/'))
        .map(|(key, _)| key.clone())
        .collect();
    expected.sort();
    expected.dedup();
    expected
}

/// Property: a recursive listing equals the sorted, filtered key set
#[test]
fn proptest_recursive_listing_matches_keys() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(arb_keys(), 1usize..8, any::<bool>(), any::<bool>()),
            |(keys, workers, include_dirs, paged)| {
                tokio::runtime::Runtime::new().unwrap().block_on(async {
                    let style = if paged { ListingStyle::Paged } else { ListingStyle::Stream };
                    let client = MockClient::new("bucket").with_style(style);
                    for (key, size) in &keys {
                        client.insert(key, vec![0u8; *size]).await;
                    }
                    let backend = Backend::new(client);

                    let options = ListOptions::new("p")
                        .with_recursive(true)
                        .with_directories(include_dirs)
                        .with_concurrency(workers)
                        .with_page_size(3);
                    let names: Vec<String> = backend
                        .list_objects(&options)
                        .await
                        .unwrap()
                        .into_iter()
                        .map(|o| o.name().to_string())
                        .collect();

                    prop_assert_eq!(names, expected_recursive(&keys, include_dirs));
                    Ok(())
                })
            },
        )
        .unwrap();
}

/// Property: a one-level listing without directories holds only direct children
#[test]
fn proptest_single_level_has_no_directories() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(arb_keys(), 1usize..6), |(keys, workers)| {
            tokio::runtime::Runtime::new().unwrap().block_on(async {
                let client = MockClient::new("bucket");
                for (key, size) in &keys {
                    client.insert(key, vec![0u8; *size]).await;
                }
                let backend = Backend::new(client);

                let options = ListOptions::new("p/").with_concurrency(workers);
                let objects = backend.list_objects(&options).await.unwrap();

                for object in &objects {
                    prop_assert!(!object.is_dir());
                    prop_assert!(!object.name()["p/".len()..].contains('/'));
                }
                Ok(())
            })
        })
        .unwrap();
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Property: equal sizes keep their discovery order in both directions
#[test]
fn proptest_size_sort_is_stable() {
    proptest!(|(sizes in prop::collection::vec(0i64..4, 0..30), descending in any::<bool>())| {
        let mut objects: Vec<ObjectInfo> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| ObjectInfo::new(format!("k{:02}", i), *size, at(0)))
            .collect();
        let order = if descending { SortOrder::Descending } else { SortOrder::Ascending };
        sort_objects(&mut objects, SortBy::Size, order);

        for pair in objects.windows(2) {
            if pair[0].size() == pair[1].size() {
                prop_assert!(pair[0].name() < pair[1].name());
            } else if descending {
                prop_assert!(pair[0].size() > pair[1].size());
            } else {
                prop_assert!(pair[0].size() < pair[1].size());
            }
        }
    });
}
