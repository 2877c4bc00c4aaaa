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

//! Facade behaviour of `Backend` over the in-memory client
//!
//! Covers the pre-flight checks the facade performs on its own (existence before
//! delete and copy, name validation, local file checks) and the error codes callers
//! see for each provider.

use chrono::{TimeZone, Utc};
use unistore_storage::mock::{ListingStyle, MockClient};
use unistore_storage::{
    Backend, CopyOptions, ErrorCode, ListOptions, MoveOptions, Provider, ServiceError, SortBy,
    SortOrder, StorageBackend,
};

async fn backend_with(keys: &[(&str, &str)]) -> (Backend<MockClient>, MockClient) {
    let client = MockClient::new("media");
    for (key, data) in keys {
        client.insert(key, data.to_string()).await;
    }
    (Backend::new(client.clone()), client)
}

#[tokio::test]
async fn test_delete_missing_object_skips_provider() {
    let (backend, client) = backend_with(&[]).await;

    let err = backend.delete_object("nope.txt").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchKey);
    assert_eq!(err.provider(), Provider::Minio);
    assert_eq!(client.remove_calls(), 0);
}

#[tokio::test]
async fn test_delete_existing_object() {
    let (backend, client) = backend_with(&[("a.txt", "x")]).await;

    backend.delete_object("a.txt").await.unwrap();
    assert_eq!(client.remove_calls(), 1);
    assert!(!backend.object_exists("a.txt").await.unwrap());
}

#[tokio::test]
async fn test_copy_refuses_existing_destination() {
    let (backend, client) = backend_with(&[("src.txt", "new"), ("dst.txt", "old")]).await;

    let err = backend
        .copy_object("src.txt", "dst.txt", CopyOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ObjectAlreadyExists);
    assert_eq!(client.copy_calls(), 0);
}

#[tokio::test]
async fn test_copy_with_overwrite_replaces_destination() {
    let (backend, client) = backend_with(&[("src.txt", "new"), ("dst.txt", "old")]).await;

    backend
        .copy_object("src.txt", "dst.txt", CopyOptions { overwrite: true })
        .await
        .unwrap();
    assert_eq!(client.copy_calls(), 1);

    let data = backend.get_object("dst.txt").await.unwrap().bytes().await.unwrap();
    assert_eq!(&data[..], b"new");
}

#[tokio::test]
async fn test_copy_missing_source_is_no_such_key() {
    let (backend, _) = backend_with(&[]).await;

    let err = backend
        .copy_object("ghost.txt", "dst.txt", CopyOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchKey);
}

#[tokio::test]
async fn test_copy_validates_names_before_any_call() {
    let (backend, client) = backend_with(&[("src.txt", "x")]).await;

    for (src, dst, bad) in [
        ("src.txt", "dir/", "dir/"),
        ("/src.txt", "dst.txt", "/src.txt"),
        ("a//b", "c\\d", "a//b"),
        ("src.txt", "", ""),
    ] {
        let err = backend
            .copy_object(src, dst, CopyOptions { overwrite: true })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidObjectName);
        assert!(err.message().ends_with(bad), "{} should name {:?}", err, bad);
    }
    assert_eq!(client.copy_calls(), 0);
}

#[tokio::test]
async fn test_move_deletes_source_after_copy() {
    let (backend, client) = backend_with(&[("src.txt", "x")]).await;

    backend
        .move_object("src.txt", "dst.txt", MoveOptions::default())
        .await
        .unwrap();
    assert!(!client.contains("src.txt").await);
    assert!(client.contains("dst.txt").await);
}

#[tokio::test]
async fn test_move_preserving_source() {
    let (backend, client) = backend_with(&[("src.txt", "x"), ("dst.txt", "old")]).await;

    backend
        .move_object("src.txt", "dst.txt", MoveOptions { preserve_source: true })
        .await
        .unwrap();
    assert!(client.contains("src.txt").await);
    assert_eq!(client.remove_calls(), 0);
}

#[tokio::test]
async fn test_move_onto_itself_keeps_object() {
    let (backend, client) = backend_with(&[("k", "payload")]).await;

    backend
        .move_object("k", "k", MoveOptions::default())
        .await
        .unwrap();
    assert!(client.contains("k").await);
    assert_eq!(client.copy_calls(), 0);
    assert_eq!(client.remove_calls(), 0);

    let data = backend.get_object("k").await.unwrap().bytes().await.unwrap();
    assert_eq!(&data[..], b"payload");
}

#[tokio::test]
async fn test_move_missing_object_onto_itself() {
    let (backend, client) = backend_with(&[]).await;

    let err = backend
        .move_object("k", "k", MoveOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchKey);
    assert_eq!(client.copy_calls(), 0);
}

#[tokio::test]
async fn test_copy_onto_itself_is_refused_by_provider() {
    let (backend, client) = backend_with(&[("k", "payload")]).await;

    let err = backend
        .copy_object("k", "k", CopyOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ObjectAlreadyExists);

    let err = backend
        .copy_object("k", "k", CopyOptions { overwrite: true })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unknown);
    assert!(client.contains("k").await);
}

#[tokio::test]
async fn test_failed_copy_leaves_source() {
    let (backend, client) = backend_with(&[("src.txt", "x")]).await;
    client
        .fail_copy_with(ServiceError::new("RequestTimeout", "Request timed out.").with_status(400))
        .await;

    let err = backend
        .move_object("src.txt", "dst.txt", MoveOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RequestTimeout);
    assert!(client.contains("src.txt").await);
    assert_eq!(client.remove_calls(), 0);
}

#[tokio::test]
async fn test_unmapped_provider_code_is_unknown() {
    let (backend, client) = backend_with(&[("src.txt", "x")]).await;
    client
        .fail_copy_with(ServiceError::new("SlowDownPlease", "throttled"))
        .await;

    let err = backend
        .copy_object("src.txt", "dst.txt", CopyOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unknown);
    assert!(err.native().is_some());
}

#[tokio::test]
async fn test_get_missing_object() {
    let (backend, _) = backend_with(&[]).await;
    let err = backend.get_object("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_put_then_get_round_trip() {
    let (backend, _) = backend_with(&[]).await;

    let mut body: &[u8] = b"frame data";
    backend.put_object("clips/a.raw", &mut body).await.unwrap();

    let data = backend
        .get_object("clips/a.raw")
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&data[..], b"frame data");
}

#[tokio::test]
async fn test_fput_missing_file_is_no_such_file() {
    let (backend, client) = backend_with(&[]).await;
    let dir = tempfile::tempdir().unwrap();

    let err = backend
        .fput_object(&dir.path().join("absent.bin"), "absent.bin")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchFile);
    assert!(client.keys().await.is_empty());
}

#[tokio::test]
async fn test_fput_and_fget_through_files() {
    let (backend, _) = backend_with(&[]).await;
    let dir = tempfile::tempdir().unwrap();

    let upload = dir.path().join("upload.txt");
    tokio::fs::write(&upload, b"on disk").await.unwrap();
    backend.fput_object(&upload, "docs/upload.txt").await.unwrap();

    let download = dir.path().join("download.txt");
    backend.fget_object("docs/upload.txt", &download).await.unwrap();
    assert_eq!(tokio::fs::read(&download).await.unwrap(), b"on disk");
}

#[tokio::test]
async fn test_open_creates_missing_bucket() {
    let client = MockClient::without_bucket(Provider::Oss, "fresh");

    let backend = Backend::open(client.clone(), true).await.unwrap();
    assert!(backend.bucket_exists("fresh").await.unwrap());
    assert_eq!(backend.provider(), Provider::Oss);
}

#[tokio::test]
async fn test_open_without_create_reports_missing_bucket() {
    let client = MockClient::without_bucket(Provider::S3, "absent");

    let err = Backend::open(client, false).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchBucket);
    assert_eq!(err.provider(), Provider::S3);
}

#[tokio::test]
async fn test_create_bucket_twice_maps_per_provider() {
    for provider in [Provider::Minio, Provider::S3, Provider::Oss] {
        let backend = Backend::new(MockClient::for_provider(provider, "taken"));
        let err = backend.create_bucket("taken").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::BucketAlreadyExists, "{}", provider);
    }
}

#[tokio::test]
async fn test_ensure_bucket_is_idempotent() {
    let backend = Backend::new(MockClient::without_bucket(Provider::Minio, "b"));
    backend.ensure_bucket("b").await.unwrap();
    backend.ensure_bucket("b").await.unwrap();
    assert!(backend.bucket_exists("b").await.unwrap());
}

#[tokio::test]
async fn test_object_exists_in_missing_bucket() {
    let backend = Backend::new(MockClient::without_bucket(Provider::Oss, "gone"));
    let err = backend.object_exists("a").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchBucket);
}

#[tokio::test]
async fn test_list_one_level_excludes_directories() {
    let (backend, _) =
        backend_with(&[("a/x.txt", "hello"), ("a/sub/", ""), ("a/y.txt", "abc")]).await;

    let objects = backend
        .list_objects(&ListOptions::new("a/"))
        .await
        .unwrap();
    let listed: Vec<(&str, i64)> = objects.iter().map(|o| (o.name(), o.size())).collect();
    assert_eq!(listed, [("a/x.txt", 5), ("a/y.txt", 3)]);
}

#[tokio::test]
async fn test_list_with_directories_in_both_styles() {
    for style in [ListingStyle::Stream, ListingStyle::Paged] {
        let client = MockClient::new("media").with_style(style);
        for key in ["a/x.txt", "a/sub/one", "a/sub/two", "a/y.txt"] {
            client.insert(key, "data").await;
        }
        let backend = Backend::new(client);

        let options = ListOptions::new("a").with_directories(true).with_page_size(1);
        let names: Vec<String> = backend
            .list_objects(&options)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name().to_string())
            .collect();
        assert_eq!(names, ["a/sub/", "a/x.txt", "a/y.txt"], "{:?}", style);
    }
}

#[tokio::test]
async fn test_list_own_marker_never_lists() {
    let (backend, _) = backend_with(&[("a/", ""), ("a/b.txt", "x")]).await;

    let objects = backend
        .list_objects(&ListOptions::new("a/").with_recursive(true).with_directories(true))
        .await
        .unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name(), "a/b.txt");
}

#[tokio::test]
async fn test_list_sorted_by_modification_time() {
    let client = MockClient::new("media");
    for (key, day) in [("logs/b", 3), ("logs/a", 1), ("logs/c", 2)] {
        let at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        client.insert_at(key, "x", at).await;
    }
    let backend = Backend::new(client);

    let options = ListOptions::new("logs").with_sort(SortBy::LastModified, SortOrder::Descending);
    let names: Vec<String> = backend
        .list_objects(&options)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.name().to_string())
        .collect();
    assert_eq!(names, ["logs/b", "logs/c", "logs/a"]);
}

#[tokio::test]
async fn test_list_error_fails_whole_listing() {
    for style in [ListingStyle::Stream, ListingStyle::Paged] {
        let client = MockClient::new("media").with_style(style);
        for i in 0..6 {
            client.insert(&format!("k/{}", i), "x").await;
        }
        client
            .fail_listing_at(1, ServiceError::new("RequestTimeout", "Request timed out."))
            .await;
        let backend = Backend::new(client);

        let options = ListOptions::new("k").with_concurrency(3).with_page_size(2);
        let err = backend.list_objects(&options).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::RequestTimeout, "{:?}", style);
    }
}

#[tokio::test]
async fn test_list_missing_bucket() {
    let backend = Backend::new(MockClient::without_bucket(Provider::Oss, "gone"));
    let err = backend.list_objects(&ListOptions::default()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchBucket);
}
