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

//! Integration tests against a real MinIO server
//!
//! # Prerequisites
//!
//! MinIO must be running before executing these tests:
//! ```bash
//! docker run -d -p 9000:9000 minio/minio server /data
//! cargo test -p unistore-storage --test minio_docker_tests -- --ignored
//! ```
//!
//! # Configuration
//!
//! - Endpoint: http://localhost:9000
//! - Access Key: minioadmin
//! - Secret Key: minioadmin
//! - Bucket: unistore-test (created on first use)

#[cfg(test)]
mod minio_docker_tests {
    use unistore_config::{BackendConfig, BackendType, Config};
    use unistore_storage::{
        open_backend, CopyOptions, ErrorCode, ListOptions, MoveOptions, StorageBackend,
    };
    use std::sync::Arc;

    fn test_config(bucket: &str) -> Config {
        let mut config = Config::new(
            BackendType::Minio,
            BackendConfig {
                endpoint: "http://localhost:9000".to_string(),
                access_key_id: "minioadmin".to_string(),
                access_key_secret: "minioadmin".to_string(),
                bucket_name: bucket.to_string(),
                create_bucket_if_not_exists: true,
            },
        );
        config.listing.concurrency = 4;
        config
    }

    /// Helper function to open the test bucket
    async fn create_test_backend() -> Arc<dyn StorageBackend> {
        open_backend(&test_config("unistore-test"))
            .await
            .expect("Failed to open MinIO backend")
    }

    async fn put(backend: &Arc<dyn StorageBackend>, key: &str, data: &[u8]) {
        let mut body = data;
        backend
            .put_object(key, &mut body)
            .await
            .expect("Failed to put object to MinIO");
    }

    /// Test basic PUT and GET operations
    #[tokio::test]
    #[ignore] // Requires MinIO to be running
    async fn test_minio_put_and_get() {
        let backend = create_test_backend().await;

        put(&backend, "test/basic.txt", b"Hello from MinIO!").await;

        let data = backend
            .get_object("test/basic.txt")
            .await
            .expect("Failed to get object from MinIO")
            .bytes()
            .await
            .unwrap();
        assert_eq!(&data[..], b"Hello from MinIO!");
    }

    /// Test error classification for a missing key
    #[tokio::test]
    #[ignore] // Requires MinIO
    async fn test_minio_missing_key() {
        let backend = create_test_backend().await;

        let err = backend.get_object("test/never-written").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoSuchKey);

        let err = backend.delete_object("test/never-written").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoSuchKey);
    }

    /// Test copy and move semantics
    #[tokio::test]
    #[ignore] // Requires MinIO
    async fn test_minio_copy_and_move() {
        let backend = create_test_backend().await;
        put(&backend, "test/copy/src.txt", b"copy me").await;
        let _ = backend.delete_object("test/copy/dst.txt").await;

        backend
            .copy_object("test/copy/src.txt", "test/copy/dst.txt", CopyOptions::default())
            .await
            .unwrap();
        let err = backend
            .copy_object("test/copy/src.txt", "test/copy/dst.txt", CopyOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ObjectAlreadyExists);

        backend
            .move_object("test/copy/src.txt", "test/copy/moved.txt", MoveOptions::default())
            .await
            .unwrap();
        assert!(!backend.object_exists("test/copy/src.txt").await.unwrap());
        assert!(backend.object_exists("test/copy/moved.txt").await.unwrap());
    }

    /// Test listing across several pages with concurrent workers
    #[tokio::test]
    #[ignore] // Requires MinIO
    async fn test_minio_list_objects() {
        let backend = create_test_backend().await;
        for i in 0..25 {
            put(&backend, &format!("test/list/{:02}.bin", i), &[0u8; 8]).await;
        }
        put(&backend, "test/list/nested/inner.bin", b"x").await;

        let options = ListOptions::new("test/list")
            .with_concurrency(4)
            .with_page_size(10);
        let objects = backend.list_objects(&options).await.unwrap();
        assert_eq!(objects.len(), 25);
        assert!(objects.windows(2).all(|w| w[0].name() < w[1].name()));

        let with_dirs = backend
            .list_objects(&options.clone().with_directories(true))
            .await
            .unwrap();
        assert!(with_dirs.iter().any(|o| o.name() == "test/list/nested/" && o.is_dir()));
    }

    /// Test fput/fget through the local filesystem
    #[tokio::test]
    #[ignore] // Requires MinIO
    async fn test_minio_file_transfer() {
        let backend = create_test_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let upload = dir.path().join("upload.bin");
        tokio::fs::write(&upload, vec![7u8; 4096]).await.unwrap();

        backend.fput_object(&upload, "test/file/upload.bin").await.unwrap();
        let download = dir.path().join("nested").join("download.bin");
        backend
            .fget_object("test/file/upload.bin", &download)
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&download).await.unwrap(), vec![7u8; 4096]);
    }

    /// Test that a missing bucket is reported when creation is disabled
    #[tokio::test]
    #[ignore] // Requires MinIO
    async fn test_minio_missing_bucket() {
        let mut config = test_config("unistore-never-created");
        config.config.create_bucket_if_not_exists = false;

        let err = open_backend(&config).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoSuchBucket);
    }
}
