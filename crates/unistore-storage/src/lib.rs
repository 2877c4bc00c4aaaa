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

//! Unified object storage for Unistore
//!
//! This crate puts one asynchronous interface in front of three providers:
//! - MinIO and other S3-compatible servers
//! - Amazon S3
//! - Aliyun OSS
//!
//! # Architecture
//!
//! Each provider is a thin [`ProviderClient`] that speaks the provider's protocol and
//! reports failures as raw `anyhow` errors carrying the provider's own code. The
//! generic [`Backend`] wraps a client and implements [`StorageBackend`], the facade
//! callers program against. Every provider failure is classified by the provider's
//! [`ProcessorChain`] into a [`StorageError`] with a common [`ErrorCode`], so callers
//! never match on provider-specific strings.
//!
//! Listings are enumerated by the client and consumed by a pool of workers
//! (see [`listing`]), then filtered and sorted into [`ObjectInfo`] values.
//!
//! # Examples
//!
//! ```no_run
//! use unistore_config::ConfigLoader;
//! use unistore_storage::{open_backend, ListOptions, SortBy, SortOrder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load_file("unistore.toml").await?;
//!     let storage = open_backend(&config).await?;
//!
//!     let options = ListOptions::new("reports/")
//!         .with_recursive(true)
//!         .with_concurrency(4)
//!         .with_sort(SortBy::LastModified, SortOrder::Descending);
//!
//!     for object in storage.list_objects(&options).await? {
//!         println!("{} {}", object.size(), object.name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! ```no_run
//! # use unistore_storage::{StorageBackend, ErrorCode};
//! # async fn remove(storage: &dyn StorageBackend) -> anyhow::Result<()> {
//! match storage.delete_object("stale.bin").await {
//!     Ok(()) => {}
//!     Err(e) if e.code() == ErrorCode::NoSuchKey => println!("already gone"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod chain;
pub mod data;
pub mod error;
pub mod keys;
pub mod listing;
pub mod minio;
pub mod mock;
pub mod object;
pub mod options;
pub mod oss;
pub mod provider;
pub mod s3_compat;

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::info;
use unistore_config::Config;

pub use backend::Backend;
pub use chain::{ErrorConverter, ErrorProcessor, ProcessorChain, ServiceError};
pub use data::ObjectData;
pub use error::{ErrorCode, Provider, StorageError, StorageResult};
pub use minio::MinIOClient;
pub use object::{ObjectInfo, SortBy, SortOrder};
pub use options::{CopyOptions, ListOptions, MoveOptions};
pub use oss::OssClient;
pub use provider::ProviderClient;

/// Storage facade shared by every provider
///
/// All operations act on the bucket the backend was opened with, except the bucket
/// operations which take the bucket name explicitly. Every error is a
/// [`StorageError`] tagged with the provider and a common [`ErrorCode`].
///
/// # Examples
///
/// ```rust,no_run
/// # use unistore_storage::{Backend, CopyOptions, StorageBackend, mock::MockClient};
/// #[tokio::main]
/// async fn example() -> unistore_storage::StorageResult<()> {
///     let storage: Box<dyn StorageBackend> = Box::new(Backend::new(MockClient::new("media")));
///
///     let mut body: &[u8] = b"raw frames";
///     storage.put_object("clips/a.raw", &mut body).await?;
///     storage
///         .copy_object("clips/a.raw", "archive/a.raw", CopyOptions::default())
///         .await?;
///     assert!(storage.object_exists("archive/a.raw").await?);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// Provider behind this backend
    fn provider(&self) -> Provider;

    /// Bucket all object operations act on
    fn bucket(&self) -> &str;

    /// Create `bucket`
    ///
    /// # Errors
    ///
    /// `BucketAlreadyExists` when the bucket is already there, whoever owns it.
    async fn create_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Whether `bucket` exists
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Create `bucket` unless it already exists
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Whether `key` exists
    ///
    /// A missing object is `Ok(false)`; a missing bucket is `NoSuchBucket`.
    async fn object_exists(&self, key: &str) -> StorageResult<bool>;

    /// Open `key` for reading
    ///
    /// # Errors
    ///
    /// `NoSuchKey` when the object does not exist.
    async fn get_object(&self, key: &str) -> StorageResult<ObjectData>;

    /// Download `key` into the local file at `path`
    async fn fget_object(&self, key: &str, path: &Path) -> StorageResult<()>;

    /// Upload the local file at `path` as `key`
    ///
    /// # Errors
    ///
    /// `NoSuchFile` when `path` does not exist; nothing is sent to the provider.
    async fn fput_object(&self, path: &Path, key: &str) -> StorageResult<()>;

    /// Upload everything `reader` yields as `key`, replacing any existing object
    async fn put_object(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<()>;

    /// Delete `key`
    ///
    /// # Errors
    ///
    /// `NoSuchKey` when the object does not exist. The provider is not asked to
    /// delete anything in that case.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;

    /// List objects under the options' prefix
    ///
    /// Results are filtered to the prefix, stripped of directory placeholders unless
    /// requested, and sorted per the options. Any enumeration failure fails the
    /// whole listing.
    async fn list_objects(&self, options: &ListOptions) -> StorageResult<Vec<ObjectInfo>>;

    /// Server-side copy of `src` to `dst`
    ///
    /// # Errors
    ///
    /// - `InvalidObjectName` when either key is not a valid object name
    /// - `ObjectAlreadyExists` when `dst` exists and `overwrite` is off
    async fn copy_object(&self, src: &str, dst: &str, options: CopyOptions) -> StorageResult<()>;

    /// Copy `src` to `dst`, overwriting, then delete `src` unless it is preserved
    ///
    /// A failed copy leaves the source untouched.
    async fn move_object(&self, src: &str, dst: &str, options: MoveOptions) -> StorageResult<()>;
}

/// Build the backend selected by `config`
///
/// The bucket is checked once; when it is missing it is created if
/// `create_bucket_if_not_exists` is set and reported as `NoSuchBucket` otherwise.
pub async fn open_backend(config: &Config) -> StorageResult<Arc<dyn StorageBackend>> {
    let settings = &config.config;
    let create = settings.create_bucket_if_not_exists;

    let backend: Arc<dyn StorageBackend> = match config.backend_type {
        Provider::Minio => Arc::new(Backend::open(MinIOClient::new(settings), create).await?),
        Provider::S3 => Arc::new(Backend::open(MinIOClient::aws(settings), create).await?),
        Provider::Oss => Arc::new(Backend::open(OssClient::new(settings), create).await?),
    };

    info!(
        provider = %backend.provider(),
        bucket = backend.bucket(),
        endpoint = %settings.host(),
        "Opened storage backend"
    );
    Ok(backend)
}
