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

//! Provider client seam
//!
//! A [`ProviderClient`] is a thin passthrough to one provider's SDK. It reports
//! failures as native errors; [`Backend`](crate::Backend) owns the classification
//! and the behavior every provider must share.

use crate::chain::ErrorConverter;
use crate::data::ObjectData;
use crate::error::Provider;
use crate::listing::EntrySource;
use crate::options::ListRequest;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::path::Path;

/// One provider's raw operations
#[async_trait]
pub trait ProviderClient: Send + Sync + Debug + 'static {
    /// Provider tag reported in errors
    fn provider(&self) -> Provider;

    /// Bucket objects are read from and written to
    fn bucket(&self) -> &str;

    /// Classifier for this provider's native errors
    fn converter(&self) -> ErrorConverter;

    /// Create `bucket`
    async fn make_bucket(&self, bucket: &str) -> anyhow::Result<()>;

    /// Whether `bucket` exists
    async fn bucket_exists(&self, bucket: &str) -> anyhow::Result<bool>;

    /// Whether `key` exists; a missing object is `Ok(false)`, not an error
    async fn object_exists(&self, key: &str) -> anyhow::Result<bool>;

    /// Open `key` for reading
    async fn get_object(&self, key: &str) -> anyhow::Result<ObjectData>;

    /// Download `key` into the file at `path`
    async fn get_object_to_file(&self, key: &str, path: &Path) -> anyhow::Result<()>;

    /// Upload `body` as `key`
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;

    /// Upload the file at `path` as `key`
    async fn put_object_from_file(&self, path: &Path, key: &str) -> anyhow::Result<()>;

    /// Delete `key`
    async fn remove_object(&self, key: &str) -> anyhow::Result<()>;

    /// Server-side copy of `src` to `dst`, replacing `dst`
    async fn copy_object(&self, src: &str, dst: &str) -> anyhow::Result<()>;

    /// Enumerate the entries for `request`
    ///
    /// Nothing is fetched until the returned source is polled.
    fn list_entries(&self, request: ListRequest) -> EntrySource;
}
