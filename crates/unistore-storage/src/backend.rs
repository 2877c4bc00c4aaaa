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

//! The unified facade
//!
//! [`Backend`] implements [`StorageBackend`] once for every [`ProviderClient`]. Each
//! client error goes through the client's [`ErrorConverter`]; conditions detected
//! here (missing source file, missing object before delete, occupied copy
//! destination, invalid key) are reported directly without calling the provider.

use crate::chain::ErrorConverter;
use crate::data::ObjectData;
use crate::error::{Provider, StorageError, StorageResult};
use crate::keys::first_invalid_object_name;
use crate::listing;
use crate::object::ObjectInfo;
use crate::options::{CopyOptions, ListOptions, MoveOptions};
use crate::provider::ProviderClient;
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

/// Unified storage over one provider client
#[derive(Debug)]
pub struct Backend<C> {
    client: C,
    converter: ErrorConverter,
}

impl<C: ProviderClient> Backend<C> {
    /// Wrap `client` without touching the network
    pub fn new(client: C) -> Self {
        let converter = client.converter();
        Backend { client, converter }
    }

    /// Wrap `client` after making sure its bucket exists
    ///
    /// A missing bucket is created when `create_if_missing` is set and reported as
    /// `NoSuchBucket` otherwise.
    pub async fn open(client: C, create_if_missing: bool) -> StorageResult<Self> {
        let backend = Backend::new(client);
        let bucket = backend.client.bucket().to_string();

        if !backend.bucket_exists(&bucket).await? {
            if !create_if_missing {
                return Err(StorageError::bucket_not_found(backend.provider(), &bucket));
            }
            backend.create_bucket(&bucket).await?;
        }

        debug!(provider = %backend.provider(), bucket = %bucket, "Storage backend ready");
        Ok(backend)
    }

    /// The wrapped client
    pub fn client(&self) -> &C {
        &self.client
    }

    fn convert(&self, err: anyhow::Error) -> StorageError {
        self.converter.convert(err)
    }

    fn validate_names(&self, src: &str, dst: &str) -> StorageResult<()> {
        match first_invalid_object_name(&[src, dst]) {
            Some(key) => Err(StorageError::invalid_object_name(self.provider(), key)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<C: ProviderClient> StorageBackend for Backend<C> {
    fn provider(&self) -> Provider {
        self.client.provider()
    }

    fn bucket(&self) -> &str {
        self.client.bucket()
    }

    async fn create_bucket(&self, bucket: &str) -> StorageResult<()> {
        self.client
            .make_bucket(bucket)
            .await
            .map_err(|e| self.convert(e))?;
        info!(provider = %self.provider(), bucket, "Created bucket");
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.client
            .bucket_exists(bucket)
            .await
            .map_err(|e| self.convert(e))
    }

    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        if self.bucket_exists(bucket).await? {
            return Ok(());
        }
        self.create_bucket(bucket).await
    }

    async fn object_exists(&self, key: &str) -> StorageResult<bool> {
        self.client
            .object_exists(key)
            .await
            .map_err(|e| self.convert(e))
    }

    async fn get_object(&self, key: &str) -> StorageResult<ObjectData> {
        self.client.get_object(key).await.map_err(|e| self.convert(e))
    }

    async fn fget_object(&self, key: &str, path: &Path) -> StorageResult<()> {
        self.client
            .get_object_to_file(key, path)
            .await
            .map_err(|e| self.convert(e))
    }

    async fn fput_object(&self, path: &Path, key: &str) -> StorageResult<()> {
        let present = tokio::fs::try_exists(path).await.unwrap_or(false);
        if !present {
            return Err(StorageError::no_such_file(
                self.provider(),
                &path.display().to_string(),
            ));
        }

        self.client
            .put_object_from_file(path, key)
            .await
            .map_err(|e| self.convert(e))
    }

    async fn put_object(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<()> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| self.convert(e.into()))?;

        self.client
            .put_object(key, Bytes::from(buf))
            .await
            .map_err(|e| self.convert(e))
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        if !self.object_exists(key).await? {
            return Err(StorageError::object_not_found(self.provider(), key));
        }

        self.client
            .remove_object(key)
            .await
            .map_err(|e| self.convert(e))
    }

    async fn list_objects(&self, options: &ListOptions) -> StorageResult<Vec<ObjectInfo>> {
        let source = self.client.list_entries(options.request());
        listing::list_objects(source, options, self.converter).await
    }

    async fn copy_object(&self, src: &str, dst: &str, options: CopyOptions) -> StorageResult<()> {
        self.validate_names(src, dst)?;

        if !options.overwrite && self.object_exists(dst).await? {
            return Err(StorageError::object_already_exists(self.provider(), dst));
        }

        self.client
            .copy_object(src, dst)
            .await
            .map_err(|e| self.convert(e))
    }

    async fn move_object(&self, src: &str, dst: &str, options: MoveOptions) -> StorageResult<()> {
        self.validate_names(src, dst)?;

        // The object already sits at its destination
        if src == dst {
            if !self.object_exists(src).await? {
                return Err(StorageError::object_not_found(self.provider(), src));
            }
            debug!(key = %src, "Move onto itself, nothing to do");
            return Ok(());
        }

        self.copy_object(src, dst, CopyOptions { overwrite: true })
            .await?;

        if !options.preserve_source {
            self.delete_object(src).await?;
        }
        Ok(())
    }
}
