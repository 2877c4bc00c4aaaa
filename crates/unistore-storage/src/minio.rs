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

//! MinIO & S3 client
//!
//! Talks to MinIO (or any S3-compatible server) with path-style addressing, and to
//! Amazon S3 itself with virtual-hosted addressing. Both share one error table.
//!
//! Listing follows the paginator: the SDK walks continuation tokens and the pages
//! are flattened into one entry stream that every listing worker drains. In a
//! single-level listing common prefixes come through as zero-size `dir/` entries.
//!
//! ```rust,no_run
//! use unistore_config::BackendConfig;
//! use unistore_storage::{minio::MinIOClient, Backend, ListOptions, StorageBackend};
//!
//! # async fn example() -> unistore_storage::StorageResult<()> {
//! let config = BackendConfig {
//!     endpoint: "http://localhost:9000".to_string(),
//!     access_key_id: "minioadmin".to_string(),
//!     access_key_secret: "minioadmin".to_string(),
//!     bucket_name: "media".to_string(),
//!     create_bucket_if_not_exists: true,
//! };
//!
//! let backend = Backend::open(MinIOClient::new(&config), true).await?;
//! for object in backend.list_objects(&ListOptions::new("photos")).await? {
//!     println!("{} {}", object.name(), object.size());
//! }
//! # Ok(())
//! # }
//! ```

use crate::chain::{
    CodeTable, ErrorConverter, ErrorProcessor, ProcessorChain, ServiceError, NO_SUCH_HOST,
};
use crate::data::ObjectData;
use crate::error::{ErrorCode, Provider};
use crate::listing::{EntrySource, RawEntry};
use crate::options::ListRequest;
use crate::provider::ProviderClient;
use crate::s3_compat::{into_page, sdk_error, S3Api, DEFAULT_REGION};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use unistore_config::BackendConfig;

/// MinIO and S3 error codes
pub const MINIO_CODES: CodeTable = &[
    ("NoSuchKey", ErrorCode::NoSuchKey),
    ("NoSuchBucket", ErrorCode::NoSuchBucket),
    ("RequestTimeout", ErrorCode::RequestTimeout),
    ("BucketNotFound", ErrorCode::NoSuchBucket),
    ("502 Bad Gateway", ErrorCode::BadGateway),
    ("InvalidAccessKeyId", ErrorCode::InvalidAccessKeyID),
    ("SignatureDoesNotMatch", ErrorCode::InvalidAccessKeySecret),
    ("BucketAlreadyOwnedByYou", ErrorCode::BucketAlreadyExists),
    ("XMinioInvalidObjectName", ErrorCode::InvalidObjectName),
];

fn chain_for(provider: Provider) -> ProcessorChain {
    ProcessorChain::new(provider)
        .then(ErrorProcessor::ServiceCode { table: MINIO_CODES })
        // an unresolvable host means the virtual-hosted bucket name does not exist
        .then(ErrorProcessor::Transport {
            needles: NO_SUCH_HOST,
            code: ErrorCode::NoSuchBucket,
        })
        .then(ErrorProcessor::Message {
            literal: "access denied",
            code: ErrorCode::AccessDenied,
        })
}

/// Classification chain for MinIO
pub fn error_chain() -> ProcessorChain {
    chain_for(Provider::Minio)
}

/// Classification chain for Amazon S3
pub fn s3_error_chain() -> ProcessorChain {
    chain_for(Provider::S3)
}

/// Region named by an AWS endpoint host such as `s3.eu-west-1.amazonaws.com`
pub fn aws_region(host: &str) -> &str {
    let Some(rest) = host.strip_suffix(".amazonaws.com") else {
        return DEFAULT_REGION;
    };
    let label = rest.rsplit('.').next().unwrap_or(rest);
    match rest.strip_prefix("s3.").or_else(|| label.strip_prefix("s3-")) {
        Some(region) if !region.is_empty() && region != "s3" => region,
        _ => DEFAULT_REGION,
    }
}

/// Client for MinIO, or for Amazon S3 when built with [`MinIOClient::aws`]
#[derive(Debug, Clone)]
pub struct MinIOClient {
    api: S3Api,
    provider: Provider,
}

impl MinIOClient {
    /// MinIO client using path-style addressing
    pub fn new(config: &BackendConfig) -> Self {
        MinIOClient {
            api: S3Api::new(config, Provider::Minio, DEFAULT_REGION, true),
            provider: Provider::Minio,
        }
    }

    /// Amazon S3 client using virtual-hosted addressing
    pub fn aws(config: &BackendConfig) -> Self {
        let region = aws_region(config.host());
        MinIOClient {
            api: S3Api::new(config, Provider::S3, region, false),
            provider: Provider::S3,
        }
    }

    /// The underlying S3 API wrapper
    pub fn api(&self) -> &S3Api {
        &self.api
    }
}

#[async_trait]
impl ProviderClient for MinIOClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn bucket(&self) -> &str {
        self.api.bucket()
    }

    fn converter(&self) -> ErrorConverter {
        match self.provider {
            Provider::S3 => ErrorConverter::new(Provider::S3, s3_error_chain),
            _ => ErrorConverter::new(Provider::Minio, error_chain),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        self.api.make_bucket(bucket).await
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.api.bucket_exists(bucket).await
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        self.api.object_exists(key).await
    }

    async fn get_object(&self, key: &str) -> Result<ObjectData> {
        // GetObject on a missing key fails lazily on some servers; stat first
        if !self.api.object_exists(key).await? {
            return Err(ServiceError::new(
                "NoSuchKey",
                format!("The specified key does not exist: {}", key),
            )
            .with_status(404)
            .into());
        }
        self.api.get_object(key).await
    }

    async fn get_object_to_file(&self, key: &str, path: &Path) -> Result<()> {
        self.api.get_object_to_file(key, path).await
    }

    async fn put_object(&self, key: &str, body: Bytes) -> Result<()> {
        self.api.put_object(key, body).await
    }

    async fn put_object_from_file(&self, path: &Path, key: &str) -> Result<()> {
        self.api.put_object_from_file(path, key).await
    }

    async fn remove_object(&self, key: &str) -> Result<()> {
        self.api.remove_object(key).await
    }

    async fn copy_object(&self, src: &str, dst: &str) -> Result<()> {
        self.api.copy_object(src, dst).await
    }

    fn list_entries(&self, request: ListRequest) -> EntrySource {
        let pages = self.api.list_request(&request).into_paginator().send();

        let entries = stream::unfold(pages, |mut pages| async move {
            pages.next().await.map(|page| (page, pages))
        })
        .map(|page| -> Result<_> {
            let page = into_page(page.map_err(sdk_error)?);
            let prefixes = page
                .common_prefixes
                .into_iter()
                .map(|prefix| RawEntry::object(prefix, 0, None));
            let entries: Vec<RawEntry> = page.entries.into_iter().chain(prefixes).collect();
            Ok(stream::iter(entries.into_iter().map(Ok::<_, anyhow::Error>)))
        })
        .try_flatten();

        EntrySource::from_stream(entries)
    }
}
