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

//! Aliyun OSS client
//!
//! Uses the S3-compatible OSS API with virtual-hosted addressing. Listing pages
//! explicitly: one pager walks the continuation tokens, and each page's objects and
//! common prefixes are queued for the listing workers.

use crate::chain::{CodeTable, ErrorConverter, ErrorProcessor, ProcessorChain, NO_SUCH_HOST};
use crate::data::ObjectData;
use crate::error::{ErrorCode, Provider};
use crate::listing::{EntrySource, ListPage, PageFetcher};
use crate::options::ListRequest;
use crate::provider::ProviderClient;
use crate::s3_compat::{into_page, sdk_error, S3Api};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use unistore_config::BackendConfig;

/// Region used when the endpoint host does not name one
pub const DEFAULT_OSS_REGION: &str = "oss-cn-hangzhou";

/// OSS error codes
pub const OSS_CODES: CodeTable = &[
    ("NoSuchKey", ErrorCode::NoSuchKey),
    ("NoSuchBucket", ErrorCode::NoSuchBucket),
    ("AccessDenied", ErrorCode::AccessDenied),
    ("BucketNotFound", ErrorCode::NoSuchBucket),
    ("RequestTimeout", ErrorCode::RequestTimeout),
    ("InvalidObjectName", ErrorCode::InvalidObjectName),
    ("InvalidAccessKeyId", ErrorCode::InvalidAccessKeyID),
    ("BucketAlreadyExists", ErrorCode::BucketAlreadyExists),
    ("SignatureDoesNotMatch", ErrorCode::InvalidAccessKeySecret),
];

/// Classification chain for OSS
pub fn error_chain() -> ProcessorChain {
    ProcessorChain::new(Provider::Oss)
        .then(ErrorProcessor::ServiceCode { table: OSS_CODES })
        .then(ErrorProcessor::Transport {
            needles: NO_SUCH_HOST,
            code: ErrorCode::BadGateway,
        })
        .then(ErrorProcessor::Message {
            literal: "access denied",
            code: ErrorCode::AccessDenied,
        })
}

/// Region of an endpoint such as `oss-cn-beijing.aliyuncs.com` or
/// `oss-cn-beijing-internal.aliyuncs.com`
pub fn oss_region(host: &str) -> &str {
    let label = host.split(['.', ':']).next().unwrap_or_default();
    let label = label.strip_suffix("-internal").unwrap_or(label);
    if label.len() > "oss-".len() && label.starts_with("oss-") {
        label
    } else {
        DEFAULT_OSS_REGION
    }
}

#[derive(Debug)]
struct OssPager {
    api: S3Api,
}

#[async_trait]
impl PageFetcher for OssPager {
    async fn fetch_page(&self, request: &ListRequest, token: Option<String>) -> Result<ListPage> {
        let output = self
            .api
            .list_request(request)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(into_page(output))
    }
}

/// Client for Aliyun OSS
#[derive(Debug, Clone)]
pub struct OssClient {
    pager: Arc<OssPager>,
}

impl OssClient {
    /// Build a client for `config`; no request is made
    pub fn new(config: &BackendConfig) -> Self {
        let region = oss_region(config.host());
        OssClient {
            pager: Arc::new(OssPager {
                api: S3Api::new(config, Provider::Oss, region, false),
            }),
        }
    }

    fn api(&self) -> &S3Api {
        &self.pager.api
    }
}

#[async_trait]
impl ProviderClient for OssClient {
    fn provider(&self) -> Provider {
        Provider::Oss
    }

    fn bucket(&self) -> &str {
        self.api().bucket()
    }

    fn converter(&self) -> ErrorConverter {
        ErrorConverter::new(Provider::Oss, error_chain)
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        self.api().make_bucket(bucket).await
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.api().bucket_exists(bucket).await
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        self.api().object_exists(key).await
    }

    async fn get_object(&self, key: &str) -> Result<ObjectData> {
        self.api().get_object(key).await
    }

    async fn get_object_to_file(&self, key: &str, path: &Path) -> Result<()> {
        self.api().get_object_to_file(key, path).await
    }

    async fn put_object(&self, key: &str, body: Bytes) -> Result<()> {
        self.api().put_object(key, body).await
    }

    async fn put_object_from_file(&self, path: &Path, key: &str) -> Result<()> {
        self.api().put_object_from_file(path, key).await
    }

    async fn remove_object(&self, key: &str) -> Result<()> {
        self.api().remove_object(key).await
    }

    async fn copy_object(&self, src: &str, dst: &str) -> Result<()> {
        self.api().copy_object(src, dst).await
    }

    fn list_entries(&self, request: ListRequest) -> EntrySource {
        EntrySource::paginated(Arc::clone(&self.pager), request)
    }
}
