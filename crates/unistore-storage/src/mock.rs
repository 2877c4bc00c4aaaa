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

//! In-memory provider client for testing
//!
//! [`MockClient`] keeps objects in a `BTreeMap` behind a tokio `RwLock` and answers
//! with the same native error codes the real provider would, so the provider's
//! classification chain runs unchanged. It can emulate either listing style, inject
//! listing and copy failures, and count the calls tests need to assert on.
//!
//! ```rust,no_run
//! use unistore_storage::mock::MockClient;
//! use unistore_storage::{Backend, ListOptions, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() -> unistore_storage::StorageResult<()> {
//!     let client = MockClient::new("media");
//!     client.insert("a/x.txt", "hello").await;
//!
//!     let backend = Backend::new(client);
//!     let objects = backend.list_objects(&ListOptions::new("a")).await?;
//!     assert_eq!(objects.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::chain::{ErrorConverter, ServiceError};
use crate::data::ObjectData;
use crate::error::Provider;
use crate::listing::{EntrySource, ListPage, PageFetcher, RawEntry};
use crate::options::ListRequest;
use crate::provider::ProviderClient;
use crate::{minio, oss};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Which pagination style the mock emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingStyle {
    /// One entry stream; common prefixes arrive as zero-size `dir/` objects
    #[default]
    Stream,
    /// Continuation-token pages carrying objects and common prefixes separately
    Paged,
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Object(RawEntry),
    Prefix(String),
}

#[derive(Debug, Default)]
struct Faults {
    /// Entry index (stream style) or page index (paged style) and the error to raise
    listing: Option<(usize, ServiceError)>,
    copy: Option<ServiceError>,
}

#[derive(Debug, Default)]
struct Counters {
    removes: AtomicUsize,
    copies: AtomicUsize,
    list_requests: AtomicUsize,
}

struct MockState {
    provider: Provider,
    bucket: String,
    buckets: RwLock<BTreeSet<String>>,
    objects: RwLock<BTreeMap<String, StoredObject>>,
    faults: RwLock<Faults>,
    counters: Counters,
}

/// In-memory provider client
#[derive(Clone)]
pub struct MockClient {
    state: Arc<MockState>,
    style: ListingStyle,
}

impl MockClient {
    /// MinIO-flavoured client whose bucket already exists
    pub fn new(bucket: &str) -> Self {
        Self::build(Provider::Minio, bucket, ListingStyle::Stream, true)
    }

    /// Client for `provider`; OSS defaults to paged listing, the others to a stream
    pub fn for_provider(provider: Provider, bucket: &str) -> Self {
        let style = match provider {
            Provider::Oss => ListingStyle::Paged,
            _ => ListingStyle::Stream,
        };
        Self::build(provider, bucket, style, true)
    }

    /// Client whose bucket has not been created yet
    pub fn without_bucket(provider: Provider, bucket: &str) -> Self {
        Self::build(provider, bucket, ListingStyle::Stream, false)
    }

    fn build(provider: Provider, bucket: &str, style: ListingStyle, create: bool) -> Self {
        let mut buckets = BTreeSet::new();
        if create {
            buckets.insert(bucket.to_string());
        }
        MockClient {
            state: Arc::new(MockState {
                provider,
                bucket: bucket.to_string(),
                buckets: RwLock::new(buckets),
                objects: RwLock::new(BTreeMap::new()),
                faults: RwLock::new(Faults::default()),
                counters: Counters::default(),
            }),
            style,
        }
    }

    /// Switch the listing style
    pub fn with_style(mut self, style: ListingStyle) -> Self {
        self.style = style;
        self
    }

    /// Store `data` under `key`, stamped with the current time
    pub async fn insert(&self, key: &str, data: impl Into<Bytes>) {
        self.insert_at(key, data, Utc::now()).await;
    }

    /// Store `data` under `key` with an explicit modification time
    pub async fn insert_at(&self, key: &str, data: impl Into<Bytes>, last_modified: DateTime<Utc>) {
        self.state.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data: data.into(),
                last_modified,
            },
        );
    }

    /// Whether `key` is stored
    pub async fn contains(&self, key: &str) -> bool {
        self.state.objects.read().await.contains_key(key)
    }

    /// Stored keys in order
    pub async fn keys(&self) -> Vec<String> {
        self.state.objects.read().await.keys().cloned().collect()
    }

    /// Fail the listing at entry `at` (stream style) or at the `at`-th page request
    /// made by this client (paged style)
    pub async fn fail_listing_at(&self, at: usize, error: ServiceError) {
        self.state.faults.write().await.listing = Some((at, error));
    }

    /// Fail every copy with `error`
    pub async fn fail_copy_with(&self, error: ServiceError) {
        self.state.faults.write().await.copy = Some(error);
    }

    /// Number of delete calls that reached the client
    pub fn remove_calls(&self) -> usize {
        self.state.counters.removes.load(Ordering::SeqCst)
    }

    /// Number of copy calls that reached the client
    pub fn copy_calls(&self) -> usize {
        self.state.counters.copies.load(Ordering::SeqCst)
    }

    /// Number of listing requests (one per stream, one per page when paged)
    pub fn list_requests(&self) -> usize {
        self.state.counters.list_requests.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for MockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClient")
            .field("provider", &self.state.provider)
            .field("bucket", &self.state.bucket)
            .field("style", &self.style)
            .finish()
    }
}

fn no_such_key(key: &str) -> anyhow::Error {
    ServiceError::new("NoSuchKey", format!("The specified key does not exist: {}", key))
        .with_status(404)
        .into()
}

impl MockState {
    fn bucket_exists_code(&self) -> &'static str {
        match self.provider {
            Provider::Oss => "BucketAlreadyExists",
            _ => "BucketAlreadyOwnedByYou",
        }
    }

    async fn require_bucket(&self) -> Result<()> {
        if self.buckets.read().await.contains(&self.bucket) {
            return Ok(());
        }
        Err(ServiceError::new(
            "NoSuchBucket",
            format!("The specified bucket does not exist: {}", self.bucket),
        )
        .with_status(404)
        .into())
    }

    async fn read(&self, key: &str) -> Result<Bytes> {
        self.require_bucket().await?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| no_such_key(key))
    }

    /// Everything `request` would enumerate, rolled up by its delimiter
    async fn snapshot(&self, request: &ListRequest) -> Result<Vec<Item>> {
        self.require_bucket().await?;
        self.counters.list_requests.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.read().await;
        let prefix = request.prefix.as_str();
        let mut items = Vec::new();
        let mut last_rollup: Option<String> = None;

        for (key, object) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }

            if !request.recursive() {
                if let Some(slash) = key[prefix.len()..].find('/') {
                    let dir = &key[..prefix.len() + slash + 1];
                    if last_rollup.as_deref() != Some(dir) {
                        last_rollup = Some(dir.to_string());
                        items.push(Item::Prefix(dir.to_string()));
                    }
                    continue;
                }
            }

            let size = i64::try_from(object.data.len()).unwrap_or(i64::MAX);
            items.push(Item::Object(RawEntry::object(
                key.clone(),
                size,
                Some(object.last_modified),
            )));
        }

        Ok(items)
    }
}

struct MockPager {
    state: Arc<MockState>,
}

#[async_trait]
impl PageFetcher for MockPager {
    async fn fetch_page(&self, request: &ListRequest, token: Option<String>) -> Result<ListPage> {
        let page_index = self.state.counters.list_requests.load(Ordering::SeqCst);
        let items = self.state.snapshot(request).await?;

        if let Some((at, error)) = &self.state.faults.read().await.listing {
            if *at == page_index {
                return Err(error.clone().into());
            }
        }

        let start: usize = match token {
            Some(token) => token.parse().context("malformed continuation token")?,
            None => 0,
        };
        let end = (start + request.page_size.max(1)).min(items.len());

        let mut page = ListPage::default();
        for item in items.get(start..end).unwrap_or_default() {
            match item {
                Item::Object(entry) => page.entries.push(entry.clone()),
                Item::Prefix(prefix) => page.common_prefixes.push(prefix.clone()),
            }
        }
        if end < items.len() {
            page.next_token = Some(end.to_string());
        }
        Ok(page)
    }
}

#[async_trait]
impl ProviderClient for MockClient {
    fn provider(&self) -> Provider {
        self.state.provider
    }

    fn bucket(&self) -> &str {
        &self.state.bucket
    }

    fn converter(&self) -> ErrorConverter {
        match self.state.provider {
            Provider::Minio => ErrorConverter::new(Provider::Minio, minio::error_chain),
            Provider::S3 => ErrorConverter::new(Provider::S3, minio::s3_error_chain),
            Provider::Oss => ErrorConverter::new(Provider::Oss, oss::error_chain),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        let mut buckets = self.state.buckets.write().await;
        if !buckets.insert(bucket.to_string()) {
            return Err(ServiceError::new(
                self.state.bucket_exists_code(),
                format!("The requested bucket name is not available: {}", bucket),
            )
            .with_status(409)
            .into());
        }
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.state.buckets.read().await.contains(bucket))
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        self.state.require_bucket().await?;
        Ok(self.state.objects.read().await.contains_key(key))
    }

    async fn get_object(&self, key: &str) -> Result<ObjectData> {
        Ok(ObjectData::from_bytes(self.state.read(key).await?))
    }

    async fn get_object_to_file(&self, key: &str, path: &Path) -> Result<()> {
        let data = self.state.read(key).await?;
        tokio::fs::write(path, &data)
            .await
            .with_context(|| format!("writing {}", path.display()))
    }

    async fn put_object(&self, key: &str, body: Bytes) -> Result<()> {
        self.state.require_bucket().await?;
        self.insert(key, body).await;
        Ok(())
    }

    async fn put_object_from_file(&self, path: &Path, key: &str) -> Result<()> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        self.put_object(key, Bytes::from(data)).await
    }

    async fn remove_object(&self, key: &str) -> Result<()> {
        self.state.counters.removes.fetch_add(1, Ordering::SeqCst);
        self.state.require_bucket().await?;
        self.state.objects.write().await.remove(key);
        Ok(())
    }

    async fn copy_object(&self, src: &str, dst: &str) -> Result<()> {
        self.state.counters.copies.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.state.faults.read().await.copy {
            return Err(error.clone().into());
        }

        self.state.require_bucket().await?;
        let mut objects = self.state.objects.write().await;
        let source = objects.get(src).cloned().ok_or_else(|| no_such_key(src))?;
        if src == dst {
            return Err(ServiceError::new(
                "InvalidRequest",
                "This copy request is illegal because it is trying to copy an object to itself \
                 without changing the object's metadata, storage class, website redirect \
                 location or encryption attributes.",
            )
            .with_status(400)
            .into());
        }
        objects.insert(
            dst.to_string(),
            StoredObject {
                data: source.data,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    fn list_entries(&self, request: ListRequest) -> EntrySource {
        match self.style {
            ListingStyle::Paged => EntrySource::paginated(
                Arc::new(MockPager {
                    state: Arc::clone(&self.state),
                }),
                request,
            ),
            ListingStyle::Stream => {
                let state = Arc::clone(&self.state);
                let entries = stream::once(async move {
                    let items = match state.snapshot(&request).await {
                        Ok(items) => items,
                        Err(e) => return stream::iter(vec![Err(e)]),
                    };
                    let fault = state.faults.read().await.listing.clone();

                    let mut entries: Vec<Result<RawEntry>> = items
                        .into_iter()
                        .map(|item| match item {
                            Item::Object(entry) => Ok(entry),
                            Item::Prefix(prefix) => Ok(RawEntry::object(prefix, 0, None)),
                        })
                        .collect();
                    if let Some((at, error)) = fault {
                        entries.truncate(at);
                        entries.push(Err(error.into()));
                    }
                    stream::iter(entries)
                })
                .flatten();
                EntrySource::from_stream(entries)
            }
        }
    }
}
