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

//! Concurrent paginated listing
//!
//! Providers expose their enumeration as an [`EntrySource`]: one shared, ordered
//! stream of raw entries. Providers that page with continuation tokens get a
//! source built by [`EntrySource::paginated`], where a single pager walks the tokens
//! and each page's objects and common prefixes are queued for the workers.
//!
//! [`list_objects`] starts `concurrency` workers that drain the source. Each entry is
//! taken by exactly one worker, normalized into an [`ObjectInfo`] and filtered.
//! Every worker reports exactly once. The first failure cancels the rest and is
//! returned through the provider's [`ErrorConverter`]; nothing partial is returned.
//! Results are merged, directories are removed when not wanted, and the merged
//! list is sorted, which is the only ordering callers may rely on.

use crate::chain::ErrorConverter;
use crate::error::{ErrorCode, StorageError, StorageResult};
use crate::object::{remove_dir_objects, sort_objects, ObjectInfo};
use crate::options::{ListOptions, ListRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How a provider reported an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A stored object, or a directory reported in object form
    Object,
    /// A prefix rolled up by the delimiter
    CommonPrefix,
}

/// A listing entry as the provider returned it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Object key or common prefix
    pub key: String,
    /// Size in bytes
    pub size: i64,
    /// Modification time, when the provider sent one
    pub last_modified: Option<DateTime<Utc>>,
    /// Object or common prefix
    pub kind: EntryKind,
}

impl RawEntry {
    /// An object entry
    pub fn object(key: impl Into<String>, size: i64, last_modified: Option<DateTime<Utc>>) -> Self {
        RawEntry {
            key: key.into(),
            size,
            last_modified,
            kind: EntryKind::Object,
        }
    }

    /// A common prefix entry
    pub fn common_prefix(key: impl Into<String>) -> Self {
        RawEntry {
            key: key.into(),
            size: 0,
            last_modified: None,
            kind: EntryKind::CommonPrefix,
        }
    }

    fn into_object_info(self) -> ObjectInfo {
        ObjectInfo::new(
            self.key,
            self.size,
            self.last_modified.unwrap_or(DateTime::UNIX_EPOCH),
        )
    }
}

/// One page of a token-paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects on this page
    pub entries: Vec<RawEntry>,
    /// Common prefixes on this page
    pub common_prefixes: Vec<String>,
    /// Token for the next page; `None` or empty when this was the last
    pub next_token: Option<String>,
}

/// Fetches single pages for providers that page with continuation tokens
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetch the page at `token`, or the first page when `token` is `None`
    async fn fetch_page(
        &self,
        request: &ListRequest,
        token: Option<String>,
    ) -> anyhow::Result<ListPage>;
}

/// A provider's enumeration as one stream of entries
pub struct EntrySource {
    inner: BoxStream<'static, anyhow::Result<RawEntry>>,
}

impl EntrySource {
    /// Wrap a stream that already yields entries one by one
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = anyhow::Result<RawEntry>> + Send + 'static,
    {
        EntrySource {
            inner: stream.boxed(),
        }
    }

    /// Page through `fetcher` lazily, one page at a time
    pub fn paginated<F: PageFetcher>(fetcher: Arc<F>, request: ListRequest) -> Self {
        enum Cursor {
            Start,
            Next(String),
            Done,
        }

        let pages = stream::try_unfold(Cursor::Start, move |cursor| {
            let fetcher = Arc::clone(&fetcher);
            let request = request.clone();
            async move {
                let token = match cursor {
                    Cursor::Done => return Ok::<_, anyhow::Error>(None),
                    Cursor::Start => None,
                    Cursor::Next(token) => Some(token),
                };

                let page = fetcher.fetch_page(&request, token).await?;
                let next = match page.next_token {
                    Some(token) if !token.is_empty() => Cursor::Next(token),
                    _ => Cursor::Done,
                };

                let entries = page
                    .entries
                    .into_iter()
                    .chain(page.common_prefixes.into_iter().map(RawEntry::common_prefix))
                    .map(Ok::<_, anyhow::Error>);

                Ok(Some((stream::iter(entries), next)))
            }
        });

        Self::from_stream(pages.try_flatten())
    }

    /// A source that fails on first poll
    pub fn failed(err: anyhow::Error) -> Self {
        Self::from_stream(stream::once(async move { Err(err) }))
    }

    /// Collect every entry without concurrency or filtering
    pub async fn collect_all(self) -> anyhow::Result<Vec<RawEntry>> {
        self.inner.try_collect().await
    }
}

impl fmt::Debug for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrySource").finish_non_exhaustive()
    }
}

type SharedQueue = Arc<Mutex<BoxStream<'static, anyhow::Result<RawEntry>>>>;

/// List, filter, merge and sort the entries of `source`
pub async fn list_objects(
    source: EntrySource,
    options: &ListOptions,
    converter: ErrorConverter,
) -> StorageResult<Vec<ObjectInfo>> {
    let workers = options.concurrency();
    let queue: SharedQueue = Arc::new(Mutex::new(source.inner));
    let cancel = CancellationToken::new();
    // Cancels workers still running when this future returns early or is dropped.
    let _guard = cancel.clone().drop_guard();

    debug!(
        provider = %converter.provider(),
        prefix = options.effective_prefix(),
        workers,
        "Listing objects"
    );

    let mut tasks = JoinSet::new();
    for worker in 0..workers {
        let queue = Arc::clone(&queue);
        let cancel = cancel.clone();
        let prefix = options.effective_prefix().to_string();
        let include_dirs = options.include_directories();

        tasks.spawn(async move {
            let result = drain(&queue, &cancel, &prefix, include_dirs).await;
            if let Err(e) = &result {
                debug!(worker, error = %e, "Listing worker failed");
                cancel.cancel();
            }
            result
        });
    }

    let mut objects = Vec::new();
    for _ in 0..workers {
        match tasks.join_next().await {
            Some(Ok(Ok(mut partial))) => objects.append(&mut partial),
            Some(Ok(Err(e))) => {
                cancel.cancel();
                return Err(converter.convert(e));
            }
            Some(Err(join_error)) => {
                cancel.cancel();
                warn!(error = %join_error, "Listing worker did not complete");
                return Err(StorageError::with_native(
                    converter.provider(),
                    ErrorCode::Unknown,
                    "listing worker did not complete",
                    join_error.into(),
                ));
            }
            None => break,
        }
    }

    if !options.include_directories() {
        objects = remove_dir_objects(objects);
    }
    sort_objects(&mut objects, options.sort_by(), options.sort_order());

    debug!(count = objects.len(), "Listing complete");
    Ok(objects)
}

async fn drain(
    queue: &SharedQueue,
    cancel: &CancellationToken,
    prefix: &str,
    include_dirs: bool,
) -> anyhow::Result<Vec<ObjectInfo>> {
    let mut found = Vec::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(found),
            next = pull(queue) => next,
        };

        let entry = match next {
            None => return Ok(found),
            Some(entry) => entry?,
        };

        match entry.kind {
            EntryKind::Object => {
                let info = entry.into_object_info();
                if info.is_listable(prefix, include_dirs) {
                    found.push(info);
                }
            }
            // Rollups bypass the per-entry filter; the merged result is filtered again.
            EntryKind::CommonPrefix => found.push(entry.into_object_info()),
        }
    }
}

async fn pull(queue: &SharedQueue) -> Option<anyhow::Result<RawEntry>> {
    queue.lock().await.next().await
}
