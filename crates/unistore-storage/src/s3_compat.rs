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

//! Shared plumbing for providers reached through the S3 API
//!
//! MinIO, Amazon S3 and Aliyun OSS (through its S3-compatible endpoint) differ only
//! in addressing style, region, error table and listing style. Everything else lives
//! in [`S3Api`].

use crate::chain::ServiceError;
use crate::data::ObjectData;
use crate::error::Provider;
use crate::listing::{ListPage, RawEntry};
use crate::options::ListRequest;
use anyhow::{Context, Result};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::list_objects_v2::builders::ListObjectsV2FluentBuilder;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SdkDateTime};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use unistore_config::BackendConfig;

/// Region assumed when the endpoint does not name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// S3 client bound to one bucket
#[derive(Clone)]
pub struct S3Api {
    client: Client,
    bucket: String,
    region: String,
    provider: Provider,
}

impl S3Api {
    /// Build a client for `config` without contacting the endpoint
    pub fn new(config: &BackendConfig, provider: Provider, region: &str, path_style: bool) -> Self {
        debug!(
            provider = %provider,
            endpoint = %config.endpoint_url(),
            bucket = config.bucket(),
            region,
            path_style,
            "Initializing S3 client"
        );

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.access_key_secret.clone(),
            None,
            None,
            "unistore",
        );

        // Built directly rather than through aws-config so no IMDS region lookup runs
        // against non-AWS endpoints.
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(path_style)
            .region(Region::new(region.to_string()))
            .build();

        S3Api {
            client: Client::from_conf(s3_config),
            bucket: config.bucket().to_string(),
            region: region.to_string(),
            provider,
        }
    }

    /// Bucket objects live in
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The SDK client
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) async fn make_bucket(&self, bucket: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request.send().await.map_err(sdk_error)?;
        Ok(())
    }

    pub(crate) async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(false),
            Err(e) => Err(sdk_error(e)),
        }
    }

    pub(crate) async fn object_exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(false),
            Err(e) => Err(sdk_error(e)),
        }
    }

    pub(crate) async fn get_object(&self, key: &str) -> Result<ObjectData> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(ObjectData::new(output.body.into_async_read()))
    }

    pub(crate) async fn get_object_to_file(&self, key: &str, path: &Path) -> Result<()> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let mut reader = Box::pin(output.body.into_async_read());
        let mut file = fs::File::create(path)
            .await
            .with_context(|| format!("creating {}", path.display()))?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;

        debug!(key, path = %path.display(), bytes = written, "Downloaded object");
        Ok(())
    }

    pub(crate) async fn put_object(&self, key: &str, body: Bytes) -> Result<()> {
        debug!(key, bytes = body.len(), "Putting object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    pub(crate) async fn put_object_from_file(&self, path: &Path, key: &str) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    pub(crate) async fn remove_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    pub(crate) async fn copy_object(&self, src: &str, dst: &str) -> Result<()> {
        let source = format!(
            "{}/{}",
            self.bucket,
            urlencoding::encode(src).replace("%2F", "/")
        );
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .key(dst)
            .copy_source(source)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    /// A `ListObjectsV2` request for one page of `request`
    pub(crate) fn list_request(&self, request: &ListRequest) -> ListObjectsV2FluentBuilder {
        let max_keys = i32::try_from(request.page_size).unwrap_or(i32::MAX);
        self.client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix(non_empty(&request.prefix))
            .set_delimiter(non_empty(request.delimiter))
            .max_keys(max_keys)
    }
}

impl fmt::Debug for S3Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Api")
            .field("provider", &self.provider)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Split a `ListObjectsV2` response into objects, prefixes and the next token
pub(crate) fn into_page(output: ListObjectsV2Output) -> ListPage {
    let entries = output
        .contents()
        .iter()
        .filter_map(|object| {
            let key = object.key()?;
            Some(RawEntry::object(
                key,
                object.size().unwrap_or(0),
                object.last_modified().and_then(to_chrono),
            ))
        })
        .collect();

    let common_prefixes = output
        .common_prefixes()
        .iter()
        .filter_map(|p| p.prefix().map(str::to_string))
        .collect();

    let next_token = if output.is_truncated().unwrap_or(false) {
        output.next_continuation_token().map(str::to_string)
    } else {
        None
    };

    ListPage {
        entries,
        common_prefixes,
        next_token,
    }
}

fn to_chrono(time: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

/// Turn an SDK failure into a native error
///
/// Provider replies carrying an error code surface as a [`ServiceError`]; a reply
/// without a body keeps its HTTP status line as the code. Transport failures are
/// passed on as they are.
pub(crate) fn sdk_error<E>(err: SdkError<E, HttpResponse>) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err
        .code()
        .map(str::to_string)
        .or_else(|| status.map(status_line));

    match code {
        Some(code) => {
            let message = err.message().unwrap_or_default().to_string();
            let mut service = ServiceError::new(code, message);
            if let Some(status) = status {
                service = service.with_status(status);
            }
            anyhow::Error::new(err).context(service)
        }
        None => anyhow::Error::new(err),
    }
}

fn status_line(status: u16) -> String {
    let reason = match status {
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => return status.to_string(),
    };
    format!("{} {}", status, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::types::{CommonPrefix, Object};

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(502), "502 Bad Gateway");
        assert_eq!(status_line(418), "418");
    }

    #[test]
    fn test_into_page() {
        let output = ListObjectsV2Output::builder()
            .contents(
                Object::builder()
                    .key("a/x.txt")
                    .size(5)
                    .last_modified(SdkDateTime::from_secs(1_700_000_000))
                    .build(),
            )
            .contents(Object::builder().size(1).build())
            .common_prefixes(CommonPrefix::builder().prefix("a/sub/").build())
            .is_truncated(true)
            .next_continuation_token("t2")
            .build();

        let page = into_page(output);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].key, "a/x.txt");
        assert_eq!(
            page.entries[0].last_modified.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(page.common_prefixes, ["a/sub/"]);
        assert_eq!(page.next_token.as_deref(), Some("t2"));
    }

    #[test]
    fn test_last_page_has_no_token() {
        let output = ListObjectsV2Output::builder()
            .is_truncated(false)
            .next_continuation_token("ignored")
            .build();
        assert_eq!(into_page(output).next_token, None);
    }
}
