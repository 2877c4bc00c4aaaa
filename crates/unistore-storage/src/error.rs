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

//! Normalized storage errors
//!
//! Every provider failure is reported as a [`StorageError`] carrying the provider it
//! came from, one [`ErrorCode`] out of a closed set, a message, and the native cause
//! for diagnostics. Callers branch on the code; they never need to inspect the cause.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use unistore_config::BackendType as Provider;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

type NativeError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Normalized error code
///
/// Names are stable and match the strings reported to callers. New codes may be
/// added; existing ones are never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    /// Unclassified failure
    Unknown,
    /// Object does not exist
    NoSuchKey,
    /// Endpoint unreachable or answered with a gateway error
    BadGateway,
    /// Local file does not exist
    NoSuchFile,
    /// Bucket does not exist
    NoSuchBucket,
    /// Credentials lack permission
    AccessDenied,
    /// Provider timed out the request
    RequestTimeout,
    /// Local directory does not exist
    NoSuchDirectory,
    /// Object key rejected
    InvalidObjectName,
    /// Access key id not recognized
    InvalidAccessKeyID,
    /// Destination object already present
    ObjectAlreadyExists,
    /// Bucket already present
    BucketAlreadyExists,
    /// Signature did not match the access key secret
    InvalidAccessKeySecret,
}

impl ErrorCode {
    /// Every code, in declaration order
    pub const ALL: [ErrorCode; 13] = [
        ErrorCode::Unknown,
        ErrorCode::NoSuchKey,
        ErrorCode::BadGateway,
        ErrorCode::NoSuchFile,
        ErrorCode::NoSuchBucket,
        ErrorCode::AccessDenied,
        ErrorCode::RequestTimeout,
        ErrorCode::NoSuchDirectory,
        ErrorCode::InvalidObjectName,
        ErrorCode::InvalidAccessKeyID,
        ErrorCode::ObjectAlreadyExists,
        ErrorCode::BucketAlreadyExists,
        ErrorCode::InvalidAccessKeySecret,
    ];

    /// Stable string name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unknown => "Unknown",
            ErrorCode::NoSuchKey => "NoSuchKey",
            ErrorCode::BadGateway => "BadGateway",
            ErrorCode::NoSuchFile => "NoSuchFile",
            ErrorCode::NoSuchBucket => "NoSuchBucket",
            ErrorCode::AccessDenied => "AccessDenied",
            ErrorCode::RequestTimeout => "RequestTimeout",
            ErrorCode::NoSuchDirectory => "NoSuchDirectory",
            ErrorCode::InvalidObjectName => "InvalidObjectName",
            ErrorCode::InvalidAccessKeyID => "InvalidAccessKeyID",
            ErrorCode::ObjectAlreadyExists => "ObjectAlreadyExists",
            ErrorCode::BucketAlreadyExists => "BucketAlreadyExists",
            ErrorCode::InvalidAccessKeySecret => "InvalidAccessKeySecret",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified storage failure
///
/// Immutable once built. Equality ignores the native cause.
#[derive(Error, Debug, Clone)]
#[error("[{provider}] {code}: {message}")]
pub struct StorageError {
    provider: Provider,
    code: ErrorCode,
    message: String,
    #[source]
    native: Option<NativeError>,
}

impl StorageError {
    /// Create an error without a native cause
    pub fn new(provider: Provider, code: ErrorCode, message: impl Into<String>) -> Self {
        StorageError {
            provider,
            code,
            message: message.into(),
            native: None,
        }
    }

    /// Create an error that keeps the provider's original error as its source
    pub fn with_native(
        provider: Provider,
        code: ErrorCode,
        message: impl Into<String>,
        native: anyhow::Error,
    ) -> Self {
        let native: Box<dyn std::error::Error + Send + Sync + 'static> = native.into();
        StorageError {
            provider,
            code,
            message: message.into(),
            native: Some(Arc::from(native)),
        }
    }

    /// Bucket does not exist
    pub fn bucket_not_found(provider: Provider, bucket: &str) -> Self {
        Self::new(provider, ErrorCode::NoSuchBucket, format!("bucket not found: {}", bucket))
    }

    /// Bucket already exists
    pub fn bucket_already_exists(provider: Provider, bucket: &str) -> Self {
        Self::new(
            provider,
            ErrorCode::BucketAlreadyExists,
            format!("bucket already exists: {}", bucket),
        )
    }

    /// Object does not exist
    pub fn object_not_found(provider: Provider, key: &str) -> Self {
        Self::new(provider, ErrorCode::NoSuchKey, format!("object not found: {}", key))
    }

    /// Destination object already exists
    pub fn object_already_exists(provider: Provider, key: &str) -> Self {
        Self::new(
            provider,
            ErrorCode::ObjectAlreadyExists,
            format!("object already exists: {}", key),
        )
    }

    /// Object key failed validation
    pub fn invalid_object_name(provider: Provider, key: &str) -> Self {
        Self::new(
            provider,
            ErrorCode::InvalidObjectName,
            format!("invalid object name: {}", key),
        )
    }

    /// Local file does not exist
    pub fn no_such_file(provider: Provider, path: &str) -> Self {
        Self::new(provider, ErrorCode::NoSuchFile, format!("no such file: {}", path))
    }

    /// Local directory does not exist
    pub fn no_such_directory(provider: Provider, path: &str) -> Self {
        Self::new(
            provider,
            ErrorCode::NoSuchDirectory,
            format!("no such directory: {}", path),
        )
    }

    /// Provider that produced the error
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Normalized code
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Original provider error, when there was one
    pub fn native(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.native.as_deref()
    }

    /// Check if this is a NoSuchKey error
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NoSuchKey
    }

    /// Check if this is a NoSuchBucket error
    pub fn is_bucket_not_found(&self) -> bool {
        self.code == ErrorCode::NoSuchBucket
    }

    /// Check if this is an ObjectAlreadyExists error
    pub fn is_already_exists(&self) -> bool {
        self.code == ErrorCode::ObjectAlreadyExists
    }
}

impl PartialEq for StorageError {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider && self.code == other.code && self.message == other.message
    }
}

impl Eq for StorageError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_constructors_embed_subject() {
        let err = StorageError::object_not_found(Provider::Minio, "a/b.txt");
        assert!(err.is_not_found());
        assert_eq!(err.message(), "object not found: a/b.txt");
        assert_eq!(err.to_string(), "[minio] NoSuchKey: object not found: a/b.txt");
        assert!(err.source().is_none());

        let err = StorageError::bucket_not_found(Provider::Oss, "media");
        assert!(err.is_bucket_not_found());
        assert_eq!(err.provider(), Provider::Oss);
    }

    #[test]
    fn test_native_exposed_as_source() {
        let err = StorageError::with_native(
            Provider::S3,
            ErrorCode::Unknown,
            "boom",
            anyhow::anyhow!("socket closed"),
        );
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("socket closed"));
    }

    #[test]
    fn test_equality_ignores_native() {
        let a = StorageError::with_native(
            Provider::Minio,
            ErrorCode::AccessDenied,
            "denied",
            anyhow::anyhow!("one"),
        );
        let b = StorageError::new(Provider::Minio, ErrorCode::AccessDenied, "denied");
        assert_eq!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_code_names_are_stable() {
        let names: Vec<&str> = ErrorCode::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names[0], "Unknown");
        assert_eq!(names[9], "InvalidAccessKeyID");
        assert_eq!(names[12], "InvalidAccessKeySecret");
        assert_eq!(ErrorCode::BadGateway.to_string(), "BadGateway");
    }
}
