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

//! Configuration schema
//!
//! The top level mirrors the deployed JSON layout: a `backend_type` tag next to a
//! `config` table holding endpoint, credentials and bucket. Listing defaults and
//! logging settings are optional tables.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scheme prefix for plain-text endpoints
pub const HTTP_PREFIX: &str = "http://";

/// Scheme prefix for TLS endpoints
pub const HTTPS_PREFIX: &str = "https://";

/// Object storage provider selected at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Amazon S3
    S3,
    /// Aliyun Object Storage Service
    Oss,
    /// MinIO or another S3-compatible server
    Minio,
}

impl BackendType {
    /// Lowercase tag used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::S3 => "s3",
            BackendType::Oss => "oss",
            BackendType::Minio => "minio",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(BackendType::S3),
            "oss" => Ok(BackendType::Oss),
            "minio" => Ok(BackendType::Minio),
            other => Err(ConfigError::UnsupportedBackend(other.to_string())),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Which provider to talk to
    pub backend_type: BackendType,

    /// Connection settings for that provider
    pub config: BackendConfig,

    /// Defaults applied to listings that do not set their own values
    #[serde(default)]
    pub listing: ListingConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Create a configuration with default listing and logging sections
    pub fn new(backend_type: BackendType, config: BackendConfig) -> Self {
        Config {
            backend_type,
            config,
            listing: ListingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Endpoint, credentials and bucket of a provider
///
/// Credentials are passed through to the provider untouched.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    /// Endpoint, optionally prefixed with `http://` or `https://`
    pub endpoint: String,

    /// Access key id
    #[serde(default)]
    pub access_key_id: String,

    /// Access key secret
    #[serde(default)]
    pub access_key_secret: String,

    /// Bucket name; `tenant:bucket` is accepted and resolves to `bucket`
    pub bucket_name: String,

    /// Create the bucket on startup when it does not exist
    #[serde(default)]
    pub create_bucket_if_not_exists: bool,
}

impl BackendConfig {
    /// Whether the endpoint asks for TLS
    pub fn secure(&self) -> bool {
        self.endpoint.starts_with(HTTPS_PREFIX)
    }

    /// Endpoint without its scheme prefix or trailing slash
    pub fn host(&self) -> &str {
        let host = self
            .endpoint
            .strip_prefix(HTTPS_PREFIX)
            .or_else(|| self.endpoint.strip_prefix(HTTP_PREFIX))
            .unwrap_or(&self.endpoint);
        host.trim_end_matches('/')
    }

    /// Endpoint as a full URL, defaulting to `http://` when no scheme was given
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure() { HTTPS_PREFIX } else { HTTP_PREFIX };
        format!("{}{}", scheme, self.host())
    }

    /// Bucket name with any `tenant:` scope removed
    pub fn bucket(&self) -> &str {
        match self.bucket_name.split_once(':') {
            Some((_, bucket)) => bucket,
            None => &self.bucket_name,
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &"***")
            .field("access_key_secret", &"***")
            .field("bucket_name", &self.bucket_name)
            .field("create_bucket_if_not_exists", &self.create_bucket_if_not_exists)
            .finish()
    }
}

/// Default listing parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingConfig {
    /// Number of listing workers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum keys requested per provider page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        ListingConfig {
            concurrency: default_concurrency(),
            page_size: default_page_size(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}

fn default_page_size() -> usize {
    1000
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Log filter, e.g. `info` or `unistore_storage=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: `pretty`, `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
