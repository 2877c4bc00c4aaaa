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

//! Command implementations for the unistore CLI
//!
//! Every command runs against a [`Context`] built once in `main`: the loaded
//! configuration plus the storage backend it selects.

pub mod bucket;
pub mod list;
pub mod object;
pub mod transfer;

pub use bucket::{EnsureBucketCmd, MbCmd};
pub use list::LsCmd;
pub use object::{CatCmd, ExistsCmd, GetCmd, PutCmd, RmCmd};
pub use transfer::{CpCmd, MvCmd};

use anyhow::{Context as _, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use unistore_config::{Config, ConfigLoader};
use unistore_storage::{open_backend, StorageBackend};

/// Loaded configuration and the backend it selects
pub struct Context {
    /// Configuration after environment overrides
    pub config: Config,
    /// Backend for the configured bucket
    pub storage: Arc<dyn StorageBackend>,
}

/// Load the configuration from `path`, or from `UNISTORE_*` variables when no path is given
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader
            .load_with_overrides(path)
            .await
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => loader
            .from_env()
            .context("no --config given and the environment does not describe a backend"),
    }
}

impl Context {
    /// Open the backend described by `config`
    pub async fn connect(config: Config) -> Result<Self> {
        debug!(backend = %config.backend_type, endpoint = %config.config.host(), "Connecting");
        let storage = open_backend(&config).await?;
        Ok(Context { config, storage })
    }
}
