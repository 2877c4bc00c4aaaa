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

//! Configuration for Unistore
//!
//! A configuration names one provider (`minio`, `oss` or `s3`), how to reach it and
//! which bucket to use. It can be read from TOML, YAML or JSON, and every field can
//! be overridden with a `UNISTORE_` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use unistore_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_with_overrides("unistore.toml").await?;
//!
//!     println!("Backend: {}", config.backend_type);
//!     println!("Bucket: {}", config.config.bucket());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use loader::{apply_env_overrides, ConfigFormat, ConfigLoader, ENV_PREFIX};
pub use schema::*;
pub use validation::{Validator, MAX_PAGE_SIZE};
