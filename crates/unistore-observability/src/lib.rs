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

//! Structured logging for Unistore.
//!
//! Wraps `tracing-subscriber` setup so the CLI and tests can install a
//! subscriber from a [`LogConfig`] in one call.
//!
//! ```ignore
//! use unistore_observability::{init_tracing_with_config, LogConfig};
//!
//! let config = LogConfig::from_settings("info", "compact")?;
//! init_tracing_with_config(&config)?;
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput, LOG_ENV_VAR};
pub use initialization::{build_env_filter, init_tracing, init_tracing_with_config};
