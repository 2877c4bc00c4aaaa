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

//! Global subscriber setup.

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing with the specified format and optional log level.
///
/// # Example
///
/// ```ignore
/// use unistore_observability::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Compact, Some("debug")).unwrap();
/// tracing::info!("ready");
/// ```
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::new().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(&config)
}

/// Initialize tracing with a detailed configuration.
///
/// Fails with [`LogError::AlreadyInitialized`] when a global subscriber is
/// already installed.
pub fn init_tracing_with_config(config: &LogConfig) -> Result<(), LogError> {
    let filter = build_env_filter(config)?;
    Registry::default()
        .with(build_layer(config).with_filter(filter))
        .try_init()
        .map_err(|e| LogError::AlreadyInitialized(e.to_string()))
}

fn build_layer(config: &LogConfig) -> BoxedLayer {
    let writer = get_writer(config.output);

    match (config.format, config.use_timestamps) {
        (LogFormat::Pretty, true) => fmt::layer()
            .with_writer(writer)
            .with_target(config.include_targets)
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .boxed(),
        (LogFormat::Pretty, false) => fmt::layer()
            .with_writer(writer)
            .with_target(config.include_targets)
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .without_time()
            .boxed(),
        (LogFormat::Compact, true) => fmt::layer()
            .with_writer(writer)
            .with_target(config.include_targets)
            .with_ansi(config.use_color)
            .compact()
            .boxed(),
        (LogFormat::Compact, false) => fmt::layer()
            .with_writer(writer)
            .with_target(config.include_targets)
            .with_ansi(config.use_color)
            .compact()
            .without_time()
            .boxed(),
        (LogFormat::Json, true) => fmt::layer()
            .with_writer(writer)
            .json()
            .with_target(config.include_targets)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        (LogFormat::Json, false) => fmt::layer()
            .with_writer(writer)
            .json()
            .with_target(config.include_targets)
            .with_span_events(FmtSpan::CLOSE)
            .without_time()
            .boxed(),
    }
}

fn get_writer(output: LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}

/// Build the filter for the given configuration
pub fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let filter = config.effective_level();

    EnvFilter::try_new(&filter).map_err(|e| LogError::InvalidFilter {
        filter,
        reason: e.to_string(),
    })
}
