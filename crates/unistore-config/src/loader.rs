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

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{BackendConfig, BackendType, Config};
use crate::validation::Validator;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "UNISTORE_";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document
    Toml,
    /// YAML document
    Yaml,
    /// JSON document
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !fs::try_exists(path).await? {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        debug!("Configuration loaded from {}", format.name());
        self.finish(config)
    }

    /// Load a file, then apply `UNISTORE_*` environment overrides
    pub async fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let mut config = ConfigLoader::without_validation().load_file(path).await?;
        apply_env_overrides(&mut config)?;
        self.finish(config)
    }

    /// Build a configuration purely from `UNISTORE_*` environment variables
    ///
    /// `UNISTORE_BACKEND_TYPE`, `UNISTORE_ENDPOINT` and `UNISTORE_BUCKET_NAME` are
    /// required; everything else falls back to its default.
    pub fn from_env(&self) -> ConfigResult<Config> {
        let backend_type: BackendType = required_env("BACKEND_TYPE")?.parse()?;
        let backend = BackendConfig {
            endpoint: required_env("ENDPOINT")?,
            bucket_name: required_env("BUCKET_NAME")?,
            ..Default::default()
        };

        let mut config = Config::new(backend_type, backend);
        apply_env_overrides(&mut config)?;
        self.finish(config)
    }

    fn finish(&self, config: Config) -> ConfigResult<Config> {
        if self.validate {
            config.validate()?;
            info!("Configuration validated successfully");
        }
        Ok(config)
    }
}

/// Apply environment variable overrides
pub fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Some(value) = env("BACKEND_TYPE") {
        config.backend_type = value.parse()?;
    }
    if let Some(value) = env("ENDPOINT") {
        config.config.endpoint = value;
    }
    if let Some(value) = env("ACCESS_KEY_ID") {
        config.config.access_key_id = value;
    }
    if let Some(value) = env("ACCESS_KEY_SECRET") {
        config.config.access_key_secret = value;
    }
    if let Some(value) = env("BUCKET_NAME") {
        config.config.bucket_name = value;
    }
    if let Some(value) = env("CREATE_BUCKET") {
        config.config.create_bucket_if_not_exists = parse_bool("CREATE_BUCKET", &value)?;
    }

    if let Some(value) = env("LIST_CONCURRENCY") {
        config.listing.concurrency = parse_usize("LIST_CONCURRENCY", &value)?;
    }
    if let Some(value) = env("LIST_PAGE_SIZE") {
        config.listing.page_size = parse_usize("LIST_PAGE_SIZE", &value)?;
    }

    if let Some(value) = env("LOG_LEVEL") {
        config.observability.log_level = value;
    }
    if let Some(value) = env("LOG_FORMAT") {
        config.observability.log_format = value;
    }

    Ok(())
}

fn env(suffix: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, suffix)).ok()
}

fn required_env(suffix: &str) -> ConfigResult<String> {
    env(suffix).ok_or_else(|| ConfigError::MissingRequired(format!("{}{}", ENV_PREFIX, suffix)))
}

fn parse_usize(suffix: &str, value: &str) -> ConfigResult<usize> {
    value.parse().map_err(|_| {
        ConfigError::env_var_parsing_error(
            format!("{}{}", ENV_PREFIX, suffix),
            value,
            "expected valid integer",
        )
    })
}

fn parse_bool(suffix: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::env_var_parsing_error(
            format!("{}{}", ENV_PREFIX, suffix),
            value,
            "expected 'true', 'false', 'yes', 'no', '1', '0', 'on', or 'off'",
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("a.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("a.yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("a.json").unwrap(), ConfigFormat::Json);
        assert!(matches!(
            ConfigFormat::from_path("a.ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ConfigFormat::from_path("config"),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_load_json_layout() {
        let json = r#"{
            "backend_type": "oss",
            "config": {
                "endpoint": "https://oss-cn-hangzhou.aliyuncs.com",
                "access_key_id": "id",
                "access_key_secret": "secret",
                "bucket_name": "szls:suanpan",
                "create_bucket_if_not_exists": true
            }
        }"#;

        let config = ConfigLoader::new()
            .load_from_string(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.backend_type, BackendType::Oss);
        assert_eq!(config.config.bucket(), "suanpan");
        assert!(config.config.create_bucket_if_not_exists);
        assert_eq!(config.listing.concurrency, 1);
        assert_eq!(config.listing.page_size, 1000);
    }

    #[test]
    fn test_create_bucket_defaults_to_false() {
        let toml = r#"
            backend_type = "minio"

            [config]
            endpoint = "http://localhost:9000"
            bucket_name = "bucket"
        "#;

        let config = ConfigLoader::new()
            .load_from_string(toml, ConfigFormat::Toml)
            .unwrap();
        assert!(!config.config.create_bucket_if_not_exists);
    }

    #[test]
    fn test_validation_applies_to_strings() {
        let toml = r#"
            backend_type = "minio"

            [config]
            endpoint = ""
            bucket_name = "bucket"
        "#;

        assert!(ConfigLoader::new()
            .load_from_string(toml, ConfigFormat::Toml)
            .is_err());
        assert!(ConfigLoader::without_validation()
            .load_from_string(toml, ConfigFormat::Toml)
            .is_ok());
    }

    #[test]
    fn test_parse_bool_values() {
        assert!(parse_bool("X", "yes").unwrap());
        assert!(parse_bool("X", "ON").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
