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
use crate::schema::{BackendConfig, Config, ListingConfig, ObservabilityConfig};

/// Largest page a provider will return for one listing request
pub const MAX_PAGE_SIZE: usize = 1000;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Validation for a configuration section
pub trait Validator {
    /// Check the section, returning the first problem found
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.config.validate()?;
        self.listing.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for BackendConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.host().is_empty() {
            return Err(ConfigError::MissingRequired("config.endpoint".to_string()));
        }

        if self.bucket().is_empty() {
            return Err(ConfigError::MissingRequired(
                "config.bucket_name".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validator for ListingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::invalid_value(
                "listing.concurrency",
                "must be at least 1",
            ));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::invalid_value(
                "listing.page_size",
                format!("must be between 1 and {}, got {}", MAX_PAGE_SIZE, self.page_size),
            ));
        }

        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", VALID_LOG_FORMATS.join(", ")),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BackendType;

    fn valid_config() -> Config {
        Config::new(
            BackendType::Minio,
            BackendConfig {
                endpoint: "http://localhost:9000".to_string(),
                bucket_name: "bucket".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_endpoint() {
        let mut config = valid_config();
        config.config.endpoint = "https://".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(field)) if field == "config.endpoint"
        ));
    }

    #[test]
    fn test_tenant_only_bucket_is_missing() {
        let mut config = valid_config();
        config.config.bucket_name = "tenant:".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = valid_config();
        config.listing.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = valid_config();
        config.listing.page_size = MAX_PAGE_SIZE + 1;
        assert!(config.validate().is_err());

        config.listing.page_size = MAX_PAGE_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = valid_config();
        config.observability.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
