// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default HTTP request timeout (milliseconds).
///
/// Writes block the acquisition thread for at most this long.
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Invalid connection settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing InfluxDB setting: {0}")]
    Missing(&'static str),

    #[error("invalid InfluxDB URL '{0}': expected http:// or https://")]
    InvalidUrl(String),
}

/// InfluxDB v2 connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluxDbConfig {
    /// InfluxDB URL (e.g., "http://localhost:8086").
    #[serde(default)]
    pub url: String,
    /// InfluxDB organization.
    #[serde(default)]
    pub org: String,
    /// InfluxDB bucket.
    #[serde(default)]
    pub bucket: String,
    /// Authentication token.
    #[serde(default)]
    pub token: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for InfluxDbConfig {
    fn default() -> Self {
        Self::new("", "", "", "")
    }
}

impl InfluxDbConfig {
    /// Create a configuration with the default timeout.
    pub fn new(
        url: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            org: org.into(),
            bucket: bucket.into(),
            token: token.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that every setting needed for a write is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Missing("url"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        if self.org.is_empty() {
            return Err(ConfigError::Missing("org"));
        }
        if self.bucket.is_empty() {
            return Err(ConfigError::Missing("bucket"));
        }
        if self.token.is_empty() {
            return Err(ConfigError::Missing("token"));
        }
        Ok(())
    }
}
