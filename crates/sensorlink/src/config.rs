// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service configuration.
//!
//! Loaded from YAML; every section is optional and falls back to defaults.
//!
//! ```yaml
//! owner: "jay"
//! influxdb:
//!   url: "http://localhost:8086"
//!   org: "home"
//!   bucket: "garden"
//!   token: "..."
//! serial:
//!   port: "/dev/ttyUSB0"
//!   baud_rate: 9600
//! timing:
//!   retry_interval_ms: 5000
//!   poll_interval_ms: 5000
//! sensor_codes:
//!   LX: light
//! ```

use crate::acquisition::{LoopSettings, DEFAULT_POLL_INTERVAL, DEFAULT_RETRY_INTERVAL};
use crate::error::ConfigError;
use crate::link::{LinkSettings, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
use crate::measurement::{SensorCodeTable, SensorKind};
use sensorlink_influx::InfluxDbConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Value of the `user` tag on every point.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// InfluxDB connection settings.
    #[serde(default)]
    pub influxdb: InfluxDbConfig,

    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    /// Extra sensor codes, merged over the built-in table.
    #[serde(default)]
    pub sensor_codes: HashMap<String, SensorKind>,
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Fixed port. When unset the first discovered port is used.
    #[serde(default)]
    pub port: Option<String>,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Loop timing (milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_owner() -> String {
    "default".to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT.as_millis() as u64
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL.as_millis() as u64
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            influxdb: InfluxDbConfig::default(),
            serial: SerialConfig::default(),
            timing: TimingConfig::default(),
            sensor_codes: HashMap::new(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl BridgeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check values that serde cannot.
    ///
    /// InfluxDB settings are not checked here: a dry run needs none.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.trim().is_empty() {
            return Err(ConfigError::Invalid("owner must not be empty".to_string()));
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::Invalid("serial.baud_rate must be > 0".to_string()));
        }
        if self.serial.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "serial.read_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.timing.retry_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing.retry_interval_ms must be > 0".to_string(),
            ));
        }
        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing.poll_interval_ms must be > 0".to_string(),
            ));
        }
        if let Some(code) = self
            .sensor_codes
            .keys()
            .find(|code| code.len() != 2 || !code.is_ascii())
        {
            return Err(ConfigError::Invalid(format!(
                "sensor code {:?} must be exactly 2 ASCII characters",
                code
            )));
        }
        Ok(())
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            port: self.serial.port.clone(),
            baud_rate: self.serial.baud_rate,
            read_timeout: Duration::from_millis(self.serial.read_timeout_ms),
        }
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            retry_interval: Duration::from_millis(self.timing.retry_interval_ms),
            poll_interval: Duration::from_millis(self.timing.poll_interval_ms),
        }
    }

    /// Built-in sensor codes plus any configured extras.
    pub fn code_table(&self) -> SensorCodeTable {
        SensorCodeTable::with_overrides(&self.sensor_codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_YAML: &str = r#"
owner: "jay"
influxdb:
  url: "http://influx.example.com:8086"
  org: "home"
  bucket: "garden"
  token: "test-token-placeholder"
  timeout_ms: 10000
serial:
  port: "/dev/ttyUSB3"
  baud_rate: 19200
timing:
  retry_interval_ms: 2000
  poll_interval_ms: 500
sensor_codes:
  LX: light
  WT: soil_moisture
"#;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = BridgeConfig::from_yaml("{}").expect("parse empty");
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.link_settings(), LinkSettings::default());
        assert_eq!(config.loop_settings(), LoopSettings::default());
        assert_eq!(config.influxdb.timeout_ms, 2_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_yaml() {
        let config = BridgeConfig::from_yaml(FULL_YAML).expect("parse full");

        assert_eq!(config.owner, "jay");
        assert_eq!(config.influxdb.url, "http://influx.example.com:8086");
        assert_eq!(config.influxdb.bucket, "garden");
        assert_eq!(config.influxdb.timeout_ms, 10_000);

        let link = config.link_settings();
        assert_eq!(link.port.as_deref(), Some("/dev/ttyUSB3"));
        assert_eq!(link.baud_rate, 19200);
        assert_eq!(link.read_timeout, Duration::from_secs(1));

        let timing = config.loop_settings();
        assert_eq!(timing.retry_interval, Duration::from_secs(2));
        assert_eq!(timing.poll_interval, Duration::from_millis(500));

        let table = config.code_table();
        assert_eq!(table.lookup("LX"), SensorKind::Light);
        assert_eq!(table.lookup("WT"), SensorKind::SoilMoisture);
        assert_eq!(table.lookup("LI"), SensorKind::Light);
    }

    #[test]
    fn test_unknown_sensor_kind_rejected() {
        let err = BridgeConfig::from_yaml("sensor_codes:\n  LX: brightness\n");
        assert!(matches!(err, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_validate_sensor_code_length() {
        let mut config = BridgeConfig::default();
        config
            .sensor_codes
            .insert("LUX".to_string(), SensorKind::Light);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_owner_and_baud() {
        let mut config = BridgeConfig {
            owner: "  ".to_string(),
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());

        config.owner = "jay".to_string();
        config.serial.baud_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let config = BridgeConfig::from_yaml("timing:\n  retry_interval_ms: 0\n").expect("parse");
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("retry_interval_ms")),
            other => panic!("expected invalid retry interval, got {:?}", other),
        }

        let config = BridgeConfig::from_yaml("timing:\n  poll_interval_ms: 0\n").expect("parse");
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("poll_interval_ms")),
            other => panic!("expected invalid poll interval, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sensorlink.yaml");
        std::fs::write(&path, FULL_YAML).expect("write config");

        let config = BridgeConfig::from_file(&path).expect("load");
        assert_eq!(config.owner, "jay");

        let missing = BridgeConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
