// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Measurement data model and sensor code lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of sensor a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Light,
    Humidity,
    SoilTemperature,
    AirTemperature,
    SoilMoisture,
    Unknown,
}

impl SensorKind {
    /// Field name used when the reading is written to the datastore.
    pub fn field_name(self) -> &'static str {
        match self {
            SensorKind::Light => "light",
            SensorKind::Humidity => "humidity",
            SensorKind::SoilTemperature => "soil_temperature",
            SensorKind::AirTemperature => "air_temperature",
            SensorKind::SoilMoisture => "soil_moisture",
            SensorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Two-character sensor code to sensor kind mapping.
///
/// Read-only once built. Codes not in the table resolve to
/// [`SensorKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorCodeTable {
    codes: HashMap<String, SensorKind>,
}

impl SensorCodeTable {
    /// Table with no entries; every code resolves to `Unknown`.
    pub fn empty() -> Self {
        Self {
            codes: HashMap::new(),
        }
    }

    /// Add or replace a code mapping.
    pub fn with_code(mut self, code: impl Into<String>, kind: SensorKind) -> Self {
        self.codes.insert(code.into(), kind);
        self
    }

    /// Default table extended with `extra` (extra entries win).
    pub fn with_overrides<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a SensorKind)>,
    {
        extra
            .into_iter()
            .fold(Self::default(), |table, (code, kind)| table.with_code(code.clone(), *kind))
    }

    /// Resolve a code.
    pub fn lookup(&self, code: &str) -> SensorKind {
        self.codes.get(code).copied().unwrap_or(SensorKind::Unknown)
    }

    /// Number of known codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True when no codes are known.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for SensorCodeTable {
    fn default() -> Self {
        Self::empty()
            .with_code("LI", SensorKind::Light)
            .with_code("HU", SensorKind::Humidity)
            .with_code("ST", SensorKind::SoilTemperature)
            .with_code("AT", SensorKind::AirTemperature)
            .with_code("SM", SensorKind::SoilMoisture)
    }
}

/// One parsed sensor reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// Two-character device identifier.
    pub device_id: String,
    /// Sensor the reading came from.
    pub sensor_kind: SensorKind,
    /// Reading value. Device-reported errors are stored as `0`.
    pub value: i64,
    /// Owner tag attached to every record.
    pub owner: String,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {}={}",
            self.owner, self.device_id, self.sensor_kind, self.value
        )
    }
}
