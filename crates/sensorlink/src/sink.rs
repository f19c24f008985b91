// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Measurement sinks.
//!
//! A sink accepts one measurement at a time. Failures are reported back to
//! the acquisition loop, which logs them and drops the measurement.

use crate::error::SinkError;
use crate::measurement::Measurement;
use sensorlink_influx::{InfluxClient, InfluxDbConfig, InfluxError, Point};

/// Measurement name of every written point.
pub const MEASUREMENT_NAME: &str = "sensor_data";

/// Destination for parsed measurements.
pub trait Sink {
    /// Deliver one measurement.
    fn forward(&mut self, measurement: Measurement) -> Result<(), SinkError>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn forward(&mut self, measurement: Measurement) -> Result<(), SinkError> {
        (**self).forward(measurement)
    }
}

/// Build the datastore point for a measurement.
///
/// Tags `user` and `device_id`, one integer field named after the sensor.
pub fn to_point(measurement: &Measurement, timestamp_ns: i64) -> Point {
    Point::new(MEASUREMENT_NAME)
        .tag("user", measurement.owner.as_str())
        .tag("device_id", measurement.device_id.as_str())
        .field(measurement.sensor_kind.field_name(), measurement.value)
        .timestamp(timestamp_ns)
}

fn now_ns() -> i64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000))
}

/// Writes measurements to InfluxDB v2.
pub struct InfluxSink {
    client: InfluxClient,
}

impl InfluxSink {
    pub fn new(client: InfluxClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &InfluxDbConfig) -> Result<Self, InfluxError> {
        Ok(Self::new(InfluxClient::new(config)?))
    }
}

impl Sink for InfluxSink {
    fn forward(&mut self, measurement: Measurement) -> Result<(), SinkError> {
        let point = to_point(&measurement, now_ns());
        let line = point.to_line_protocol().map_err(SinkError::new)?;
        self.client.write_point(&point).map_err(SinkError::new)?;

        tracing::info!(bucket = %self.client.bucket(), "{}", line);
        Ok(())
    }
}

/// Logs the Line Protocol it would write; no network I/O.
#[derive(Debug, Default)]
pub struct DryRunSink {
    written: u64,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measurements accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl Sink for DryRunSink {
    fn forward(&mut self, measurement: Measurement) -> Result<(), SinkError> {
        let line = to_point(&measurement, now_ns())
            .to_line_protocol()
            .map_err(SinkError::new)?;
        tracing::info!(dry_run = true, "{}", line);
        self.written += 1;
        Ok(())
    }
}
