// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! sensorlink InfluxDB client
//!
//! Encodes points as InfluxDB v2 Line Protocol and writes them over HTTP.
//!
//! ```text
//! Point --> Line Protocol --> POST /api/v2/write?org=..&bucket=..&precision=ns
//! ```

pub mod client;
pub mod config;
pub mod point;

pub use client::{InfluxClient, InfluxError};
pub use config::{ConfigError, InfluxDbConfig};
pub use point::{encode_batch, FieldValue, Point, PointError};
