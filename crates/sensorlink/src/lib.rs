// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! sensorlink
//!
//! Reads line-delimited sensor readings from a serial device and forwards
//! them to InfluxDB.
//!
//! ```text
//! serial port --> ConnectionManager --> FrameParser --> Sink --> InfluxDB
//!                        ^                                 |
//!                        +------- AcquisitionLoop ---------+
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorlink::{
//!     AcquisitionLoop, ConnectionManager, DryRunSink, FrameParser, LinkSettings, LoopSettings,
//! };
//!
//! let link = ConnectionManager::system(LinkSettings::default());
//! let mut acquisition = AcquisitionLoop::new(
//!     link,
//!     FrameParser::default(),
//!     DryRunSink::new(),
//!     "jay",
//!     LoopSettings::default(),
//! );
//! acquisition.run();
//! ```

pub mod acquisition;
pub mod config;
pub mod discovery;
pub mod error;
pub mod link;
pub mod measurement;
pub mod parser;
pub mod sink;

pub use acquisition::{AcquisitionLoop, AcquisitionStats, LoopSettings, LoopState, Step, StopHandle};
pub use config::BridgeConfig;
pub use discovery::{list_ports, PortDiscovery, PortIdentifier, StaticPorts, SystemPorts};
pub use error::{ConfigError, ConnectError, LinkLost, ParseError, SinkError};
pub use link::{
    ConnectionManager, Connected, LinkSettings, LinkState, PortOpener, RawLine, SerialLink,
    SystemOpener,
};
pub use measurement::{Measurement, SensorCodeTable, SensorKind};
pub use parser::FrameParser;
pub use sink::{DryRunSink, InfluxSink, Sink};
