// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy.
//!
//! Every runtime error here is recoverable: the acquisition loop logs it
//! and carries on.

use std::io;
use thiserror::Error;

/// A raw line could not be turned into a measurement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line too short: {len} bytes, need at least 4")]
    Truncated { len: usize },

    #[error("malformed value in line {line:?}")]
    MalformedValue { line: String },
}

/// The link could not be established.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("no serial ports found")]
    NoPorts,

    #[error("cannot open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: io::Error,
    },
}

/// An I/O error occurred on a bound link; the link is now disconnected.
#[derive(Debug, Error)]
#[error("serial link lost: {0}")]
pub struct LinkLost(#[from] pub io::Error);

/// A measurement could not be delivered to the sink.
#[derive(Debug, Error)]
#[error("sink write failed: {0}")]
pub struct SinkError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl SinkError {
    /// Wrap any error as a sink failure.
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
