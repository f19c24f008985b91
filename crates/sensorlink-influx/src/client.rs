// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Blocking InfluxDB v2 write client.
//!
//! Points are encoded as Line Protocol and POSTed to `/api/v2/write`
//! with nanosecond precision.

use crate::config::{ConfigError, InfluxDbConfig};
use crate::point::{encode_batch, Point, PointError};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use thiserror::Error;

/// Errors returned by [`InfluxClient`].
#[derive(Debug, Error)]
pub enum InfluxError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot encode point: {0}")]
    Point(#[from] PointError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("InfluxDB rejected write (HTTP {status}): {body}")]
    Status { status: u16, body: String },
}

/// Client for the InfluxDB v2 write endpoint.
pub struct InfluxClient {
    http: Client,
    write_url: String,
    org: String,
    bucket: String,
    token: String,
}

impl InfluxClient {
    /// Build a client from validated settings.
    ///
    /// The configured timeout caps both connection setup and the whole
    /// request, including a server that accepts and never answers.
    pub fn new(config: &InfluxDbConfig) -> Result<Self, InfluxError> {
        config.validate()?;

        let http = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            write_url: format!("{}/api/v2/write", config.url.trim_end_matches('/')),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
        })
    }

    /// Full URL of the write endpoint (without query string).
    pub fn write_url(&self) -> &str {
        &self.write_url
    }

    /// Destination bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Write a single point.
    pub fn write_point(&self, point: &Point) -> Result<(), InfluxError> {
        self.write(std::slice::from_ref(point))
    }

    /// Write a batch of points in one request. An empty batch is a no-op.
    pub fn write(&self, points: &[Point]) -> Result<(), InfluxError> {
        if points.is_empty() {
            return Ok(());
        }

        let body = encode_batch(points)?;

        let response = self
            .http
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(points = points.len(), bucket = %self.bucket, "InfluxDB write ok");
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(InfluxError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
