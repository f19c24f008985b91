// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! sensorlink CLI
//!
//! Forward serial sensor readings to InfluxDB.
//!
//! # Usage
//!
//! ```bash
//! # Write to InfluxDB using the first serial port found
//! sensorlink --host http://localhost:8086 --org home --token $TOKEN --bucket garden
//!
//! # Fixed port, settings from a file
//! sensorlink --config sensorlink.yaml --port /dev/ttyUSB0
//!
//! # Parse and log only
//! sensorlink --dry-run --owner jay
//!
//! # Show candidate ports
//! sensorlink --list-ports
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use sensorlink::{
    list_ports, AcquisitionLoop, BridgeConfig, ConnectionManager, DryRunSink, FrameParser,
    InfluxSink, Sink, StopHandle,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sensorlink")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Forward serial sensor readings to InfluxDB")]
#[command(long_about = None)]
struct Cli {
    /// InfluxDB URL (e.g. http://localhost:8086)
    #[arg(long)]
    host: Option<String>,

    /// InfluxDB organization
    #[arg(long)]
    org: Option<String>,

    /// InfluxDB API token
    #[arg(long)]
    token: Option<String>,

    /// InfluxDB bucket
    #[arg(long)]
    bucket: Option<String>,

    /// Value of the `user` tag on every point
    #[arg(long)]
    owner: Option<String>,

    /// Serial port to use instead of the first one discovered
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// YAML configuration file (command-line flags take precedence)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log points instead of writing them to InfluxDB
    #[arg(long)]
    dry_run: bool,

    /// Print available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Verbose mode (debug logs)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("sensorlink=debug,sensorlink_influx=debug")
    } else {
        EnvFilter::new("sensorlink=info,sensorlink_influx=info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    if cli.list_ports {
        for port in list_ports() {
            println!("{}", port);
        }
        return Ok(());
    }

    let config = build_config(&cli)?;

    tracing::info!(
        owner = %config.owner,
        port = ?config.serial.port,
        baud = config.serial.baud_rate,
        dry_run = cli.dry_run,
        "Starting sensorlink"
    );

    let stop = StopHandle::new();
    ctrlc_handler(stop.clone());

    if cli.dry_run {
        acquire(&config, DryRunSink::new(), stop);
    } else {
        let sink = InfluxSink::from_config(&config.influxdb)
            .context("Failed to create InfluxDB client")?;
        acquire(&config, sink, stop);
    }

    tracing::info!("Interrupted, serial connection closed");
    Ok(())
}

fn acquire<S: Sink>(config: &BridgeConfig, sink: S, stop: StopHandle) {
    let link = ConnectionManager::system(config.link_settings());
    let parser = FrameParser::new(config.code_table());

    let mut acquisition = AcquisitionLoop::new(
        link,
        parser,
        sink,
        config.owner.clone(),
        config.loop_settings(),
    )
    .with_stop_handle(stop);

    acquisition.run();
}

fn build_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = match cli.config {
        Some(ref path) => BridgeConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    if let Some(ref host) = cli.host {
        config.influxdb.url = host.clone();
    }
    if let Some(ref org) = cli.org {
        config.influxdb.org = org.clone();
    }
    if let Some(ref token) = cli.token {
        config.influxdb.token = token.clone();
    }
    if let Some(ref bucket) = cli.bucket {
        config.influxdb.bucket = bucket.clone();
    }
    if let Some(ref owner) = cli.owner {
        config.owner = owner.clone();
    }
    if let Some(ref port) = cli.port {
        config.serial.port = Some(port.clone());
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }

    config.validate().context("Invalid configuration")?;
    if !cli.dry_run {
        config
            .influxdb
            .validate()
            .context("InfluxDB settings incomplete (use --host/--org/--token/--bucket or --dry-run)")?;
    }

    Ok(config)
}

/// Setup Ctrl+C handler.
fn ctrlc_handler(stop: StopHandle) {
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, shutting down...");
        stop.stop();
    }) {
        tracing::warn!(error = %e, "Cannot install Ctrl+C handler");
    }
}
