// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Acquisition loop.
//!
//! Single-threaded poll loop driving the link, the parser and the sink:
//!
//! ```text
//! Disconnected --connect ok--> Polling
//!      |                          |
//!      | connect failed           | link lost
//!      v                          v
//!   Backoff <---------------------+
//!      |
//!      +-- retry interval --> Disconnected
//! ```
//!
//! Nothing that goes wrong inside the loop stops it. The only exit is a
//! stop request through [`StopHandle`].

use crate::discovery::{PortDiscovery, SystemPorts};
use crate::link::{ConnectionManager, PortOpener, SystemOpener};
use crate::parser::FrameParser;
use crate::sink::Sink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Pause after a failed connect or a lost link.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Pause after a poll that found no data.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Granularity at which sleeps check for a stop request.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Loop timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    pub retry_interval: Duration,
    pub poll_interval: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Disconnected,
    Polling,
    Backoff,
}

/// What a single [`AcquisitionLoop::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connected,
    ConnectFailed,
    Forwarded,
    SinkFailed,
    ParseFailed,
    Idle,
    LinkLost,
}

/// Loop counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    /// Raw lines read from the link.
    pub lines_read: u64,
    /// Measurements accepted by the sink.
    pub forwarded: u64,
    /// Lines dropped by the parser.
    pub parse_failures: u64,
    /// Measurements the sink rejected.
    pub sink_failures: u64,
    /// Failed connect attempts.
    pub connect_failures: u64,
    /// Links dropped after an I/O error.
    pub links_lost: u64,
}

/// Handle to stop a running loop from another thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Reads, parses and forwards measurements until stopped.
pub struct AcquisitionLoop<S, D = SystemPorts, O = SystemOpener>
where
    O: PortOpener,
{
    link: ConnectionManager<D, O>,
    parser: FrameParser,
    sink: S,
    owner: String,
    settings: LoopSettings,
    state: LoopState,
    stats: AcquisitionStats,
    stop: StopHandle,
}

impl<S, D, O> AcquisitionLoop<S, D, O>
where
    S: Sink,
    D: PortDiscovery,
    O: PortOpener,
{
    pub fn new(
        link: ConnectionManager<D, O>,
        parser: FrameParser,
        sink: S,
        owner: impl Into<String>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            link,
            parser,
            sink,
            owner: owner.into(),
            settings,
            state: LoopState::Disconnected,
            stats: AcquisitionStats::default(),
            stop: StopHandle::new(),
        }
    }

    /// Share an existing stop handle (e.g. one wired to Ctrl+C).
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    pub fn link(&self) -> &ConnectionManager<D, O> {
        &self.link
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one state transition without sleeping.
    pub fn step(&mut self) -> Step {
        match self.state {
            LoopState::Disconnected | LoopState::Backoff => {
                self.state = LoopState::Disconnected;
                self.try_connect()
            }
            LoopState::Polling => self.poll(),
        }
    }

    /// Loop until a stop is requested, then release the link.
    pub fn run(&mut self) {
        tracing::info!(owner = %self.owner, "Starting acquisition");

        while !self.stop.is_stopped() {
            let step = self.step();
            if let Some(pause) = self.pause_after(step) {
                self.sleep(pause);
            }
        }

        self.link.disconnect();
        tracing::info!(
            lines_read = self.stats.lines_read,
            forwarded = self.stats.forwarded,
            parse_failures = self.stats.parse_failures,
            sink_failures = self.stats.sink_failures,
            "Acquisition stopped"
        );
    }

    fn try_connect(&mut self) -> Step {
        match self.link.connect() {
            Ok(_) => {
                self.state = LoopState::Polling;
                Step::Connected
            }
            Err(e) => {
                self.stats.connect_failures += 1;
                self.state = LoopState::Backoff;
                tracing::warn!(
                    error = %e,
                    retry_in = ?self.settings.retry_interval,
                    "Could not connect"
                );
                Step::ConnectFailed
            }
        }
    }

    fn poll(&mut self) -> Step {
        match self.link.read_line_if_available() {
            Ok(Some(line)) => {
                self.stats.lines_read += 1;
                tracing::debug!(bytes = line.len(), "Reading data");
                self.handle_line(&line)
            }
            Ok(None) => Step::Idle,
            Err(e) => {
                self.stats.links_lost += 1;
                self.state = LoopState::Backoff;
                tracing::warn!(
                    error = %e,
                    retry_in = ?self.settings.retry_interval,
                    "Reconnecting"
                );
                Step::LinkLost
            }
        }
    }

    fn handle_line(&mut self, line: &[u8]) -> Step {
        let measurement = match self.parser.parse(line, &self.owner) {
            Ok(m) => m,
            Err(e) => {
                self.stats.parse_failures += 1;
                tracing::warn!(error = %e, "Dropping unparsable line");
                return Step::ParseFailed;
            }
        };

        let summary = measurement.to_string();
        match self.sink.forward(measurement) {
            Ok(()) => {
                self.stats.forwarded += 1;
                Step::Forwarded
            }
            Err(e) => {
                self.stats.sink_failures += 1;
                tracing::warn!(error = %e, measurement = %summary, "Dropping measurement");
                Step::SinkFailed
            }
        }
    }

    fn pause_after(&self, step: Step) -> Option<Duration> {
        match step {
            Step::ConnectFailed | Step::LinkLost => Some(self.settings.retry_interval),
            Step::Idle => Some(self.settings.poll_interval),
            _ => None,
        }
    }

    fn sleep(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while !self.stop.is_stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LoopSettings::default();
        assert_eq!(settings.retry_interval, Duration::from_secs(5));
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_stop_handle_shared() {
        let handle = StopHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_stopped());
        clone.stop();
        assert!(handle.is_stopped());
    }
}
