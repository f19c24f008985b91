// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serial link lifecycle.
//!
//! [`ConnectionManager`] owns the only handle to the device. It never
//! retries on its own; reconnection policy lives in the acquisition loop.

use crate::discovery::{PortDiscovery, SystemPorts};
use crate::error::{ConnectError, LinkLost};
use serialport::SerialPort;
use std::io::{self, BufRead, BufReader, Read};
use std::time::Duration;

/// Device baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Upper bound for a single blocking read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest line returned in one piece; the remainder comes back as the next line.
pub const MAX_LINE_BYTES: u64 = 256;

/// One line as read from the link, terminator included when present.
pub type RawLine = Vec<u8>;

/// Serial link parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Fixed port to use instead of the first discovered one.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Byte stream from an open port.
pub trait SerialLink: Read {
    /// Bytes waiting in the OS receive queue.
    fn bytes_to_read(&mut self) -> io::Result<u32>;
}

impl SerialLink for Box<dyn SerialPort> {
    fn bytes_to_read(&mut self) -> io::Result<u32> {
        SerialPort::bytes_to_read(&**self).map_err(io::Error::from)
    }
}

/// Opens ports by name.
pub trait PortOpener {
    type Link: SerialLink;

    fn open(&self, port: &str, settings: &LinkSettings) -> io::Result<Self::Link>;
}

/// Opens real serial ports through the `serialport` crate (8N1, no flow control).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl PortOpener for SystemOpener {
    type Link = Box<dyn SerialPort>;

    fn open(&self, port: &str, settings: &LinkSettings) -> io::Result<Self::Link> {
        serialport::new(port, settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()
            .map_err(io::Error::from)
    }
}

/// Whether a port is currently bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// Proof of a successful connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    pub port: String,
}

/// Owns the serial link.
pub struct ConnectionManager<D = SystemPorts, O = SystemOpener>
where
    O: PortOpener,
{
    discovery: D,
    opener: O,
    settings: LinkSettings,
    port: Option<String>,
    reader: Option<BufReader<O::Link>>,
}

impl ConnectionManager {
    /// Manager over the host's real serial ports.
    pub fn system(settings: LinkSettings) -> Self {
        Self::new(SystemPorts, SystemOpener, settings)
    }
}

impl<D, O> ConnectionManager<D, O>
where
    D: PortDiscovery,
    O: PortOpener,
{
    pub fn new(discovery: D, opener: O, settings: LinkSettings) -> Self {
        Self {
            discovery,
            opener,
            settings,
            port: None,
            reader: None,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Port the manager is bound to (kept across a lost link).
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    pub fn state(&self) -> LinkState {
        if self.reader.is_some() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// Open the link.
    ///
    /// Port choice, in order: the port already bound, the configured port,
    /// the first discovered port. A failed open forgets the choice so the
    /// next attempt runs discovery again.
    pub fn connect(&mut self) -> Result<Connected, ConnectError> {
        if let (Some(port), true) = (&self.port, self.reader.is_some()) {
            return Ok(Connected { port: port.clone() });
        }

        let port = match self.port.clone().or_else(|| self.settings.port.clone()) {
            Some(port) => port,
            None => self
                .discovery
                .list_ports()
                .into_iter()
                .next()
                .map(|p| p.into_string())
                .ok_or(ConnectError::NoPorts)?,
        };

        tracing::info!(port = %port, baud = self.settings.baud_rate, "Connecting");

        match self.opener.open(&port, &self.settings) {
            Ok(link) => {
                self.reader = Some(BufReader::new(link));
                self.port = Some(port.clone());
                tracing::info!(port = %port, "Connected");
                Ok(Connected { port })
            }
            Err(source) => {
                self.port = None;
                Err(ConnectError::Open { port, source })
            }
        }
    }

    /// Release the link. Safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        if self.reader.take().is_some() {
            tracing::info!(port = ?self.port, "Disconnected");
        }
    }

    /// Read one line if the device has sent anything.
    ///
    /// Returns `Ok(None)` immediately when nothing is waiting. Otherwise
    /// blocks at most the read timeout; a partial line cut short by the
    /// timeout is returned as-is. Any other I/O error drops the link.
    pub fn read_line_if_available(&mut self) -> Result<Option<RawLine>, LinkLost> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(LinkLost(io::Error::new(
                io::ErrorKind::NotConnected,
                "link is not connected",
            )));
        };

        match read_pending_line(reader) {
            Ok(line) => Ok(line),
            Err(e) => {
                self.reader = None;
                tracing::warn!(port = ?self.port, error = %e, "Serial I/O error, link dropped");
                Err(LinkLost(e))
            }
        }
    }
}

fn read_pending_line<L: SerialLink>(reader: &mut BufReader<L>) -> io::Result<Option<RawLine>> {
    if reader.buffer().is_empty() && reader.get_mut().bytes_to_read()? == 0 {
        return Ok(None);
    }

    let mut line = Vec::new();
    match reader.by_ref().take(MAX_LINE_BYTES).read_until(b'\n', &mut line) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
        Err(e) => return Err(e),
    }

    Ok((!line.is_empty()).then_some(line))
}
