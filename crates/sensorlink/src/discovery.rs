// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serial port discovery.

use std::fmt;
use std::path::Path;

/// OS name of a serial port (e.g. `/dev/ttyUSB0`, `COM3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortIdentifier(String);

impl PortIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PortIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PortIdentifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PortIdentifier {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Source of candidate serial ports.
pub trait PortDiscovery {
    /// Ports currently visible. An empty list is a valid answer.
    fn list_ports(&self) -> Vec<PortIdentifier>;
}

/// Ports enumerated by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortDiscovery for SystemPorts {
    fn list_ports(&self) -> Vec<PortIdentifier> {
        match serialport::available_ports() {
            Ok(ports) => ports
                .into_iter()
                .map(|info| info.port_name)
                .filter(|name| !is_link_alias(name))
                .map(PortIdentifier::from)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Serial port enumeration failed");
                Vec::new()
            }
        }
    }
}

/// Fixed port list, in the given order.
#[derive(Debug, Clone, Default)]
pub struct StaticPorts(pub Vec<PortIdentifier>);

impl PortDiscovery for StaticPorts {
    fn list_ports(&self) -> Vec<PortIdentifier> {
        self.0.clone()
    }
}

/// Convenience wrapper over [`SystemPorts`].
pub fn list_ports() -> Vec<PortIdentifier> {
    SystemPorts.list_ports()
}

/// True for symlinked device aliases such as `/dev/serial/by-id/*`.
fn is_link_alias(name: &str) -> bool {
    std::fs::symlink_metadata(Path::new(name))
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_ports_keep_order() {
        let discovery = StaticPorts(vec!["/dev/ttyUSB1".into(), "/dev/ttyUSB0".into()]);
        let ports = discovery.list_ports();
        assert_eq!(ports[0].as_str(), "/dev/ttyUSB1");
        assert_eq!(ports[1].to_string(), "/dev/ttyUSB0");
    }

    #[test]
    fn test_system_ports_skip_aliases() {
        for port in list_ports() {
            assert!(!port.as_str().is_empty());
            assert!(!is_link_alias(port.as_str()), "alias listed: {}", port);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_alias() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("ttyFAKE0");
        std::fs::write(&target, b"").expect("target");
        let link = dir.path().join("by-id-fake");
        std::os::unix::fs::symlink(&target, &link).expect("symlink");

        assert!(is_link_alias(link.to_str().expect("utf8 path")));
        assert!(!is_link_alias(target.to_str().expect("utf8 path")));
        assert!(!is_link_alias("COM3"));
    }
}
