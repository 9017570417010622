//! Real serial ports behind the core's transport abstraction
//!
//! Wraps the `serialport` crate in the non-blocking [`SerialPort`] contract
//! the devices poll. UARTs without a configured device path fall back to
//! in-memory loopback ports so the emulator can run without hardware.

use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;
use std::time::Duration;

use rigsim_core::{MemorySerialPort, SerialError, SerialPort, SerialProvider, SharedSerial};
use serialport::SerialPort as _;
use tracing::warn;

/// A host serial device (e.g. `/dev/ttyUSB0`) exposed as a polled port
pub struct SystemSerialPort {
    path: String,
    port: Option<Box<dyn serialport::SerialPort>>,
    baud: u32,
}

impl SystemSerialPort {
    /// Create a closed port for the given device path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            port: None,
            baud: 0,
        }
    }
}

impl SerialPort for SystemSerialPort {
    fn open(&mut self, baud: u32) -> Result<(), SerialError> {
        // Re-opening at a new baud rate drops the old handle first
        self.port = None;
        let port = serialport::new(&self.path, baud)
            .timeout(Duration::from_millis(1))
            .open()
            .map_err(|e| SerialError::OpenFailed(format!("{}: {}", self.path, e)))?;
        self.port = Some(port);
        self.baud = baud;
        Ok(())
    }

    fn close(&mut self) {
        self.port = None;
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn bytes_available(&mut self) -> usize {
        self.port
            .as_mut()
            .and_then(|p| p.bytes_to_read().ok())
            .unwrap_or(0) as usize
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.bytes_available() == 0 {
            return None;
        }
        let port = self.port.as_mut()?;
        let mut buf = [0u8; 1];
        match port.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }

    fn write_all(&mut self, data: &[u8]) {
        if let Some(port) = self.port.as_mut() {
            if let Err(e) = std::io::Write::write_all(port, data) {
                warn!("write failed on {}: {}", self.path, e);
            }
        }
    }

    fn baud(&self) -> u32 {
        self.baud
    }
}

/// Maps UART indexes to host serial devices
///
/// Indexes without a path mapping get an in-memory loopback port.
pub struct SystemSerialProvider {
    paths: Vec<Option<String>>,
}

impl SystemSerialProvider {
    /// Create a provider for `uart_count` UARTs with no mappings
    pub fn new(uart_count: u8) -> Self {
        Self {
            paths: vec![None; uart_count as usize],
        }
    }

    /// Bind a UART index (1-based) to a host serial device path
    pub fn map_uart(&mut self, uart_index: u8, path: impl Into<String>) -> bool {
        let Some(slot) = uart_index.checked_sub(1) else {
            return false;
        };
        match self.paths.get_mut(slot as usize) {
            Some(entry) => {
                *entry = Some(path.into());
                true
            }
            None => false,
        }
    }

    /// Device path mapped to a UART, if any
    pub fn path_for_uart(&self, uart_index: u8) -> Option<&str> {
        self.paths
            .get(uart_index.checked_sub(1)? as usize)?
            .as_deref()
    }
}

impl SerialProvider for SystemSerialProvider {
    fn uart_count(&self) -> u8 {
        self.paths.len() as u8
    }

    fn port_for_uart(&mut self, uart_index: u8) -> Option<SharedSerial> {
        let slot = uart_index.checked_sub(1)? as usize;
        match self.paths.get(slot)? {
            Some(path) => Some(Rc::new(RefCell::new(SystemSerialPort::new(path.clone())))),
            None => Some(Rc::new(RefCell::new(MemorySerialPort::new()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_uart_falls_back_to_loopback() {
        let mut provider = SystemSerialProvider::new(2);
        let port = provider.port_for_uart(1).unwrap();
        assert!(port.borrow_mut().open(9_600).is_ok());
    }

    #[test]
    fn test_map_uart_bounds() {
        let mut provider = SystemSerialProvider::new(2);
        assert!(provider.map_uart(1, "/dev/ttyUSB0"));
        assert!(provider.map_uart(2, "/dev/ttyUSB1"));
        assert!(!provider.map_uart(0, "/dev/null"));
        assert!(!provider.map_uart(3, "/dev/null"));
        assert_eq!(provider.path_for_uart(1), Some("/dev/ttyUSB0"));
        assert_eq!(provider.path_for_uart(3), None);
    }
}
