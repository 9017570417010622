//! Serial transport abstraction
//!
//! Devices talk to the outside world only through the [`SerialPort`] trait:
//! non-blocking polled reads, buffered writes, open/close at a configurable
//! baud rate. The [`SerialProvider`] maps platform UART indexes to port
//! instances so the manager never knows what a port physically is.
//!
//! [`MemorySerialPort`] is the in-memory implementation used by tests and by
//! loopback setups without hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::SerialError;

/// Non-blocking byte transport
///
/// All reads are polled; nothing here may block. Implementations are free to
/// buffer writes internally.
pub trait SerialPort {
    /// Open (or re-open) the port at the given baud rate
    fn open(&mut self, baud: u32) -> Result<(), SerialError>;

    /// Close the port; buffered state is retained
    fn close(&mut self);

    /// Whether the port is currently open
    fn is_open(&self) -> bool;

    /// Number of bytes ready to read without blocking
    fn bytes_available(&mut self) -> usize;

    /// Read one byte if available
    fn read_byte(&mut self) -> Option<u8>;

    /// Write all bytes (buffered, non-blocking)
    fn write_all(&mut self, data: &[u8]);

    /// Baud rate of the last successful open
    fn baud(&self) -> u32;
}

/// Shared handle to a serial port
///
/// Ports are shared between the manager (which owns the pool) and the device
/// currently bound to the UART. `Rc` keeps the whole emulator single-threaded
/// by construction, which is the concurrency model the manager assumes.
pub type SharedSerial = Rc<RefCell<dyn SerialPort>>;

/// Maps 1-based UART indexes to serial ports
pub trait SerialProvider {
    /// Number of UARTs this platform exposes
    fn uart_count(&self) -> u8;

    /// Port for the given UART index, if the platform has one
    fn port_for_uart(&mut self, uart_index: u8) -> Option<SharedSerial>;
}

/// In-memory serial port for tests and hardware-free loopback
///
/// Bytes written by the host side are queued with [`inject`](Self::inject)
/// and read by the device through the [`SerialPort`] trait; device output
/// accumulates until drained with [`take_output`](Self::take_output).
#[derive(Debug, Default)]
pub struct MemorySerialPort {
    open: bool,
    baud: u32,
    from_host: VecDeque<u8>,
    to_host: Vec<u8>,
}

impl MemorySerialPort {
    /// Create a closed port with empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the host had transmitted them
    pub fn inject(&mut self, data: &[u8]) {
        self.from_host.extend(data);
    }

    /// Drain everything the device has written
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.to_host)
    }
}

impl SerialPort for MemorySerialPort {
    fn open(&mut self, baud: u32) -> Result<(), SerialError> {
        self.open = true;
        self.baud = baud;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn bytes_available(&mut self) -> usize {
        self.from_host.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.from_host.pop_front()
    }

    fn write_all(&mut self, data: &[u8]) {
        self.to_host.extend_from_slice(data);
    }

    fn baud(&self) -> u32 {
        self.baud
    }
}

/// Provider backed entirely by [`MemorySerialPort`] instances
pub struct MemorySerialProvider {
    ports: Vec<Rc<RefCell<MemorySerialPort>>>,
}

impl MemorySerialProvider {
    /// Create a provider with `count` UARTs
    pub fn new(count: u8) -> Self {
        Self {
            ports: (0..count)
                .map(|_| Rc::new(RefCell::new(MemorySerialPort::new())))
                .collect(),
        }
    }

    /// Typed handle to a UART's port, for injecting input and draining
    /// output from the host side
    pub fn port(&self, uart_index: u8) -> Option<Rc<RefCell<MemorySerialPort>>> {
        if uart_index == 0 {
            return None;
        }
        self.ports.get(uart_index as usize - 1).cloned()
    }
}

impl SerialProvider for MemorySerialProvider {
    fn uart_count(&self) -> u8 {
        self.ports.len() as u8
    }

    fn port_for_uart(&mut self, uart_index: u8) -> Option<SharedSerial> {
        self.port(uart_index).map(|p| p as SharedSerial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_port_loopback() {
        let mut port = MemorySerialPort::new();
        port.open(38_400).unwrap();
        assert!(port.is_open());
        assert_eq!(port.baud(), 38_400);

        port.inject(b"FA;");
        assert_eq!(port.bytes_available(), 3);
        assert_eq!(port.read_byte(), Some(b'F'));
        assert_eq!(port.read_byte(), Some(b'A'));
        assert_eq!(port.read_byte(), Some(b';'));
        assert_eq!(port.read_byte(), None);

        port.write_all(b"FA014074000;");
        assert_eq!(port.take_output(), b"FA014074000;");
        assert!(port.take_output().is_empty());
    }

    #[test]
    fn test_reopen_changes_baud() {
        let mut port = MemorySerialPort::new();
        port.open(4_800).unwrap();
        port.close();
        assert!(!port.is_open());
        port.open(9_600).unwrap();
        assert_eq!(port.baud(), 9_600);
    }

    #[test]
    fn test_provider_index_bounds() {
        let mut provider = MemorySerialProvider::new(2);
        assert_eq!(provider.uart_count(), 2);
        assert!(provider.port_for_uart(0).is_none());
        assert!(provider.port_for_uart(1).is_some());
        assert!(provider.port_for_uart(2).is_some());
        assert!(provider.port_for_uart(3).is_none());
    }

    #[test]
    fn test_provider_returns_same_port() {
        let mut provider = MemorySerialProvider::new(1);
        let a = provider.port_for_uart(1).unwrap();
        a.borrow_mut().open(9_600).unwrap();
        let b = provider.port_for_uart(1).unwrap();
        assert!(b.borrow().is_open());
    }
}
