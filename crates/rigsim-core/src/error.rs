//! Error types for device and resource management

use thiserror::Error;

/// Errors that can occur while managing devices and UARTs
///
/// Every variant is a definitive rejection; no operation leaves partial
/// state behind, and nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// UART index outside the platform's range
    #[error("invalid UART index: {0}")]
    InvalidUart(u8),

    /// UART already owned by another device
    #[error("UART {0} is already in use")]
    UartBusy(u8),

    /// No registered factory for the requested type
    #[error("unknown device type: {0}")]
    UnknownType(String),

    /// All device slots are occupied
    #[error("no free device slots")]
    NoFreeSlot,

    /// Factory registry is at capacity
    #[error("factory registry is full")]
    RegistryFull,

    /// A factory with this type name is already registered
    #[error("device type already registered: {0}")]
    DuplicateType(String),

    /// The serial provider has no port for this UART
    #[error("no serial port available for UART {0}")]
    SerialUnavailable(u8),
}

/// Errors from option parsing and restoration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// No option with the given name on this device
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// Value failed to parse or is out of range for the option
    #[error("invalid value {value:?} for option {name}")]
    InvalidValue {
        /// Option name
        name: String,
        /// Rejected input
        value: String,
    },

    /// Serialized option buffer shorter than the device expects
    #[error("option data too short: {0} bytes")]
    DataTooShort(usize),
}

/// Errors from the serial transport layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// Underlying port could not be opened
    #[error("failed to open serial port: {0}")]
    OpenFailed(String),

    /// Operation attempted on a closed port
    #[error("serial port is not open")]
    NotOpen,
}
