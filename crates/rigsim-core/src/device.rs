//! The emulated device contract
//!
//! Every emulated peripheral implements [`EmulatedDevice`] and ships a
//! stateless [`DeviceFactory`] that the manager uses to construct instances
//! on demand.

use std::any::Any;
use std::fmt;

use crate::error::{OptionError, SerialError};
use crate::options::DeviceOption;
use crate::serial::SharedSerial;

/// Broad device category, used for type-name aliases ("radio" etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCategory {
    /// Transceiver CAT interface
    Radio,
    /// Azimuth/elevation rotator controller
    Rotator,
    /// GPS receiver
    Gps,
}

impl DeviceCategory {
    /// Alias name accepted by the manager in place of a concrete type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Radio => "radio",
            Self::Rotator => "rotator",
            Self::Gps => "gps",
        }
    }

    /// Parse an alias name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("radio") {
            Some(Self::Radio)
        } else if name.eq_ignore_ascii_case("rotator") {
            Some(Self::Rotator)
        } else if name.eq_ignore_ascii_case("gps") {
            Some(Self::Gps)
        } else {
            None
        }
    }
}

/// Console-controlled simulation meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterType {
    /// Received signal strength
    SMeter,
    /// Transmit power
    Power,
    /// Standing wave ratio
    Swr,
    /// Automatic level control
    Alc,
    /// Speech compression
    Compression,
}

impl MeterType {
    /// Meter name as used by the console
    pub fn name(&self) -> &'static str {
        match self {
            Self::SMeter => "smeter",
            Self::Power => "power",
            Self::Swr => "swr",
            Self::Alc => "alc",
            Self::Compression => "comp",
        }
    }

    /// Parse a meter name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::SMeter,
            Self::Power,
            Self::Swr,
            Self::Alc,
            Self::Compression,
        ]
        .into_iter()
        .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

/// Device instance identity: the slot index assigned by the manager
///
/// Identities are small and reused after destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u8);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An emulated serial-attached peripheral
///
/// Lifecycle: constructed stopped, `begin` opens the UART and starts
/// processing, `end` closes the UART with in-memory state retained, and
/// dropping the instance releases everything. `update` must never block; it
/// drains whatever input is available and advances any continuous
/// simulation.
pub trait EmulatedDevice {
    /// Start the device: open the UART at the configured baud rate
    ///
    /// Calling `begin` on a running device is a no-op success.
    fn begin(&mut self) -> Result<(), SerialError>;

    /// Stop the device: close the UART, keep state
    ///
    /// Calling `end` on a stopped device is a no-op.
    fn end(&mut self);

    /// Process pending input and advance simulations; non-blocking
    fn update(&mut self);

    /// Device type name (e.g. "yaesu")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Identity assigned by the manager, if registered
    fn device_id(&self) -> Option<DeviceId>;

    /// Assign the identity (called by the manager)
    fn set_device_id(&mut self, id: DeviceId);

    /// UART index this device is bound to (immutable after creation)
    fn uart_index(&self) -> u8;

    /// The device's configurable options
    fn options(&self) -> &[DeviceOption];

    /// Set an option by name from a string value
    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError>;

    /// Format an option's current value, if the option exists
    fn option_value(&self, name: &str) -> Option<String>;

    /// Pack option values for persistence (at most
    /// [`MAX_OPTION_BYTES`](crate::options::MAX_OPTION_BYTES))
    fn serialize_options(&self) -> Vec<u8>;

    /// Restore option values from a packed buffer
    fn deserialize_options(&mut self, data: &[u8]) -> Result<(), OptionError>;

    /// Set a simulated meter value; false if this device has no such meter
    fn set_meter(&mut self, meter: MeterType, value: u8) -> bool;

    /// Current simulated meter value (0 if unsupported)
    fn meter(&self, meter: MeterType) -> u8;

    /// Whether the device is between `begin` and `end`
    fn is_running(&self) -> bool;

    /// Multi-line status string for display
    fn status(&self) -> String;

    /// Downcast support for device-specific console operations
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Stateless descriptor and constructor for a device type
pub trait DeviceFactory {
    /// Unique type name (e.g. "yaesu"), matched case-insensitively
    fn type_name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Category this type belongs to
    fn category(&self) -> DeviceCategory;

    /// Build a stopped instance bound to the given serial port and UART
    fn create(&self, serial: SharedSerial, uart_index: u8) -> Box<dyn EmulatedDevice>;
}
