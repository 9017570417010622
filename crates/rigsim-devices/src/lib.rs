//! Emulated Devices
//!
//! The three serial-attached peripherals this project emulates, each binding
//! a state model and a protocol codec to a serial port behind the
//! [`EmulatedDevice`](rigsim_core::EmulatedDevice) contract:
//!
//! - **YaesuDevice** (`yaesu`): FT-991A CAT transceiver interface
//! - **G5500Device** (`g-5500`): GS-232 azimuth/elevation rotator
//! - **NmeaGpsDevice** (`nmea-gps`): NMEA-0183 GPS receiver
//!
//! # Example
//!
//! ```rust
//! use rigsim_core::{DeviceManager, MemorySerialProvider};
//! use rigsim_devices::register_builtin_factories;
//!
//! let mut manager = DeviceManager::new(Box::new(MemorySerialProvider::new(2)));
//! register_builtin_factories(&mut manager).unwrap();
//!
//! let id = manager.create_device("radio", 1).unwrap();
//! manager.device_mut(id).unwrap().begin().unwrap();
//! manager.update_all();
//! ```

pub mod gps;
pub mod radio;
pub mod rotator;

pub use gps::{NmeaGpsDevice, NmeaGpsFactory};
pub use radio::{RadioState, YaesuDevice, YaesuFactory};
pub use rotator::{G5500Device, G5500Factory, RotationDir, RotatorState};

use rigsim_core::{DeviceManager, ManagerError};

/// Register every built-in device factory with a manager
pub fn register_builtin_factories(manager: &mut DeviceManager) -> Result<(), ManagerError> {
    manager.register_factory(Box::new(YaesuFactory))?;
    manager.register_factory(Box::new(G5500Factory))?;
    manager.register_factory(Box::new(NmeaGpsFactory))?;
    Ok(())
}
