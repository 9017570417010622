//! Device Contract and Resource Management
//!
//! This crate defines the pieces every emulated peripheral shares:
//!
//! - **EmulatedDevice / DeviceFactory**: the polymorphic device contract
//!   (lifecycle, options, meters, persistence, status)
//! - **DeviceOption**: named, typed, self-describing configuration values
//! - **SerialPort / SerialProvider**: the non-blocking transport abstraction
//!   the core polls, with an in-memory implementation for tests
//! - **DeviceManager**: factory registry, instance slots, and exclusive
//!   UART allocation
//! - **Config snapshot/restore**: bounded device descriptors for the
//!   persistence collaborator
//!
//! # Concurrency model
//!
//! Execution is cooperative and single-threaded: one loop calls
//! [`DeviceManager::update_all`] and every device drains its serial input
//! without blocking. Serial ports are shared as `Rc<RefCell<_>>` handles,
//! which makes the single-threaded assumption a compile-time property.
//!
//! # Example
//!
//! ```rust
//! use rigsim_core::{DeviceManager, MemorySerialProvider};
//!
//! let mut manager = DeviceManager::new(Box::new(MemorySerialProvider::new(2)));
//! // Factories register here, then devices are created by type name:
//! // let id = manager.create_device("yaesu", 1)?;
//! manager.update_all();
//! assert_eq!(manager.uart_count(), 2);
//! ```

pub mod device;
pub mod error;
pub mod manager;
pub mod options;
pub mod serial;
pub mod storage;

pub use device::{DeviceCategory, DeviceFactory, DeviceId, EmulatedDevice, MeterType};
pub use error::{ManagerError, OptionError, SerialError};
pub use manager::{DeviceManager, MAX_DEVICES, MAX_DEVICE_FACTORIES};
pub use options::{DeviceOption, OptionValue, MAX_OPTION_BYTES};
pub use serial::{MemorySerialPort, MemorySerialProvider, SerialPort, SerialProvider, SharedSerial};
pub use storage::{config_snapshot, restore_config, StoredDeviceConfig};
