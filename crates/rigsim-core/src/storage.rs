//! Configuration snapshot and restore
//!
//! The persistence collaborator (EEPROM, a JSON file, anything) stores a
//! bounded list of [`StoredDeviceConfig`] descriptors: type name, UART
//! binding, and the device's packed option bytes. This module converts
//! between that representation and live manager state. Byte-level storage
//! mechanics live outside the core.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::manager::DeviceManager;
use crate::options::MAX_OPTION_BYTES;

/// Maximum stored length of a device type name
pub const MAX_TYPE_NAME_LEN: usize = 16;

/// One stored device descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDeviceConfig {
    /// Device type name
    pub type_name: String,
    /// UART the device was bound to (1-based)
    pub uart_index: u8,
    /// Packed option values, as produced by `serialize_options`
    #[serde(default)]
    pub option_bytes: Vec<u8>,
}

/// Capture every existing device as a stored descriptor
///
/// Option bytes beyond [`MAX_OPTION_BYTES`] are truncated; type names are
/// capped at [`MAX_TYPE_NAME_LEN`].
pub fn config_snapshot(manager: &DeviceManager) -> Vec<StoredDeviceConfig> {
    manager
        .devices()
        .map(|(_, device)| {
            let mut type_name = device.name().to_string();
            type_name.truncate(MAX_TYPE_NAME_LEN);

            let mut option_bytes = device.serialize_options();
            option_bytes.truncate(MAX_OPTION_BYTES);

            StoredDeviceConfig {
                type_name,
                uart_index: device.uart_index(),
                option_bytes,
            }
        })
        .collect()
}

/// Recreate devices from stored descriptors
///
/// Each entry is restored independently: a failure (unknown type, UART taken,
/// bad option bytes) is logged and skipped, and restoration continues with
/// the rest. Returns the number of devices created.
pub fn restore_config(manager: &mut DeviceManager, configs: &[StoredDeviceConfig]) -> usize {
    let mut restored = 0;

    for config in configs {
        if config.type_name.is_empty() {
            warn!("skipping stored device with empty type name");
            continue;
        }

        match manager.create_device_with_options(
            &config.type_name,
            config.uart_index,
            &config.option_bytes,
        ) {
            Ok(device_id) => {
                info!(
                    "restored device {} ({}) on UART {}",
                    device_id, config.type_name, config.uart_index
                );
                restored += 1;
            }
            Err(e) => {
                warn!(
                    "failed to restore device '{}' on UART {}: {}",
                    config.type_name, config.uart_index, e
                );
            }
        }
    }

    restored
}
