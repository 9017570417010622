//! Device lifecycle and UART resource management
//!
//! The [`DeviceManager`] owns a bounded registry of device factories, a
//! bounded array of device instances keyed by slot index, and the exclusive
//! allocation of platform UARTs to at most one device each. Every failure is
//! reported synchronously and leaves no partial state behind.

use crate::device::{DeviceCategory, DeviceFactory, DeviceId, EmulatedDevice};
use crate::error::ManagerError;
use crate::serial::{SerialProvider, SharedSerial};
use tracing::{error, info, warn};

/// Maximum number of simultaneously existing device instances
pub const MAX_DEVICES: usize = 4;

/// Maximum number of registered device factories
pub const MAX_DEVICE_FACTORIES: usize = 8;

/// Registry of factories and instances, and the UART allocation table
pub struct DeviceManager {
    factories: Vec<Box<dyn DeviceFactory>>,
    devices: [Option<Box<dyn EmulatedDevice>>; MAX_DEVICES],
    uart_allocation: Vec<Option<DeviceId>>,
    serial_ports: Vec<Option<SharedSerial>>,
    provider: Box<dyn SerialProvider>,
    default_radio_type: String,
    default_rotator_type: String,
    default_gps_type: String,
}

impl DeviceManager {
    /// Create a manager over the given serial provider
    pub fn new(provider: Box<dyn SerialProvider>) -> Self {
        let uart_count = provider.uart_count() as usize;
        Self {
            factories: Vec::new(),
            devices: std::array::from_fn(|_| None),
            uart_allocation: vec![None; uart_count],
            serial_ports: vec![None; uart_count],
            provider,
            default_radio_type: "yaesu".to_string(),
            default_rotator_type: "g-5500".to_string(),
            default_gps_type: "nmea-gps".to_string(),
        }
    }

    // === Factory registration ===

    /// Register a device factory
    ///
    /// Fails on a duplicate type name (case-insensitive) or a full registry.
    pub fn register_factory(&mut self, factory: Box<dyn DeviceFactory>) -> Result<(), ManagerError> {
        if self.factories.len() >= MAX_DEVICE_FACTORIES {
            return Err(ManagerError::RegistryFull);
        }
        if self.find_factory(factory.type_name()).is_some() {
            return Err(ManagerError::DuplicateType(factory.type_name().to_string()));
        }
        self.factories.push(factory);
        Ok(())
    }

    /// Iterate over registered factories
    pub fn factories(&self) -> impl Iterator<Item = &dyn DeviceFactory> {
        self.factories.iter().map(|f| f.as_ref())
    }

    /// Find a factory by type name, case-insensitively
    pub fn find_factory(&self, type_name: &str) -> Option<&dyn DeviceFactory> {
        self.factories
            .iter()
            .find(|f| f.type_name().eq_ignore_ascii_case(type_name))
            .map(|f| f.as_ref())
    }

    /// Set the concrete type a category alias resolves to
    pub fn set_default_type(&mut self, category: DeviceCategory, type_name: &str) {
        let slot = match category {
            DeviceCategory::Radio => &mut self.default_radio_type,
            DeviceCategory::Rotator => &mut self.default_rotator_type,
            DeviceCategory::Gps => &mut self.default_gps_type,
        };
        *slot = type_name.to_string();
    }

    /// Resolve a category alias ("radio", "rotator", "gps") to its default
    /// concrete type; anything else passes through unchanged
    pub fn resolve_type_name<'a>(&'a self, type_or_category: &'a str) -> &'a str {
        match DeviceCategory::from_name(type_or_category) {
            Some(DeviceCategory::Radio) => &self.default_radio_type,
            Some(DeviceCategory::Rotator) => &self.default_rotator_type,
            Some(DeviceCategory::Gps) => &self.default_gps_type,
            None => type_or_category,
        }
    }

    // === Device lifecycle ===

    /// Create a stopped device of the given type (or category alias) bound
    /// to a UART
    ///
    /// Validation order: UART index, UART availability, factory lookup, free
    /// slot, serial port. A failure at any step logs the cause and changes
    /// nothing.
    pub fn create_device(&mut self, type_name: &str, uart_index: u8) -> Result<DeviceId, ManagerError> {
        let resolved = self.resolve_type_name(type_name).to_string();

        if uart_index == 0 || uart_index as usize > self.uart_allocation.len() {
            error!("invalid UART index: {}", uart_index);
            return Err(ManagerError::InvalidUart(uart_index));
        }

        if !self.is_uart_available(uart_index) {
            error!("UART {} is already in use", uart_index);
            return Err(ManagerError::UartBusy(uart_index));
        }

        let Some(factory_index) = self
            .factories
            .iter()
            .position(|f| f.type_name().eq_ignore_ascii_case(&resolved))
        else {
            error!("unknown device type: {}", type_name);
            return Err(ManagerError::UnknownType(type_name.to_string()));
        };

        let Some(slot) = self.devices.iter().position(|d| d.is_none()) else {
            error!("no free device slots");
            return Err(ManagerError::NoFreeSlot);
        };

        let Some(serial) = self.serial_for_uart(uart_index) else {
            error!("no serial port available for UART {}", uart_index);
            return Err(ManagerError::SerialUnavailable(uart_index));
        };

        let mut device = self.factories[factory_index].create(serial, uart_index);

        let device_id = DeviceId(slot as u8);
        device.set_device_id(device_id);

        self.devices[slot] = Some(device);
        self.uart_allocation[uart_index as usize - 1] = Some(device_id);

        info!("created device {} ({}) on UART {}", device_id, resolved, uart_index);
        Ok(device_id)
    }

    /// Create a device and restore its options from serialized bytes
    ///
    /// A restoration failure is non-fatal; the device keeps its defaults.
    pub fn create_device_with_options(
        &mut self,
        type_name: &str,
        uart_index: u8,
        option_data: &[u8],
    ) -> Result<DeviceId, ManagerError> {
        let device_id = self.create_device(type_name, uart_index)?;

        if !option_data.is_empty() {
            if let Some(device) = self.devices[device_id.0 as usize].as_deref_mut() {
                if let Err(e) = device.deserialize_options(option_data) {
                    warn!("failed to restore options for device {}: {}", device_id, e);
                }
            }
        }

        Ok(device_id)
    }

    /// Destroy a device by identity, releasing its UART
    ///
    /// Safe to call with an invalid or already-cleared identity; returns
    /// false with no side effects in that case.
    pub fn destroy_device(&mut self, device_id: DeviceId) -> bool {
        let slot = device_id.0 as usize;
        if slot >= MAX_DEVICES {
            return false;
        }
        let Some(mut device) = self.devices[slot].take() else {
            return false;
        };
        if device.is_running() {
            device.end();
        }

        let uart_index = device.uart_index() as usize;
        if uart_index >= 1 && uart_index <= self.uart_allocation.len() {
            self.uart_allocation[uart_index - 1] = None;
        }

        info!("destroyed device {}", device_id);
        true
    }

    // === Device access ===

    /// Number of existing device instances
    pub fn device_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_some()).count()
    }

    /// Device by identity
    pub fn device(&self, device_id: DeviceId) -> Option<&dyn EmulatedDevice> {
        self.devices.get(device_id.0 as usize)?.as_deref()
    }

    /// Device by identity, mutable
    pub fn device_mut(&mut self, device_id: DeviceId) -> Option<&mut (dyn EmulatedDevice + 'static)> {
        self.devices.get_mut(device_id.0 as usize)?.as_deref_mut()
    }

    /// Device owning the given UART, if any
    pub fn device_by_uart(&self, uart_index: u8) -> Option<&dyn EmulatedDevice> {
        if uart_index == 0 || uart_index as usize > self.uart_allocation.len() {
            return None;
        }
        let device_id = self.uart_allocation[uart_index as usize - 1]?;
        self.device(device_id)
    }

    /// Iterate over existing devices with their identities
    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &dyn EmulatedDevice)> {
        self.devices
            .iter()
            .enumerate()
            .filter_map(|(slot, d)| d.as_deref().map(|d| (DeviceId(slot as u8), d)))
    }

    // === UART management ===

    /// Number of UARTs the platform exposes
    pub fn uart_count(&self) -> u8 {
        self.uart_allocation.len() as u8
    }

    /// Whether a UART exists and is unallocated
    pub fn is_uart_available(&self, uart_index: u8) -> bool {
        if uart_index == 0 || uart_index as usize > self.uart_allocation.len() {
            return false;
        }
        self.uart_allocation[uart_index as usize - 1].is_none()
    }

    /// Serial port for a UART, constructed on first use and reused after
    fn serial_for_uart(&mut self, uart_index: u8) -> Option<SharedSerial> {
        let slot = uart_index.checked_sub(1)? as usize;
        if slot >= self.serial_ports.len() {
            return None;
        }
        if self.serial_ports[slot].is_none() {
            self.serial_ports[slot] = self.provider.port_for_uart(uart_index);
        }
        self.serial_ports[slot].clone()
    }

    // === Main loop ===

    /// Call `update` on every running device; stopped instances cost nothing
    pub fn update_all(&mut self) {
        for device in self.devices.iter_mut().flatten() {
            if device.is_running() {
                device.update();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MeterType;
    use crate::error::{OptionError, SerialError};
    use crate::options::DeviceOption;
    use crate::serial::MemorySerialProvider;
    use std::any::Any;

    struct TestDevice {
        serial: SharedSerial,
        uart_index: u8,
        device_id: Option<DeviceId>,
        running: bool,
        updates: u32,
        options: Vec<DeviceOption>,
    }

    impl EmulatedDevice for TestDevice {
        fn begin(&mut self) -> Result<(), SerialError> {
            self.serial.borrow_mut().open(9_600)?;
            self.running = true;
            Ok(())
        }

        fn end(&mut self) {
            self.serial.borrow_mut().close();
            self.running = false;
        }

        fn update(&mut self) {
            self.updates += 1;
        }

        fn name(&self) -> &'static str {
            "test"
        }

        fn description(&self) -> &'static str {
            "Test device"
        }

        fn device_id(&self) -> Option<DeviceId> {
            self.device_id
        }

        fn set_device_id(&mut self, id: DeviceId) {
            self.device_id = Some(id);
        }

        fn uart_index(&self) -> u8 {
            self.uart_index
        }

        fn options(&self) -> &[DeviceOption] {
            &self.options
        }

        fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
            crate::options::find_option_mut(&mut self.options, name)
                .ok_or_else(|| OptionError::UnknownOption(name.to_string()))?
                .parse_set(value)
        }

        fn option_value(&self, name: &str) -> Option<String> {
            crate::options::find_option(&self.options, name).map(|o| o.format())
        }

        fn serialize_options(&self) -> Vec<u8> {
            vec![u8::from(self.options[0].as_bool().unwrap_or(false))]
        }

        fn deserialize_options(&mut self, data: &[u8]) -> Result<(), OptionError> {
            if data.is_empty() {
                return Err(OptionError::DataTooShort(data.len()));
            }
            self.options[0].value = crate::options::OptionValue::Bool(data[0] != 0);
            Ok(())
        }

        fn set_meter(&mut self, _meter: MeterType, _value: u8) -> bool {
            false
        }

        fn meter(&self, _meter: MeterType) -> u8 {
            0
        }

        fn is_running(&self) -> bool {
            self.running
        }

        fn status(&self) -> String {
            format!("updates: {}", self.updates)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct TestFactory(&'static str);

    impl DeviceFactory for TestFactory {
        fn type_name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "Test device"
        }

        fn category(&self) -> DeviceCategory {
            DeviceCategory::Radio
        }

        fn create(&self, serial: SharedSerial, uart_index: u8) -> Box<dyn EmulatedDevice> {
            Box::new(TestDevice {
                serial,
                uart_index,
                device_id: None,
                running: false,
                updates: 0,
                options: vec![DeviceOption::boolean("echo", "Echo", false)],
            })
        }
    }

    fn manager_with(uarts: u8, types: &[&'static str]) -> DeviceManager {
        let mut mgr = DeviceManager::new(Box::new(MemorySerialProvider::new(uarts)));
        for t in types {
            mgr.register_factory(Box::new(TestFactory(t))).unwrap();
        }
        mgr
    }

    #[test]
    fn test_register_duplicate_type_fails() {
        let mut mgr = manager_with(1, &["yaesu"]);
        assert_eq!(
            mgr.register_factory(Box::new(TestFactory("YAESU"))),
            Err(ManagerError::DuplicateType("YAESU".to_string()))
        );
    }

    #[test]
    fn test_registry_capacity() {
        let mut mgr = manager_with(
            1,
            &["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"],
        );
        assert_eq!(
            mgr.register_factory(Box::new(TestFactory("t8"))),
            Err(ManagerError::RegistryFull)
        );
    }

    #[test]
    fn test_create_validates_uart_index() {
        let mut mgr = manager_with(2, &["yaesu"]);
        assert_eq!(
            mgr.create_device("yaesu", 0),
            Err(ManagerError::InvalidUart(0))
        );
        assert_eq!(
            mgr.create_device("yaesu", 3),
            Err(ManagerError::InvalidUart(3))
        );
    }

    #[test]
    fn test_uart_exclusivity() {
        let mut mgr = manager_with(2, &["yaesu", "other"]);
        let id = mgr.create_device("yaesu", 1).unwrap();
        assert_eq!(
            mgr.create_device("other", 1),
            Err(ManagerError::UartBusy(1))
        );

        assert!(mgr.destroy_device(id));
        assert!(mgr.create_device("other", 1).is_ok());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut mgr = manager_with(1, &["yaesu"]);
        assert_eq!(
            mgr.create_device("kenwood", 1),
            Err(ManagerError::UnknownType("kenwood".to_string()))
        );
    }

    #[test]
    fn test_slot_capacity_and_reuse() {
        let mut mgr = manager_with(8, &["yaesu"]);
        for uart in 1..=4 {
            mgr.create_device("yaesu", uart).unwrap();
        }
        assert_eq!(
            mgr.create_device("yaesu", 5),
            Err(ManagerError::NoFreeSlot)
        );

        // Freed slots are reused, lowest first
        assert!(mgr.destroy_device(DeviceId(2)));
        assert_eq!(mgr.create_device("yaesu", 5), Ok(DeviceId(2)));
    }

    #[test]
    fn test_destroy_is_idempotent_safe() {
        let mut mgr = manager_with(1, &["yaesu"]);
        let id = mgr.create_device("yaesu", 1).unwrap();

        assert!(mgr.destroy_device(id));
        assert!(!mgr.destroy_device(id));
        assert!(!mgr.destroy_device(DeviceId(200)));
        assert_eq!(mgr.device_count(), 0);
        assert!(mgr.is_uart_available(1));
    }

    #[test]
    fn test_destroy_stops_running_device() {
        let mut mgr = manager_with(1, &["yaesu"]);
        let id = mgr.create_device("yaesu", 1).unwrap();
        mgr.device_mut(id).unwrap().begin().unwrap();
        assert!(mgr.device(id).unwrap().is_running());
        assert!(mgr.destroy_device(id));
    }

    #[test]
    fn test_category_alias_resolution() {
        let mut mgr = manager_with(1, &["yaesu"]);
        let id = mgr.create_device("radio", 1).unwrap();
        assert_eq!(mgr.device(id).unwrap().uart_index(), 1);

        // Unknown alias default passes through to the factory lookup
        mgr.set_default_type(DeviceCategory::Radio, "missing");
        assert!(matches!(
            mgr.create_device("radio", 1),
            Err(ManagerError::UartBusy(1))
        ));
    }

    #[test]
    fn test_device_by_uart() {
        let mut mgr = manager_with(2, &["yaesu"]);
        let id = mgr.create_device("yaesu", 2).unwrap();
        assert_eq!(mgr.device_by_uart(2).unwrap().device_id(), Some(id));
        assert!(mgr.device_by_uart(1).is_none());
        assert!(mgr.device_by_uart(0).is_none());
    }

    #[test]
    fn test_create_with_options_restores() {
        let mut mgr = manager_with(1, &["yaesu"]);
        let id = mgr.create_device_with_options("yaesu", 1, &[1]).unwrap();
        assert_eq!(
            mgr.device(id).unwrap().option_value("echo").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_create_with_bad_options_keeps_defaults() {
        let mut mgr = manager_with(1, &["yaesu"]);
        let id = mgr.create_device_with_options("yaesu", 1, &[]).unwrap();
        assert_eq!(
            mgr.device(id).unwrap().option_value("echo").as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_update_all_skips_stopped_devices() {
        let mut mgr = manager_with(2, &["yaesu"]);
        let running = mgr.create_device("yaesu", 1).unwrap();
        let stopped = mgr.create_device("yaesu", 2).unwrap();
        mgr.device_mut(running).unwrap().begin().unwrap();

        mgr.update_all();
        mgr.update_all();

        assert_eq!(mgr.device(running).unwrap().status(), "updates: 2");
        assert_eq!(mgr.device(stopped).unwrap().status(), "updates: 0");
    }
}
