//! Line console over the device manager
//!
//! Thin command layer: every command maps directly onto a manager or device
//! operation. Input arrives as complete lines; output is returned as text so
//! the main loop owns all printing.

use std::path::PathBuf;

use rigsim_core::{config_snapshot, restore_config, DeviceId, DeviceManager, MeterType};
use rigsim_devices::NmeaGpsDevice;

use crate::settings;

const HELP: &str = "\
Commands:
  help                       Show this help
  types                      List available device types
  uarts                      List UARTs and their allocation
  devices                    List active device instances
  create <type> <uart>       Create device on UART (e.g. create radio 1)
  destroy <id>               Destroy device by ID
  start <id>                 Start device
  stop <id>                  Stop device
  status [id]                Show device status
  options <id>               List device options
  set <id> <option> <value>  Set device option
  get <id> <option>          Get device option value
  meter <id> <type> <value>  Set meter (smeter/power/swr/alc/comp)
  gps <id> <lat> <lon> [alt] Set GPS position (decimal degrees)
  save                       Save configuration to disk
  load                       Restore configuration from disk
  clear                      Delete stored configuration
  quit                       Exit";

/// Console command processor bound to a config file path
pub struct Console {
    config_path: PathBuf,
}

impl Console {
    /// Create a console persisting to the given config path
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Execute one command line
    ///
    /// Returns `(keep_running, output)`.
    pub fn execute(&self, manager: &mut DeviceManager, line: &str) -> (bool, String) {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = args.first() else {
            return (true, String::new());
        };

        let output = match command.to_ascii_lowercase().as_str() {
            "help" => HELP.to_string(),
            "types" => self.cmd_types(manager),
            "uarts" => self.cmd_uarts(manager),
            "devices" => self.cmd_devices(manager),
            "create" => self.cmd_create(manager, &args),
            "destroy" => self.cmd_destroy(manager, &args),
            "start" => self.cmd_start(manager, &args),
            "stop" => self.cmd_stop(manager, &args),
            "status" => self.cmd_status(manager, &args),
            "options" => self.cmd_options(manager, &args),
            "set" => self.cmd_set(manager, &args),
            "get" => self.cmd_get(manager, &args),
            "meter" => self.cmd_meter(manager, &args),
            "gps" => self.cmd_gps(manager, &args),
            "save" => self.cmd_save(manager),
            "load" => self.cmd_load(manager),
            "clear" => self.cmd_clear(),
            "quit" | "exit" => return (false, String::new()),
            _ => format!("Unknown command: {}\nType 'help' for available commands.", command),
        };
        (true, output)
    }

    fn cmd_types(&self, manager: &DeviceManager) -> String {
        let mut out = String::from("Available device types:\n");
        for factory in manager.factories() {
            out.push_str(&format!(
                "  {:<10} {} [{}]\n",
                factory.type_name(),
                factory.description(),
                factory.category().name(),
            ));
        }
        out.trim_end().to_string()
    }

    fn cmd_uarts(&self, manager: &DeviceManager) -> String {
        let mut out = String::from("UARTs:\n");
        for uart in 1..=manager.uart_count() {
            match manager.device_by_uart(uart) {
                Some(device) => out.push_str(&format!(
                    "  UART {}: in use by device {} ({})\n",
                    uart,
                    device.device_id().map(|id| id.to_string()).unwrap_or_default(),
                    device.name(),
                )),
                None => out.push_str(&format!("  UART {}: free\n", uart)),
            }
        }
        out.trim_end().to_string()
    }

    fn cmd_devices(&self, manager: &DeviceManager) -> String {
        if manager.device_count() == 0 {
            return "No active devices.".to_string();
        }
        let mut out = String::from("Active devices:\n");
        for (id, device) in manager.devices() {
            out.push_str(&format!(
                "  {} {:<10} UART {} [{}]\n",
                id,
                device.name(),
                device.uart_index(),
                if device.is_running() { "running" } else { "stopped" },
            ));
        }
        out.trim_end().to_string()
    }

    fn cmd_create(&self, manager: &mut DeviceManager, args: &[&str]) -> String {
        let [_, type_name, uart] = args else {
            return "Usage: create <type> <uart>".to_string();
        };
        let Ok(uart_index) = uart.parse::<u8>() else {
            return format!("Invalid UART index: {}", uart);
        };
        match manager.create_device(type_name, uart_index) {
            Ok(id) => format!("Created device {} on UART {}", id, uart_index),
            Err(e) => format!("Error: {}", e),
        }
    }

    fn cmd_destroy(&self, manager: &mut DeviceManager, args: &[&str]) -> String {
        let Some(id) = parse_device_id(args) else {
            return "Usage: destroy <id>".to_string();
        };
        if manager.destroy_device(id) {
            format!("Destroyed device {}", id)
        } else {
            format!("No device with ID {}", id)
        }
    }

    fn cmd_start(&self, manager: &mut DeviceManager, args: &[&str]) -> String {
        let Some(id) = parse_device_id(args) else {
            return "Usage: start <id>".to_string();
        };
        match manager.device_mut(id) {
            Some(device) => match device.begin() {
                Ok(()) => format!("Started device {}", id),
                Err(e) => format!("Error: {}", e),
            },
            None => format!("No device with ID {}", id),
        }
    }

    fn cmd_stop(&self, manager: &mut DeviceManager, args: &[&str]) -> String {
        let Some(id) = parse_device_id(args) else {
            return "Usage: stop <id>".to_string();
        };
        match manager.device_mut(id) {
            Some(device) => {
                device.end();
                format!("Stopped device {}", id)
            }
            None => format!("No device with ID {}", id),
        }
    }

    fn cmd_status(&self, manager: &DeviceManager, args: &[&str]) -> String {
        if let Some(id) = parse_device_id(args) {
            match manager.device(id) {
                Some(device) => format!(
                    "Device {} ({}) on UART {} [{}]\n{}",
                    id,
                    device.name(),
                    device.uart_index(),
                    if device.is_running() { "running" } else { "stopped" },
                    device.status(),
                ),
                None => format!("No device with ID {}", id),
            }
        } else {
            // No ID: show everything
            let mut out = String::new();
            for (id, device) in manager.devices() {
                out.push_str(&format!(
                    "Device {} ({}) on UART {} [{}]\n{}\n",
                    id,
                    device.name(),
                    device.uart_index(),
                    if device.is_running() { "running" } else { "stopped" },
                    device.status(),
                ));
            }
            if out.is_empty() {
                "No active devices.".to_string()
            } else {
                out.trim_end().to_string()
            }
        }
    }

    fn cmd_options(&self, manager: &DeviceManager, args: &[&str]) -> String {
        let Some(id) = parse_device_id(args) else {
            return "Usage: options <id>".to_string();
        };
        let Some(device) = manager.device(id) else {
            return format!("No device with ID {}", id);
        };
        let mut out = format!("Options for device {}:\n", id);
        for option in device.options() {
            out.push_str(&format!(
                "  {:<12} = {:<8} ({})\n",
                option.name,
                option.format(),
                option.description,
            ));
        }
        out.trim_end().to_string()
    }

    fn cmd_set(&self, manager: &mut DeviceManager, args: &[&str]) -> String {
        let [_, id, option, value] = args else {
            return "Usage: set <id> <option> <value>".to_string();
        };
        let Some(id) = parse_id(id) else {
            return format!("Invalid device ID: {}", id);
        };
        match manager.device_mut(id) {
            Some(device) => match device.set_option(option, value) {
                Ok(()) => format!("{} = {}", option, value),
                Err(e) => format!("Error: {}", e),
            },
            None => format!("No device with ID {}", id),
        }
    }

    fn cmd_get(&self, manager: &DeviceManager, args: &[&str]) -> String {
        let [_, id, option] = args else {
            return "Usage: get <id> <option>".to_string();
        };
        let Some(id) = parse_id(id) else {
            return format!("Invalid device ID: {}", id);
        };
        match manager.device(id) {
            Some(device) => match device.option_value(option) {
                Some(value) => format!("{} = {}", option, value),
                None => format!("Unknown option: {}", option),
            },
            None => format!("No device with ID {}", id),
        }
    }

    fn cmd_meter(&self, manager: &mut DeviceManager, args: &[&str]) -> String {
        let [_, id, meter, value] = args else {
            return "Usage: meter <id> <type> <value>".to_string();
        };
        let Some(id) = parse_id(id) else {
            return format!("Invalid device ID: {}", id);
        };
        let Some(meter) = MeterType::from_name(meter) else {
            return format!("Unknown meter type: {}", meter);
        };
        let Ok(value) = value.parse::<u8>() else {
            return format!("Invalid meter value: {}", value);
        };
        match manager.device_mut(id) {
            Some(device) => {
                if device.set_meter(meter, value) {
                    format!("{} = {}", meter.name(), value)
                } else {
                    format!("Device {} has no {} meter", id, meter.name())
                }
            }
            None => format!("No device with ID {}", id),
        }
    }

    fn cmd_gps(&self, manager: &mut DeviceManager, args: &[&str]) -> String {
        if args.len() < 4 {
            return "Usage: gps <id> <lat> <lon> [alt]".to_string();
        }
        let Some(id) = parse_id(args[1]) else {
            return format!("Invalid device ID: {}", args[1]);
        };
        let (Ok(lat), Ok(lon)) = (args[2].parse::<f64>(), args[3].parse::<f64>()) else {
            return "Invalid coordinates".to_string();
        };
        let alt = args
            .get(4)
            .and_then(|a| a.parse::<f32>().ok())
            .unwrap_or(0.0);

        let Some(device) = manager.device_mut(id) else {
            return format!("No device with ID {}", id);
        };
        match device.as_any_mut().downcast_mut::<NmeaGpsDevice>() {
            Some(gps) => {
                gps.set_position(lat, lon, alt);
                format!("Position set to {}, {}, {}m", lat, lon, alt)
            }
            None => format!("Device {} is not a GPS", id),
        }
    }

    fn cmd_save(&self, manager: &DeviceManager) -> String {
        let snapshot = config_snapshot(manager);
        match settings::save(&self.config_path, &snapshot) {
            Ok(()) => format!("Saved {} device(s)", snapshot.len()),
            Err(e) => format!("Error: {}", e),
        }
    }

    fn cmd_load(&self, manager: &mut DeviceManager) -> String {
        let configs = settings::load(&self.config_path);
        if configs.is_empty() {
            return "No stored configuration.".to_string();
        }
        let restored = restore_config(manager, &configs);
        format!("Restored {} of {} device(s)", restored, configs.len())
    }

    fn cmd_clear(&self) -> String {
        match settings::clear(&self.config_path) {
            Ok(()) => "Configuration cleared.".to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }
}

fn parse_id(arg: &str) -> Option<DeviceId> {
    arg.parse::<u8>().ok().map(DeviceId)
}

fn parse_device_id(args: &[&str]) -> Option<DeviceId> {
    args.get(1).and_then(|a| parse_id(a))
}
