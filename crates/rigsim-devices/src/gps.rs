//! NMEA GPS receiver emulator
//!
//! Output-only device: on each configured output tick it advances the
//! simulated clock by one second and writes a full NMEA sentence cycle to
//! the serial port.

use std::any::Any;
use std::time::{Duration, Instant};

use rigsim_core::{
    options, DeviceCategory, DeviceFactory, DeviceId, DeviceOption, EmulatedDevice, MeterType,
    OptionError, SerialError, SharedSerial,
};
use rigsim_protocol::nmea::GpsFix;
use tracing::{debug, info};

const BAUD_CHOICES: &[&str] = &["4800", "9600", "19200", "38400"];
const BAUD_VALUES: &[u32] = &[4_800, 9_600, 19_200, 38_400];
const DEFAULT_BAUD_INDEX: u8 = 1;

const RATE_CHOICES: &[&str] = &["1", "5", "10"];
const RATE_VALUES: &[u32] = &[1, 5, 10];
const DEFAULT_RATE_INDEX: u8 = 0;

/// NMEA GPS emulator device
pub struct NmeaGpsDevice {
    serial: SharedSerial,
    uart_index: u8,
    device_id: Option<DeviceId>,
    running: bool,
    fix: GpsFix,
    options: [DeviceOption; 2],
    last_output: Option<Instant>,
}

impl NmeaGpsDevice {
    /// Create a stopped instance bound to a serial port
    pub fn new(serial: SharedSerial, uart_index: u8) -> Self {
        Self {
            serial,
            uart_index,
            device_id: None,
            running: false,
            fix: GpsFix::default(),
            options: [
                DeviceOption::enumerated(
                    "baud_rate",
                    "Serial baud rate",
                    BAUD_CHOICES,
                    DEFAULT_BAUD_INDEX,
                ),
                DeviceOption::enumerated(
                    "update_rate",
                    "Output rate (Hz)",
                    RATE_CHOICES,
                    DEFAULT_RATE_INDEX,
                ),
            ],
            last_output: None,
        }
    }

    /// Direct access to the simulated fix, for tests and the console
    pub fn fix(&self) -> &GpsFix {
        &self.fix
    }

    /// Move the simulated receiver
    pub fn set_position(&mut self, latitude: f64, longitude: f64, altitude: f32) {
        self.fix.set_position(latitude, longitude, altitude);
        info!(
            "nmea-gps: position set to {:.6}, {:.6}, {:.1}m",
            latitude, longitude, altitude
        );
    }

    /// Override the simulated UTC time of day
    pub fn set_time(&mut self, hour: u8, minute: u8, second: u8) {
        self.fix.clock.hour = hour;
        self.fix.clock.minute = minute;
        self.fix.clock.second = second;
    }

    /// Override the simulated UTC date
    pub fn set_date(&mut self, day: u8, month: u8, year: u16) {
        self.fix.clock.day = day;
        self.fix.clock.month = month;
        self.fix.clock.year = year;
    }

    fn configured_baud(&self) -> u32 {
        let index = self.options[0].selected_index().unwrap_or(DEFAULT_BAUD_INDEX);
        BAUD_VALUES
            .get(index as usize)
            .copied()
            .unwrap_or(BAUD_VALUES[DEFAULT_BAUD_INDEX as usize])
    }

    fn output_interval(&self) -> Duration {
        let index = self.options[1].selected_index().unwrap_or(DEFAULT_RATE_INDEX);
        let hz = RATE_VALUES
            .get(index as usize)
            .copied()
            .unwrap_or(RATE_VALUES[DEFAULT_RATE_INDEX as usize]);
        Duration::from_millis(1000 / hz as u64)
    }

    fn apply_baud(&mut self) -> Result<(), SerialError> {
        let baud = self.configured_baud();
        let mut port = self.serial.borrow_mut();
        if port.is_open() {
            port.close();
        }
        port.open(baud)
    }

    /// One polling step: emit a sentence cycle when the interval elapsed
    fn tick(&mut self, now: Instant) {
        let due = match self.last_output {
            Some(last) => now.saturating_duration_since(last) >= self.output_interval(),
            None => true,
        };
        if !due {
            return;
        }
        self.last_output = Some(now);

        self.fix.clock.advance_second();

        let mut port = self.serial.borrow_mut();
        for sentence in self.fix.sentences() {
            port.write_all(sentence.as_bytes());
            debug!("nmea-gps: TX {}", sentence.trim_end());
        }
    }
}

impl EmulatedDevice for NmeaGpsDevice {
    fn begin(&mut self) -> Result<(), SerialError> {
        if self.running {
            return Ok(());
        }
        self.apply_baud()?;
        self.fix = GpsFix::default();
        self.last_output = Some(Instant::now());
        self.running = true;
        info!(
            "nmea-gps: started on UART {} at {} baud, {} Hz",
            self.uart_index,
            self.configured_baud(),
            RATE_VALUES[self.options[1].selected_index().unwrap_or(DEFAULT_RATE_INDEX) as usize],
        );
        Ok(())
    }

    fn end(&mut self) {
        if !self.running {
            return;
        }
        self.serial.borrow_mut().close();
        self.running = false;
        info!("nmea-gps: stopped on UART {}", self.uart_index);
    }

    fn update(&mut self) {
        if !self.running {
            return;
        }
        self.tick(Instant::now());
    }

    fn name(&self) -> &'static str {
        "nmea-gps"
    }

    fn description(&self) -> &'static str {
        "NMEA GPS Emulator"
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
        options::find_option_mut(&mut self.options, name)
            .ok_or_else(|| OptionError::UnknownOption(name.to_string()))?
            .parse_set(value)?;

        if name.eq_ignore_ascii_case("baud_rate") && self.running {
            if let Err(e) = self.apply_baud() {
                tracing::warn!("nmea-gps: failed to re-open UART {}: {}", self.uart_index, e);
            }
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<String> {
        options::find_option(&self.options, name).map(|o| o.format())
    }

    fn serialize_options(&self) -> Vec<u8> {
        vec![
            self.options[0].selected_index().unwrap_or(DEFAULT_BAUD_INDEX),
            self.options[1].selected_index().unwrap_or(DEFAULT_RATE_INDEX),
        ]
    }

    fn deserialize_options(&mut self, data: &[u8]) -> Result<(), OptionError> {
        if data.len() < 2 {
            return Err(OptionError::DataTooShort(data.len()));
        }
        let baud_index = if (data[0] as usize) < BAUD_CHOICES.len() {
            data[0]
        } else {
            DEFAULT_BAUD_INDEX
        };
        let rate_index = if (data[1] as usize) < RATE_CHOICES.len() {
            data[1]
        } else {
            DEFAULT_RATE_INDEX
        };
        self.options[0].value = rigsim_core::OptionValue::Enum {
            choices: BAUD_CHOICES,
            selected: baud_index,
        };
        self.options[1].value = rigsim_core::OptionValue::Enum {
            choices: RATE_CHOICES,
            selected: rate_index,
        };
        Ok(())
    }

    fn set_meter(&mut self, _meter: MeterType, _value: u8) -> bool {
        // GPS receivers have no meters
        false
    }

    fn meter(&self, _meter: MeterType) -> u8 {
        0
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn status(&self) -> String {
        let fix_status = match self.fix.fix_quality {
            1 => "GPS fix",
            2 => "DGPS fix",
            _ => "No fix",
        };
        let rate =
            RATE_VALUES[self.options[1].selected_index().unwrap_or(DEFAULT_RATE_INDEX) as usize];

        format!(
            "  Position: {:.6}, {:.6}\n  Altitude: {:.1} m\n  Speed: {:.1} knots\n  Course: {:.1} deg\n  Fix: {} ({} satellites)\n  HDOP: {:.1}\n  Time: {:02}:{:02}:{:02} UTC\n  Date: {:04}-{:02}-{:02}\n  Update rate: {} Hz",
            self.fix.latitude,
            self.fix.longitude,
            self.fix.altitude,
            self.fix.speed_knots,
            self.fix.course_true,
            fix_status,
            self.fix.satellites_used,
            self.fix.hdop,
            self.fix.clock.hour,
            self.fix.clock.minute,
            self.fix.clock.second,
            self.fix.clock.year,
            self.fix.clock.month,
            self.fix.clock.day,
            rate,
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Factory for [`NmeaGpsDevice`] instances
pub struct NmeaGpsFactory;

impl DeviceFactory for NmeaGpsFactory {
    fn type_name(&self) -> &'static str {
        "nmea-gps"
    }

    fn description(&self) -> &'static str {
        "NMEA GPS Emulator"
    }

    fn category(&self) -> DeviceCategory {
        DeviceCategory::Gps
    }

    fn create(&self, serial: SharedSerial, uart_index: u8) -> Box<dyn EmulatedDevice> {
        Box::new(NmeaGpsDevice::new(serial, uart_index))
    }
}
