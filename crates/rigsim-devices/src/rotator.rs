//! Yaesu G-5500 rotator emulator (GS-232 protocol)
//!
//! Couples the GS-232 codec to a continuous rotation simulation: position
//! advances by elapsed wall time times the configured angular speed, so the
//! trajectory is independent of how often `update` runs.

use std::any::Any;
use std::time::{Duration, Instant};

use rigsim_core::{
    options, DeviceCategory, DeviceFactory, DeviceId, DeviceOption, EmulatedDevice, MeterType,
    OptionError, SerialError, SharedSerial,
};
use rigsim_protocol::gs232::{Gs232Codec, Gs232Command, Gs232Response};
use rigsim_protocol::ProtocolCodec;
use tracing::{debug, info};

/// Azimuth range in degrees; the G-5500 overlaps past north
pub const AZ_MIN: f32 = 0.0;
/// Azimuth upper bound
pub const AZ_MAX: f32 = 450.0;
/// Elevation lower bound
pub const EL_MIN: f32 = 0.0;
/// Elevation upper bound
pub const EL_MAX: f32 = 180.0;

const BAUD_CHOICES: &[&str] = &["1200", "4800", "9600"];
const BAUD_VALUES: &[u32] = &[1_200, 4_800, 9_600];
const DEFAULT_BAUD_INDEX: u8 = 2;

const MIN_SPEED: u32 = 1;
const MAX_SPEED: u32 = 10;
const DEFAULT_AZ_SPEED: u32 = 2;
const DEFAULT_EL_SPEED: u32 = 1;

/// Minimum interval between position integrations, to keep very fast
/// polling from accumulating sub-millisecond floating point steps
const MIN_STEP_INTERVAL: Duration = Duration::from_millis(10);

/// Rotation direction of one axis
///
/// `Cw` means increasing angle (clockwise for azimuth, up for elevation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDir {
    /// Not moving
    Stopped,
    /// Increasing angle
    Cw,
    /// Decreasing angle
    Ccw,
}

/// Simulated rotator state
#[derive(Debug, Clone, PartialEq)]
pub struct RotatorState {
    /// Current azimuth in fractional degrees
    pub azimuth: f32,
    /// Current elevation in fractional degrees
    pub elevation: f32,
    /// Goto target azimuth
    pub target_azimuth: f32,
    /// Goto target elevation
    pub target_elevation: f32,
    /// Azimuth axis motion
    pub az_rotation: RotationDir,
    /// Elevation axis motion
    pub el_rotation: RotationDir,
    /// Azimuth axis is tracking a goto target
    pub az_goto: bool,
    /// Elevation axis is tracking a goto target
    pub el_goto: bool,
}

impl Default for RotatorState {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: 0.0,
            target_azimuth: 0.0,
            target_elevation: 0.0,
            az_rotation: RotationDir::Stopped,
            el_rotation: RotationDir::Stopped,
            az_goto: false,
            el_goto: false,
        }
    }
}

impl RotatorState {
    /// Azimuth rounded for protocol responses
    pub fn azimuth_int(&self) -> u16 {
        (self.azimuth + 0.5) as u16
    }

    /// Elevation rounded for protocol responses
    pub fn elevation_int(&self) -> u16 {
        (self.elevation + 0.5) as u16
    }

    /// Whether either axis is moving
    pub fn is_moving(&self) -> bool {
        self.az_rotation != RotationDir::Stopped || self.el_rotation != RotationDir::Stopped
    }

    /// Stop azimuth motion and leave goto mode
    pub fn stop_azimuth(&mut self) {
        self.az_rotation = RotationDir::Stopped;
        self.az_goto = false;
    }

    /// Stop elevation motion and leave goto mode
    pub fn stop_elevation(&mut self) {
        self.el_rotation = RotationDir::Stopped;
        self.el_goto = false;
    }

    /// Stop both axes
    pub fn stop_all(&mut self) {
        self.stop_azimuth();
        self.stop_elevation();
    }

    /// Begin manual clockwise azimuth rotation
    pub fn rotate_cw(&mut self) {
        self.az_rotation = RotationDir::Cw;
        self.az_goto = false;
    }

    /// Begin manual counter-clockwise azimuth rotation
    pub fn rotate_ccw(&mut self) {
        self.az_rotation = RotationDir::Ccw;
        self.az_goto = false;
    }

    /// Begin manual upward elevation rotation
    pub fn rotate_up(&mut self) {
        self.el_rotation = RotationDir::Cw;
        self.el_goto = false;
    }

    /// Begin manual downward elevation rotation
    pub fn rotate_down(&mut self) {
        self.el_rotation = RotationDir::Ccw;
        self.el_goto = false;
    }

    /// Start moving toward an azimuth target
    ///
    /// Direction comes from the sign of (target - current) at issue time and
    /// stays fixed until the target is reached or the command is re-issued.
    pub fn goto_azimuth(&mut self, target: f32) {
        self.target_azimuth = target.clamp(AZ_MIN, AZ_MAX);
        self.az_goto = true;
        if self.target_azimuth > self.azimuth {
            self.az_rotation = RotationDir::Cw;
        } else if self.target_azimuth < self.azimuth {
            self.az_rotation = RotationDir::Ccw;
        } else {
            self.az_rotation = RotationDir::Stopped;
            self.az_goto = false;
        }
    }

    /// Start moving toward an elevation target
    pub fn goto_elevation(&mut self, target: f32) {
        self.target_elevation = target.clamp(EL_MIN, EL_MAX);
        self.el_goto = true;
        if self.target_elevation > self.elevation {
            self.el_rotation = RotationDir::Cw;
        } else if self.target_elevation < self.elevation {
            self.el_rotation = RotationDir::Ccw;
        } else {
            self.el_rotation = RotationDir::Stopped;
            self.el_goto = false;
        }
    }
}

/// Advance both axes by `dt` seconds at the given speeds
///
/// Goto mode clamps to (and stops at) the target the moment it is reached
/// or overshot; manual rotation clamps at the range bounds and stops there.
fn integrate(state: &mut RotatorState, az_speed: f32, el_speed: f32, dt: f32) {
    if state.az_rotation != RotationDir::Stopped {
        let step = az_speed * dt;
        if state.az_rotation == RotationDir::Cw {
            state.azimuth += step;
            if state.az_goto && state.azimuth >= state.target_azimuth {
                state.azimuth = state.target_azimuth;
                state.stop_azimuth();
            }
            if state.azimuth > AZ_MAX {
                state.azimuth = AZ_MAX;
                state.stop_azimuth();
            }
        } else {
            state.azimuth -= step;
            if state.az_goto && state.azimuth <= state.target_azimuth {
                state.azimuth = state.target_azimuth;
                state.stop_azimuth();
            }
            if state.azimuth < AZ_MIN {
                state.azimuth = AZ_MIN;
                state.stop_azimuth();
            }
        }
    }

    if state.el_rotation != RotationDir::Stopped {
        let step = el_speed * dt;
        if state.el_rotation == RotationDir::Cw {
            state.elevation += step;
            if state.el_goto && state.elevation >= state.target_elevation {
                state.elevation = state.target_elevation;
                state.stop_elevation();
            }
            if state.elevation > EL_MAX {
                state.elevation = EL_MAX;
                state.stop_elevation();
            }
        } else {
            state.elevation -= step;
            if state.el_goto && state.elevation <= state.target_elevation {
                state.elevation = state.target_elevation;
                state.stop_elevation();
            }
            if state.elevation < EL_MIN {
                state.elevation = EL_MIN;
                state.stop_elevation();
            }
        }
    }
}

/// Apply one parsed command to the state, producing the response for reads
fn apply_command(state: &mut RotatorState, cmd: Gs232Command) -> Option<Gs232Response> {
    match cmd {
        Gs232Command::RotateClockwise => {
            state.rotate_cw();
            None
        }
        Gs232Command::RotateCounterClockwise => {
            state.rotate_ccw();
            None
        }
        Gs232Command::StopAzimuth => {
            state.stop_azimuth();
            None
        }
        Gs232Command::RotateUp => {
            state.rotate_up();
            None
        }
        Gs232Command::RotateDown => {
            state.rotate_down();
            None
        }
        Gs232Command::StopElevation => {
            state.stop_elevation();
            None
        }
        Gs232Command::StopAll => {
            state.stop_all();
            None
        }
        Gs232Command::ReadAzimuth => Some(Gs232Response::Azimuth(state.azimuth_int())),
        Gs232Command::ReadAzEl => Some(Gs232Response::AzEl(
            state.azimuth_int(),
            state.elevation_int(),
        )),
        Gs232Command::ReadElevation => Some(Gs232Response::Elevation(state.elevation_int())),
        Gs232Command::GotoAzimuth(az) => {
            state.goto_azimuth(az as f32);
            debug!("g-5500: moving to azimuth {}", az);
            None
        }
        Gs232Command::GotoAzEl { az, el } => {
            state.goto_azimuth(az as f32);
            state.goto_elevation(el as f32);
            debug!("g-5500: moving to az={} el={}", az, el);
            None
        }
    }
}

/// Yaesu G-5500 rotator emulator device
pub struct G5500Device {
    serial: SharedSerial,
    uart_index: u8,
    device_id: Option<DeviceId>,
    running: bool,
    state: RotatorState,
    codec: Gs232Codec,
    options: [DeviceOption; 3],
    last_update: Option<Instant>,
}

impl G5500Device {
    /// Create a stopped instance bound to a serial port
    pub fn new(serial: SharedSerial, uart_index: u8) -> Self {
        Self {
            serial,
            uart_index,
            device_id: None,
            running: false,
            state: RotatorState::default(),
            codec: Gs232Codec::new(),
            options: [
                DeviceOption::enumerated(
                    "baud_rate",
                    "Serial baud rate",
                    BAUD_CHOICES,
                    DEFAULT_BAUD_INDEX,
                ),
                DeviceOption::uint(
                    "az_speed",
                    "Azimuth speed (deg/sec)",
                    MIN_SPEED,
                    MAX_SPEED,
                    DEFAULT_AZ_SPEED,
                ),
                DeviceOption::uint(
                    "el_speed",
                    "Elevation speed (deg/sec)",
                    MIN_SPEED,
                    MAX_SPEED,
                    DEFAULT_EL_SPEED,
                ),
            ],
            last_update: None,
        }
    }

    /// Direct access to the simulated state, for tests and the console
    pub fn state(&self) -> &RotatorState {
        &self.state
    }

    fn az_speed(&self) -> f32 {
        self.options[1].as_u32().unwrap_or(DEFAULT_AZ_SPEED) as f32
    }

    fn el_speed(&self) -> f32 {
        self.options[2].as_u32().unwrap_or(DEFAULT_EL_SPEED) as f32
    }

    fn configured_baud(&self) -> u32 {
        let index = self.options[0].selected_index().unwrap_or(DEFAULT_BAUD_INDEX);
        BAUD_VALUES
            .get(index as usize)
            .copied()
            .unwrap_or(BAUD_VALUES[DEFAULT_BAUD_INDEX as usize])
    }

    fn apply_baud(&mut self) -> Result<(), SerialError> {
        let baud = self.configured_baud();
        let mut port = self.serial.borrow_mut();
        if port.is_open() {
            port.close();
        }
        port.open(baud)
    }

    /// Advance the rotation simulation, rate-limited to one integration per
    /// [`MIN_STEP_INTERVAL`]
    fn step_rotation(&mut self, now: Instant) {
        let Some(last) = self.last_update else {
            self.last_update = Some(now);
            return;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < MIN_STEP_INTERVAL {
            return;
        }
        self.last_update = Some(now);
        let az_speed = self.az_speed();
        let el_speed = self.el_speed();
        integrate(
            &mut self.state,
            az_speed,
            el_speed,
            elapsed.as_secs_f32(),
        );
    }
}

impl EmulatedDevice for G5500Device {
    fn begin(&mut self) -> Result<(), SerialError> {
        if self.running {
            return Ok(());
        }
        self.apply_baud()?;
        self.codec.clear();
        self.state = RotatorState::default();
        self.last_update = Some(Instant::now());
        self.running = true;
        info!(
            "g-5500: started on UART {} at {} baud",
            self.uart_index,
            self.configured_baud()
        );
        Ok(())
    }

    fn end(&mut self) {
        if !self.running {
            return;
        }
        self.state.stop_all();
        self.serial.borrow_mut().close();
        self.running = false;
        info!("g-5500: stopped on UART {}", self.uart_index);
    }

    fn update(&mut self) {
        if !self.running {
            return;
        }

        let mut incoming = Vec::new();
        {
            let mut port = self.serial.borrow_mut();
            while let Some(byte) = port.read_byte() {
                incoming.push(byte);
            }
        }
        if !incoming.is_empty() {
            self.codec.push_bytes(&incoming);
            while let Some(cmd) = self.codec.next_command() {
                if let Some(response) = apply_command(&mut self.state, cmd) {
                    self.serial.borrow_mut().write_all(&response.encode());
                }
            }
        }

        self.step_rotation(Instant::now());
    }

    fn name(&self) -> &'static str {
        "g-5500"
    }

    fn description(&self) -> &'static str {
        "Yaesu G-5500 Rotator (GS-232)"
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
                tracing::warn!("g-5500: failed to re-open UART {}: {}", self.uart_index, e);
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
            self.options[1].as_u32().unwrap_or(DEFAULT_AZ_SPEED) as u8,
            self.options[2].as_u32().unwrap_or(DEFAULT_EL_SPEED) as u8,
        ]
    }

    fn deserialize_options(&mut self, data: &[u8]) -> Result<(), OptionError> {
        if data.len() < 3 {
            return Err(OptionError::DataTooShort(data.len()));
        }

        let baud_index = if (data[0] as usize) < BAUD_CHOICES.len() {
            data[0]
        } else {
            DEFAULT_BAUD_INDEX
        };
        self.options[0].value = rigsim_core::OptionValue::Enum {
            choices: BAUD_CHOICES,
            selected: baud_index,
        };

        let restore_speed = |raw: u8, default: u32| {
            let speed = raw as u32;
            if (MIN_SPEED..=MAX_SPEED).contains(&speed) {
                speed
            } else {
                default
            }
        };
        self.options[1].value = rigsim_core::OptionValue::Uint {
            min: MIN_SPEED,
            max: MAX_SPEED,
            value: restore_speed(data[1], DEFAULT_AZ_SPEED),
        };
        self.options[2].value = rigsim_core::OptionValue::Uint {
            min: MIN_SPEED,
            max: MAX_SPEED,
            value: restore_speed(data[2], DEFAULT_EL_SPEED),
        };
        Ok(())
    }

    fn set_meter(&mut self, _meter: MeterType, _value: u8) -> bool {
        // Rotators have no meters
        false
    }

    fn meter(&self, _meter: MeterType) -> u8 {
        0
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn status(&self) -> String {
        let axis_status = |dir: RotationDir, in_goto: bool, cw: &str, ccw: &str| match dir {
            RotationDir::Stopped => "stopped".to_string(),
            RotationDir::Cw if in_goto => format!("goto {}", cw),
            RotationDir::Cw => cw.to_string(),
            RotationDir::Ccw if in_goto => format!("goto {}", ccw),
            RotationDir::Ccw => ccw.to_string(),
        };

        format!(
            "  Azimuth: {} deg ({})\n  Elevation: {} deg ({})\n  Target Az: {} deg\n  Target El: {} deg\n  Az Speed: {} deg/sec\n  El Speed: {} deg/sec",
            self.state.azimuth_int(),
            axis_status(self.state.az_rotation, self.state.az_goto, "CW", "CCW"),
            self.state.elevation_int(),
            axis_status(self.state.el_rotation, self.state.el_goto, "UP", "DOWN"),
            self.state.target_azimuth as i32,
            self.state.target_elevation as i32,
            self.options[1].as_u32().unwrap_or(DEFAULT_AZ_SPEED),
            self.options[2].as_u32().unwrap_or(DEFAULT_EL_SPEED),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Factory for [`G5500Device`] instances
pub struct G5500Factory;

impl DeviceFactory for G5500Factory {
    fn type_name(&self) -> &'static str {
        "g-5500"
    }

    fn description(&self) -> &'static str {
        "Yaesu G-5500 Rotator (GS-232)"
    }

    fn category(&self) -> DeviceCategory {
        DeviceCategory::Rotator
    }

    fn create(&self, serial: SharedSerial, uart_index: u8) -> Box<dyn EmulatedDevice> {
        Box::new(G5500Device::new(serial, uart_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigsim_core::MemorySerialPort;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_device() -> (G5500Device, Rc<RefCell<MemorySerialPort>>) {
        let port = Rc::new(RefCell::new(MemorySerialPort::new()));
        let device = G5500Device::new(port.clone(), 1);
        (device, port)
    }

    fn exchange(
        device: &mut G5500Device,
        port: &Rc<RefCell<MemorySerialPort>>,
        input: &[u8],
    ) -> Vec<u8> {
        port.borrow_mut().inject(input);
        device.update();
        port.borrow_mut().take_output()
    }

    #[test]
    fn test_position_reads() {
        let (mut device, port) = test_device();
        device.begin().unwrap();
        assert_eq!(exchange(&mut device, &port, b"C\r"), b"+0000\r\n");
        assert_eq!(exchange(&mut device, &port, b"C2\r"), b"+0000 +0000\r\n");
        assert_eq!(exchange(&mut device, &port, b"B\r"), b"+0000\r\n");
    }

    #[test]
    fn test_goto_sets_direction_from_target_sign() {
        let mut state = RotatorState::default();
        state.azimuth = 100.0;

        state.goto_azimuth(225.0);
        assert_eq!(state.az_rotation, RotationDir::Cw);
        assert!(state.az_goto);

        state.goto_azimuth(50.0);
        assert_eq!(state.az_rotation, RotationDir::Ccw);

        state.goto_azimuth(100.0);
        assert_eq!(state.az_rotation, RotationDir::Stopped);
        assert!(!state.az_goto);
    }

    #[test]
    fn test_integrate_reaches_target_exactly() {
        let mut state = RotatorState::default();
        state.goto_azimuth(225.0);

        // 2 deg/sec for 50 seconds: exactly 100 degrees
        integrate(&mut state, 2.0, 1.0, 50.0);
        assert!((state.azimuth - 100.0).abs() < 1e-3);
        assert_eq!(state.az_rotation, RotationDir::Cw);

        // Overshoot clamps to the target and stops
        integrate(&mut state, 2.0, 1.0, 100.0);
        assert_eq!(state.azimuth, 225.0);
        assert_eq!(state.az_rotation, RotationDir::Stopped);
        assert!(!state.az_goto);
    }

    #[test]
    fn test_goto_downward() {
        let mut state = RotatorState::default();
        state.azimuth = 300.0;
        state.goto_azimuth(90.0);
        integrate(&mut state, 10.0, 1.0, 1000.0);
        assert_eq!(state.azimuth, 90.0);
        assert_eq!(state.az_rotation, RotationDir::Stopped);
    }

    #[test]
    fn test_manual_rotation_clamps_at_bounds() {
        let mut state = RotatorState::default();
        state.rotate_cw();
        integrate(&mut state, 10.0, 1.0, 1000.0);
        assert_eq!(state.azimuth, AZ_MAX);
        assert_eq!(state.az_rotation, RotationDir::Stopped);

        state.rotate_ccw();
        integrate(&mut state, 10.0, 1.0, 1000.0);
        assert_eq!(state.azimuth, AZ_MIN);
        assert_eq!(state.az_rotation, RotationDir::Stopped);
    }

    #[test]
    fn test_elevation_axis_independent() {
        let mut state = RotatorState::default();
        state.goto_elevation(45.0);
        state.goto_azimuth(10.0);

        integrate(&mut state, 1.0, 1.0, 10.0);
        assert_eq!(state.azimuth, 10.0);
        assert_eq!(state.az_rotation, RotationDir::Stopped);
        assert!((state.elevation - 10.0).abs() < 1e-3);
        assert_eq!(state.el_rotation, RotationDir::Cw);

        integrate(&mut state, 1.0, 1.0, 60.0);
        assert_eq!(state.elevation, 45.0);
        assert_eq!(state.el_rotation, RotationDir::Stopped);
    }

    #[test]
    fn test_stop_commands() {
        let (mut device, port) = test_device();
        device.begin().unwrap();

        exchange(&mut device, &port, b"R\r");
        assert_eq!(device.state().az_rotation, RotationDir::Cw);
        exchange(&mut device, &port, b"A\r");
        assert_eq!(device.state().az_rotation, RotationDir::Stopped);

        exchange(&mut device, &port, b"U\rD\r");
        assert_eq!(device.state().el_rotation, RotationDir::Ccw);
        exchange(&mut device, &port, b"S\r");
        assert!(!device.state().is_moving());
    }

    #[test]
    fn test_step_rotation_rate_limit() {
        let (mut device, _port) = test_device();
        device.begin().unwrap();
        device.state.rotate_cw();

        let t0 = Instant::now();
        device.last_update = Some(t0);

        // Below the 10ms floor: no movement, timestamp unchanged
        device.step_rotation(t0 + Duration::from_millis(5));
        assert_eq!(device.state().azimuth, 0.0);
        assert_eq!(device.last_update, Some(t0));

        // One full second at the default 2 deg/sec
        device.step_rotation(t0 + Duration::from_secs(1));
        assert!((device.state().azimuth - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_goto_via_protocol_and_simulation() {
        let (mut device, port) = test_device();
        device.begin().unwrap();
        device.set_option("az_speed", "10").unwrap();

        exchange(&mut device, &port, b"M225\r");
        assert!(device.state().az_goto);

        let t0 = device.last_update.unwrap();
        device.step_rotation(t0 + Duration::from_secs(60));
        assert_eq!(device.state().azimuth, 225.0);
        assert!(!device.state().az_goto);

        assert_eq!(exchange(&mut device, &port, b"C\r"), b"+0225\r\n");
    }

    #[test]
    fn test_malformed_goto_leaves_state() {
        let (mut device, port) = test_device();
        device.begin().unwrap();
        assert_eq!(exchange(&mut device, &port, b"M900\r"), b"");
        assert!(!device.state().az_goto);
        assert_eq!(device.state().az_rotation, RotationDir::Stopped);
    }

    #[test]
    fn test_begin_resets_position() {
        let (mut device, port) = test_device();
        device.begin().unwrap();
        exchange(&mut device, &port, b"M090\r");
        device.end();
        device.begin().unwrap();
        assert_eq!(device.state().azimuth, 0.0);
        assert!(!device.state().is_moving());
    }

    #[test]
    fn test_option_roundtrip() {
        let (mut device, _port) = test_device();
        device.set_option("baud_rate", "4800").unwrap();
        device.set_option("az_speed", "5").unwrap();
        let bytes = device.serialize_options();
        assert_eq!(bytes, vec![1, 5, 1]);

        let (mut restored, _port) = test_device();
        restored.deserialize_options(&bytes).unwrap();
        assert_eq!(restored.option_value("baud_rate").as_deref(), Some("4800"));
        assert_eq!(restored.option_value("az_speed").as_deref(), Some("5"));
    }

    #[test]
    fn test_deserialize_out_of_range_speed_falls_back() {
        let (mut device, _port) = test_device();
        device.deserialize_options(&[0, 99, 0]).unwrap();
        assert_eq!(device.option_value("az_speed").as_deref(), Some("2"));
        assert_eq!(device.option_value("el_speed").as_deref(), Some("1"));
    }

    #[test]
    fn test_meters_unsupported() {
        let (mut device, _port) = test_device();
        assert!(!device.set_meter(MeterType::SMeter, 10));
        assert_eq!(device.meter(MeterType::SMeter), 0);
    }

    #[test]
    fn test_status_shows_goto() {
        let (mut device, port) = test_device();
        device.begin().unwrap();
        exchange(&mut device, &port, b"M180\r");
        let status = device.status();
        assert!(status.contains("goto CW"));
        assert!(status.contains("Target Az: 180 deg"));
    }
}
