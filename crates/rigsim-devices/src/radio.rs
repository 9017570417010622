//! Yaesu FT-991A CAT interface emulator
//!
//! Binds the radio state model and the CAT codec to a serial port behind
//! the [`EmulatedDevice`] contract. Reads answer from current state; writes
//! mutate state silently, exactly as the hardware behaves.

use std::any::Any;

use rigsim_core::{
    options, DeviceCategory, DeviceFactory, DeviceId, DeviceOption, EmulatedDevice, MeterType,
    OptionError, SerialError, SharedSerial,
};
use rigsim_protocol::cat::{
    CatCodec, CatCommand, CatResponse, OperatingMode, Vfo, CLAR_LIMIT, CLAR_STEP,
};
use rigsim_protocol::ProtocolCodec;
use tracing::{debug, info};

/// Baud rates offered by the `baud_rate` option
const BAUD_CHOICES: &[&str] = &["4800", "9600", "19200", "38400"];
const BAUD_VALUES: &[u32] = &[4_800, 9_600, 19_200, 38_400];
const DEFAULT_BAUD_INDEX: u8 = 3;

/// Power-on frequency for VFO-A (20m FT8)
pub const DEFAULT_FREQ_VFO_A: u32 = 14_074_000;

/// Power-on frequency for VFO-B (40m FT8)
pub const DEFAULT_FREQ_VFO_B: u32 = 7_074_000;

/// Simulated transceiver state
///
/// Frequency and mode reads/writes target the current VFO unless a command
/// names the other explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioState {
    /// VFO-A frequency in Hz
    pub freq_vfo_a: u32,
    /// VFO-B frequency in Hz
    pub freq_vfo_b: u32,
    /// Which VFO is current
    pub current_vfo: Vfo,
    /// Operating mode of VFO-A
    pub mode_vfo_a: OperatingMode,
    /// Operating mode of VFO-B
    pub mode_vfo_b: OperatingMode,
    /// Transmitting
    pub ptt: bool,
    /// Powered on
    pub power_on: bool,
    /// RIT enabled
    pub rit_on: bool,
    /// XIT enabled
    pub xit_on: bool,
    /// Clarifier offset in Hz
    pub rit_offset: i16,
    /// Transmit clarifier offset in Hz
    pub xit_offset: i16,
    /// S-meter (console-controlled)
    pub smeter: u8,
    /// Power meter
    pub power_meter: u8,
    /// SWR meter
    pub swr_meter: u8,
    /// ALC meter
    pub alc_meter: u8,
    /// Compression meter
    pub comp_meter: u8,
    /// Squelch level (0-100)
    pub squelch: u8,
    /// AF gain (0-255)
    pub af_gain: u8,
    /// RF gain (0-255)
    pub rf_gain: u8,
}

impl Default for RadioState {
    fn default() -> Self {
        Self {
            freq_vfo_a: DEFAULT_FREQ_VFO_A,
            freq_vfo_b: DEFAULT_FREQ_VFO_B,
            current_vfo: Vfo::A,
            mode_vfo_a: OperatingMode::Usb,
            mode_vfo_b: OperatingMode::Usb,
            ptt: false,
            power_on: true,
            rit_on: false,
            xit_on: false,
            rit_offset: 0,
            xit_offset: 0,
            smeter: 0,
            power_meter: 0,
            swr_meter: 0,
            alc_meter: 0,
            comp_meter: 0,
            squelch: 50,
            af_gain: 128,
            rf_gain: 255,
        }
    }
}

impl RadioState {
    /// Frequency of the current VFO
    pub fn current_frequency(&self) -> u32 {
        match self.current_vfo {
            Vfo::A => self.freq_vfo_a,
            Vfo::B => self.freq_vfo_b,
        }
    }

    /// Set the frequency of the current VFO
    pub fn set_current_frequency(&mut self, hz: u32) {
        match self.current_vfo {
            Vfo::A => self.freq_vfo_a = hz,
            Vfo::B => self.freq_vfo_b = hz,
        }
    }

    /// Mode of the current VFO
    pub fn current_mode(&self) -> OperatingMode {
        match self.current_vfo {
            Vfo::A => self.mode_vfo_a,
            Vfo::B => self.mode_vfo_b,
        }
    }

    /// Set the mode of the current VFO
    pub fn set_current_mode(&mut self, mode: OperatingMode) {
        match self.current_vfo {
            Vfo::A => self.mode_vfo_a = mode,
            Vfo::B => self.mode_vfo_b = mode,
        }
    }
}

/// Apply one parsed command to the state, producing the response for reads
fn apply_command(state: &mut RadioState, cmd: CatCommand) -> Option<CatResponse> {
    match cmd {
        CatCommand::FrequencyA(None) => Some(CatResponse::FrequencyA(state.freq_vfo_a)),
        CatCommand::FrequencyA(Some(hz)) => {
            state.freq_vfo_a = hz;
            None
        }
        CatCommand::FrequencyB(None) => Some(CatResponse::FrequencyB(state.freq_vfo_b)),
        CatCommand::FrequencyB(Some(hz)) => {
            state.freq_vfo_b = hz;
            None
        }
        CatCommand::Info => Some(CatResponse::Info {
            frequency: state.current_frequency(),
            rit_offset: if state.rit_on { state.rit_offset } else { 0 },
            mode: state.current_mode() as u8,
        }),
        CatCommand::Id => Some(CatResponse::Id),
        CatCommand::Mode(None) => Some(CatResponse::Mode(state.current_mode() as u8)),
        CatCommand::Mode(Some(mode)) => {
            state.set_current_mode(mode);
            None
        }
        CatCommand::Power(None) => Some(CatResponse::Power(state.power_on)),
        CatCommand::Power(Some(on)) => {
            state.power_on = on;
            None
        }
        CatCommand::SMeter => Some(CatResponse::SMeter(state.smeter)),
        CatCommand::Transmit(None) => Some(CatResponse::Transmit(state.ptt)),
        CatCommand::Transmit(Some(tx)) => {
            state.ptt = tx;
            None
        }
        CatCommand::Receive => {
            state.ptt = false;
            None
        }
        CatCommand::VfoSelect(None) => Some(CatResponse::VfoSelect(state.current_vfo)),
        CatCommand::VfoSelect(Some(vfo)) => {
            state.current_vfo = vfo;
            None
        }
        CatCommand::RitEnable(None) => Some(CatResponse::RitEnable(state.rit_on)),
        CatCommand::RitEnable(Some(on)) => {
            state.rit_on = on;
            None
        }
        CatCommand::XitEnable(None) => Some(CatResponse::XitEnable(state.xit_on)),
        CatCommand::XitEnable(Some(on)) => {
            state.xit_on = on;
            None
        }
        CatCommand::RitDown(Some(offset)) | CatCommand::RitUp(Some(offset)) => {
            state.rit_offset = offset;
            None
        }
        CatCommand::RitDown(None) => {
            state.rit_offset = (state.rit_offset - CLAR_STEP).clamp(-CLAR_LIMIT, CLAR_LIMIT);
            None
        }
        CatCommand::RitUp(None) => {
            state.rit_offset = (state.rit_offset + CLAR_STEP).clamp(-CLAR_LIMIT, CLAR_LIMIT);
            None
        }
        CatCommand::AfGain(None) => Some(CatResponse::AfGain(state.af_gain)),
        CatCommand::AfGain(Some(gain)) => {
            state.af_gain = gain;
            None
        }
        CatCommand::RfGain(None) => Some(CatResponse::RfGain(state.rf_gain)),
        CatCommand::RfGain(Some(gain)) => {
            state.rf_gain = gain;
            None
        }
        CatCommand::Squelch(None) => Some(CatResponse::Squelch(state.squelch)),
        CatCommand::Squelch(Some(level)) => {
            state.squelch = level;
            None
        }
        CatCommand::ReadMeter(meter) => {
            let value = match meter {
                1 => state.smeter,
                2 => state.power_meter,
                3 => state.swr_meter,
                4 => state.alc_meter,
                5 => state.comp_meter,
                _ => 0,
            };
            Some(CatResponse::Meter { meter, value })
        }
    }
}

/// Yaesu FT-991A CAT emulator device
pub struct YaesuDevice {
    serial: SharedSerial,
    uart_index: u8,
    device_id: Option<DeviceId>,
    running: bool,
    state: RadioState,
    codec: CatCodec,
    options: [DeviceOption; 2],
}

impl YaesuDevice {
    /// Create a stopped instance bound to a serial port
    pub fn new(serial: SharedSerial, uart_index: u8) -> Self {
        Self {
            serial,
            uart_index,
            device_id: None,
            running: false,
            state: RadioState::default(),
            codec: CatCodec::new(),
            options: [
                DeviceOption::enumerated(
                    "baud_rate",
                    "Serial baud rate",
                    BAUD_CHOICES,
                    DEFAULT_BAUD_INDEX,
                ),
                DeviceOption::boolean("echo", "Log CAT traffic at debug level", false),
            ],
        }
    }

    /// Direct access to the simulated state, for tests and the console
    pub fn state(&self) -> &RadioState {
        &self.state
    }

    fn configured_baud(&self) -> u32 {
        let index = self.options[0].selected_index().unwrap_or(DEFAULT_BAUD_INDEX);
        BAUD_VALUES
            .get(index as usize)
            .copied()
            .unwrap_or(BAUD_VALUES[DEFAULT_BAUD_INDEX as usize])
    }

    /// Re-open the UART at the configured baud rate
    fn apply_baud(&mut self) -> Result<(), SerialError> {
        let baud = self.configured_baud();
        let mut port = self.serial.borrow_mut();
        if port.is_open() {
            port.close();
        }
        port.open(baud)?;
        debug!("yaesu: baud rate set to {}", baud);
        Ok(())
    }
}

impl EmulatedDevice for YaesuDevice {
    fn begin(&mut self) -> Result<(), SerialError> {
        if self.running {
            return Ok(());
        }
        self.apply_baud()?;
        self.codec.clear();
        self.running = true;
        info!(
            "yaesu: started on UART {} at {} baud",
            self.uart_index,
            self.configured_baud()
        );
        Ok(())
    }

    fn end(&mut self) {
        if !self.running {
            return;
        }
        self.serial.borrow_mut().close();
        self.running = false;
        info!("yaesu: stopped on UART {}", self.uart_index);
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
        if incoming.is_empty() {
            return;
        }
        self.codec.push_bytes(&incoming);

        let echo = self.options[1].as_bool().unwrap_or(false);
        while let Some(cmd) = self.codec.next_command() {
            if echo {
                debug!("yaesu: CMD {:?}", cmd);
            }
            if let Some(response) = apply_command(&mut self.state, cmd) {
                let bytes = response.encode();
                if echo {
                    debug!("yaesu: RSP {}", String::from_utf8_lossy(&bytes));
                }
                self.serial.borrow_mut().write_all(&bytes);
            }
        }
    }

    fn name(&self) -> &'static str {
        "yaesu"
    }

    fn description(&self) -> &'static str {
        "Yaesu FT-991A CAT Emulator"
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

        // A baud change takes effect immediately while running
        if name.eq_ignore_ascii_case("baud_rate") && self.running {
            if let Err(e) = self.apply_baud() {
                tracing::warn!("yaesu: failed to re-open UART {}: {}", self.uart_index, e);
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
            u8::from(self.options[1].as_bool().unwrap_or(false)),
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
        self.options[0].value = rigsim_core::OptionValue::Enum {
            choices: BAUD_CHOICES,
            selected: baud_index,
        };
        self.options[1].value = rigsim_core::OptionValue::Bool(data[1] != 0);
        Ok(())
    }

    fn set_meter(&mut self, meter: MeterType, value: u8) -> bool {
        match meter {
            MeterType::SMeter => self.state.smeter = value,
            MeterType::Power => self.state.power_meter = value,
            MeterType::Swr => self.state.swr_meter = value,
            MeterType::Alc => self.state.alc_meter = value,
            MeterType::Compression => self.state.comp_meter = value,
        }
        true
    }

    fn meter(&self, meter: MeterType) -> u8 {
        match meter {
            MeterType::SMeter => self.state.smeter,
            MeterType::Power => self.state.power_meter,
            MeterType::Swr => self.state.swr_meter,
            MeterType::Alc => self.state.alc_meter,
            MeterType::Compression => self.state.comp_meter,
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn status(&self) -> String {
        format!(
            "  VFO-A: {} Hz ({})\n  VFO-B: {} Hz\n  Active VFO: {}\n  PTT: {}\n  S-Meter: {}\n  RIT: {} ({:+} Hz)\n  XIT: {} ({:+} Hz)",
            self.state.freq_vfo_a,
            self.state.current_mode().name(),
            self.state.freq_vfo_b,
            match self.state.current_vfo {
                Vfo::A => 'A',
                Vfo::B => 'B',
            },
            if self.state.ptt { "ON" } else { "OFF" },
            self.state.smeter,
            if self.state.rit_on { "ON" } else { "OFF" },
            self.state.rit_offset,
            if self.state.xit_on { "ON" } else { "OFF" },
            self.state.xit_offset,
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Factory for [`YaesuDevice`] instances
pub struct YaesuFactory;

impl DeviceFactory for YaesuFactory {
    fn type_name(&self) -> &'static str {
        "yaesu"
    }

    fn description(&self) -> &'static str {
        "Yaesu FT-991A CAT Emulator"
    }

    fn category(&self) -> DeviceCategory {
        DeviceCategory::Radio
    }

    fn create(&self, serial: SharedSerial, uart_index: u8) -> Box<dyn EmulatedDevice> {
        Box::new(YaesuDevice::new(serial, uart_index))
    }
}
