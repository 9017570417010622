//! Yaesu CAT protocol (ASCII, semicolon-terminated)
//!
//! Implements the FT-991A flavor of the ASCII CAT protocol: two-letter
//! command codes, `;` terminator, 9-digit frequencies in Hz. A command with
//! empty parameters is a read (the radio responds); a command with
//! parameters is a write (the radio mutates state and stays silent).
//!
//! Malformed input is dropped without a response, matching real hardware.

use crate::error::ParseError;
use crate::ProtocolCodec;
use std::collections::VecDeque;

/// Command terminator byte
pub const CAT_TERMINATOR: u8 = b';';

/// Input buffer capacity; an unterminated command longer than this is
/// discarded wholesale
pub const CAT_BUFFER_SIZE: usize = 64;

/// Lowest tunable frequency (30 kHz)
pub const FREQ_MIN: u32 = 30_000;

/// Highest tunable frequency (470 MHz)
pub const FREQ_MAX: u32 = 470_000_000;

/// RIT/XIT offset limit in Hz (symmetric)
pub const CLAR_LIMIT: i16 = 9999;

/// RIT/XIT step applied when RD/RU carry no explicit offset
pub const CLAR_STEP: i16 = 10;

/// ID response payload for the emulated FT-991A
pub const RADIO_ID: &str = "0670";

/// Operating modes, numbered as the MD command encodes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperatingMode {
    /// Lower sideband
    Lsb = 1,
    /// Upper sideband
    Usb = 2,
    /// CW upper
    CwU = 3,
    /// FM
    Fm = 4,
    /// AM
    Am = 5,
    /// RTTY lower
    RttyL = 6,
    /// CW lower
    CwL = 7,
    /// Data lower
    DataL = 8,
    /// RTTY upper
    RttyU = 9,
    /// Data FM
    DataFm = 10,
    /// Narrow FM
    FmN = 11,
    /// Data upper
    DataU = 12,
    /// Narrow AM
    AmN = 13,
    /// C4FM digital
    C4fm = 14,
}

impl OperatingMode {
    /// Convert a raw MD mode number, if valid
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Lsb),
            2 => Some(Self::Usb),
            3 => Some(Self::CwU),
            4 => Some(Self::Fm),
            5 => Some(Self::Am),
            6 => Some(Self::RttyL),
            7 => Some(Self::CwL),
            8 => Some(Self::DataL),
            9 => Some(Self::RttyU),
            10 => Some(Self::DataFm),
            11 => Some(Self::FmN),
            12 => Some(Self::DataU),
            13 => Some(Self::AmN),
            14 => Some(Self::C4fm),
            _ => None,
        }
    }

    /// Display name as shown on the radio's front panel
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lsb => "LSB",
            Self::Usb => "USB",
            Self::CwU => "CW-U",
            Self::Fm => "FM",
            Self::Am => "AM",
            Self::RttyL => "RTTY-L",
            Self::CwL => "CW-L",
            Self::DataL => "DATA-L",
            Self::RttyU => "RTTY-U",
            Self::DataFm => "DATA-FM",
            Self::FmN => "FM-N",
            Self::DataU => "DATA-U",
            Self::AmN => "AM-N",
            Self::C4fm => "C4FM",
        }
    }
}

/// VFO selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vfo {
    /// VFO A
    A,
    /// VFO B
    B,
}

/// A parsed CAT command
///
/// `None` parameters mean a read (query); `Some` carries a validated,
/// range-clamped write value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatCommand {
    /// FA - VFO-A frequency in Hz
    FrequencyA(Option<u32>),
    /// FB - VFO-B frequency in Hz
    FrequencyB(Option<u32>),
    /// IF - composite information read
    Info,
    /// ID - radio identification read
    Id,
    /// MD - operating mode of the current VFO
    Mode(Option<OperatingMode>),
    /// PS - power on/off
    Power(Option<bool>),
    /// SM - S-meter read
    SMeter,
    /// TX - transmit (PTT) state
    Transmit(Option<bool>),
    /// RX - return to receive (PTT off)
    Receive,
    /// VS - VFO select
    VfoSelect(Option<Vfo>),
    /// RI - RIT enable
    RitEnable(Option<bool>),
    /// XT - XIT enable
    XitEnable(Option<bool>),
    /// RD - clarifier down; `Some` is an absolute offset, `None` steps -10 Hz
    RitDown(Option<i16>),
    /// RU - clarifier up; `Some` is an absolute offset, `None` steps +10 Hz
    RitUp(Option<i16>),
    /// AG - AF gain (0-255)
    AfGain(Option<u8>),
    /// RG - RF gain (0-255)
    RfGain(Option<u8>),
    /// SQ - squelch level (0-100)
    Squelch(Option<u8>),
    /// RM - read meter by number (1=S, 2=power, 3=SWR, 4=ALC, 5=comp)
    ReadMeter(u8),
}

/// A CAT response ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatResponse {
    /// FA read response
    FrequencyA(u32),
    /// FB read response
    FrequencyB(u32),
    /// IF composite response
    Info {
        /// Current VFO frequency in Hz
        frequency: u32,
        /// Clarifier offset (zero when RIT is off)
        rit_offset: i16,
        /// Current VFO mode number
        mode: u8,
    },
    /// ID response
    Id,
    /// MD read response
    Mode(u8),
    /// PS read response
    Power(bool),
    /// SM read response
    SMeter(u8),
    /// TX read response
    Transmit(bool),
    /// VS read response
    VfoSelect(Vfo),
    /// RI read response
    RitEnable(bool),
    /// XT read response
    XitEnable(bool),
    /// AG read response
    AfGain(u8),
    /// RG read response
    RfGain(u8),
    /// SQ read response
    Squelch(u8),
    /// RM read response
    Meter {
        /// Meter number as queried
        meter: u8,
        /// Raw meter value
        value: u8,
    },
}

impl CatResponse {
    /// Encode this response to its wire format, terminator included
    pub fn encode(&self) -> Vec<u8> {
        let body = match self {
            Self::FrequencyA(hz) => format!("FA{:09}", hz),
            Self::FrequencyB(hz) => format!("FB{:09}", hz),
            Self::Info {
                frequency,
                rit_offset,
                mode,
            } => format!("IF{:09}{:+05}0{:02}0000000000", frequency, rit_offset, mode),
            Self::Id => format!("ID{}", RADIO_ID),
            Self::Mode(mode) => format!("MD0{}", mode),
            Self::Power(on) => format!("PS{}", u8::from(*on)),
            Self::SMeter(value) => format!("SM0{:03}", value),
            Self::Transmit(ptt) => format!("TX{}", u8::from(*ptt)),
            Self::VfoSelect(Vfo::A) => "VS0".to_string(),
            Self::VfoSelect(Vfo::B) => "VS1".to_string(),
            Self::RitEnable(on) => format!("RI{}", u8::from(*on)),
            Self::XitEnable(on) => format!("XT{}", u8::from(*on)),
            Self::AfGain(value) => format!("AG0{:03}", value),
            Self::RfGain(value) => format!("RG0{:03}", value),
            Self::Squelch(value) => format!("SQ0{:03}", value),
            Self::Meter { meter, value } => format!("RM{}{:03}", meter, value),
        };
        format!("{};", body).into_bytes()
    }
}

/// Streaming CAT frame parser
///
/// Feed raw serial bytes with [`push_bytes`](ProtocolCodec::push_bytes) and
/// drain complete commands with [`next_command`](ProtocolCodec::next_command).
/// Letters are folded to uppercase while buffering and control bytes are
/// discarded; a buffer overflow drops the partial command with a warning.
pub struct CatCodec {
    buffer: Vec<u8>,
    frames: VecDeque<String>,
}

impl CatCodec {
    /// Create a new codec with an empty buffer
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(CAT_BUFFER_SIZE),
            frames: VecDeque::new(),
        }
    }

    /// Parse a complete frame (terminator already stripped)
    fn parse_command(cmd: &str) -> Result<CatCommand, ParseError> {
        if cmd.len() < 2 {
            return Err(ParseError::CommandTooShort(cmd.to_string()));
        }

        let code = &cmd[..2];
        let params = &cmd[2..];

        match code {
            "FA" => Ok(CatCommand::FrequencyA(parse_write_frequency(params)?)),
            "FB" => Ok(CatCommand::FrequencyB(parse_write_frequency(params)?)),
            "IF" => Ok(CatCommand::Info),
            "ID" => Ok(CatCommand::Id),
            "MD" => {
                // MD; and MD0; are reads, MD0n; writes mode n of the main
                // receiver
                if params.len() < 2 {
                    Ok(CatCommand::Mode(None))
                } else {
                    let digit = params.as_bytes()[1];
                    let mode = digit
                        .is_ascii_digit()
                        .then(|| OperatingMode::from_u8(digit - b'0'))
                        .flatten()
                        .ok_or_else(|| ParseError::InvalidMode(params.to_string()))?;
                    Ok(CatCommand::Mode(Some(mode)))
                }
            }
            "PS" => Ok(CatCommand::Power(parse_write_flag(params))),
            "SM" => Ok(CatCommand::SMeter),
            "TX" => {
                if params.is_empty() {
                    Ok(CatCommand::Transmit(None))
                } else {
                    // TX0 = off, TX1 = on, TX2 = tune (treated as on)
                    Ok(CatCommand::Transmit(Some(params.as_bytes()[0] != b'0')))
                }
            }
            "RX" => Ok(CatCommand::Receive),
            "VS" => {
                if params.is_empty() {
                    Ok(CatCommand::VfoSelect(None))
                } else if params.as_bytes()[0] == b'0' {
                    Ok(CatCommand::VfoSelect(Some(Vfo::A)))
                } else {
                    Ok(CatCommand::VfoSelect(Some(Vfo::B)))
                }
            }
            "RI" => Ok(CatCommand::RitEnable(parse_write_flag(params))),
            "XT" => Ok(CatCommand::XitEnable(parse_write_flag(params))),
            "RD" => Ok(CatCommand::RitDown(parse_clarifier_offset(params))),
            "RU" => Ok(CatCommand::RitUp(parse_clarifier_offset(params))),
            "AG" => Ok(CatCommand::AfGain(parse_gain(code, params, 255)?)),
            "RG" => Ok(CatCommand::RfGain(parse_gain(code, params, 255)?)),
            "SQ" => Ok(CatCommand::Squelch(parse_gain(code, params, 100)?)),
            "RM" => {
                let meter = params
                    .as_bytes()
                    .first()
                    .filter(|b| b.is_ascii_digit())
                    .map(|b| b - b'0')
                    .unwrap_or(1);
                Ok(CatCommand::ReadMeter(meter))
            }
            _ => Err(ParseError::UnknownCommand(cmd.to_string())),
        }
    }
}

impl Default for CatCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for CatCodec {
    type Command = CatCommand;

    fn push_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == CAT_TERMINATOR {
                if !self.buffer.is_empty() {
                    let frame = String::from_utf8_lossy(&self.buffer).into_owned();
                    self.frames.push_back(frame);
                    self.buffer.clear();
                }
                continue;
            }

            // Control bytes never appear inside a CAT command
            if byte < 0x20 {
                continue;
            }

            if self.buffer.len() < CAT_BUFFER_SIZE - 1 {
                self.buffer.push(byte.to_ascii_uppercase());
            } else {
                tracing::warn!("CAT buffer overflow, discarding partial command");
                self.buffer.clear();
            }
        }
    }

    fn next_command(&mut self) -> Option<CatCommand> {
        loop {
            let frame = self.frames.pop_front()?;
            match Self::parse_command(&frame) {
                Ok(cmd) => return Some(cmd),
                Err(e) => {
                    tracing::warn!("dropped CAT command {:?}: {}", frame, e);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.frames.clear();
    }
}

/// Parse FA/FB parameters: empty is a read, otherwise a 9-digit frequency
/// that must fall inside the tunable range (no clamping; bad values reject
/// the whole command)
fn parse_write_frequency(params: &str) -> Result<Option<u32>, ParseError> {
    if params.is_empty() {
        return Ok(None);
    }
    let hz = params
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidFrequency(params.to_string()))?;
    if !(FREQ_MIN..=FREQ_MAX).contains(&hz) {
        return Err(ParseError::InvalidFrequency(params.to_string()));
    }
    Ok(Some(hz))
}

/// Parse a single-digit boolean write parameter ('1' = on)
fn parse_write_flag(params: &str) -> Option<bool> {
    params.as_bytes().first().map(|&b| b == b'1')
}

/// Parse an RD/RU parameter: four or more characters set an absolute offset
/// (clamped to the clarifier range), anything shorter selects the default
/// step
fn parse_clarifier_offset(params: &str) -> Option<i16> {
    if params.len() >= 4 {
        Some((parse_int_prefix(params) as i16).clamp(-CLAR_LIMIT, CLAR_LIMIT))
    } else {
        None
    }
}

/// Parse an AG/RG/SQ parameter: empty or a lone receiver digit is a read,
/// a receiver digit plus value is a range-clamped write
fn parse_gain(code: &str, params: &str, max: u8) -> Result<Option<u8>, ParseError> {
    if params.len() <= 1 {
        return Ok(None);
    }
    if params.len() < 4 {
        return Err(ParseError::InvalidParameter {
            command: code.to_string(),
            params: params.to_string(),
        });
    }
    let value = parse_int_prefix(&params[1..]).clamp(0, max as i32) as u8;
    Ok(Some(value))
}

/// `atoi`-style parse: optional sign plus leading digits, zero if none
fn parse_int_prefix(s: &str) -> i32 {
    let bytes = s.as_bytes();
    let mut idx = 0;
    let mut negative = false;
    if idx < bytes.len() && (bytes[idx] == b'-' || bytes[idx] == b'+') {
        negative = bytes[idx] == b'-';
        idx += 1;
    }
    let mut value: i32 = 0;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        value = value.saturating_mul(10).saturating_add((bytes[idx] - b'0') as i32);
        idx += 1;
    }
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolCodec;

    fn parse_one(input: &[u8]) -> Option<CatCommand> {
        let mut codec = CatCodec::new();
        codec.push_bytes(input);
        codec.next_command()
    }

    #[test]
    fn test_parse_frequency_read() {
        assert_eq!(parse_one(b"FA;"), Some(CatCommand::FrequencyA(None)));
        assert_eq!(parse_one(b"FB;"), Some(CatCommand::FrequencyB(None)));
    }

    #[test]
    fn test_parse_frequency_write() {
        assert_eq!(
            parse_one(b"FA014250000;"),
            Some(CatCommand::FrequencyA(Some(14_250_000)))
        );
    }

    #[test]
    fn test_frequency_below_range_dropped() {
        assert_eq!(parse_one(b"FA000029999;"), None);
    }

    #[test]
    fn test_frequency_above_range_dropped() {
        assert_eq!(parse_one(b"FA470000001;"), None);
    }

    #[test]
    fn test_frequency_malformed_dropped() {
        assert_eq!(parse_one(b"FA14.25MHZ;"), None);
    }

    #[test]
    fn test_lowercase_folded() {
        assert_eq!(
            parse_one(b"fa014250000;"),
            Some(CatCommand::FrequencyA(Some(14_250_000)))
        );
    }

    #[test]
    fn test_control_bytes_skipped() {
        assert_eq!(
            parse_one(b"FA\x01\x0a014250000;"),
            Some(CatCommand::FrequencyA(Some(14_250_000)))
        );
    }

    #[test]
    fn test_mode_read_with_receiver_digit() {
        assert_eq!(parse_one(b"MD;"), Some(CatCommand::Mode(None)));
        assert_eq!(parse_one(b"MD0;"), Some(CatCommand::Mode(None)));
    }

    #[test]
    fn test_mode_write() {
        assert_eq!(
            parse_one(b"MD02;"),
            Some(CatCommand::Mode(Some(OperatingMode::Usb)))
        );
        assert_eq!(
            parse_one(b"MD07;"),
            Some(CatCommand::Mode(Some(OperatingMode::CwL)))
        );
    }

    #[test]
    fn test_mode_invalid_dropped() {
        assert_eq!(parse_one(b"MD0X;"), None);
    }

    #[test]
    fn test_transmit() {
        assert_eq!(parse_one(b"TX;"), Some(CatCommand::Transmit(None)));
        assert_eq!(parse_one(b"TX1;"), Some(CatCommand::Transmit(Some(true))));
        assert_eq!(parse_one(b"TX0;"), Some(CatCommand::Transmit(Some(false))));
        // TX2 (tune) keys the transmitter as well
        assert_eq!(parse_one(b"TX2;"), Some(CatCommand::Transmit(Some(true))));
    }

    #[test]
    fn test_clarifier_step_and_absolute() {
        assert_eq!(parse_one(b"RD;"), Some(CatCommand::RitDown(None)));
        assert_eq!(parse_one(b"RU;"), Some(CatCommand::RitUp(None)));
        assert_eq!(parse_one(b"RD0500;"), Some(CatCommand::RitDown(Some(500))));
        assert_eq!(
            parse_one(b"RU-12000;"),
            Some(CatCommand::RitUp(Some(-9999)))
        );
    }

    #[test]
    fn test_gain_read_and_write() {
        assert_eq!(parse_one(b"AG0;"), Some(CatCommand::AfGain(None)));
        assert_eq!(parse_one(b"AG0100;"), Some(CatCommand::AfGain(Some(100))));
        // Out-of-range writes clamp
        assert_eq!(parse_one(b"AG0999;"), Some(CatCommand::AfGain(Some(255))));
        assert_eq!(parse_one(b"SQ0999;"), Some(CatCommand::Squelch(Some(100))));
    }

    #[test]
    fn test_read_meter_defaults_to_smeter() {
        assert_eq!(parse_one(b"RM;"), Some(CatCommand::ReadMeter(1)));
        assert_eq!(parse_one(b"RM3;"), Some(CatCommand::ReadMeter(3)));
    }

    #[test]
    fn test_unknown_command_dropped() {
        assert_eq!(parse_one(b"ZZ123;"), None);
        assert_eq!(parse_one(b"A;"), None);
    }

    #[test]
    fn test_streaming_partial_input() {
        let mut codec = CatCodec::new();
        codec.push_bytes(b"FA0142");
        assert_eq!(codec.next_command(), None);
        codec.push_bytes(b"50000;TX1;");
        assert_eq!(
            codec.next_command(),
            Some(CatCommand::FrequencyA(Some(14_250_000)))
        );
        assert_eq!(codec.next_command(), Some(CatCommand::Transmit(Some(true))));
        assert_eq!(codec.next_command(), None);
    }

    #[test]
    fn test_buffer_overflow_discards_partial() {
        let mut codec = CatCodec::new();
        codec.push_bytes(&[b'F'; 200]);
        codec.push_bytes(b";");
        // Whatever survived the overflow is not a valid command
        assert_eq!(codec.next_command(), None);
    }

    #[test]
    fn test_encode_frequency_zero_padded() {
        assert_eq!(CatResponse::FrequencyA(7_074_000).encode(), b"FA007074000;");
        assert_eq!(
            CatResponse::FrequencyB(430_000_000).encode(),
            b"FB430000000;"
        );
    }

    #[test]
    fn test_encode_info_field_widths() {
        let resp = CatResponse::Info {
            frequency: 14_074_000,
            rit_offset: -120,
            mode: 2,
        };
        assert_eq!(resp.encode(), b"IF014074000-01200020000000000;");

        let resp = CatResponse::Info {
            frequency: 14_074_000,
            rit_offset: 0,
            mode: 12,
        };
        assert_eq!(resp.encode(), b"IF014074000+00000120000000000;");
    }

    #[test]
    fn test_encode_id() {
        assert_eq!(CatResponse::Id.encode(), b"ID0670;");
    }

    #[test]
    fn test_encode_meters_and_gains() {
        assert_eq!(CatResponse::SMeter(7).encode(), b"SM0007;");
        assert_eq!(CatResponse::AfGain(128).encode(), b"AG0128;");
        assert_eq!(CatResponse::Meter { meter: 3, value: 45 }.encode(), b"RM3045;");
    }

    #[test]
    fn test_mode_from_u8_bounds() {
        assert_eq!(OperatingMode::from_u8(0), None);
        assert_eq!(OperatingMode::from_u8(1), Some(OperatingMode::Lsb));
        assert_eq!(OperatingMode::from_u8(14), Some(OperatingMode::C4fm));
        assert_eq!(OperatingMode::from_u8(15), None);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::ProtocolCodec;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn frequency_write_roundtrips_through_encode(hz in FREQ_MIN..=FREQ_MAX) {
            let wire = CatResponse::FrequencyA(hz).encode();
            let mut codec = CatCodec::new();
            codec.push_bytes(&wire);
            prop_assert_eq!(codec.next_command(), Some(CatCommand::FrequencyA(Some(hz))));
        }

        #[test]
        fn out_of_range_frequencies_never_parse(hz in prop_oneof![0u32..FREQ_MIN, FREQ_MAX + 1..u32::MAX]) {
            let mut codec = CatCodec::new();
            codec.push_bytes(format!("FA{:09};", hz).as_bytes());
            prop_assert_eq!(codec.next_command(), None);
        }
    }
}
