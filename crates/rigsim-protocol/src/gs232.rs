//! GS-232 rotator control protocol
//!
//! Single-letter commands terminated by CR or LF, as spoken by Yaesu
//! azimuth/elevation rotator controllers. Position reads answer with
//! sign-prefixed four-character fields (`+0NNN`); motion commands are
//! silent. Out-of-range or malformed goto targets drop the command without
//! touching state.

use crate::error::ParseError;
use crate::ProtocolCodec;
use std::collections::VecDeque;

/// Input buffer capacity
pub const GS232_BUFFER_SIZE: usize = 64;

/// Maximum azimuth in degrees (0-450, overlap past north)
pub const AZ_MAX_DEG: u16 = 450;

/// Maximum elevation in degrees
pub const EL_MAX_DEG: u16 = 180;

/// A parsed GS-232 command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gs232Command {
    /// R - rotate clockwise (azimuth increasing)
    RotateClockwise,
    /// L - rotate counter-clockwise (azimuth decreasing)
    RotateCounterClockwise,
    /// A - stop azimuth rotation
    StopAzimuth,
    /// U - rotate up (elevation increasing)
    RotateUp,
    /// D - rotate down (elevation decreasing)
    RotateDown,
    /// E - stop elevation rotation
    StopElevation,
    /// S - stop all rotation
    StopAll,
    /// C - read azimuth
    ReadAzimuth,
    /// C2 - read azimuth and elevation
    ReadAzEl,
    /// B - read elevation
    ReadElevation,
    /// Mnnn - rotate to azimuth
    GotoAzimuth(u16),
    /// Wnnn nnn - rotate to azimuth and elevation
    GotoAzEl {
        /// Target azimuth in degrees
        az: u16,
        /// Target elevation in degrees
        el: u16,
    },
}

/// A GS-232 position response, CRLF-terminated on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gs232Response {
    /// Azimuth only, `+0NNN`
    Azimuth(u16),
    /// Azimuth and elevation, `+0NNN +0NNN`
    AzEl(u16, u16),
    /// Elevation only, `+0NNN`
    Elevation(u16),
}

impl Gs232Response {
    /// Encode this response to its wire format
    pub fn encode(&self) -> Vec<u8> {
        let body = match self {
            Self::Azimuth(az) | Self::Elevation(az) => format!("+0{:03}", az),
            Self::AzEl(az, el) => format!("+0{:03} +0{:03}", az, el),
        };
        format!("{}\r\n", body).into_bytes()
    }
}

/// Streaming GS-232 frame parser
///
/// Accepts CR or LF as terminator, folds to uppercase, and buffers only
/// printable characters. Input past the buffer capacity is dropped.
pub struct Gs232Codec {
    buffer: Vec<u8>,
    frames: VecDeque<String>,
}

impl Gs232Codec {
    /// Create a new codec with an empty buffer
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(GS232_BUFFER_SIZE),
            frames: VecDeque::new(),
        }
    }

    /// Parse a complete frame (terminator already stripped)
    fn parse_command(cmd: &str) -> Result<Gs232Command, ParseError> {
        let bytes = cmd.as_bytes();
        match bytes[0] {
            b'R' => Ok(Gs232Command::RotateClockwise),
            b'L' => Ok(Gs232Command::RotateCounterClockwise),
            b'A' => Ok(Gs232Command::StopAzimuth),
            b'U' => Ok(Gs232Command::RotateUp),
            b'D' => Ok(Gs232Command::RotateDown),
            b'E' => Ok(Gs232Command::StopElevation),
            b'S' => Ok(Gs232Command::StopAll),
            b'C' => {
                if bytes.get(1) == Some(&b'2') {
                    Ok(Gs232Command::ReadAzEl)
                } else {
                    Ok(Gs232Command::ReadAzimuth)
                }
            }
            b'B' => Ok(Gs232Command::ReadElevation),
            b'M' => {
                let az = parse_angle(&cmd[1..])?;
                validate_range(az, AZ_MAX_DEG)?;
                Ok(Gs232Command::GotoAzimuth(az as u16))
            }
            b'W' => {
                let params = &cmd[1..];
                let space = params
                    .find(' ')
                    .ok_or_else(|| ParseError::InvalidAngle(params.to_string()))?;
                let az = parse_angle(&params[..space])?;
                let el = parse_angle(&params[space + 1..])?;
                validate_range(az, AZ_MAX_DEG)?;
                validate_range(el, EL_MAX_DEG)?;
                Ok(Gs232Command::GotoAzEl {
                    az: az as u16,
                    el: el as u16,
                })
            }
            _ => Err(ParseError::UnknownCommand(cmd.to_string())),
        }
    }
}

impl Default for Gs232Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for Gs232Codec {
    type Command = Gs232Command;

    fn push_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == b'\r' || byte == b'\n' {
                if !self.buffer.is_empty() {
                    let frame = String::from_utf8_lossy(&self.buffer).into_owned();
                    self.frames.push_back(frame);
                    self.buffer.clear();
                }
                continue;
            }

            if (0x20..0x7f).contains(&byte) && self.buffer.len() < GS232_BUFFER_SIZE - 1 {
                self.buffer.push(byte.to_ascii_uppercase());
            }
        }
    }

    fn next_command(&mut self) -> Option<Gs232Command> {
        loop {
            let frame = self.frames.pop_front()?;
            match Self::parse_command(&frame) {
                Ok(cmd) => return Some(cmd),
                Err(e) => {
                    tracing::warn!("dropped GS-232 command {:?}: {}", frame, e);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.frames.clear();
    }
}

/// Parse an angle field: optional leading spaces and sign, then decimal
/// digits; trailing characters are tolerated (`strtol` semantics)
fn parse_angle(s: &str) -> Result<i32, ParseError> {
    let trimmed = s.trim_start_matches(' ');
    let bytes = trimmed.as_bytes();
    let mut idx = 0;
    let mut negative = false;
    if idx < bytes.len() && (bytes[idx] == b'-' || bytes[idx] == b'+') {
        negative = bytes[idx] == b'-';
        idx += 1;
    }
    let digits_start = idx;
    let mut value: i32 = 0;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        value = value.saturating_mul(10).saturating_add((bytes[idx] - b'0') as i32);
        idx += 1;
    }
    if idx == digits_start {
        return Err(ParseError::InvalidAngle(s.to_string()));
    }
    Ok(if negative { -value } else { value })
}

/// Reject angles outside [0, max]
fn validate_range(angle: i32, max: u16) -> Result<(), ParseError> {
    if angle < 0 || angle > max as i32 {
        return Err(ParseError::AngleOutOfRange(angle));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolCodec;

    fn parse_one(input: &[u8]) -> Option<Gs232Command> {
        let mut codec = Gs232Codec::new();
        codec.push_bytes(input);
        codec.next_command()
    }

    #[test]
    fn test_single_letter_commands() {
        assert_eq!(parse_one(b"R\r"), Some(Gs232Command::RotateClockwise));
        assert_eq!(parse_one(b"L\r"), Some(Gs232Command::RotateCounterClockwise));
        assert_eq!(parse_one(b"A\r"), Some(Gs232Command::StopAzimuth));
        assert_eq!(parse_one(b"U\r"), Some(Gs232Command::RotateUp));
        assert_eq!(parse_one(b"D\r"), Some(Gs232Command::RotateDown));
        assert_eq!(parse_one(b"E\r"), Some(Gs232Command::StopElevation));
        assert_eq!(parse_one(b"S\r"), Some(Gs232Command::StopAll));
    }

    #[test]
    fn test_lf_terminator_accepted() {
        assert_eq!(parse_one(b"S\n"), Some(Gs232Command::StopAll));
    }

    #[test]
    fn test_position_reads() {
        assert_eq!(parse_one(b"C\r"), Some(Gs232Command::ReadAzimuth));
        assert_eq!(parse_one(b"C2\r"), Some(Gs232Command::ReadAzEl));
        assert_eq!(parse_one(b"B\r"), Some(Gs232Command::ReadElevation));
    }

    #[test]
    fn test_goto_azimuth() {
        assert_eq!(parse_one(b"M225\r"), Some(Gs232Command::GotoAzimuth(225)));
        assert_eq!(parse_one(b"M000\r"), Some(Gs232Command::GotoAzimuth(0)));
        assert_eq!(parse_one(b"M450\r"), Some(Gs232Command::GotoAzimuth(450)));
    }

    #[test]
    fn test_goto_azimuth_out_of_range_dropped() {
        assert_eq!(parse_one(b"M451\r"), None);
        assert_eq!(parse_one(b"M-10\r"), None);
    }

    #[test]
    fn test_goto_azimuth_malformed_dropped() {
        assert_eq!(parse_one(b"M\r"), None);
        assert_eq!(parse_one(b"MABC\r"), None);
    }

    #[test]
    fn test_goto_both_axes() {
        assert_eq!(
            parse_one(b"W180 045\r"),
            Some(Gs232Command::GotoAzEl { az: 180, el: 45 })
        );
    }

    #[test]
    fn test_goto_both_requires_separator() {
        assert_eq!(parse_one(b"W180045\r"), None);
    }

    #[test]
    fn test_goto_both_elevation_out_of_range_dropped() {
        assert_eq!(parse_one(b"W180 181\r"), None);
    }

    #[test]
    fn test_lowercase_folded() {
        assert_eq!(parse_one(b"m090\r"), Some(Gs232Command::GotoAzimuth(90)));
    }

    #[test]
    fn test_crlf_yields_single_command() {
        let mut codec = Gs232Codec::new();
        codec.push_bytes(b"C\r\n");
        assert_eq!(codec.next_command(), Some(Gs232Command::ReadAzimuth));
        assert_eq!(codec.next_command(), None);
    }

    #[test]
    fn test_encode_positions() {
        assert_eq!(Gs232Response::Azimuth(225).encode(), b"+0225\r\n");
        assert_eq!(Gs232Response::Azimuth(5).encode(), b"+0005\r\n");
        assert_eq!(Gs232Response::Elevation(90).encode(), b"+0090\r\n");
        assert_eq!(Gs232Response::AzEl(350, 12).encode(), b"+0350 +0012\r\n");
    }
}
