//! Wire Protocol Library
//!
//! This crate provides parsing and encoding for the serial protocols spoken
//! by the emulated peripherals:
//!
//! - **Yaesu CAT**: ASCII semicolon-terminated transceiver control (FT-991A)
//! - **GS-232**: CR/LF-terminated rotator control (Yaesu G-5500 controllers)
//! - **NMEA-0183**: GPS sentence generation (GGA/RMC/GSA/GSV/VTG)
//!
//! # Architecture
//!
//! The two command protocols each provide a streaming codec that frames a
//! raw byte stream into typed commands, plus response types that encode back
//! to protocol bytes. Malformed frames are logged and dropped rather than
//! surfaced, matching real-hardware behavior where bad input simply gets no
//! answer. NMEA is generate-only: a [`nmea::GpsFix`] renders to a full
//! sentence cycle.
//!
//! # Example
//!
//! ```rust
//! use rigsim_protocol::cat::{CatCodec, CatCommand};
//! use rigsim_protocol::ProtocolCodec;
//!
//! let mut codec = CatCodec::new();
//! codec.push_bytes(b"FA014250000;");
//!
//! let cmd = codec.next_command().unwrap();
//! assert_eq!(cmd, CatCommand::FrequencyA(Some(14_250_000)));
//! ```

pub mod cat;
pub mod error;
pub mod gs232;
pub mod nmea;

pub use error::ParseError;

/// Trait for streaming codecs that frame incoming byte streams into commands
pub trait ProtocolCodec {
    /// The command type produced by this codec
    type Command;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete command from the buffer
    ///
    /// Frames that fail to parse are logged and skipped.
    fn next_command(&mut self) -> Option<Self::Command>;

    /// Clear the internal buffer and any queued frames
    fn clear(&mut self);
}
