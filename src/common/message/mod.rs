// src/common/message/mod.rs

mod data;
mod error;
pub mod parse;

pub use data::{AnalogInputs, BenderReading, FaultMessage, ANALOG_FULL_SCALE_RAW, ANALOG_FULL_SCALE_VOLTS, MAX_ANALOG_INPUTS};
pub use error::MessageParseError;
pub use parse::parse_message;

use core::fmt;

/// A parsed message from the Bender board. Borrows the line it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<'a> {
    /// `BGF n s ppp dcc dcppt gfr`: status of one unit.
    Bender(BenderReading),
    /// `AIN n a0 a1 ...`: analog input readings.
    AnalogInputs(AnalogInputs),
    /// `GFS <text>`: free-form fault text.
    Fault(FaultMessage<'a>),
}

impl Message<'_> {
    /// Three-letter tag that starts the message on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            Message::Bender(_) => BenderReading::TAG,
            Message::AnalogInputs(_) => AnalogInputs::TAG,
            Message::Fault(_) => FaultMessage::TAG,
        }
    }
}

/// Formats the payload fields (no checksum), e.g. `BGF 2 0 0 0 0 0`.
impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Bender(reading) => reading.fmt(f),
            Message::AnalogInputs(inputs) => inputs.fmt(f),
            Message::Fault(fault) => fault.fmt(f),
        }
    }
}
