// src/common/error.rs

use super::message::MessageParseError;

/// Runtime errors of the serial side, generic over the interface I/O error.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum BenderError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the serial implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// Line has no `*` separating payload and checksum.
    #[error("Line has no checksum delimiter")]
    MissingChecksum,

    /// Characters after `*` are not exactly two hex digits.
    #[error("Malformed checksum field")]
    MalformedChecksum,

    /// Received checksum does not match the sum of the payload.
    #[error("Checksum mismatch: received {received:#04x}, calculated {calculated:#04x}")]
    ChecksumMismatch { received: u8, calculated: u8 },

    /// Line exceeded the framing buffer and was discarded.
    #[error("Line overflow: buffer capacity is {capacity} bytes")]
    LineOverflow { capacity: usize },

    /// Unit number outside 0..=3.
    #[error("Invalid Bender unit number: {0}")]
    InvalidBenderNumber(u8),

    /// Payload passed the checksum but could not be parsed.
    #[error("Message parse error: {0}")]
    Parse(#[from] MessageParseError),
}

impl<E: core::fmt::Debug> BenderError<E> {
    /// Whether the error comes from the interface rather than the data stream.
    pub fn is_io(&self) -> bool {
        matches!(self, BenderError::Io(_))
    }
}
