// src/common/message/error.rs

/// Error type specific to payload parsing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MessageParseError {
    /// Payload was empty or only whitespace.
    #[error("empty message")]
    EmptyInput,
    /// Payload is not valid UTF-8 (the board only sends ASCII).
    #[error("message is not valid ASCII")]
    InvalidUtf8,
    /// First token is not a known message tag.
    #[error("unknown message type")]
    UnknownMessageType,
    /// Fewer fields than the message type requires.
    #[error("expected {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },
    /// Unit number is not a digit in 0..=3.
    #[error("invalid Bender unit number")]
    InvalidBenderNumber,
    /// Status field is neither `0` nor `1`.
    #[error("invalid status digit")]
    InvalidStatus,
    /// A numeric field failed to parse.
    #[error("invalid numeric value in field `{field}`")]
    NumericError { field: &'static str },
    /// More analog values than can be stored.
    #[error("more than {max} analog values")]
    TooManyValues { max: usize },
}

impl From<core::str::Utf8Error> for MessageParseError {
    fn from(_: core::str::Utf8Error) -> Self {
        MessageParseError::InvalidUtf8
    }
}
