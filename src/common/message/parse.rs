// src/common/message/parse.rs

use super::data::{AnalogInputs, BenderReading, FaultMessage, MAX_ANALOG_INPUTS};
use super::error::MessageParseError;
use super::Message;

use crate::common::types::{BenderNumber, Status};

use core::str::{self, FromStr, SplitAsciiWhitespace};

// --- Internal Helpers ---
fn next_number<T: FromStr>(
    fields: &mut SplitAsciiWhitespace<'_>,
    field: &'static str,
) -> Result<T, MessageParseError> {
    // Caller has already checked the field count.
    let token = fields.next().ok_or(MessageParseError::NumericError { field })?;
    token.parse::<T>().map_err(|_| MessageParseError::NumericError { field })
}

// --- Public Parsing Function ---

/// Parses a payload (the part of a line before `*`) into a [`Message`].
///
/// Fields may be separated by any run of spaces or tabs.
pub fn parse_message(payload: &[u8]) -> Result<Message<'_>, MessageParseError> {
    let text = str::from_utf8(payload)?.trim();
    let tag = text
        .split_ascii_whitespace()
        .next()
        .ok_or(MessageParseError::EmptyInput)?;
    // Tag sits at the start of the trimmed text.
    let rest = &text[tag.len()..];

    match tag {
        BenderReading::TAG => parse_bender(rest).map(Message::Bender),
        AnalogInputs::TAG => parse_analog(rest).map(Message::AnalogInputs),
        FaultMessage::TAG => Ok(Message::Fault(FaultMessage::new(rest))),
        _ => Err(MessageParseError::UnknownMessageType),
    }
}

/// `n s ppp dcc dcppt gfr`; trailing extra fields are ignored.
fn parse_bender(rest: &str) -> Result<BenderReading, MessageParseError> {
    const FIELDS: usize = 6;
    let found = rest.split_ascii_whitespace().count();
    if found < FIELDS {
        return Err(MessageParseError::MissingFields { expected: FIELDS, found });
    }

    let mut fields = rest.split_ascii_whitespace();
    let number = next_number::<u8>(&mut fields, "n")
        .ok()
        .and_then(|n| BenderNumber::new(n).ok())
        .ok_or(MessageParseError::InvalidBenderNumber)?;
    let status = next_number::<u8>(&mut fields, "s")
        .ok()
        .and_then(Status::from_digit)
        .ok_or(MessageParseError::InvalidStatus)?;

    Ok(BenderReading {
        number,
        status,
        period_us: next_number(&mut fields, "ppp")?,
        duty_high_us: next_number(&mut fields, "dcc")?,
        duty_ppt: next_number(&mut fields, "dcppt")?,
        resistance_kohm: next_number(&mut fields, "gfr")?,
    })
}

/// `n a0 a1 ...`; fewer values than announced are accepted.
fn parse_analog(rest: &str) -> Result<AnalogInputs, MessageParseError> {
    let mut fields = rest.split_ascii_whitespace();
    let declared_count: u8 = match fields.clone().next() {
        Some(_) => next_number(&mut fields, "n")?,
        None => return Err(MessageParseError::MissingFields { expected: 1, found: 0 }),
    };

    let mut inputs = AnalogInputs::new(declared_count);
    for token in fields.take(declared_count as usize) {
        let raw = token
            .parse::<u16>()
            .map_err(|_| MessageParseError::NumericError { field: "ain" })?;
        inputs
            .push(raw)
            .map_err(|_| MessageParseError::TooManyValues { max: MAX_ANALOG_INPUTS })?;
    }
    Ok(inputs)
}
