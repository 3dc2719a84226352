// src/common/checksum.rs

use super::error::BenderError;
use core::fmt;

/// Delimiter between the payload and the checksum digits.
pub const CHECKSUM_DELIMITER: u8 = b'*';

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Calculates the CheckSum8 (sum modulo 256) of `data`.
///
/// The board sums every byte preceding the `*`, including the separator
/// space(s) in front of it.
#[inline]
pub fn calculate_checksum8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encodes a checksum as two upper-case hex digits.
pub fn encode_checksum_hex(checksum: u8) -> [u8; 2] {
    [
        HEX_DIGITS[(checksum >> 4) as usize],
        HEX_DIGITS[(checksum & 0x0F) as usize],
    ]
}

/// Decodes two hex digits (either case). Returns `None` for anything else.
pub fn decode_checksum_hex(digits: &[u8]) -> Option<u8> {
    match digits {
        [hi, lo] => Some((hex_value(*hi)? << 4) | hex_value(*lo)?),
        _ => None,
    }
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Splits a line at the first `*` into payload and checksum field.
pub fn split_checksum<E>(line: &[u8]) -> Result<(&[u8], &[u8]), BenderError<E>>
where
    E: fmt::Debug,
{
    let pos = line
        .iter()
        .position(|b| *b == CHECKSUM_DELIMITER)
        .ok_or(BenderError::MissingChecksum)?;
    Ok((&line[..pos], &line[pos + 1..]))
}

/// Verifies the checksum of a framed line (terminators already stripped).
///
/// Trailing whitespace after the two digits is tolerated.
///
/// # Returns
///
/// * `Ok(payload)`: the bytes before `*`.
/// * `Err(BenderError::MissingChecksum)` if there is no `*`.
/// * `Err(BenderError::MalformedChecksum)` if the field is not two hex digits.
/// * `Err(BenderError::ChecksumMismatch)` if the sums differ.
pub fn verify_line_checksum<E>(line: &[u8]) -> Result<&[u8], BenderError<E>>
where
    E: fmt::Debug,
{
    let (payload, field) = split_checksum(line)?;
    let field = field.trim_ascii_end();
    let received = decode_checksum_hex(field).ok_or(BenderError::MalformedChecksum)?;
    let calculated = calculate_checksum8(payload);

    if received == calculated {
        Ok(payload)
    } else {
        Err(BenderError::ChecksumMismatch { received, calculated })
    }
}

/// Writes `fields` as a framed wire line: `<fields> *HH\r\n`.
///
/// The checksum covers the fields and the single space before `*`.
pub fn write_framed_line<W: fmt::Write>(out: &mut W, fields: &str) -> fmt::Result {
    let checksum = calculate_checksum8(fields.as_bytes()).wrapping_add(b' ');
    let [hi, lo] = encode_checksum_hex(checksum);
    write!(out, "{} *{}{}\r\n", fields, hi as char, lo as char)
}
