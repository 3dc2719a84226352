// src/common/message/data.rs

use crate::common::types::{BenderNumber, Status};
use arrayvec::ArrayVec;
use core::fmt;

/// Largest number of analog values kept from one `AIN` message.
pub const MAX_ANALOG_INPUTS: usize = 8;
/// Raw reading corresponding to full scale.
pub const ANALOG_FULL_SCALE_RAW: u16 = 1023;
/// Full scale voltage of the analog inputs.
pub const ANALOG_FULL_SCALE_VOLTS: f32 = 5.0;

/// Status of one unit, from a `BGF` message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BenderReading {
    pub number: BenderNumber,
    pub status: Status,
    /// Period of the last PWM cycle in microseconds. Zero means a DC level (short).
    pub period_us: u32,
    /// High part of the duty cycle in microseconds.
    pub duty_high_us: u32,
    /// Duty cycle to period ratio in parts per thousand.
    pub duty_ppt: u16,
    /// Ground fault resistance in kilo-ohms.
    pub resistance_kohm: u32,
}

impl BenderReading {
    pub const TAG: &'static str = "BGF";

    /// A zero period means the line sits at a DC level.
    #[inline]
    pub fn is_dc_level(&self) -> bool {
        self.period_us == 0
    }

    /// Value published to the resistance sensor.
    #[inline]
    pub fn resistance_state(&self) -> f32 {
        self.resistance_kohm as f32
    }
}

impl fmt::Display for BenderReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            Self::TAG,
            self.number,
            self.status as u8,
            self.period_us,
            self.duty_high_us,
            self.duty_ppt,
            self.resistance_kohm
        )
    }
}

/// Analog input readings from an `AIN` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalogInputs {
    /// Input count announced by the board.
    pub declared_count: u8,
    values: ArrayVec<u16, MAX_ANALOG_INPUTS>,
}

impl AnalogInputs {
    pub const TAG: &'static str = "AIN";

    pub fn new(declared_count: u8) -> Self {
        AnalogInputs {
            declared_count,
            values: ArrayVec::new(),
        }
    }

    /// Appends a raw reading. Fails once `MAX_ANALOG_INPUTS` values are stored.
    pub fn push(&mut self, raw: u16) -> Result<(), u16> {
        self.values.try_push(raw).map_err(|e| e.element())
    }

    /// Raw readings actually received. May be fewer than `declared_count`.
    pub fn values(&self) -> &[u16] {
        &self.values
    }

    /// Reading of input `index` converted to volts.
    pub fn voltage(&self, index: usize) -> Option<f32> {
        self.values
            .get(index)
            .map(|raw| *raw as f32 * ANALOG_FULL_SCALE_VOLTS / ANALOG_FULL_SCALE_RAW as f32)
    }

    /// Whether fewer values arrived than the board announced.
    pub fn is_truncated(&self) -> bool {
        self.values.len() < self.declared_count as usize
    }
}

impl fmt::Display for AnalogInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Self::TAG, self.declared_count)?;
        for value in &self.values {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// Free-form fault text from a `GFS` message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FaultMessage<'a> {
    text: &'a str,
}

impl<'a> FaultMessage<'a> {
    pub const TAG: &'static str = "GFS";

    pub fn new(text: &'a str) -> Self {
        FaultMessage { text: text.trim() }
    }

    /// The text as received, outer whitespace trimmed.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Words of the text; runs of spaces or tabs collapse.
    pub fn words(&self) -> impl Iterator<Item = &'a str> {
        self.text.split_ascii_whitespace()
    }

    /// The unit referenced as `BENDER n`, if any.
    pub fn bender(&self) -> Option<BenderNumber> {
        let mut words = self.words();
        while let Some(word) = words.next() {
            if word.eq_ignore_ascii_case("BENDER") {
                let digits = words.next()?.trim_end_matches(|c: char| !c.is_ascii_digit());
                return digits.parse::<u8>().ok().and_then(|n| BenderNumber::new(n).ok());
            }
        }
        None
    }
}

impl fmt::Display for FaultMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::TAG)?;
        for word in self.words() {
            write!(f, " {}", word)?;
        }
        Ok(())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analog_capacity_and_voltage() {
        let mut inputs = AnalogInputs::new(9);
        for raw in 0..MAX_ANALOG_INPUTS as u16 {
            assert!(inputs.push(raw).is_ok());
        }
        assert_eq!(inputs.push(99), Err(99));
        assert!(inputs.is_truncated());

        let mut full = AnalogInputs::new(1);
        full.push(1023).unwrap();
        assert_eq!(full.voltage(0), Some(5.0));
        assert_eq!(full.voltage(1), None);
    }

    #[test]
    fn test_fault_bender_reference() {
        let fault = FaultMessage::new(" BENDER 2: FLAT LINE LOW -- SHORT -- FAULT INDICATED  ");
        assert_eq!(fault.bender(), Some(BenderNumber::new(2).unwrap()));
        assert_eq!(fault.text(), "BENDER 2: FLAT LINE LOW -- SHORT -- FAULT INDICATED");

        assert_eq!(FaultMessage::new("BENDER 7: NOISE").bender(), None);
        assert_eq!(FaultMessage::new("SUPPLY LOW").bender(), None);
    }

    #[test]
    fn test_fault_display_collapses_whitespace() {
        let mut out: heapless::String<64> = heapless::String::new();
        core::fmt::write(&mut out, format_args!("{}", FaultMessage::new("BENDER 1:\t10Hz  -- FAULT"))).unwrap();
        assert_eq!(out.as_str(), "GFS BENDER 1: 10Hz -- FAULT");
    }
}
