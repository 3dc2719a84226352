// src/common/types.rs

use super::error::BenderError;
use super::timing::NEVER_MS;
use core::convert::TryFrom;
use core::fmt;
use core::num::NonZeroU32;
use core::time::Duration;

// --- Bender unit number ---

/// Index of one of the ground-fault monitoring channels on the board (0..=3).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct BenderNumber(u8);

impl BenderNumber {
    /// Number of channels the board reports on.
    pub const COUNT: usize = 4;

    /// Creates a new `BenderNumber` if `number` is a valid channel index.
    pub fn new(number: u8) -> Result<Self, BenderError<()>> {
        if (number as usize) < Self::COUNT {
            Ok(BenderNumber(number))
        } else {
            Err(BenderError::InvalidBenderNumber(number))
        }
    }

    #[inline]
    pub const fn get(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// All valid unit numbers in ascending order.
    pub fn all() -> impl Iterator<Item = BenderNumber> {
        (0..Self::COUNT as u8).map(BenderNumber)
    }
}

impl TryFrom<u8> for BenderNumber {
    type Error = BenderError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BenderNumber> for u8 {
    fn from(value: BenderNumber) -> Self {
        value.0
    }
}

impl fmt::Display for BenderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Unit status ---

/// Status digit of a `BGF` message.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Status {
    Fault = 0,
    Good = 1,
}

impl Status {
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Status::Fault),
            1 => Some(Status::Good),
            _ => None,
        }
    }

    #[inline]
    pub fn is_good(&self) -> bool {
        matches!(self, Status::Good)
    }

    /// Value published to the status sensor.
    #[inline]
    pub fn as_state(&self) -> f32 {
        *self as u8 as f32
    }
}

// --- Sensitivity ---

/// Strictly positive sensitivity setting handed to the sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Sensitivity(NonZeroU32);

impl Sensitivity {
    pub const DEFAULT: Sensitivity = match NonZeroU32::new(10) {
        Some(value) => Sensitivity(value),
        None => panic!("default sensitivity is zero"),
    };

    /// Returns `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Sensitivity)
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Update interval ---

/// How often the component's update cycle runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UpdateInterval {
    /// Never run the update cycle.
    Never,
    /// Run every period. Millisecond precision, below `NEVER_MS`.
    Every(Duration),
}

impl UpdateInterval {
    /// Builds an interval from whole milliseconds; `NEVER_MS` maps to `Never`.
    pub fn from_millis(ms: u32) -> Self {
        if ms == NEVER_MS {
            UpdateInterval::Never
        } else {
            UpdateInterval::Every(Duration::from_millis(ms as u64))
        }
    }

    /// Milliseconds as passed to the setter, `NEVER_MS` for `Never`.
    pub fn as_millis(&self) -> u32 {
        match self {
            UpdateInterval::Never => NEVER_MS,
            UpdateInterval::Every(period) => {
                u32::try_from(period.as_millis()).unwrap_or(NEVER_MS)
            }
        }
    }

    pub fn period(&self) -> Option<Duration> {
        match self {
            UpdateInterval::Never => None,
            UpdateInterval::Every(period) => Some(*period),
        }
    }
}

impl fmt::Display for UpdateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateInterval::Never => write!(f, "never"),
            UpdateInterval::Every(_) => write!(f, "{}ms", self.as_millis()),
        }
    }
}
