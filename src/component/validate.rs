// src/component/validate.rs

use super::value::{ConfigMap, ConfigValue};
use crate::common::timing::{
    MICROS_PER_DAY, MICROS_PER_HOUR, MICROS_PER_MILLI, MICROS_PER_MINUTE, MICROS_PER_SECOND,
    NEVER_MS,
};
use crate::common::types::{Sensitivity, UpdateInterval};

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

/// What is wrong with a single config value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationErrorKind {
    #[error("expected a mapping, got {0}")]
    ExpectedMapping(&'static str),
    #[error("[{0}] is an invalid option")]
    UnknownOption(String),
    #[error("required key not provided")]
    MissingRequired,
    #[error("expected an integer, got {0}")]
    ExpectedInteger(&'static str),
    #[error("this option only accepts integers with no fractional part")]
    FractionalInteger,
    #[error("value must be at least {min}, got {value}")]
    TooSmall { min: i64, value: i64 },
    #[error("value must be at most {max}, got {value}")]
    TooLarge { max: i64, value: i64 },
    #[error("expected a number, got {0}")]
    ExpectedNumber(&'static str),
    #[error("number must be finite and fit in a 32-bit float")]
    NonFiniteNumber,
    #[error("expected a time period, got {0}")]
    ExpectedTimePeriod(&'static str),
    #[error("invalid time period '{0}'")]
    InvalidTimePeriod(String),
    #[error("don't know what '{0}' means as it has no time unit, did you mean '{0}s'?")]
    MissingTimeUnit(String),
    #[error("unknown time unit '{0}'")]
    UnknownTimeUnit(String),
    #[error("'{0}' is not a time period key")]
    UnknownTimePeriodKey(String),
    #[error("time period must not be negative")]
    NegativeTimePeriod,
    #[error("maximum precision is {0}")]
    TooPrecise(&'static str),
    #[error("time period is too long")]
    TimePeriodOverflow,
    #[error("expected an identifier, got {0}")]
    ExpectedIdentifier(&'static str),
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("'{0}' is a reserved word")]
    ReservedIdentifier(String),
    #[error("ID '{0}' is already defined")]
    DuplicateId(String),
    #[error("no UART bus is declared, add a `uart:` block")]
    NoUartBus,
    #[error("multiple UART buses are declared, set `uart_id`")]
    AmbiguousUartBus,
    #[error("couldn't find a UART bus with ID '{0}'")]
    UnknownUartBus(String),
}

/// A validation failure at a config path such as `bender_serial_sensor->sensitivity`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{path}] {kind}")]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        ValidationError { path: path.into(), kind }
    }
}

/// Every failure found while validating one config block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Whether any error is reported at a path ending in `key`.
    pub fn has_error_for(&self, key: &str) -> bool {
        self.0.iter().any(|e| e.path.rsplit("->").next() == Some(key))
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl core::error::Error for ValidationErrors {}

// --- Integers ---

/// Parses `10`, `+10`, `-3`, `0x0A`.
fn parse_int_str(s: &str) -> Option<i64> {
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Accepts integers, integral floats and integer strings.
pub fn int_(value: &ConfigValue) -> Result<i64, ValidationErrorKind> {
    match value {
        ConfigValue::Int(i) => Ok(*i),
        ConfigValue::Float(f) => {
            if !f.is_finite() {
                return Err(ValidationErrorKind::ExpectedInteger("float"));
            }
            // Outside this range the cast below saturates.
            if *f <= -9.2e18 || *f >= 9.2e18 {
                return Err(ValidationErrorKind::TooLarge { max: i64::MAX, value: i64::MAX });
            }
            let truncated = *f as i64;
            if truncated as f64 == *f {
                Ok(truncated)
            } else {
                Err(ValidationErrorKind::FractionalInteger)
            }
        }
        ConfigValue::String(s) => {
            parse_int_str(s.trim()).ok_or(ValidationErrorKind::ExpectedInteger("string"))
        }
        other => Err(ValidationErrorKind::ExpectedInteger(other.type_name())),
    }
}

/// Integer in `min..=max`.
pub fn int_range(value: &ConfigValue, min: i64, max: i64) -> Result<i64, ValidationErrorKind> {
    let n = int_(value)?;
    if n < min {
        Err(ValidationErrorKind::TooSmall { min, value: n })
    } else if n > max {
        Err(ValidationErrorKind::TooLarge { max, value: n })
    } else {
        Ok(n)
    }
}

/// Strictly positive integer that fits a `u32`.
pub fn positive_int(value: &ConfigValue) -> Result<u32, ValidationErrorKind> {
    int_range(value, 1, u32::MAX as i64).map(|n| n as u32)
}

pub fn sensitivity(value: &ConfigValue) -> Result<Sensitivity, ValidationErrorKind> {
    let n = positive_int(value)?;
    Sensitivity::new(n).ok_or(ValidationErrorKind::TooSmall { min: 1, value: 0 })
}

/// Any finite number, or a string holding one.
pub fn float_(value: &ConfigValue) -> Result<f32, ValidationErrorKind> {
    let number = match value {
        ConfigValue::Int(i) => *i as f32,
        ConfigValue::Float(f) => *f as f32,
        ConfigValue::String(s) => s
            .trim()
            .parse::<f32>()
            .map_err(|_| ValidationErrorKind::ExpectedNumber("string"))?,
        other => return Err(ValidationErrorKind::ExpectedNumber(other.type_name())),
    };
    // Rendered as a C++ float literal, which has no spelling for these.
    if !number.is_finite() {
        return Err(ValidationErrorKind::NonFiniteNumber);
    }
    Ok(number)
}

// --- Time periods ---

const TIME_UNITS: &[(&str, u64)] = &[
    ("us", 1),
    ("microseconds", 1),
    ("ms", MICROS_PER_MILLI),
    ("milliseconds", MICROS_PER_MILLI),
    ("s", MICROS_PER_SECOND),
    ("sec", MICROS_PER_SECOND),
    ("secs", MICROS_PER_SECOND),
    ("seconds", MICROS_PER_SECOND),
    ("min", MICROS_PER_MINUTE),
    ("mins", MICROS_PER_MINUTE),
    ("minutes", MICROS_PER_MINUTE),
    ("h", MICROS_PER_HOUR),
    ("hours", MICROS_PER_HOUR),
    ("d", MICROS_PER_DAY),
    ("days", MICROS_PER_DAY),
];

const TIME_PERIOD_KEYS: &[(&str, u64)] = &[
    ("days", MICROS_PER_DAY),
    ("hours", MICROS_PER_HOUR),
    ("minutes", MICROS_PER_MINUTE),
    ("seconds", MICROS_PER_SECOND),
    ("milliseconds", MICROS_PER_MILLI),
    ("microseconds", 1),
];

fn unit_scale(unit: &str) -> Option<u64> {
    TIME_UNITS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(unit))
        .map(|(_, scale)| *scale)
}

/// `number * scale` in whole microseconds for a non-negative decimal `number`.
fn scale_decimal(number: &str, scale: u64) -> Result<u64, ValidationErrorKind> {
    let invalid = || ValidationErrorKind::InvalidTimePeriod(number.to_string());
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    let whole: u64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| ValidationErrorKind::TimePeriodOverflow)?
    };
    let mut micros = whole
        .checked_mul(scale)
        .ok_or(ValidationErrorKind::TimePeriodOverflow)?;

    let frac_part = frac_part.trim_end_matches('0');
    if !frac_part.is_empty() {
        if frac_part.len() > 18 {
            return Err(ValidationErrorKind::TooPrecise("microseconds"));
        }
        let numerator: u128 = frac_part.parse().map_err(|_| invalid())?;
        let denominator = 10u128.pow(frac_part.len() as u32);
        let scaled = numerator * scale as u128;
        if scaled % denominator != 0 {
            return Err(ValidationErrorKind::TooPrecise("microseconds"));
        }
        micros = micros
            .checked_add((scaled / denominator) as u64)
            .ok_or(ValidationErrorKind::TimePeriodOverflow)?;
    }
    Ok(micros)
}

/// `HH:MM` or `HH:MM:SS`.
fn parse_colon_period(s: &str) -> Result<u64, ValidationErrorKind> {
    let invalid = || ValidationErrorKind::InvalidTimePeriod(s.to_string());
    let parts: Vec<&str> = s.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }

    let scales = [MICROS_PER_HOUR, MICROS_PER_MINUTE, MICROS_PER_SECOND];
    parts.iter().zip(scales).try_fold(0u64, |acc, (part, scale)| {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        scale_decimal(part, scale)?
            .checked_add(acc)
            .ok_or(ValidationErrorKind::TimePeriodOverflow)
    })
}

fn parse_time_period_str(s: &str) -> Result<u64, ValidationErrorKind> {
    let s = s.trim();
    if s.starts_with('-') {
        return Err(ValidationErrorKind::NegativeTimePeriod);
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.contains(':') {
        return parse_colon_period(s);
    }

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = (&s[..split], s[split..].trim());
    if number.is_empty() {
        return Err(ValidationErrorKind::InvalidTimePeriod(s.to_string()));
    }
    if unit.is_empty() {
        return Err(ValidationErrorKind::MissingTimeUnit(number.to_string()));
    }
    let scale = unit_scale(unit).ok_or_else(|| ValidationErrorKind::UnknownTimeUnit(unit.to_string()))?;
    scale_decimal(number, scale)
}

fn time_period_from_map(map: &ConfigMap) -> Result<u64, ValidationErrorKind> {
    map.iter().try_fold(0u64, |acc, (key, value)| {
        let scale = TIME_PERIOD_KEYS
            .iter()
            .find(|(name, _)| *name == key.as_str())
            .map(|(_, scale)| *scale)
            .ok_or_else(|| ValidationErrorKind::UnknownTimePeriodKey(key.clone()))?;

        let micros = match value {
            ConfigValue::Int(i) if *i < 0 => return Err(ValidationErrorKind::NegativeTimePeriod),
            ConfigValue::Int(i) => (*i as u64)
                .checked_mul(scale)
                .ok_or(ValidationErrorKind::TimePeriodOverflow)?,
            ConfigValue::Float(f) if !f.is_finite() => {
                return Err(ValidationErrorKind::InvalidTimePeriod(format!("{}", f)))
            }
            ConfigValue::Float(f) if *f < 0.0 => return Err(ValidationErrorKind::NegativeTimePeriod),
            // f64 Display never uses exponent notation.
            ConfigValue::Float(f) => scale_decimal(&format!("{}", f), scale)?,
            other => return Err(ValidationErrorKind::ExpectedNumber(other.type_name())),
        };
        acc.checked_add(micros).ok_or(ValidationErrorKind::TimePeriodOverflow)
    })
}

/// Any non-negative time period, microsecond precision.
///
/// Accepts `"<number><unit>"`, `"HH:MM[:SS]"`, or a mapping of `days`,
/// `hours`, `minutes`, `seconds`, `milliseconds` and `microseconds`.
pub fn time_period(value: &ConfigValue) -> Result<Duration, ValidationErrorKind> {
    let micros = match value {
        ConfigValue::Int(i) => return Err(ValidationErrorKind::MissingTimeUnit(i.to_string())),
        ConfigValue::Float(f) => return Err(ValidationErrorKind::MissingTimeUnit(format!("{}", f))),
        ConfigValue::String(s) => parse_time_period_str(s)?,
        ConfigValue::Map(m) => time_period_from_map(m)?,
        other => return Err(ValidationErrorKind::ExpectedTimePeriod(other.type_name())),
    };
    Ok(Duration::from_micros(micros))
}

/// Time period that is a whole number of milliseconds.
pub fn positive_time_period_milliseconds(value: &ConfigValue) -> Result<Duration, ValidationErrorKind> {
    let period = time_period(value)?;
    if period.subsec_nanos() % 1_000_000 != 0 {
        return Err(ValidationErrorKind::TooPrecise("milliseconds"));
    }
    Ok(period)
}

/// `never`, or a millisecond time period below the "never" sentinel.
pub fn update_interval(value: &ConfigValue) -> Result<UpdateInterval, ValidationErrorKind> {
    if let Some(s) = value.as_str() {
        if s.trim().eq_ignore_ascii_case("never") {
            return Ok(UpdateInterval::Never);
        }
    }
    let period = positive_time_period_milliseconds(value)?;
    if period.as_millis() >= NEVER_MS as u128 {
        return Err(ValidationErrorKind::TimePeriodOverflow);
    }
    Ok(UpdateInterval::Every(period))
}

// --- Identifiers ---

const RESERVED_IDS: &[&str] = &[
    // C++ keywords likely to be typed as IDs
    "auto", "bool", "break", "case", "char", "class", "const", "continue", "default", "delete",
    "do", "double", "else", "enum", "extern", "false", "float", "for", "goto", "if", "int",
    "long", "namespace", "new", "nullptr", "private", "public", "return", "short", "signed",
    "sizeof", "static", "struct", "switch", "template", "this", "true", "typedef", "union",
    "unsigned", "using", "virtual", "void", "volatile", "while",
    // Names the generated main file already uses
    "App", "setup", "loop", "delay", "millis", "uint8_t", "uint16_t", "uint32_t", "int32_t",
];

/// A C++ identifier that is not a reserved word.
pub fn valid_identifier(value: &ConfigValue) -> Result<String, ValidationErrorKind> {
    let name = match value {
        ConfigValue::String(s) => s.trim(),
        other => return Err(ValidationErrorKind::ExpectedIdentifier(other.type_name())),
    };

    let mut chars = name.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationErrorKind::InvalidIdentifier(name.to_string()));
    }
    if RESERVED_IDS.contains(&name) {
        return Err(ValidationErrorKind::ReservedIdentifier(name.to_string()));
    }
    Ok(name.to_string())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> ConfigValue {
        ConfigValue::from(v)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_positive_int_accepts() {
        assert_eq!(positive_int(&ConfigValue::Int(1)), Ok(1));
        assert_eq!(positive_int(&ConfigValue::Int(4_294_967_295)), Ok(u32::MAX));
        assert_eq!(positive_int(&ConfigValue::Float(10.0)), Ok(10));
        assert_eq!(positive_int(&s(" 12 ")), Ok(12));
        assert_eq!(positive_int(&s("0x0A")), Ok(10));
    }

    #[test]
    fn test_positive_int_rejects() {
        assert_eq!(
            positive_int(&ConfigValue::Int(0)),
            Err(ValidationErrorKind::TooSmall { min: 1, value: 0 })
        );
        assert_eq!(
            positive_int(&ConfigValue::Int(-5)),
            Err(ValidationErrorKind::TooSmall { min: 1, value: -5 })
        );
        assert_eq!(
            positive_int(&ConfigValue::Int(4_294_967_296)),
            Err(ValidationErrorKind::TooLarge { max: 4_294_967_295, value: 4_294_967_296 })
        );
        assert_eq!(positive_int(&ConfigValue::Float(2.5)), Err(ValidationErrorKind::FractionalInteger));
        assert_eq!(positive_int(&s("ten")), Err(ValidationErrorKind::ExpectedInteger("string")));
        assert_eq!(positive_int(&s("1.5")), Err(ValidationErrorKind::ExpectedInteger("string")));
        assert_eq!(
            positive_int(&ConfigValue::Bool(true)),
            Err(ValidationErrorKind::ExpectedInteger("boolean"))
        );
        assert_eq!(
            positive_int(&ConfigValue::Float(f64::NAN)),
            Err(ValidationErrorKind::ExpectedInteger("float"))
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(float_(&ConfigValue::Int(600)), Ok(600.0));
        assert_eq!(float_(&ConfigValue::Float(-100.5)), Ok(-100.5));
        assert_eq!(float_(&s("800")), Ok(800.0));
        assert_eq!(float_(&ConfigValue::Null), Err(ValidationErrorKind::ExpectedNumber("null")));

        for non_finite in [s("nan"), s("inf"), s("-infinity"), ConfigValue::Float(1e300), ConfigValue::Float(f64::NAN)] {
            assert_eq!(float_(&non_finite), Err(ValidationErrorKind::NonFiniteNumber));
        }
    }

    #[test]
    fn test_time_period_units() {
        assert_eq!(time_period(&s("60s")), Ok(Duration::from_secs(60)));
        assert_eq!(time_period(&s("500ms")), Ok(ms(500)));
        assert_eq!(time_period(&s("1.5s")), Ok(ms(1_500)));
        assert_eq!(time_period(&s("2 min")), Ok(Duration::from_secs(120)));
        assert_eq!(time_period(&s("1h")), Ok(Duration::from_secs(3_600)));
        assert_eq!(time_period(&s("1d")), Ok(Duration::from_secs(86_400)));
        assert_eq!(time_period(&s("250us")), Ok(Duration::from_micros(250)));
        assert_eq!(time_period(&s("10 Seconds")), Ok(Duration::from_secs(10)));
        assert_eq!(time_period(&s(".5s")), Ok(ms(500)));
        assert_eq!(time_period(&s("+3s")), Ok(Duration::from_secs(3)));
    }

    #[test]
    fn test_time_period_colon_and_map() {
        assert_eq!(time_period(&s("01:30")), Ok(Duration::from_secs(5_400)));
        assert_eq!(time_period(&s("00:01:05")), Ok(Duration::from_secs(65)));
        assert!(matches!(time_period(&s("1:2:3:4")), Err(ValidationErrorKind::InvalidTimePeriod(_))));
        assert!(matches!(time_period(&s("1::3")), Err(ValidationErrorKind::InvalidTimePeriod(_))));

        let period = ConfigValue::map([("minutes", ConfigValue::Int(1)), ("seconds", ConfigValue::Float(2.5))]);
        assert_eq!(time_period(&period), Ok(ms(62_500)));
        assert_eq!(
            time_period(&ConfigValue::map([("weeks", ConfigValue::Int(1))])),
            Err(ValidationErrorKind::UnknownTimePeriodKey("weeks".into()))
        );
        assert_eq!(
            time_period(&ConfigValue::map([("seconds", ConfigValue::Int(-1))])),
            Err(ValidationErrorKind::NegativeTimePeriod)
        );
    }

    #[test]
    fn test_time_period_rejects() {
        assert_eq!(time_period(&s("60")), Err(ValidationErrorKind::MissingTimeUnit("60".into())));
        assert_eq!(
            time_period(&ConfigValue::Int(60)),
            Err(ValidationErrorKind::MissingTimeUnit("60".into()))
        );
        assert_eq!(time_period(&s("5 fortnights")), Err(ValidationErrorKind::UnknownTimeUnit("fortnights".into())));
        assert_eq!(time_period(&s("-5s")), Err(ValidationErrorKind::NegativeTimePeriod));
        assert!(matches!(time_period(&s("s")), Err(ValidationErrorKind::InvalidTimePeriod(_))));
        assert!(matches!(time_period(&s("1.2.3s")), Err(ValidationErrorKind::InvalidTimePeriod(_))));
        assert_eq!(time_period(&s("0.5us")), Err(ValidationErrorKind::TooPrecise("microseconds")));
        assert_eq!(
            time_period(&ConfigValue::Bool(false)),
            Err(ValidationErrorKind::ExpectedTimePeriod("boolean"))
        );
    }

    #[test]
    fn test_update_interval() {
        assert_eq!(update_interval(&s("never")), Ok(UpdateInterval::Never));
        assert_eq!(update_interval(&s("NEVER")), Ok(UpdateInterval::Never));
        assert_eq!(update_interval(&s("60s")).map(|i| i.as_millis()), Ok(60_000));
        assert_eq!(update_interval(&s("0ms")).map(|i| i.as_millis()), Ok(0));
        assert_eq!(update_interval(&s("1500us")), Err(ValidationErrorKind::TooPrecise("milliseconds")));
        assert_eq!(update_interval(&s("50d")), Err(ValidationErrorKind::TimePeriodOverflow));
        assert!(update_interval(&s("soon")).is_err());
    }

    #[test]
    fn test_valid_identifier() {
        assert_eq!(valid_identifier(&s("ground_fault_1")), Ok("ground_fault_1".into()));
        assert_eq!(valid_identifier(&s("_private")), Ok("_private".into()));
        assert_eq!(valid_identifier(&s("1st")), Err(ValidationErrorKind::InvalidIdentifier("1st".into())));
        assert_eq!(valid_identifier(&s("has-dash")), Err(ValidationErrorKind::InvalidIdentifier("has-dash".into())));
        assert_eq!(valid_identifier(&s("")), Err(ValidationErrorKind::InvalidIdentifier("".into())));
        assert_eq!(valid_identifier(&s("new")), Err(ValidationErrorKind::ReservedIdentifier("new".into())));
        assert_eq!(valid_identifier(&ConfigValue::Int(3)), Err(ValidationErrorKind::ExpectedIdentifier("integer")));
    }

    #[test]
    fn test_errors_display() {
        let mut errors = ValidationErrors::default();
        errors.push(ValidationError::new("bender_serial_sensor->sensitivity", ValidationErrorKind::FractionalInteger));
        errors.push(ValidationError::new("bender_serial_sensor->foo", ValidationErrorKind::UnknownOption("foo".into())));
        assert_eq!(
            format!("{}", errors),
            "[bender_serial_sensor->sensitivity] this option only accepts integers with no fractional part\n\
             [bender_serial_sensor->foo] [foo] is an invalid option"
        );
        assert!(errors.has_error_for("sensitivity"));
        assert!(!errors.has_error_for("update_interval"));
    }
}
