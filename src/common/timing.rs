// src/common/timing.rs

use core::time::Duration;

/// Nominal period between message blocks sent by the board.
pub const MESSAGE_BLOCK_INTERVAL: Duration = Duration::from_millis(500);

/// Update interval sentinel meaning "never run", as understood by the host scheduler.
pub const NEVER_MS: u32 = u32::MAX;

// Microseconds per time unit accepted by the duration grammar.
pub const MICROS_PER_MILLI: u64 = 1_000;
pub const MICROS_PER_SECOND: u64 = 1_000_000;
pub const MICROS_PER_MINUTE: u64 = 60 * MICROS_PER_SECOND;
pub const MICROS_PER_HOUR: u64 = 60 * MICROS_PER_MINUTE;
pub const MICROS_PER_DAY: u64 = 24 * MICROS_PER_HOUR;
