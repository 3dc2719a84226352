// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod checksum;
pub mod error;
pub mod hal_traits;
pub mod line;
pub mod message;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

pub use checksum::{
    calculate_checksum8, decode_checksum_hex, encode_checksum_hex, split_checksum,
    verify_line_checksum, write_framed_line,
};
pub use error::BenderError;
pub use hal_traits::BenderSerial;
pub use line::{LineBuffer, LineStatus, MAX_LINE_LEN};
pub use message::{
    parse_message, AnalogInputs, BenderReading, FaultMessage, Message, MessageParseError,
};
pub use types::{BenderNumber, Sensitivity, Status, UpdateInterval};

#[cfg(feature = "impl-hal")]
pub use hal_traits::HalSerial;
