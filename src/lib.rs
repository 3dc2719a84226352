// src/lib.rs

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod common;
pub mod monitor;

#[cfg(feature = "alloc")]
pub mod component;

// Re-export key types for convenience
pub use common::{BenderError, BenderNumber, Message};
pub use monitor::BenderMonitor;
