// src/monitor/mod.rs

mod sink;
pub mod sync_monitor;

pub use sink::{BenderSensors, SensorSink};
pub use sync_monitor::{BenderMonitor, MonitorStats};
