// src/monitor/sync_monitor.rs

use crate::common::{
    checksum::verify_line_checksum,
    error::BenderError,
    hal_traits::BenderSerial,
    line::{LineBuffer, LineStatus},
    message::{parse_message, AnalogInputs, BenderReading, Message},
    types::{BenderNumber, Sensitivity, UpdateInterval},
};
use super::sink::{BenderSensors, SensorSink};

use core::fmt::Debug;
use log::{debug, warn};

/// Counters kept across polls. They wrap around on overflow.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Lines that passed the checksum and parsed.
    pub lines_processed: u32,
    pub checksum_failures: u32,
    pub parse_failures: u32,
    /// Lines dropped for exceeding the line buffer.
    pub overflows: u32,
    /// `GFS` messages received.
    pub faults_reported: u32,
    /// Individual `publish_state` calls made.
    pub states_published: u32,
}

/// Per-line state, kept apart from the line buffer so a buffered line can be
/// dispatched while the buffer is borrowed.
#[derive(Debug)]
struct Dispatcher<S> {
    sensors: [Option<BenderSensors<S>>; BenderNumber::COUNT],
    latest: [Option<BenderReading>; BenderNumber::COUNT],
    latest_analog: Option<AnalogInputs>,
    stats: MonitorStats,
}

impl<S: SensorSink> Dispatcher<S> {
    fn new() -> Self {
        Dispatcher {
            sensors: core::array::from_fn(|_| None),
            latest: [None; BenderNumber::COUNT],
            latest_analog: None,
            stats: MonitorStats::default(),
        }
    }

    fn process_line<E: Debug>(&mut self, line: &[u8]) -> Result<(), BenderError<E>> {
        let payload = match verify_line_checksum(line) {
            Ok(payload) => payload,
            Err(e) => {
                self.stats.checksum_failures = self.stats.checksum_failures.wrapping_add(1);
                warn!("Checksum validation failed ({}): {}", e, printable(line));
                return Err(e);
            }
        };

        let message = match parse_message(payload) {
            Ok(message) => message,
            Err(e) => {
                self.stats.parse_failures = self.stats.parse_failures.wrapping_add(1);
                warn!("Unhandled message ({}): {}", e, printable(line));
                return Err(BenderError::Parse(e));
            }
        };
        self.stats.lines_processed = self.stats.lines_processed.wrapping_add(1);

        match message {
            Message::Bender(reading) => self.publish(reading),
            Message::AnalogInputs(inputs) => {
                for (i, raw) in inputs.values().iter().enumerate() {
                    debug!("Analog input {}: {}", i, raw);
                }
                self.latest_analog = Some(inputs);
            }
            Message::Fault(fault) => {
                self.stats.faults_reported = self.stats.faults_reported.wrapping_add(1);
                warn!("Fault message: {}", fault);
            }
        }
        Ok(())
    }

    fn publish(&mut self, reading: BenderReading) {
        let slot = reading.number.index();
        self.latest[slot] = Some(reading);

        match self.sensors[slot].as_mut() {
            Some(sensors) => {
                sensors.status.publish_state(reading.status.as_state());
                sensors.resistance.publish_state(reading.resistance_state());
                self.stats.states_published = self.stats.states_published.wrapping_add(2);
            }
            None => debug!("No sensors registered for Bender {}", reading.number),
        }
    }
}

/// Best-effort text for log output.
fn printable(line: &[u8]) -> &str {
    core::str::from_utf8(line).unwrap_or("<non-ascii>")
}

/// Reads the Bender board's UART and publishes what it reports.
///
/// Drive it by calling [`poll`](Self::poll) from the main loop.
#[derive(Debug)]
pub struct BenderMonitor<IF, S = fn(f32)>
where
    IF: BenderSerial,
{
    interface: IF,
    line: LineBuffer,
    dispatcher: Dispatcher<S>,
    sensitivity: Sensitivity,
    update_interval: Option<UpdateInterval>,
}

impl<IF, S> BenderMonitor<IF, S>
where
    IF: BenderSerial,
    S: SensorSink,
{
    pub fn new(interface: IF) -> Self {
        BenderMonitor {
            interface,
            line: LineBuffer::new(),
            dispatcher: Dispatcher::new(),
            sensitivity: Sensitivity::DEFAULT,
            update_interval: None,
        }
    }

    // --- Setters called by generated code ---

    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
    }

    pub fn set_update_interval(&mut self, interval: UpdateInterval) {
        self.update_interval = Some(interval);
    }

    /// Applies a validated config record, as the generated setter calls would.
    #[cfg(feature = "alloc")]
    pub fn apply(&mut self, config: &crate::component::BenderSensorConfig) {
        config.apply_to(self);
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    /// `None` until set; the host default applies then.
    pub fn update_interval(&self) -> Option<UpdateInterval> {
        self.update_interval
    }

    /// Attaches status and resistance sensors to a unit, replacing any previous pair.
    pub fn register_bender(&mut self, number: BenderNumber, status: S, resistance: S) {
        self.dispatcher.sensors[number.index()] = Some(BenderSensors::new(status, resistance));
    }

    pub fn unregister_bender(&mut self, number: BenderNumber) -> Option<BenderSensors<S>> {
        self.dispatcher.sensors[number.index()].take()
    }

    pub fn setup(&mut self) {
        debug!("BenderSerialSensor setup complete.");
        self.dump_config();
    }

    pub fn dump_config(&self) {
        debug!("BenderSerialSensor:");
        debug!("  Sensitivity: {}", self.sensitivity);
        match self.update_interval {
            Some(interval) => debug!("  Update Interval: {}", interval),
            None => debug!("  Update Interval: host default"),
        }
        for number in BenderNumber::all() {
            if self.dispatcher.sensors[number.index()].is_some() {
                debug!("  Bender {}: status + resistance sensors", number);
            }
        }
    }

    // --- Public Polling Methods ---

    /// Drains every byte currently available and dispatches each completed line.
    ///
    /// Checksum and parse failures are logged and counted, not returned.
    /// Returns the number of complete lines seen, or the first I/O error.
    pub fn poll(&mut self) -> Result<usize, BenderError<IF::Error>> {
        let mut lines = 0;
        loop {
            let byte = match self.interface.read_byte() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => return Ok(lines),
                Err(nb::Error::Other(e)) => return Err(BenderError::Io(e)),
            };

            match self.line.push(byte) {
                LineStatus::Pending => {}
                LineStatus::Ready => {
                    lines += 1;
                    // Failures are already counted and logged by the dispatcher.
                    let _ = self.dispatcher.process_line::<IF::Error>(self.line.line());
                }
                LineStatus::Overflow { capacity } => {
                    lines += 1;
                    self.dispatcher.stats.overflows = self.dispatcher.stats.overflows.wrapping_add(1);
                    warn!("Discarded line: {}", BenderError::<IF::Error>::LineOverflow { capacity });
                }
            }
        }
    }

    /// Verifies, parses and dispatches one line (terminators stripped).
    pub fn process_line(&mut self, line: &[u8]) -> Result<(), BenderError<IF::Error>> {
        self.dispatcher.process_line(line)
    }

    // --- Accessors ---

    pub fn latest_reading(&self, number: BenderNumber) -> Option<&BenderReading> {
        self.dispatcher.latest[number.index()].as_ref()
    }

    pub fn latest_analog(&self) -> Option<&AnalogInputs> {
        self.dispatcher.latest_analog.as_ref()
    }

    pub fn stats(&self) -> MonitorStats {
        self.dispatcher.stats
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Gives the interface back.
    pub fn release(self) -> IF {
        self.interface
    }
}
