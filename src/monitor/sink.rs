// src/monitor/sink.rs

/// Receiver of published sensor states.
///
/// Closures taking an `f32` implement it, so tests and glue code can pass
/// `|state| ...` directly.
pub trait SensorSink {
    fn publish_state(&mut self, state: f32);
}

impl<F> SensorSink for F
where
    F: FnMut(f32),
{
    fn publish_state(&mut self, state: f32) {
        self(state)
    }
}

/// The pair of sensors attached to one Bender unit.
#[derive(Debug, Clone)]
pub struct BenderSensors<S> {
    /// Receives 1.0 (good) or 0.0 (fault).
    pub status: S,
    /// Receives the ground fault resistance in kilo-ohms.
    pub resistance: S,
}

impl<S: SensorSink> BenderSensors<S> {
    pub fn new(status: S, resistance: S) -> Self {
        BenderSensors { status, resistance }
    }
}
