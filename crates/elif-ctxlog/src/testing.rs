//! Test doubles for code that logs through a [`ContextLogger`](crate::ContextLogger)
//!
//! Enabled under `cfg(test)` and by the `testing` feature.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::sink::{Level, Sink};
use crate::value::Fields;

#[derive(Debug, Default)]
struct Recording {
    sub_calls: Vec<Fields>,
    emissions: Vec<(Level, String)>,
}

/// Sink that records what it is asked to do.
///
/// Every sink derived through [`Sink::sub`] writes into the same recording,
/// so a test can hold on to the root sink and inspect everything emitted
/// through loggers built on top of it. `fatal` and `panic` only record.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    recording: Arc<Mutex<Recording>>,
    level: Arc<Mutex<Level>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::with_level(Level::Info)
    }

    pub fn with_level(level: Level) -> Self {
        Self {
            recording: Arc::new(Mutex::new(Recording::default())),
            level: Arc::new(Mutex::new(level)),
        }
    }

    pub fn set_level(&self, level: Level) {
        *self.level.lock() = level;
    }

    /// Field sets passed to `sub`, in call order
    pub fn sub_calls(&self) -> Vec<Fields> {
        self.recording.lock().sub_calls.clone()
    }

    /// Emitted `(level, message)` pairs, in call order
    pub fn emissions(&self) -> Vec<(Level, String)> {
        self.recording.lock().emissions.clone()
    }

    pub fn clear(&self) {
        let mut recording = self.recording.lock();
        recording.sub_calls.clear();
        recording.emissions.clear();
    }

    fn record(&self, level: Level, message: &str) {
        self.recording
            .lock()
            .emissions
            .push((level, message.to_string()));
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for RecordingSink {
    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn fatal(&self, message: &str) {
        self.record(Level::Fatal, message);
    }

    fn panic(&self, message: &str) {
        self.record(Level::Panic, message);
    }

    fn sub(&self, fields: Fields) -> Arc<dyn Sink> {
        self.recording.lock().sub_calls.push(fields);
        Arc::new(self.clone())
    }

    fn level(&self) -> Level {
        *self.level.lock()
    }
}
