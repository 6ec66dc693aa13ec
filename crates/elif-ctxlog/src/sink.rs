//! Log sinks
//!
//! A [`Sink`] is the emitter a [`ContextLogger`](crate::ContextLogger)
//! delegates to. The context logger never formats or transports anything
//! itself; it only derives a one-shot sub-sink carrying the `ctx` field and
//! emits through it.

use std::fmt;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;

use crate::logger::ContextLogger;
use crate::value::Fields;

/// Log levels understood by sinks.
///
/// `Trace` and `Off` exist so a sink can report them, but the context logger
/// does not dispatch them: [`ContextLogger::log`](crate::ContextLogger::log)
/// drops messages at those levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
    Off,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
            Level::Off => "off",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LevelFilter> for Level {
    fn from(filter: LevelFilter) -> Self {
        match filter {
            LevelFilter::TRACE => Level::Trace,
            LevelFilter::DEBUG => Level::Debug,
            LevelFilter::INFO => Level::Info,
            LevelFilter::WARN => Level::Warn,
            LevelFilter::ERROR => Level::Error,
            _ => Level::Off,
        }
    }
}

/// The underlying log emitter.
///
/// `fatal` and `panic` are termination points: implementations are expected
/// to end the process or panic after emitting. Callers must not rely on
/// control returning from them.
pub trait Sink: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn fatal(&self, message: &str);
    fn panic(&self, message: &str);

    /// Derive a sink that carries `fields` in addition to this sink's own
    fn sub(&self, fields: Fields) -> Arc<dyn Sink>;

    /// The level this sink currently emits at
    fn level(&self) -> Level;

    /// The context logger behind this handle, if it is one.
    ///
    /// Lets a context recognize a [`ContextLogger`] bound through a plain
    /// `Arc<dyn Sink>`, keeping the same allocation.
    fn into_context_logger(self: Arc<Self>) -> Option<Arc<ContextLogger>> {
        None
    }
}

/// Sink backed by `tracing` events.
///
/// Accumulated fields are rendered once, as JSON, when the sink is derived
/// and attached to every event under the `fields` attribute.
#[derive(Debug, Clone)]
pub struct TracingSink {
    fields: Fields,
    rendered: String,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::with_fields(Fields::new())
    }

    pub fn with_fields(fields: Fields) -> Self {
        let rendered = serde_json::to_string(&fields).unwrap_or_default();
        Self { fields, rendered }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Concrete form of [`Sink::sub`]; later fields win on key collision
    pub fn derive(&self, fields: Fields) -> TracingSink {
        let mut merged = self.fields.clone();
        merged.extend(fields);
        TracingSink::with_fields(merged)
    }

    fn emit(&self, level: Level, message: &str) {
        let fields = self.rendered.as_str();
        match level {
            Level::Trace => tracing::trace!(fields, "{}", message),
            Level::Debug => tracing::debug!(fields, "{}", message),
            Level::Info => tracing::info!(fields, "{}", message),
            Level::Warn => tracing::warn!(fields, "{}", message),
            Level::Error => tracing::error!(fields, "{}", message),
            Level::Fatal | Level::Panic => {
                tracing::error!(fields, severity = level.as_str(), "{}", message)
            }
            Level::Off => {}
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TracingSink {
    fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    fn fatal(&self, message: &str) {
        self.emit(Level::Fatal, message);
        std::process::exit(1);
    }

    /// Emits, then panics with `message`. Under a `panic = "abort"` profile
    /// (the workspace release profile) this aborts the process instead of
    /// unwinding.
    fn panic(&self, message: &str) {
        self.emit(Level::Panic, message);
        panic!("{}", message);
    }

    fn sub(&self, fields: Fields) -> Arc<dyn Sink> {
        Arc::new(self.derive(fields))
    }

    fn level(&self) -> Level {
        Level::from(LevelFilter::current())
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl Sink for NoopSink {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn fatal(&self, _message: &str) {}
    fn panic(&self, _message: &str) {}

    fn sub(&self, _fields: Fields) -> Arc<dyn Sink> {
        Arc::new(NoopSink)
    }

    fn level(&self) -> Level {
        Level::Off
    }
}

/// The sink used when a context has none bound
pub fn default_sink() -> Arc<dyn Sink> {
    Arc::new(TracingSink::new())
}
