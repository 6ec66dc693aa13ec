//! The context logger
//!
//! A [`ContextLogger`] owns a handle to a [`Sink`] and a mapping of context
//! fields. Every message it emits goes through a one-shot sub-sink that
//! carries a snapshot of those fields under the reserved [`CTX_KEY`].
//!
//! # Field aliasing
//!
//! The field mapping is *shared*, not copied. Cloning a `ContextLogger`, or
//! deriving one with [`ContextLogger::derive_sub_logger`], yields a logger
//! that points at the same mapping: a field set through any of them is seen
//! by all of them. Only the sink differs between a logger and its sub-loggers.
//! Do not replace the `Arc` clone in `derive_sub_logger` with a deep copy;
//! request handlers rely on fields added deep in a call chain showing up in
//! logs written by their callers.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::sink::{Level, Sink};
use crate::value::{FieldValue, Fields};

/// Field holding the request identifier
pub const REQUEST_ID: &str = "request_id";

/// Key under which the accumulated fields are attached to each message
pub const CTX_KEY: &str = "ctx";

/// Field mapping shared between a logger and everything derived from it
pub type SharedFields = Arc<Mutex<Fields>>;

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Logger that injects its accumulated context fields into every message
#[derive(Clone)]
pub struct ContextLogger {
    sink: Arc<dyn Sink>,
    fields: SharedFields,
}

impl ContextLogger {
    /// Wrap `sink`, starting with a freshly generated `request_id`
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        let mut fields = Fields::new();
        fields.insert(REQUEST_ID.to_string(), FieldValue::String(new_request_id()));
        Self::with_fields(sink, fields)
    }

    /// Wrap `sink` with an explicit initial field set
    pub fn with_fields(sink: Arc<dyn Sink>, fields: Fields) -> Self {
        Self {
            sink,
            fields: Arc::new(Mutex::new(fields)),
        }
    }

    /// The request ID of this logger.
    ///
    /// If the field is missing or not a string, a new ID is generated and
    /// stored before being returned.
    pub fn request_id(&self) -> String {
        let mut fields = self.fields.lock();
        if let Some(FieldValue::String(id)) = fields.get(REQUEST_ID) {
            return id.clone();
        }

        let id = new_request_id();
        fields.insert(REQUEST_ID.to_string(), FieldValue::String(id.clone()));
        id
    }

    /// Set a context field, replacing any previous value
    pub fn set_field<K, V>(&self, key: K, value: V) -> &Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.lock().insert(key.into(), value.into());
        self
    }

    /// Set an integer context field. The value is stored as decimal text.
    pub fn set_int_field<K: Into<String>>(&self, key: K, value: i64) -> &Self {
        self.fields
            .lock()
            .insert(key.into(), FieldValue::String(value.to_string()));
        self
    }

    /// Merge `fields` into the context; incoming values win on collision
    pub fn merge_fields(&self, fields: Fields) -> &Self {
        self.fields.lock().extend(fields);
        self
    }

    /// Derive a logger whose sink is `self.sink.sub(fields)`.
    ///
    /// The returned logger shares this logger's context fields (see the
    /// module docs).
    pub fn derive_sub_logger(&self, fields: Fields) -> ContextLogger {
        ContextLogger {
            sink: self.sink.sub(fields),
            fields: Arc::clone(&self.fields),
        }
    }

    /// Snapshot of the current context fields
    pub fn fields(&self) -> Fields {
        self.fields.lock().clone()
    }

    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.fields.lock().get(key).cloned()
    }

    /// Whether `other` reads and writes the same field mapping
    pub fn shares_fields_with(&self, other: &ContextLogger) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Current level of the underlying sink
    pub fn level(&self) -> Level {
        self.sink.level()
    }

    pub fn debug<M: fmt::Display>(&self, message: M) {
        self.emit(Level::Debug, &message.to_string());
    }

    pub fn info<M: fmt::Display>(&self, message: M) {
        self.emit(Level::Info, &message.to_string());
    }

    pub fn warn<M: fmt::Display>(&self, message: M) {
        self.emit(Level::Warn, &message.to_string());
    }

    pub fn error<M: fmt::Display>(&self, message: M) {
        self.emit(Level::Error, &message.to_string());
    }

    /// Emit at fatal level. The sink terminates the process.
    pub fn fatal<M: fmt::Display>(&self, message: M) {
        self.emit(Level::Fatal, &message.to_string());
    }

    /// Emit at panic level. The sink panics after emitting; with
    /// `panic = "abort"` (the workspace release profile) that aborts.
    pub fn panic<M: fmt::Display>(&self, message: M) {
        self.emit(Level::Panic, &message.to_string());
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, &fmt::format(args));
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, &fmt::format(args));
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, &fmt::format(args));
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, &fmt::format(args));
    }

    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Fatal, &fmt::format(args));
    }

    pub fn panicf(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Panic, &fmt::format(args));
    }

    /// Log at `level`.
    ///
    /// `Level::Trace` and `Level::Off` are not dispatched: the call is a
    /// no-op and the sink is never touched.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::Debug => self.debugf(args),
            Level::Info => self.infof(args),
            Level::Warn => self.warnf(args),
            Level::Error => self.errorf(args),
            Level::Fatal => self.fatalf(args),
            Level::Panic => self.panicf(args),
            Level::Trace | Level::Off => {}
        }
    }

    fn envelope(&self) -> Arc<dyn Sink> {
        let snapshot = self.fields();
        let mut ctx = Fields::with_capacity(1);
        ctx.insert(CTX_KEY.to_string(), FieldValue::Map(snapshot));
        self.sink.sub(ctx)
    }

    fn emit(&self, level: Level, message: &str) {
        let sink = self.envelope();
        match level {
            Level::Debug => sink.debug(message),
            Level::Info => sink.info(message),
            Level::Warn => sink.warn(message),
            Level::Error => sink.error(message),
            Level::Fatal => sink.fatal(message),
            Level::Panic => sink.panic(message),
            Level::Trace | Level::Off => {}
        }
    }
}

impl fmt::Debug for ContextLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextLogger")
            .field("fields", &*self.fields.lock())
            .finish_non_exhaustive()
    }
}

impl Sink for ContextLogger {
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
    }

    fn panic(&self, message: &str) {
        self.emit(Level::Panic, message);
    }

    fn sub(&self, fields: Fields) -> Arc<dyn Sink> {
        Arc::new(self.derive_sub_logger(fields))
    }

    fn level(&self) -> Level {
        self.sink.level()
    }

    fn into_context_logger(self: Arc<Self>) -> Option<Arc<ContextLogger>> {
        Some(self)
    }
}

/// Log a formatted debug message through a [`ContextLogger`]
#[macro_export]
macro_rules! ctx_debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log a formatted info message through a [`ContextLogger`]
#[macro_export]
macro_rules! ctx_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a formatted warning through a [`ContextLogger`]
#[macro_export]
macro_rules! ctx_warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// Log a formatted error through a [`ContextLogger`]
#[macro_export]
macro_rules! ctx_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a formatted fatal message through a [`ContextLogger`]; the sink
/// terminates the process
#[macro_export]
macro_rules! ctx_fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

/// Log a formatted panic message through a [`ContextLogger`]; the sink
/// panics after emitting
#[macro_export]
macro_rules! ctx_panic {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(format_args!($($arg)+))
    };
}
