//! Request-scoped context container and logger lookup
//!
//! [`RequestContext`] is an immutable bag of typed values. Attaching a value
//! never mutates the context it is called on; it returns a derived copy that
//! the caller passes downstream. Copies are cheap: values are reference
//! counted, so a derived context shares every value it did not replace.
//!
//! The logger of a context is resolved with [`from_context`] and bound with
//! [`attach_to_context`]. Once bound, every lookup through that context (or
//! any context derived from it) returns the same [`ContextLogger`] instance.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Request;

use crate::logger::ContextLogger;
use crate::sink::{default_sink, Sink};

/// Logger slot of a context
#[derive(Clone)]
enum BoundLogger {
    Plain(Arc<dyn Sink>),
    Context(Arc<ContextLogger>),
}

/// Immutable, copy-on-attach request context
#[derive(Clone, Default)]
pub struct RequestContext {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The context carried in a request's extensions, or an empty one
    pub fn from_request<B>(request: &Request<B>) -> Self {
        request
            .extensions()
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default()
    }

    /// Derive a context holding `value`, keyed by its type
    pub fn with_value<T: Send + Sync + 'static>(&self, value: T) -> Self {
        let mut values = self.values.clone();
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Self { values }
    }

    /// Look up a value by type
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Derive a context whose logger is `sink`.
    ///
    /// A [`ContextLogger`] passed as a sink (for instance one returned by
    /// [`RequestContext::sink`] or [`Sink::sub`]) is bound as the context
    /// logger, so [`from_context`] returns it instead of wrapping it.
    pub fn with_sink(&self, sink: Arc<dyn Sink>) -> Self {
        match Arc::clone(&sink).into_context_logger() {
            Some(logger) => self.with_logger(logger),
            None => self.with_value(BoundLogger::Plain(sink)),
        }
    }

    /// Derive a context bound to an existing context logger
    pub fn with_logger(&self, logger: Arc<ContextLogger>) -> Self {
        self.with_value(BoundLogger::Context(logger))
    }

    /// The generic logger of this context.
    ///
    /// Returns the bound context logger when there is one, otherwise the
    /// bound plain sink, otherwise the default sink.
    pub fn sink(&self) -> Arc<dyn Sink> {
        match self.value::<BoundLogger>() {
            Some(BoundLogger::Context(logger)) => Arc::clone(logger) as Arc<dyn Sink>,
            Some(BoundLogger::Plain(sink)) => Arc::clone(sink),
            None => default_sink(),
        }
    }

    fn context_logger(&self) -> Option<Arc<ContextLogger>> {
        match self.value::<BoundLogger>() {
            Some(BoundLogger::Context(logger)) => Some(Arc::clone(logger)),
            _ => None,
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("values", &self.values.len())
            .field("has_context_logger", &self.context_logger().is_some())
            .finish()
    }
}

/// The context logger for `ctx`.
///
/// If `ctx` already has a context logger bound, that exact instance is
/// returned. Otherwise a new one is built around the context's current sink
/// with a fresh `request_id`. The new logger is *not* bound to `ctx`; use
/// [`attach_to_context`] to propagate it.
pub fn from_context(ctx: &RequestContext) -> Arc<ContextLogger> {
    if let Some(logger) = ctx.context_logger() {
        return logger;
    }

    tracing::trace!("creating context logger");
    Arc::new(ContextLogger::new(ctx.sink()))
}

/// Derive a context with a context logger bound.
///
/// Idempotent: attaching to a context that already has a context logger
/// binds the same instance again.
pub fn attach_to_context(ctx: &RequestContext) -> RequestContext {
    ctx.with_logger(from_context(ctx))
}
