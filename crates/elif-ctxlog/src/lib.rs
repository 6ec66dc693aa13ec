//! # elif-ctxlog
//!
//! Request-scoped contextual logging for the elif.rs framework.
//!
//! A [`ContextLogger`] carries a mutable set of fields (starting with a
//! `request_id`) and attaches a snapshot of them, under the `ctx` key, to
//! every message it forwards to the underlying [`Sink`]. One logger is
//! memoized per [`RequestContext`] chain, so fields added anywhere in a
//! request are visible everywhere else in it.
//!
//! ## Quick Start
//!
//! ```rust
//! use elif_ctxlog::{bootstrap_from_request, ctx_info, from_context};
//! use axum::http::Request;
//!
//! let request = Request::builder()
//!     .header("X-REQUEST-ID", "abc-123")
//!     .body(())
//!     .unwrap();
//!
//! let ctx = bootstrap_from_request(&request);
//! let logger = from_context(&ctx);
//! logger.set_field("user", "alice").set_int_field("attempt", 2);
//!
//! assert_eq!(logger.request_id(), "abc-123");
//! ctx_info!(logger, "charged {} cents", 1250);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logger;
pub mod request;
pub mod sink;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{init_logging, LogFormat, LoggingConfig};
pub use context::{attach_to_context, from_context, RequestContext};
pub use error::{ConfigError, CtxLogError, CtxLogResult};
pub use logger::{ContextLogger, SharedFields, CTX_KEY, REQUEST_ID};
pub use request::{
    bootstrap_from_request, bootstrap_request, fields_from_headers, AMAZON_TRACE_HEADER,
    AMAZON_TRACE_ID, FORWARDED_FOR_HEADER, IP_FORWARDED_FOR, REQUEST_ID_HEADER, USER_AGENT,
    USER_AGENT_HEADER,
};
pub use sink::{default_sink, Level, NoopSink, Sink, TracingSink};
pub use value::{FieldValue, Fields};
