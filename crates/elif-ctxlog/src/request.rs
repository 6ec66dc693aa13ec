//! Bootstrap a logging context from inbound request headers

use std::sync::Arc;

use axum::http::{HeaderMap, Request};
use uuid::Uuid;

use crate::context::{attach_to_context, from_context, RequestContext};
use crate::logger::{ContextLogger, REQUEST_ID};
use crate::value::{FieldValue, Fields};

/// Inbound request identifier header
pub const REQUEST_ID_HEADER: &str = "X-REQUEST-ID";
/// AWS load balancer trace header
pub const AMAZON_TRACE_HEADER: &str = "X-Amzn-Trace-Id";
pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";
pub const USER_AGENT_HEADER: &str = "User-Agent";

pub const AMAZON_TRACE_ID: &str = "amazon_trace_id";
pub const IP_FORWARDED_FOR: &str = "ip_forwarded_for";
pub const USER_AGENT: &str = "user_agent";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Correlation fields carried by a request's headers.
///
/// Missing headers map to empty strings, except the request ID which is
/// generated when absent or empty.
pub fn fields_from_headers(headers: &HeaderMap) -> Fields {
    let request_id = match header_str(headers, REQUEST_ID_HEADER) {
        "" => Uuid::new_v4().to_string(),
        id => id.to_string(),
    };

    let mut fields = Fields::with_capacity(4);
    fields.insert(REQUEST_ID.to_string(), FieldValue::String(request_id));
    fields.insert(
        AMAZON_TRACE_ID.to_string(),
        header_str(headers, AMAZON_TRACE_HEADER).into(),
    );
    fields.insert(
        IP_FORWARDED_FOR.to_string(),
        header_str(headers, FORWARDED_FOR_HEADER).into(),
    );
    fields.insert(
        USER_AGENT.to_string(),
        header_str(headers, USER_AGENT_HEADER).into(),
    );
    fields
}

/// Derive a context for `request` with a context logger bound and the
/// header correlation fields merged in.
///
/// Starts from the context in the request's extensions, if any. The
/// header-derived `request_id` replaces whatever the logger held before.
pub fn bootstrap_from_request<B>(request: &Request<B>) -> RequestContext {
    let ctx = attach_to_context(&RequestContext::from_request(request));
    let logger = from_context(&ctx);
    logger.merge_fields(fields_from_headers(request.headers()));

    tracing::debug!(
        request_id = %logger.request_id(),
        "request logging context bootstrapped"
    );
    ctx
}

/// Bootstrap the request's context and store it back into its extensions.
///
/// Returns the bound logger; handlers further down resolve the same
/// instance through [`RequestContext::from_request`].
pub fn bootstrap_request<B>(request: &mut Request<B>) -> Arc<ContextLogger> {
    let ctx = bootstrap_from_request(request);
    let logger = from_context(&ctx);
    request.extensions_mut().insert(ctx);
    logger
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_fields_from_headers_reads_all_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc-123"));
        headers.insert("x-amzn-trace-id", HeaderValue::from_static("Root=1-67891233"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.4.0"));

        let fields = fields_from_headers(&headers);

        assert_eq!(fields[REQUEST_ID].as_str(), Some("abc-123"));
        assert_eq!(fields[AMAZON_TRACE_ID].as_str(), Some("Root=1-67891233"));
        assert_eq!(fields[IP_FORWARDED_FOR].as_str(), Some("203.0.113.7"));
        assert_eq!(fields[USER_AGENT].as_str(), Some("curl/8.4.0"));
    }

    #[test]
    fn test_fields_from_headers_defaults() {
        let fields = fields_from_headers(&HeaderMap::new());

        let request_id = fields[REQUEST_ID].as_str().unwrap_or_default();
        assert!(Uuid::parse_str(request_id).is_ok());
        assert_eq!(fields[AMAZON_TRACE_ID].as_str(), Some(""));
        assert_eq!(fields[IP_FORWARDED_FOR].as_str(), Some(""));
        assert_eq!(fields[USER_AGENT].as_str(), Some(""));
    }

    #[test]
    fn test_empty_request_id_header_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static(""));

        let fields = fields_from_headers(&headers);
        let request_id = fields[REQUEST_ID].as_str().unwrap_or_default();
        assert!(Uuid::parse_str(request_id).is_ok());
    }

    #[test]
    fn test_non_utf8_header_reads_as_empty() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_bytes(b"agent\xff").unwrap());

        let fields = fields_from_headers(&headers);
        assert_eq!(fields[USER_AGENT].as_str(), Some(""));
    }
}
