//! End-to-end tests for request bootstrap, logger resolution and emission

use std::sync::Arc;

use axum::http::Request;
use elif_ctxlog::testing::RecordingSink;
use elif_ctxlog::{
    attach_to_context, bootstrap_from_request, bootstrap_request, ctx_debug, ctx_warn, fields,
    from_context, FieldValue, Fields, Level, RequestContext, CTX_KEY, REQUEST_ID,
};
use uuid::Uuid;

fn test_request(sink: &RecordingSink) -> Request<()> {
    let mut request = Request::builder()
        .method("GET")
        .uri("http://foo")
        .header("X-REQUEST-ID", "my-test-request-ID")
        .header("User-Agent", "elif-tests/1.0")
        .body(())
        .unwrap();
    request
        .extensions_mut()
        .insert(RequestContext::new().with_sink(Arc::new(sink.clone())));
    request
}

fn ctx_of(fields: &Fields) -> Fields {
    fields
        .get(CTX_KEY)
        .and_then(FieldValue::as_map)
        .cloned()
        .unwrap_or_default()
}

#[test]
fn test_resolves_same_logger() {
    let sink = RecordingSink::new();
    let ctx = bootstrap_from_request(&test_request(&sink));

    from_context(&ctx).set_field("hello", "world");

    let first = from_context(&ctx);
    let second = from_context(&ctx);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.field("hello"), Some(FieldValue::from("world")));
}

#[test]
fn test_bootstrap_uses_request_id_header() {
    let sink = RecordingSink::new();
    let ctx = bootstrap_from_request(&test_request(&sink));
    let logger = from_context(&ctx);

    assert_eq!(logger.request_id(), "my-test-request-ID");
    assert_eq!(logger.field("user_agent"), Some(FieldValue::from("elif-tests/1.0")));
    assert_eq!(logger.field("amazon_trace_id"), Some(FieldValue::from("")));
    assert_eq!(logger.field("ip_forwarded_for"), Some(FieldValue::from("")));
}

#[test]
fn test_bootstrap_generates_request_id() {
    let request = Request::builder().uri("/health").body(()).unwrap();
    let logger = from_context(&bootstrap_from_request(&request));

    let id = logger.request_id();
    assert!(Uuid::parse_str(&id).is_ok());
    assert_eq!(logger.request_id(), id);
}

#[test]
fn test_bootstrap_replaces_existing_request_id() {
    let sink = RecordingSink::new();
    let mut request = test_request(&sink);
    let earlier = attach_to_context(&RequestContext::from_request(&request));
    let earlier_id = from_context(&earlier).request_id();
    request.extensions_mut().insert(earlier.clone());

    let ctx = bootstrap_from_request(&request);

    // same logger instance, but the header value won
    assert!(Arc::ptr_eq(&from_context(&earlier), &from_context(&ctx)));
    assert_ne!(earlier_id, "my-test-request-ID");
    assert_eq!(from_context(&earlier).request_id(), "my-test-request-ID");
}

#[test]
fn test_bootstrap_request_stores_context_in_extensions() {
    let sink = RecordingSink::new();
    let mut request = test_request(&sink);

    let logger = bootstrap_request(&mut request);
    let downstream = from_context(&RequestContext::from_request(&request));

    assert!(Arc::ptr_eq(&logger, &downstream));
}

#[test]
fn test_set_field_changes_the_logger_in_context() {
    let sink = RecordingSink::new();
    let ctx = bootstrap_from_request(&test_request(&sink));

    from_context(&ctx).merge_fields(fields! { "foo" => "bar" });

    assert_eq!(from_context(&ctx).field("foo"), Some(FieldValue::from("bar")));
}

struct LogCase {
    name: &'static str,
    log_call: fn(&RequestContext),
    expected_sub_fields: Vec<Fields>,
    expected_emission: (Level, &'static str),
    additional_ctx_fields: Fields,
}

#[test]
fn test_ctx_logger_emissions() {
    let cases = vec![
        LogCase {
            name: "log error",
            log_call: |ctx| from_context(ctx).errorf(format_args!("error: {}", 42)),
            expected_sub_fields: vec![],
            expected_emission: (Level::Error, "error: 42"),
            additional_ctx_fields: Fields::new(),
        },
        LogCase {
            name: "log info with sub logger",
            log_call: |ctx| {
                from_context(ctx)
                    .derive_sub_logger(fields! { "foo" => "bar" })
                    .infof(format_args!("info: {}", 42))
            },
            expected_sub_fields: vec![fields! { "foo" => "bar" }],
            expected_emission: (Level::Info, "info: 42"),
            additional_ctx_fields: Fields::new(),
        },
        LogCase {
            name: "log debug with set_field",
            log_call: |ctx| {
                ctx_debug!(
                    from_context(ctx).set_field("hello", "world"),
                    "debug: {}",
                    42
                )
            },
            expected_sub_fields: vec![],
            expected_emission: (Level::Debug, "debug: 42"),
            additional_ctx_fields: fields! { "hello" => "world" },
        },
        LogCase {
            name: "log fatal with set_int_field",
            log_call: |ctx| {
                from_context(ctx)
                    .set_int_field("my_key_int", 42)
                    .fatalf(format_args!("fatal: {}", 42))
            },
            expected_sub_fields: vec![],
            expected_emission: (Level::Fatal, "fatal: 42"),
            additional_ctx_fields: fields! { "my_key_int" => "42" },
        },
        LogCase {
            name: "log panic with set_int_field and set_field",
            log_call: |ctx| {
                from_context(ctx)
                    .set_int_field("my_key_int", 42)
                    .set_field("hello", "world")
                    .panicf(format_args!("paniek: {}", 42))
            },
            expected_sub_fields: vec![],
            expected_emission: (Level::Panic, "paniek: 42"),
            additional_ctx_fields: fields! { "my_key_int" => "42", "hello" => "world" },
        },
        LogCase {
            name: "log warn with merge_fields",
            log_call: |ctx| {
                let fields = fields! { "val_1" => 42, "val_2" => "hello world" };
                ctx_warn!(from_context(ctx).merge_fields(fields), "warn: {}", 42)
            },
            expected_sub_fields: vec![],
            expected_emission: (Level::Warn, "warn: 42"),
            additional_ctx_fields: fields! { "val_1" => 42, "val_2" => "hello world" },
        },
    ];

    for case in cases {
        let sink = RecordingSink::new();
        let ctx = bootstrap_from_request(&test_request(&sink));

        (case.log_call)(&ctx);

        let sub_calls = sink.sub_calls();
        assert_eq!(
            sub_calls.len(),
            case.expected_sub_fields.len() + 1,
            "{}: unexpected number of sub calls",
            case.name
        );
        assert_eq!(
            &sub_calls[..case.expected_sub_fields.len()],
            case.expected_sub_fields.as_slice(),
            "{}",
            case.name
        );

        let envelope = &sub_calls[sub_calls.len() - 1];
        assert_eq!(envelope.len(), 1, "{}: envelope carries only ctx", case.name);
        let ctx_fields = ctx_of(envelope);
        assert_eq!(
            ctx_fields.get(REQUEST_ID),
            Some(&FieldValue::from(from_context(&ctx).request_id())),
            "{}",
            case.name
        );
        for (key, value) in &case.additional_ctx_fields {
            assert_eq!(ctx_fields.get(key), Some(value), "{}: field {}", case.name, key);
        }

        let (level, message) = case.expected_emission;
        assert_eq!(
            sink.emissions(),
            vec![(level, message.to_string())],
            "{}",
            case.name
        );
    }
}

#[test]
fn test_leveled_log_ignores_trace() {
    let sink = RecordingSink::new();
    let ctx = bootstrap_from_request(&test_request(&sink));

    from_context(&ctx).log(Level::Trace, format_args!("dropped"));

    assert!(sink.emissions().is_empty());
}

#[tokio::test]
async fn test_fields_set_in_spawned_task_are_visible_to_caller() {
    let sink = RecordingSink::new();
    let ctx = bootstrap_from_request(&test_request(&sink));

    let task_ctx = ctx.clone();
    tokio::spawn(async move {
        from_context(&task_ctx).set_field("order_id", "o-991");
    })
    .await
    .unwrap();

    from_context(&ctx).info("order placed");

    let envelope = sink.sub_calls().pop().unwrap_or_default();
    assert_eq!(ctx_of(&envelope).get("order_id"), Some(&FieldValue::from("o-991")));
}
