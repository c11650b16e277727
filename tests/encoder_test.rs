mod common;

use telemetry_sender::domain::{
    AttributeValue, Attributes, Event, EventBatch, Metric, MetricBatch, Span, SpanBatch,
    TelemetryBatch,
};
use telemetry_sender::encoder::EncodingError;

fn encode_str<B: TelemetryBatch>(batch: &B) -> String {
    String::from_utf8(batch.encode().unwrap().to_vec()).unwrap()
}

#[test]
fn gauge_with_common_attributes_matches_wire_format() {
    let gauge = Metric::gauge("gauge", 3.0, 555, Attributes::new());
    let batch = MetricBatch::new(vec![gauge], Attributes::new().with("key", "val"));

    assert_eq!(
        encode_str(&batch),
        r#"{"common":{"attributes":{"key":"val"}},"metrics":[{"name":"gauge","type":"gauge","value":3.0,"timestamp":555}]}"#
    );
}

#[test]
fn encoding_is_deterministic() {
    let attributes = Attributes::new()
        .with("host", "web-1")
        .with("cpu", 4_i64)
        .with("idle", false);
    let batch = MetricBatch::new(
        vec![Metric::gauge("load", 0.7, 1000, attributes)],
        Attributes::new().with("region", "eu"),
    );

    assert_eq!(batch.encode().unwrap(), batch.encode().unwrap());
}

#[test]
fn attribute_order_follows_insertion_and_last_write_wins() {
    let attributes = Attributes::new()
        .with("b", 1_i64)
        .with("a", 2_i64)
        .with("b", 9_i64);
    let batch = MetricBatch::new(
        vec![Metric::gauge("g", 1.0, 1, attributes)],
        Attributes::new(),
    );

    assert_eq!(
        encode_str(&batch),
        r#"{"metrics":[{"name":"g","type":"gauge","value":1.0,"timestamp":1,"attributes":{"b":9,"a":2}}]}"#
    );
}

#[test]
fn empty_batch_still_emits_empty_telemetry_array() {
    let batch = MetricBatch::new(Vec::new(), Attributes::new());
    assert_eq!(encode_str(&batch), r#"{"metrics":[]}"#);

    let with_common = MetricBatch::new(Vec::new(), Attributes::new().with("k", "v"));
    assert_eq!(
        encode_str(&with_common),
        r#"{"common":{"attributes":{"k":"v"}},"metrics":[]}"#
    );
}

#[test]
fn common_block_omitted_when_nothing_to_hoist() {
    let batch = SpanBatch::new(
        vec![Span::new("s1", "op", 10, 1.5).with_trace_id("t1")],
        Attributes::new(),
    );

    assert_eq!(
        encode_str(&batch),
        r#"{"spans":[{"id":"s1","trace.id":"t1","name":"op","timestamp":10,"duration.ms":1.5,"attributes":{}}]}"#
    );
}

#[test]
fn span_common_block_orders_trace_id_before_attributes() {
    let batch = SpanBatch::with_trace_id(
        vec![Span::new("s1", "op", 100, 12.5)],
        Attributes::new().with("service", "api"),
        "trace-1",
    );

    assert_eq!(
        encode_str(&batch),
        r#"{"common":{"traceId":"trace-1","attributes":{"service":"api"}},"spans":[{"id":"s1","name":"op","timestamp":100,"duration.ms":12.5,"attributes":{}}]}"#
    );
}

#[test]
fn span_common_block_with_trace_id_only() {
    let batch = SpanBatch::with_trace_id(
        vec![Span::new("s1", "op", 100, 1.0)],
        Attributes::new(),
        "trace-9",
    );

    assert!(encode_str(&batch).starts_with(r#"{"common":{"traceId":"trace-9"},"spans":"#));
}

#[test]
fn span_own_trace_id_renders_even_under_shared_id() {
    let spans = vec![
        Span::new("s1", "op", 1, 1.0),
        Span::new("s2", "op", 2, 1.0).with_trace_id("other-trace"),
    ];
    let batch = SpanBatch::with_trace_id(spans, Attributes::new(), "trace-1");
    let encoded = encode_str(&batch);

    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert!(value["spans"][0].get("trace.id").is_none());
    assert_eq!(value["spans"][1]["trace.id"], "other-trace");
}

#[test]
fn span_renders_parent_id_when_present() {
    let span = Span::new("child", "op", 5, 2.0)
        .with_trace_id("t")
        .with_parent_id("root");
    let batch = SpanBatch::new(vec![span], Attributes::new());

    assert_eq!(
        encode_str(&batch),
        r#"{"spans":[{"id":"child","trace.id":"t","parent.id":"root","name":"op","timestamp":5,"duration.ms":2.0,"attributes":{}}]}"#
    );
}

#[test]
fn event_renders_attributes_object_even_when_empty() {
    let batch = EventBatch::new(vec![Event::new("login", 42)], Attributes::new());

    assert_eq!(
        encode_str(&batch),
        r#"{"events":[{"eventType":"login","timestamp":42,"attributes":{}}]}"#
    );
}

#[test]
fn count_and_summary_render_interval() {
    let count = Metric::count("requests", 12.0, 100, Attributes::new()).with_interval_ms(5000);
    let summary = Metric::summary("latency", 3, 6.0, 1.0, 3.0, 100, Attributes::new())
        .with_interval_ms(5000);
    let batch = MetricBatch::new(vec![count, summary], Attributes::new());

    assert_eq!(
        encode_str(&batch),
        concat!(
            r#"{"metrics":["#,
            r#"{"name":"requests","type":"count","value":12.0,"timestamp":100,"interval.ms":5000},"#,
            r#"{"name":"latency","type":"summary","value":{"count":3,"sum":6.0,"min":1.0,"max":3.0},"timestamp":100,"interval.ms":5000}"#,
            r#"]}"#
        )
    );
}

#[test]
fn count_without_interval_omits_the_key() {
    let batch = MetricBatch::new(
        vec![Metric::count("c", 1.0, 7, Attributes::new())],
        Attributes::new(),
    );

    assert_eq!(
        encode_str(&batch),
        r#"{"metrics":[{"name":"c","type":"count","value":1.0,"timestamp":7}]}"#
    );
}

#[test]
fn numeric_edge_values_keep_precision() {
    let attributes = Attributes::new()
        .with("zero", 0_i64)
        .with("negative", -42_i64)
        .with("huge", u64::MAX)
        .with("tiny", 0.1_f64);
    let batch = MetricBatch::new(
        vec![Metric::gauge("g", -273.15, 0, attributes)],
        Attributes::new(),
    );

    let encoded = encode_str(&batch);
    assert!(encoded.contains(r#""zero":0"#));
    assert!(encoded.contains(r#""negative":-42"#));
    assert!(encoded.contains(r#""huge":18446744073709551615"#));
    assert!(encoded.contains(r#""tiny":0.1"#));
    assert!(encoded.contains(r#""value":-273.15,"timestamp":0"#));
}

#[test]
fn string_values_are_escaped() {
    let attributes = Attributes::new().with("note", "say \"hi\"\n");
    let batch = MetricBatch::new(
        vec![Metric::gauge("quote\"d", 1.0, 1, attributes)],
        Attributes::new(),
    );
    let encoded = encode_str(&batch);

    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value["metrics"][0]["name"], "quote\"d");
    assert_eq!(value["metrics"][0]["attributes"]["note"], "say \"hi\"\n");
}

#[test]
fn attribute_value_conversions_cover_all_types() {
    let attributes = Attributes::new()
        .with("s", "text")
        .with("b", true)
        .with("i", -1_i64)
        .with("u", 1_u64)
        .with("f", 1.5_f64);

    assert_eq!(attributes.len(), 5);
    assert_eq!(attributes.get("b"), Some(&AttributeValue::Bool(true)));
    assert_eq!(attributes.get("missing"), None);
}

#[test]
fn empty_metric_name_fails_encoding() {
    let batch = MetricBatch::new(
        vec![Metric::gauge("", 1.0, 1, Attributes::new())],
        Attributes::new(),
    );
    assert!(matches!(
        batch.encode(),
        Err(EncodingError::EmptyMetricName)
    ));
}

#[test]
fn non_finite_metric_value_fails_encoding() {
    let batch = MetricBatch::new(
        vec![Metric::gauge("g", f64::NAN, 1, Attributes::new())],
        Attributes::new(),
    );
    assert!(matches!(
        batch.encode(),
        Err(EncodingError::NonFiniteValue { .. })
    ));
}

#[test]
fn span_without_any_trace_id_fails_encoding() {
    let batch = SpanBatch::new(vec![Span::new("s1", "op", 1, 1.0)], Attributes::new());
    assert!(matches!(
        batch.encode(),
        Err(EncodingError::MissingTraceId { .. })
    ));
}

#[test]
fn span_as_its_own_parent_fails_encoding() {
    let span = Span::new("s1", "op", 1, 1.0)
        .with_trace_id("t")
        .with_parent_id("s1");
    let batch = SpanBatch::new(vec![span], Attributes::new());
    assert!(matches!(
        batch.encode(),
        Err(EncodingError::SelfParent { .. })
    ));
}

#[test]
fn empty_span_id_fails_encoding() {
    let batch = SpanBatch::new(
        vec![Span::new("", "op", 1, 1.0).with_trace_id("t")],
        Attributes::new(),
    );
    assert!(matches!(batch.encode(), Err(EncodingError::EmptySpanId)));
}

#[test]
fn empty_event_type_fails_encoding() {
    let batch = EventBatch::new(vec![Event::new("", 1)], Attributes::new());
    assert!(matches!(batch.encode(), Err(EncodingError::EmptyEventType)));
}

#[test]
fn split_halves_preserve_entities_and_common_block() {
    let batch = common::metric_batch_of(5);
    let (left, right) = batch.split();

    assert_eq!(left.len(), 2);
    assert_eq!(right.len(), 3);
    assert_eq!(left.metrics()[0].name(), "m0");
    assert_eq!(right.metrics()[0].name(), "m2");
    assert_eq!(left.len() + right.len(), batch.len());
}
