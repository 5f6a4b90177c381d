//! Result Decoding Tests
//!
//! Stride-based search decoding, aggregation rows and cursors, hybrid
//! summaries, and the fail-fast behavior on malformed replies.

use sablekv_search::result::{parse_aggregate, parse_hybrid, parse_search};
use sablekv_search::{Reply, ResultShape, ShardLocation};

fn text(s: &str) -> Reply {
    Reply::Text(s.to_string())
}

fn array(items: Vec<Reply>) -> Reply {
    Reply::Array(items)
}

// =============================================================================
// Search Decoding Tests
// =============================================================================

#[test]
fn test_content_only_stride_two() {
    let reply = array(vec![
        Reply::Int(2),
        text("doc:1"),
        array(vec![text("$"), text("{\"a\":1}")]),
        text("doc:2"),
        array(vec![text("$"), text("{\"a\":2}")]),
    ]);
    let result = parse_search(reply, &ResultShape::content_only()).unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.docs.len(), 2);
    // The whole-document root path surfaces under the fixed json key.
    assert_eq!(result.docs[0].get("json"), Some("{\"a\":1}"));
    assert_eq!(result.docs[1].get("json"), Some("{\"a\":2}"));
}

#[test]
fn test_ids_only_stride_one() {
    let reply = array(vec![Reply::Int(3), text("a"), text("b"), text("c")]);
    let result = parse_search(reply, &ResultShape::ids_only()).unwrap();
    assert_eq!(result.total, 3);
    let ids: Vec<&str> = result.docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(result.docs[0].fields.is_empty());
}

#[test]
fn test_full_stride_four() {
    let shape = ResultShape {
        with_scores: true,
        with_payloads: true,
        with_content: true,
    };
    let reply = array(vec![
        Reply::Int(1),
        text("doc:9"),
        text("1.5"),
        text("payload-bytes"),
        array(vec![text("title"), text("Dune"), text("year"), text("1965")]),
    ]);
    let result = parse_search(reply, &shape).unwrap();
    let doc = &result.docs[0];
    assert_eq!(doc.id, "doc:9");
    assert_eq!(doc.score, Some(1.5));
    assert_eq!(doc.payload.as_deref(), Some("payload-bytes"));
    assert_eq!(doc.get("title"), Some("Dune"));
    assert_eq!(doc.get("year"), Some("1965"));
}

#[test]
fn test_nil_payload_and_fields() {
    let shape = ResultShape {
        with_scores: false,
        with_payloads: true,
        with_content: true,
    };
    let reply = array(vec![Reply::Int(1), text("doc:1"), Reply::Nil, Reply::Nil]);
    let result = parse_search(reply, &shape).unwrap();
    assert_eq!(result.docs[0].payload, None);
    assert!(result.docs[0].fields.is_empty());
}

#[test]
fn test_search_reply_missing_total() {
    let err = parse_search(array(vec![]), &ResultShape::ids_only()).unwrap_err();
    assert!(err.to_string().contains("missing total"));
}

#[test]
fn test_search_reply_not_an_array() {
    let err = parse_search(Reply::Int(5), &ResultShape::ids_only()).unwrap_err();
    assert!(err.to_string().contains("expected array"));
}

#[test]
fn test_search_reply_wrong_stride_fails_fast() {
    // Two leaves per hit supplied, but the caller's shape says three.
    let shape = ResultShape {
        with_scores: true,
        with_payloads: false,
        with_content: true,
    };
    let reply = array(vec![
        Reply::Int(2),
        text("doc:1"),
        array(vec![]),
        text("doc:2"),
        array(vec![]),
    ]);
    let err = parse_search(reply, &shape).unwrap_err();
    assert!(err.to_string().contains("not a multiple of stride"));
}

#[test]
fn test_search_field_array_odd_length() {
    let reply = array(vec![
        Reply::Int(1),
        text("doc:1"),
        array(vec![text("title")]),
    ]);
    let err = parse_search(reply, &ResultShape::content_only()).unwrap_err();
    assert!(err.to_string().contains("name/value pairs"));
}

// =============================================================================
// Aggregation Decoding Tests
// =============================================================================

#[test]
fn test_aggregate_rows() {
    let reply = array(vec![
        Reply::Int(2),
        array(vec![text("city"), text("Berlin"), text("count"), text("42")]),
        array(vec![text("city"), text("Paris"), text("count"), text("17")]),
    ]);
    let result = parse_aggregate(reply, false, "idx", None).unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0].get_text("city"), Some("Berlin"));
    assert_eq!(result.rows[1].get_f64("count"), Some(17.0));
    assert!(result.cursor.is_none());
}

#[test]
fn test_aggregate_nested_array_preserved() {
    let nested = array(vec![text("a"), text("b")]);
    let reply = array(vec![
        Reply::Int(1),
        array(vec![text("tags"), nested.clone()]),
    ]);
    let result = parse_aggregate(reply, false, "idx", None).unwrap();
    assert_eq!(result.rows[0].get("tags"), Some(&nested));
}

#[test]
fn test_aggregate_cursor_reply() {
    let shard = ShardLocation {
        shard: "shard-3".to_string(),
        endpoint: "10.0.0.3:7401".to_string(),
    };
    let body = array(vec![
        Reply::Int(10),
        array(vec![text("k"), text("v")]),
    ]);
    let reply = array(vec![body, Reply::Int(99)]);
    let result = parse_aggregate(reply, true, "idx", Some(shard.clone())).unwrap();
    let cursor = result.cursor().unwrap();
    assert_eq!(cursor.cursor_id, 99);
    assert_eq!(cursor.index, "idx");
    assert_eq!(cursor.shard.as_ref(), Some(&shard));
}

#[test]
fn test_aggregate_cursor_zero_means_exhausted() {
    let body = array(vec![Reply::Int(0)]);
    let reply = array(vec![body, Reply::Int(0)]);
    let result = parse_aggregate(reply, true, "idx", None).unwrap();
    assert!(result.cursor.is_none());
}

#[test]
fn test_cursor_accessor_on_non_cursor_result() {
    let reply = array(vec![Reply::Int(0)]);
    let result = parse_aggregate(reply, false, "idx", None).unwrap();
    let err = result.cursor().unwrap_err();
    assert!(err.to_string().contains("no cursor"));
}

#[test]
fn test_aggregate_cursor_reply_wrong_arity() {
    let reply = array(vec![array(vec![Reply::Int(0)])]);
    let err = parse_aggregate(reply, true, "idx", None).unwrap_err();
    assert!(err.to_string().contains("expected body and cursor id"));
}

#[test]
fn test_aggregate_row_odd_length() {
    let reply = array(vec![Reply::Int(1), array(vec![text("dangling")])]);
    let err = parse_aggregate(reply, false, "idx", None).unwrap_err();
    assert!(err.to_string().contains("key/value pairs"));
}

#[test]
fn test_aggregate_reply_missing_total() {
    let err = parse_aggregate(array(vec![]), false, "idx", None).unwrap_err();
    assert!(err.to_string().contains("missing total"));
}

// =============================================================================
// Hybrid Decoding Tests
// =============================================================================

#[test]
fn test_hybrid_reply_full() {
    let reply = array(vec![
        text("total_results"),
        Reply::Int(2),
        text("execution_time"),
        text("1.25"),
        text("warnings"),
        array(vec![text("vector index cold")]),
        text("results"),
        array(vec![
            array(vec![
                text("id"),
                text("doc:1"),
                text("rank"),
                Reply::Int(1),
                text("tags"),
                array(vec![text("x")]),
            ]),
            array(vec![text("id"), text("doc:2")]),
        ]),
    ]);
    let result = parse_hybrid(reply).unwrap();
    assert_eq!(result.total_results, 2);
    assert_eq!(result.execution_time, Some(1.25));
    assert_eq!(result.warnings, vec!["vector index cold"]);
    assert_eq!(result.rows.len(), 2);

    // Text leaves coerce to text, integer leaves to numbers, anything
    // else passes through opaque.
    use sablekv_search::HybridValue;
    assert_eq!(result.rows[0].get_text("id"), Some("doc:1"));
    assert_eq!(result.rows[0].get("rank"), Some(&HybridValue::Num(1)));
    assert!(matches!(
        result.rows[0].get("tags"),
        Some(HybridValue::Other(_))
    ));
}

#[test]
fn test_hybrid_reply_skips_unknown_keys() {
    let reply = array(vec![
        text("debug_info"),
        array(vec![text("whatever")]),
        text("total_results"),
        Reply::Int(3),
    ]);
    let result = parse_hybrid(reply).unwrap();
    assert_eq!(result.total_results, 3);
    assert!(result.rows.is_empty());
}

#[test]
fn test_hybrid_reply_missing_total_results() {
    let reply = array(vec![text("results"), array(vec![])]);
    let err = parse_hybrid(reply).unwrap_err();
    assert!(err.to_string().contains("total_results"));
}

#[test]
fn test_hybrid_reply_dangling_key() {
    let reply = array(vec![text("total_results")]);
    let err = parse_hybrid(reply).unwrap_err();
    assert!(err.to_string().contains("key/value pairs"));
}

#[test]
fn test_hybrid_row_odd_length() {
    let reply = array(vec![
        text("total_results"),
        Reply::Int(1),
        text("results"),
        array(vec![array(vec![text("id")])]),
    ]);
    let err = parse_hybrid(reply).unwrap_err();
    assert!(err.to_string().contains("key/value pairs"));
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_decoded_document_serializes() {
    let reply = array(vec![
        Reply::Int(1),
        text("doc:1"),
        array(vec![text("$"), text("{}")]),
    ]);
    let result = parse_search(reply, &ResultShape::content_only()).unwrap();
    let value = serde_json::to_value(&result.docs[0]).unwrap();
    assert_eq!(value["id"], "doc:1");
}
