//! Search Query Tests
//!
//! Clause emission order, default suppression, build-time validation,
//! and the token-count invariant across optional-clause combinations.

use sablekv_search::{
    Arg, DialectSupport, NumericFilter, ResultShape, Scorer, SearchQuery, SortOrder,
};

fn text(s: &str) -> Arg {
    Arg::Text(s.to_string())
}

// =============================================================================
// Basic Emission Tests
// =============================================================================

#[test]
fn test_minimal_query() {
    let mut query = SearchQuery::new("books", "@title:dune");
    assert_eq!(
        query.build_args().unwrap(),
        vec![text("SEARCH.QUERY"), text("books"), text("@title:dune")]
    );
}

#[test]
fn test_full_clause_order() {
    let mut query = SearchQuery::new("books", "dune");
    query
        .no_content()
        .verbatim()
        .with_scores()
        .with_payloads()
        .scorer(Scorer::Bm25Std)
        .in_fields(["title", "subtitle"])
        .return_fields(["title"])
        .sort_by("year", SortOrder::Desc)
        .filter(NumericFilter::new("year").min(1960.0).max(1970.0))
        .limit(10, 20)
        .param("p", 5i64)
        .explain_score()
        .timeout(500);
    query.set_dialect(2);
    assert_eq!(
        query.build_args().unwrap(),
        vec![
            text("SEARCH.QUERY"),
            text("books"),
            text("dune"),
            text("NOCONTENT"),
            text("VERBATIM"),
            text("WITHSCORES"),
            text("WITHPAYLOADS"),
            text("SCORER"),
            text("BM25STD"),
            text("INFIELDS"),
            Arg::Int(2),
            text("title"),
            text("subtitle"),
            text("RETURN"),
            Arg::Int(1),
            text("title"),
            text("SORTBY"),
            text("year"),
            text("DESC"),
            text("FILTER"),
            text("year"),
            Arg::Float(1960.0),
            Arg::Float(1970.0),
            text("LIMIT"),
            Arg::Int(10),
            Arg::Int(20),
            text("PARAMS"),
            Arg::Int(2),
            text("p"),
            Arg::Int(5),
            text("EXPLAINSCORE"),
            text("TIMEOUT"),
            Arg::Int(500),
            text("DIALECT"),
            Arg::Int(2),
        ]
    );
}

// =============================================================================
// Scorer Emission Tests
// =============================================================================

#[test]
fn test_scorer_tanh_default_factor_suppressed() {
    let mut query = SearchQuery::new("idx", "*");
    query.scorer(Scorer::bm25_tanh(4.0));
    let args = query.build_args().unwrap();
    assert!(args.contains(&text("BM25STD.TANH")));
    assert!(!args.contains(&text("FACTOR")));
}

#[test]
fn test_scorer_tanh_custom_factor_emitted() {
    let mut query = SearchQuery::new("idx", "*");
    query.scorer(Scorer::bm25_tanh(8.0));
    let args = query.build_args().unwrap();
    let pos = args
        .iter()
        .position(|a| *a == text("BM25STD.TANH"))
        .unwrap();
    assert_eq!(args[pos + 1], text("FACTOR"));
    assert_eq!(args[pos + 2], Arg::Float(8.0));
}

#[test]
fn test_scorer_default_instances() {
    assert_eq!(Scorer::bm25_tanh(4.0), Scorer::BM25_STD_TANH_DEFAULT);
    assert_eq!(Scorer::DocScore.wire_name(), "DOCSCORE");
    assert_eq!(Scorer::Hamming.wire_name(), "HAMMING");
    assert_eq!(Scorer::DisMax.wire_name(), "DISMAX");
    assert_eq!(Scorer::TfIdfDocNorm.wire_name(), "TFIDF.DOCNORM");
}

// =============================================================================
// Filter Validation Tests
// =============================================================================

#[test]
fn test_filter_upper_without_lower_rejected() {
    let mut query = SearchQuery::new("idx", "*");
    query.filter(NumericFilter::new("price").max(100.0));
    let err = query.build_args().unwrap_err();
    assert!(err.to_string().contains("upper bound but no lower bound"));
}

#[test]
fn test_filter_without_bounds_rejected() {
    let mut query = SearchQuery::new("idx", "*");
    query.filter(NumericFilter::new("price"));
    let err = query.build_args().unwrap_err();
    assert!(err.to_string().contains("no bounds"));
}

#[test]
fn test_filter_lower_only_open_above() {
    let mut query = SearchQuery::new("idx", "*");
    query.filter(NumericFilter::new("price").min(10.0));
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("FILTER")).unwrap();
    assert_eq!(args[pos + 2], Arg::Float(10.0));
    assert_eq!(args[pos + 3], text("+inf"));
}

#[test]
fn test_filter_exclusive_bounds() {
    let mut query = SearchQuery::new("idx", "*");
    query.filter(
        NumericFilter::new("price")
            .min_exclusive(10.0)
            .max_exclusive(20.0),
    );
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("FILTER")).unwrap();
    assert_eq!(args[pos + 2], text("(10"));
    assert_eq!(args[pos + 3], text("(20"));
}

// =============================================================================
// Variadic Validation Tests
// =============================================================================

#[test]
fn test_empty_in_fields_rejected() {
    let mut query = SearchQuery::new("idx", "*");
    query.in_fields(Vec::<String>::new());
    let err = query.build_args().unwrap_err();
    assert!(err.to_string().contains("INFIELDS"));
}

#[test]
fn test_empty_return_fields_rejected() {
    let mut query = SearchQuery::new("idx", "*");
    query.return_fields(Vec::<String>::new());
    let err = query.build_args().unwrap_err();
    assert!(err.to_string().contains("RETURN"));
}

// =============================================================================
// Freezing / Idempotence Tests
// =============================================================================

#[test]
fn test_serialization_idempotent() {
    let mut query = SearchQuery::new("idx", "hello");
    query.with_scores().limit(0, 10);
    let first = query.build_args().unwrap();
    let second = query.build_args().unwrap();
    assert_eq!(first, second);
}

#[test]
#[should_panic(expected = "already serialized")]
fn test_mutation_after_build_panics() {
    let mut query = SearchQuery::new("idx", "hello");
    query.build_args().unwrap();
    query.with_scores();
}

// =============================================================================
// Result Shape Tests
// =============================================================================

#[test]
fn test_result_shape_follows_flags() {
    let query = SearchQuery::new("idx", "*");
    assert_eq!(query.result_shape(), ResultShape::content_only());
    assert_eq!(query.result_shape().stride(), 2);

    let mut query = SearchQuery::new("idx", "*");
    query.no_content();
    assert_eq!(query.result_shape(), ResultShape::ids_only());
    assert_eq!(query.result_shape().stride(), 1);

    let mut query = SearchQuery::new("idx", "*");
    query.with_scores().with_payloads();
    assert_eq!(query.result_shape().stride(), 4);
}

// =============================================================================
// Count Invariant Tests
// =============================================================================

#[test]
fn test_count_invariant_all_clause_combinations() {
    // build_args cross-checks prediction against emission internally;
    // exercising every combination here catches any drift between the
    // two bookkeeping paths.
    for bits in 0u32..(1 << 10) {
        let mut query = SearchQuery::new("idx", "q");
        if bits & 1 != 0 {
            query.no_content();
        }
        if bits & 2 != 0 {
            query.with_scores();
        }
        if bits & 4 != 0 {
            query.with_payloads();
        }
        if bits & 8 != 0 {
            query.scorer(Scorer::bm25_tanh(9.0));
        }
        if bits & 16 != 0 {
            query.in_fields(["a", "b"]);
        }
        if bits & 32 != 0 {
            query.sort_by("a", SortOrder::Asc);
        }
        if bits & 64 != 0 {
            query.filter(NumericFilter::new("n").min(1.0));
        }
        if bits & 128 != 0 {
            query.limit(0, 10);
        }
        if bits & 256 != 0 {
            query.param("k", "v").vector_param("vec", &[1.0, 2.0]);
        }
        if bits & 512 != 0 {
            query.timeout(100);
            query.set_dialect(3);
        }
        query.build_args().unwrap();
    }
}
