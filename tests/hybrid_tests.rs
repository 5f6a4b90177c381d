//! Hybrid Query Tests
//!
//! Two-leg emission, fusion-strategy parameters with the window
//! fallback, vector-method variants, and vector wire encoding.

use bytes::Bytes;
use sablekv_search::options::encode_dense;
use sablekv_search::{
    Arg, Combiner, DialectSupport, HybridQuery, SortOrder, VectorInput, VectorMethod,
};

fn text(s: &str) -> Arg {
    Arg::Text(s.to_string())
}

fn param_query() -> HybridQuery {
    HybridQuery::new("docs", "hello", "embedding", VectorInput::Param("vec".into()))
}

// =============================================================================
// Basic Emission Tests
// =============================================================================

#[test]
fn test_minimal_hybrid_query() {
    let mut query = param_query();
    assert_eq!(
        query.build_args().unwrap(),
        vec![
            text("SEARCH.HYBRID"),
            text("docs"),
            text("SEARCH"),
            text("hello"),
            text("VSIM"),
            text("@embedding"),
            text("$vec"),
        ]
    );
}

#[test]
fn test_vector_field_already_prefixed() {
    let mut query =
        HybridQuery::new("docs", "hi", "@embedding", VectorInput::Param("v".into()));
    let args = query.build_args().unwrap();
    assert_eq!(args[5], text("@embedding"));
}

#[test]
fn test_full_clause_order() {
    let mut query = param_query();
    query
        .scorer(sablekv_search::Scorer::TfIdf)
        .method(VectorMethod::knn(10))
        .combine(Combiner::rrf(Some(30), Some(60)))
        .load(["@title"])
        .apply("@score * 2", "boosted")
        .sort_by([("@boosted", SortOrder::Desc)])
        .filter("@boosted > 0")
        .limit(0, 10)
        .param("vec", "placeholder")
        .timeout(250);
    query.set_dialect(2);
    assert_eq!(
        query.build_args().unwrap(),
        vec![
            text("SEARCH.HYBRID"),
            text("docs"),
            text("SEARCH"),
            text("hello"),
            text("SCORER"),
            text("TFIDF"),
            text("VSIM"),
            text("@embedding"),
            text("$vec"),
            text("KNN"),
            Arg::Int(2),
            text("K"),
            Arg::Int(10),
            text("COMBINE"),
            text("RRF"),
            Arg::Int(4),
            text("K"),
            Arg::Int(60),
            text("WINDOW"),
            Arg::Int(30),
            text("LOAD"),
            Arg::Int(1),
            text("@title"),
            text("APPLY"),
            text("@score * 2"),
            text("AS"),
            text("boosted"),
            text("SORTBY"),
            Arg::Int(2),
            text("@boosted"),
            text("DESC"),
            text("FILTER"),
            text("@boosted > 0"),
            text("LIMIT"),
            Arg::Int(0),
            Arg::Int(10),
            text("PARAMS"),
            Arg::Int(2),
            text("vec"),
            text("placeholder"),
            text("TIMEOUT"),
            Arg::Int(250),
            text("DIALECT"),
            Arg::Int(2),
        ]
    );
}

// =============================================================================
// Fusion Strategy Tests
// =============================================================================

#[test]
fn test_rrf_window_falls_back_to_page_size() {
    let mut query = param_query();
    query.combine(Combiner::RRF_DEFAULT).limit(0, 50);
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("WINDOW")).unwrap();
    assert_eq!(args[pos + 1], Arg::Int(50));
}

#[test]
fn test_rrf_window_fixed_default_without_limit() {
    let mut query = param_query();
    query.combine(Combiner::rrf(None, None));
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("WINDOW")).unwrap();
    assert_eq!(args[pos + 1], Arg::Int(20));
}

#[test]
fn test_rrf_explicit_window_wins_over_limit() {
    let mut query = param_query();
    query.combine(Combiner::rrf(Some(7), None)).limit(0, 50);
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("WINDOW")).unwrap();
    assert_eq!(args[pos + 1], Arg::Int(7));
}

#[test]
fn test_linear_combiner_window_optional() {
    let mut query = param_query();
    query.combine(Combiner::linear(0.7, 0.3, None)).limit(0, 50);
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("COMBINE")).unwrap();
    assert_eq!(
        args[pos..pos + 7].to_vec(),
        vec![
            text("COMBINE"),
            text("LINEAR"),
            Arg::Int(4),
            text("ALPHA"),
            Arg::Float(0.7),
            text("BETA"),
            Arg::Float(0.3),
        ]
    );
    // Unlike RRF, linear fusion has no window fallback.
    assert!(!args.contains(&text("WINDOW")));
}

#[test]
fn test_linear_combiner_with_window() {
    let mut query = param_query();
    query.combine(Combiner::linear(0.5, 0.5, Some(12)));
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("LINEAR")).unwrap();
    assert_eq!(args[pos + 1], Arg::Int(6));
    let wpos = args.iter().position(|a| *a == text("WINDOW")).unwrap();
    assert_eq!(args[wpos + 1], Arg::Int(12));
}

#[test]
fn test_rrf_default_instance_shared() {
    assert_eq!(Combiner::rrf(None, None), Combiner::RRF_DEFAULT);
}

// =============================================================================
// Vector Method Tests
// =============================================================================

#[test]
fn test_knn_default_instance() {
    assert_eq!(VectorMethod::knn(10), VectorMethod::KNN_DEFAULT);
}

#[test]
fn test_knn_with_all_options() {
    let mut query = param_query();
    query.method(VectorMethod::Knn {
        k: 25,
        ef_runtime: Some(80),
        yield_score_as: Some("dist".to_string()),
    });
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("KNN")).unwrap();
    assert_eq!(
        args[pos..pos + 8].to_vec(),
        vec![
            text("KNN"),
            Arg::Int(6),
            text("K"),
            Arg::Int(25),
            text("EF_RUNTIME"),
            Arg::Int(80),
            text("YIELD_SCORE_AS"),
            text("dist"),
        ]
    );
}

#[test]
fn test_range_method() {
    let mut query = param_query();
    query.method(VectorMethod::Range {
        radius: 0.25,
        epsilon: Some(0.01),
        yield_score_as: None,
    });
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("RANGE")).unwrap();
    assert_eq!(
        args[pos..pos + 6].to_vec(),
        vec![
            text("RANGE"),
            Arg::Int(4),
            text("RADIUS"),
            Arg::Float(0.25),
            text("EPSILON"),
            Arg::Float(0.01),
        ]
    );
}

// =============================================================================
// Vector Encoding Tests
// =============================================================================

#[test]
fn test_dense_vector_encodes_little_endian_base64() {
    // 1.0f32 -> 00 00 80 3f, 2.0f32 -> 00 00 00 40, regardless of host
    // byte order.
    assert_eq!(encode_dense(&[1.0, 2.0]), "AACAPwAAAEA=");
}

#[test]
fn test_dense_vector_token_in_query() {
    let mut query = HybridQuery::new("idx", "*", "v", VectorInput::Dense(vec![1.0, 2.0]));
    let args = query.build_args().unwrap();
    assert_eq!(args[6], text("AACAPwAAAEA="));
}

#[test]
fn test_raw_vector_passes_through() {
    let raw = Bytes::from_static(&[0x00, 0x01, 0xFF]);
    let mut query = HybridQuery::new("idx", "*", "v", VectorInput::Raw(raw.clone()));
    let args = query.build_args().unwrap();
    assert_eq!(args[6], Arg::Bytes(raw));
}

#[test]
fn test_vector_param_binding() {
    let mut query = param_query();
    query.vector_param("vec", &[0.5, -0.5]);
    let args = query.build_args().unwrap();
    let pos = args.iter().position(|a| *a == text("PARAMS")).unwrap();
    assert_eq!(args[pos + 1], Arg::Int(2));
    assert_eq!(args[pos + 2], text("vec"));
    assert_eq!(args[pos + 3], text(&encode_dense(&[0.5, -0.5])));
}

// =============================================================================
// Freezing / Count Invariant Tests
// =============================================================================

#[test]
#[should_panic(expected = "already serialized")]
fn test_mutation_after_build_panics() {
    let mut query = param_query();
    query.build_args().unwrap();
    query.limit(0, 5);
}

#[test]
fn test_count_invariant_all_clause_combinations() {
    let methods = [
        None,
        Some(VectorMethod::knn(25)),
        Some(VectorMethod::Range {
            radius: 0.5,
            epsilon: Some(0.1),
            yield_score_as: Some("d".into()),
        }),
    ];
    let combiners = [
        None,
        Some(Combiner::rrf(None, Some(60))),
        Some(Combiner::linear(0.6, 0.4, Some(9))),
    ];
    for method in methods {
        for combiner in &combiners {
            for bits in 0u32..(1 << 6) {
                let mut query = param_query();
                if let Some(method) = method.clone() {
                    query.method(method);
                }
                if let Some(combiner) = combiner.clone() {
                    query.combine(combiner);
                }
                if bits & 1 != 0 {
                    query.scorer(sablekv_search::Scorer::bm25_tanh(2.0));
                }
                if bits & 2 != 0 {
                    query.load_all();
                }
                if bits & 4 != 0 {
                    query.apply("@x", "y").sort_by([("@y", SortOrder::Asc)]);
                }
                if bits & 8 != 0 {
                    query.filter("@y > 1");
                }
                if bits & 16 != 0 {
                    query.limit(0, 10);
                }
                if bits & 32 != 0 {
                    query.param("p", 1i64).timeout(100);
                    query.set_dialect(4);
                }
                query.build_args().unwrap();
            }
        }
    }
}
