//! Benchmarks for command construction and reply decoding

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sablekv_search::result::parse_search;
use sablekv_search::{
    AggregateRequest, Combiner, CursorSpec, GroupBy, HybridQuery, Reducer, Reply, ResultShape,
    SortOrder, VectorInput,
};

fn build_aggregate(c: &mut Criterion) {
    c.bench_function("build_aggregate", |b| {
        b.iter(|| {
            let mut request = AggregateRequest::new("bench", "@region:{eu}");
            request
                .load(["@price", "@qty"])
                .group_by(GroupBy::new(["@day"]).reduce(Reducer::sum("@price").alias("rev")))
                .apply("@rev / 1000", "rev_k")
                .sort_by([("@rev_k", SortOrder::Desc)])
                .limit(0, 50)
                .with_cursor(CursorSpec {
                    count: Some(500),
                    max_idle: None,
                });
            black_box(request.build_args().unwrap())
        })
    });
}

fn build_hybrid(c: &mut Criterion) {
    let vector: Vec<f32> = (0..768).map(|i| i as f32 * 0.001).collect();
    c.bench_function("build_hybrid_768d", |b| {
        b.iter(|| {
            let mut query = HybridQuery::new(
                "bench",
                "hello world",
                "embedding",
                VectorInput::Dense(vector.clone()),
            );
            query.combine(Combiner::rrf(None, Some(60))).limit(0, 10);
            black_box(query.build_args().unwrap())
        })
    });
}

fn decode_search_reply(c: &mut Criterion) {
    let mut items = vec![Reply::Int(100)];
    for i in 0..100 {
        items.push(Reply::Text(format!("doc:{}", i)));
        items.push(Reply::Array(vec![
            Reply::Text("title".to_string()),
            Reply::Text("a moderately long title value".to_string()),
            Reply::Text("year".to_string()),
            Reply::Text("1984".to_string()),
        ]));
    }
    let reply = Reply::Array(items);
    c.bench_function("decode_search_100_hits", |b| {
        b.iter(|| black_box(parse_search(reply.clone(), &ResultShape::content_only()).unwrap()))
    });
}

criterion_group!(benches, build_aggregate, build_hybrid, decode_search_reply);
criterion_main!(benches);
