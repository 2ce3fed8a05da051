use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use facetcut::facet::{
    CountFacetRecorder, FacetFieldCollector, LongRange, LongRangeFacetCutter, LongRangeSource,
};
use facetcut::segment::{build_segments, LongField, MultiLongField};
use facetcut::{AllDocs, Document, IndexSearcher, SearchSettings};

struct BenchEnv {
    searcher: IndexSearcher,
}

fn build_env(doc_count: usize) -> BenchEnv {
    let docs: Vec<Document> = (0..doc_count as u64)
        .map(|i| {
            let price = ((i * 7919) % 1_000) as i64;
            Document::new(i)
                .with_long("price", price)
                .with_longs("sizes", vec![price % 50, price % 50 + 100])
        })
        .collect();
    let segments = build_segments(&docs, 10_000, None).unwrap();
    BenchEnv {
        searcher: IndexSearcher::new(segments).with_settings(SearchSettings::default()),
    }
}

fn disjoint_ranges() -> Vec<LongRange> {
    (0..10)
        .map(|i| LongRange::inclusive(format!("r{}", i), i * 100, i * 100 + 99).unwrap())
        .collect()
}

fn overlapping_ranges() -> Vec<LongRange> {
    (0..10)
        .map(|i| LongRange::inclusive(format!("r{}", i), i * 50, i * 50 + 299).unwrap())
        .collect()
}

fn count_ranges(env: &BenchEnv, source: LongRangeSource, ranges: Vec<LongRange>) -> u64 {
    let cutter = LongRangeFacetCutter::create(source, ranges).unwrap();
    let mut collector = FacetFieldCollector::new(cutter, CountFacetRecorder::new());
    env.searcher.search(&AllDocs, &collector).unwrap();
    collector.reduce(None).unwrap();
    collector.recorder().total().unwrap()
}

fn bench_range_facets(c: &mut Criterion) {
    let counts = [10_000usize, 100_000];
    let envs: Vec<(usize, BenchEnv)> = counts.iter().map(|&n| (n, build_env(n))).collect();

    let mut group = c.benchmark_group("range_facets");
    for (count, env) in envs.iter() {
        group.bench_with_input(BenchmarkId::new("disjoint", count), env, |b, env| {
            b.iter(|| {
                let source = LongRangeSource::Single(Arc::new(LongField::new("price")));
                black_box(count_ranges(env, source, disjoint_ranges()));
            });
        });
        group.bench_with_input(BenchmarkId::new("overlapping", count), env, |b, env| {
            b.iter(|| {
                let source = LongRangeSource::Single(Arc::new(LongField::new("price")));
                black_box(count_ranges(env, source, overlapping_ranges()));
            });
        });
        group.bench_with_input(BenchmarkId::new("overlapping_multi", count), env, |b, env| {
            b.iter(|| {
                let source = LongRangeSource::Multi(Arc::new(MultiLongField::new("sizes")));
                black_box(count_ranges(env, source, overlapping_ranges()));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_range_facets);
criterion_main!(benches);
