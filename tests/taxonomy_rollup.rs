//! Taxonomy faceting: counts and aggregations rolled up the category hierarchy

use std::sync::Arc;

use facetcut::facet::{
    CountFacetRecorder, FacetFieldCollector, FacetRecorder, LongAggregationsFacetRecorder,
    OrdinalIterator, Reducer, Taxonomy, TaxonomyChildrenOrdinalIterator, TaxonomyFacetCutter,
    TaxonomyFacetRollup, ROOT_ORD,
};
use facetcut::segment::{build_segments, LongField, LongValuesSource};
use facetcut::{AllDocs, Document, FacetError, IndexSearcher, SearchSettings};

fn fixture() -> (IndexSearcher, Taxonomy) {
    let docs = vec![
        Document::new(0).with_category("cat", "A/leaf1").with_long("rating", 1),
        Document::new(1).with_category("cat", "A/leaf2").with_long("rating", 3),
        Document::new(2).with_category("cat", "A/leaf1").with_long("rating", 7),
        Document::new(3).with_category("cat", "A/leaf2").with_long("rating", 4),
        Document::new(4).with_category("cat", "A/leaf2").with_long("rating", 2),
    ];
    let mut taxonomy = Taxonomy::new();
    let segments = build_segments(&docs, 2, Some(&mut taxonomy)).unwrap();
    let searcher = IndexSearcher::new(segments)
        .with_settings(SearchSettings::default().with_max_segments_per_slice(1));
    (searcher, taxonomy)
}

#[test]
fn test_three_level_count_rollup() {
    let (searcher, taxonomy) = fixture();
    let a = taxonomy.ord_for_label("A").unwrap();
    let leaf1 = taxonomy.ord_for_label("A/leaf1").unwrap();
    let leaf2 = taxonomy.ord_for_label("A/leaf2").unwrap();

    let mut collector =
        FacetFieldCollector::new(TaxonomyFacetCutter::new("cat"), CountFacetRecorder::new());
    searcher.search(&AllDocs, &collector).unwrap();

    let rollup = TaxonomyFacetRollup::new(Arc::new(taxonomy.arrays()), vec![ROOT_ORD]).unwrap();
    collector.reduce(Some(&rollup)).unwrap();

    let recorder = collector.recorder();
    assert_eq!(recorder.count(leaf1).unwrap(), 2);
    assert_eq!(recorder.count(leaf2).unwrap(), 3);
    assert_eq!(recorder.count(a).unwrap(), 5);
    assert_eq!(recorder.count(ROOT_ORD).unwrap(), 5);

    assert!(matches!(
        collector.reduce(Some(&rollup)),
        Err(FacetError::AlreadyReduced)
    ));
    assert_eq!(collector.recorder().count(a).unwrap(), 5);
}

#[test]
fn test_children_of_dimension() {
    let (searcher, taxonomy) = fixture();
    let mut collector =
        FacetFieldCollector::new(TaxonomyFacetCutter::new("cat"), CountFacetRecorder::new());
    searcher.search(&AllDocs, &collector).unwrap();
    let rollup = TaxonomyFacetRollup::all_dims(&taxonomy);
    collector.reduce(Some(&rollup)).unwrap();

    let a = taxonomy.ord_for_label("A").unwrap();
    let recorder = collector.recorder();
    let children: Vec<String> =
        TaxonomyChildrenOrdinalIterator::new(recorder.recorded_ords().unwrap(), rollup.arrays(), a)
            .unwrap()
            .to_vec()
            .into_iter()
            .filter_map(|ord| taxonomy.label(ord))
            .collect();
    assert_eq!(children, vec!["A/leaf1", "A/leaf2"]);

    let dims =
        TaxonomyChildrenOrdinalIterator::new(recorder.recorded_ords().unwrap(), rollup.arrays(), ROOT_ORD)
            .unwrap()
            .to_vec();
    assert_eq!(dims, vec![a]);
}

#[test]
fn test_aggregation_rollup() {
    let (searcher, taxonomy) = fixture();
    let a = taxonomy.ord_for_label("A").unwrap();
    let leaf1 = taxonomy.ord_for_label("A/leaf1").unwrap();

    let sources: Vec<Arc<dyn LongValuesSource>> =
        vec![Arc::new(LongField::new("rating")), Arc::new(LongField::new("rating"))];
    let recorder =
        LongAggregationsFacetRecorder::new(sources, vec![Reducer::Sum, Reducer::Max]).unwrap();
    let mut collector = FacetFieldCollector::new(TaxonomyFacetCutter::new("cat"), recorder);
    searcher.search(&AllDocs, &collector).unwrap();

    let rollup = TaxonomyFacetRollup::all_dims(&taxonomy);
    collector.reduce(Some(&rollup)).unwrap();

    let recorder = collector.recorder();
    assert_eq!(recorder.recorded_value(leaf1, 0).unwrap(), Some(8));
    assert_eq!(recorder.recorded_value(leaf1, 1).unwrap(), Some(7));
    assert_eq!(recorder.recorded_value(a, 0).unwrap(), Some(17));
    assert_eq!(recorder.recorded_value(a, 1).unwrap(), Some(7));
    assert_eq!(recorder.recorded_value(ROOT_ORD, 0).unwrap(), None);
}

#[test]
fn test_documents_with_several_categories() {
    let docs = vec![
        Document::new(0).with_categories("cat", vec!["A/x".to_string(), "B/y".to_string()]),
        Document::new(1).with_categories("cat", vec!["A/x".to_string(), "A/z".to_string()]),
    ];
    let mut taxonomy = Taxonomy::new();
    let searcher = IndexSearcher::new(build_segments(&docs, 1, Some(&mut taxonomy)).unwrap());

    let mut collector =
        FacetFieldCollector::new(TaxonomyFacetCutter::new("cat"), CountFacetRecorder::new());
    searcher.search(&AllDocs, &collector).unwrap();
    collector.reduce(Some(&TaxonomyFacetRollup::all_dims(&taxonomy))).unwrap();

    let count = |label: &str| {
        collector
            .recorder()
            .count(taxonomy.ord_for_label(label).unwrap())
            .unwrap()
    };
    assert_eq!(count("A/x"), 2);
    assert_eq!(count("A/z"), 1);
    assert_eq!(count("B/y"), 1);
    // Counts are per (document, category) pair
    assert_eq!(count("A"), 3);
    assert_eq!(count("B"), 1);
}
