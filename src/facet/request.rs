//! Facet requests: JSON descriptions of the facets to compute and the
//! collectors they turn into.
//!
//! ```json
//! {
//!   "name": "price",
//!   "field": "price",
//!   "kind": {
//!     "type": "long_range",
//!     "ranges": [
//!       { "label": "cheap", "max": 10, "max_inclusive": false },
//!       { "label": "mid", "min": 10, "max": 20 }
//!     ]
//!   },
//!   "aggregations": [{ "field": "rating", "reducer": "max" }]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregations::{LongAggregationsFacetRecorder, Reducer};
use super::collector::FacetFieldCollector;
use super::count::{CountFacetRecorder, CountOrdToComparable};
use super::cutter::FacetCutter;
use super::ordinals::{FacetOrd, OrdinalIterator, TopnOrdinalIterator, VecOrdinalIterator};
use super::range::{
    DoubleRange, DoubleRangeFacetCutter, DoubleRangeSource, LongRange, LongRangeFacetCutter,
    LongRangeSource,
};
use super::recorder::{FacetRecorder, PairedFacetRecorder};
use super::rollup::FacetRollup;
use super::taxonomy::{
    Taxonomy, TaxonomyChildrenOrdinalIterator, TaxonomyFacetCutter, TaxonomyFacetRollup, ROOT_ORD,
};
use crate::error::{FacetError, Result};
use crate::query::{DocMatcher, IndexSearcher, MultiCollector, SearchStats};
use crate::segment::{
    DoubleField, LongField, LongValuesSource, MultiDoubleField, MultiLongField,
};

fn default_true() -> bool {
    true
}

/// Long range; a missing bound is unbounded
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LongRangeSpec {
    pub label: String,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default = "default_true")]
    pub min_inclusive: bool,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default = "default_true")]
    pub max_inclusive: bool,
}

impl LongRangeSpec {
    pub fn to_range(&self) -> Result<LongRange> {
        LongRange::new(
            self.label.clone(),
            self.min.unwrap_or(i64::MIN),
            self.min.is_none() || self.min_inclusive,
            self.max.unwrap_or(i64::MAX),
            self.max.is_none() || self.max_inclusive,
        )
    }
}

/// Double range; a missing bound is infinite
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoubleRangeSpec {
    pub label: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default = "default_true")]
    pub min_inclusive: bool,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default = "default_true")]
    pub max_inclusive: bool,
}

impl DoubleRangeSpec {
    pub fn to_range(&self) -> Result<DoubleRange> {
        DoubleRange::new(
            self.label.clone(),
            self.min.unwrap_or(f64::NEG_INFINITY),
            self.min.is_none() || self.min_inclusive,
            self.max.unwrap_or(f64::INFINITY),
            self.max.is_none() || self.max_inclusive,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FacetKind {
    LongRange {
        ranges: Vec<LongRangeSpec>,
        #[serde(default)]
        multi_valued: bool,
    },
    DoubleRange {
        ranges: Vec<DoubleRangeSpec>,
        #[serde(default)]
        multi_valued: bool,
    },
    /// Category counts rolled up into `dims` (every top-level dimension when
    /// empty), listing the children of `path` (the root when absent)
    Taxonomy {
        #[serde(default)]
        dims: Vec<String>,
        #[serde(default)]
        path: Option<String>,
    },
}

/// Long aggregation over a single-valued field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub field: String,
    pub reducer: Reducer,
}

impl AggregationSpec {
    pub fn name(&self) -> String {
        format!("{}({})", self.reducer.name(), self.field)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacetRequest {
    pub name: String,
    pub field: String,
    pub kind: FacetKind,
    #[serde(default)]
    pub aggregations: Vec<AggregationSpec>,
    /// Keep only the N buckets with the highest counts
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl FacetRequest {
    /// Read a JSON array of requests
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<FacetRequest>> {
        let content = fs::read_to_string(path.as_ref())?;
        let requests: Vec<FacetRequest> = serde_json::from_str(&content)?;
        debug!(
            path = %path.as_ref().display(),
            requests = requests.len(),
            "loaded facet requests"
        );
        Ok(requests)
    }

    /// Build the cutter, recorders and rollup for this request
    ///
    /// Taxonomy requests need the taxonomy the segments were written with.
    pub fn prepare(&self, taxonomy: Option<&Taxonomy>) -> Result<PreparedFacet> {
        if self.top_n == Some(0) {
            return Err(FacetError::InvalidArgument(format!(
                "facet '{}': top_n must be positive",
                self.name
            )));
        }

        let (cutter, labels): (Arc<dyn FacetCutter>, FacetLabels) = match &self.kind {
            FacetKind::LongRange {
                ranges,
                multi_valued,
            } => {
                let ranges = ranges
                    .iter()
                    .map(LongRangeSpec::to_range)
                    .collect::<Result<Vec<_>>>()?;
                let labels = ranges.iter().map(|r| r.label().to_string()).collect();
                let source = if *multi_valued {
                    LongRangeSource::Multi(Arc::new(MultiLongField::new(&self.field)))
                } else {
                    LongRangeSource::Single(Arc::new(LongField::new(&self.field)))
                };
                (
                    Arc::new(LongRangeFacetCutter::create(source, ranges)?) as Arc<dyn FacetCutter>,
                    FacetLabels::Ranges(labels),
                )
            }
            FacetKind::DoubleRange {
                ranges,
                multi_valued,
            } => {
                let ranges = ranges
                    .iter()
                    .map(DoubleRangeSpec::to_range)
                    .collect::<Result<Vec<_>>>()?;
                let labels = ranges.iter().map(|r| r.label().to_string()).collect();
                let source = if *multi_valued {
                    DoubleRangeSource::Multi(Arc::new(MultiDoubleField::new(&self.field)))
                } else {
                    DoubleRangeSource::Single(Arc::new(DoubleField::new(&self.field)))
                };
                (
                    Arc::new(DoubleRangeFacetCutter::create(source, ranges)?) as Arc<dyn FacetCutter>,
                    FacetLabels::Ranges(labels),
                )
            }
            FacetKind::Taxonomy { dims, path } => {
                let taxonomy = taxonomy.ok_or_else(|| {
                    FacetError::InvalidArgument(format!(
                        "taxonomy facet '{}' requires a taxonomy",
                        self.name
                    ))
                })?;
                let rollup = if dims.is_empty() {
                    TaxonomyFacetRollup::all_dims(taxonomy)
                } else {
                    let dims: Vec<&str> = dims.iter().map(String::as_str).collect();
                    TaxonomyFacetRollup::for_labels(taxonomy, &dims)?
                };
                let parent = match path {
                    Some(label) => taxonomy.ord_for_label(label).ok_or_else(|| {
                        FacetError::InvalidArgument(format!("unknown category path '{}'", label))
                    })?,
                    None => ROOT_ORD,
                };
                (
                    Arc::new(TaxonomyFacetCutter::new(&self.field)) as Arc<dyn FacetCutter>,
                    FacetLabels::Taxonomy {
                        taxonomy: Arc::new(taxonomy.clone()),
                        rollup,
                        parent,
                    },
                )
            }
        };

        let aggregations = if self.aggregations.is_empty() {
            None
        } else {
            let sources: Vec<Arc<dyn LongValuesSource>> = self
                .aggregations
                .iter()
                .map(|a| Arc::new(LongField::new(&a.field)) as Arc<dyn LongValuesSource>)
                .collect();
            let reducers = self.aggregations.iter().map(|a| a.reducer).collect();
            Some(LongAggregationsFacetRecorder::new(sources, reducers)?)
        };

        Ok(PreparedFacet {
            name: self.name.clone(),
            collector: FacetFieldCollector::new(
                cutter,
                PairedFacetRecorder::new(CountFacetRecorder::new(), aggregations),
            ),
            aggregation_names: self.aggregations.iter().map(AggregationSpec::name).collect(),
            labels,
            top_n: self.top_n,
        })
    }
}

enum FacetLabels {
    Ranges(Vec<String>),
    Taxonomy {
        taxonomy: Arc<Taxonomy>,
        rollup: TaxonomyFacetRollup,
        parent: FacetOrd,
    },
}

impl FacetLabels {
    fn rollup(&self) -> Option<&dyn FacetRollup> {
        match self {
            FacetLabels::Ranges(_) => None,
            FacetLabels::Taxonomy { rollup, .. } => Some(rollup),
        }
    }

    fn label(&self, ord: FacetOrd) -> String {
        match self {
            FacetLabels::Ranges(labels) => labels.get(ord as usize).cloned().unwrap_or_default(),
            FacetLabels::Taxonomy { taxonomy, .. } => taxonomy.label(ord).unwrap_or_default(),
        }
    }

    /// Ordinals reported as buckets, ascending
    fn candidates(&self, counts: &CountFacetRecorder) -> Result<Vec<FacetOrd>> {
        match self {
            FacetLabels::Ranges(labels) => Ok((0..labels.len() as FacetOrd).collect()),
            FacetLabels::Taxonomy { rollup, parent, .. } => Ok(
                TaxonomyChildrenOrdinalIterator::new(
                    counts.recorded_ords()?,
                    rollup.arrays(),
                    *parent,
                )?
                .to_vec(),
            ),
        }
    }
}

/// Collector of one request, ready to be attached to a search
pub struct PreparedFacet {
    name: String,
    collector: FacetFieldCollector<
        Arc<dyn FacetCutter>,
        PairedFacetRecorder<CountFacetRecorder, LongAggregationsFacetRecorder>,
    >,
    aggregation_names: Vec<String>,
    labels: FacetLabels,
    top_n: Option<usize>,
}

impl PreparedFacet {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach this facet's collector to `multi`
    pub fn register<'a>(&'a self, multi: &mut MultiCollector<'a>) {
        multi.push(&self.collector);
    }

    /// Reduce the recorders and build the buckets
    pub fn finish(self) -> Result<FacetResult> {
        let PreparedFacet {
            name,
            mut collector,
            aggregation_names,
            labels,
            top_n,
        } = self;

        collector.reduce(labels.rollup())?;

        let recorder = collector.recorder().first();
        let aggregations = collector.recorder().second();
        let candidates = labels.candidates(recorder)?;
        let ords = match top_n {
            Some(n) => TopnOrdinalIterator::new(
                VecOrdinalIterator::new(candidates),
                &CountOrdToComparable::new(recorder),
                n,
            )?
            .to_vec(),
            None => candidates,
        };

        let buckets = ords
            .into_iter()
            .map(|ord| {
                let values = match aggregations {
                    Some(aggregations) => (0..aggregation_names.len())
                        .map(|index| aggregations.recorded_value(ord, index))
                        .collect::<Result<Vec<_>>>()?,
                    None => Vec::new(),
                };
                Ok(FacetBucket {
                    label: labels.label(ord),
                    ord,
                    count: recorder.count(ord)?,
                    aggregations: values,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FacetResult {
            name,
            aggregations: aggregation_names,
            buckets,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub label: String,
    pub ord: FacetOrd,
    pub count: u64,
    /// One value per requested aggregation, `None` when nothing was recorded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregations: Vec<Option<i64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacetResult {
    pub name: String,
    /// Names of the aggregations, in bucket value order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregations: Vec<String>,
    pub buckets: Vec<FacetBucket>,
}

impl FacetResult {
    pub fn bucket(&self, label: &str) -> Option<&FacetBucket> {
        self.buckets.iter().find(|b| b.label == label)
    }
}

/// Run every request in a single pass over the searcher's segments
pub fn search_facets(
    searcher: &IndexSearcher,
    matcher: &dyn DocMatcher,
    requests: &[FacetRequest],
    taxonomy: Option<&Taxonomy>,
) -> Result<(Vec<FacetResult>, SearchStats)> {
    let prepared = requests
        .iter()
        .map(|request| request.prepare(taxonomy))
        .collect::<Result<Vec<_>>>()?;

    let stats = {
        let mut multi = MultiCollector::new();
        for facet in &prepared {
            facet.register(&mut multi);
        }
        searcher.search(matcher, &multi)?
    };

    let results = prepared
        .into_iter()
        .map(PreparedFacet::finish)
        .collect::<Result<Vec<_>>>()?;
    Ok((results, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchSettings;
    use crate::models::Document;
    use crate::query::{AllDocs, LongRangeFilter};
    use crate::segment::build_segments;
    use std::io::Write;

    const REQUESTS: &str = r#"[
        {
            "name": "price",
            "field": "price",
            "kind": {
                "type": "long_range",
                "ranges": [
                    { "label": "cheap", "max": 10, "max_inclusive": false },
                    { "label": "mid", "min": 10, "max": 20 },
                    { "label": "all", "min": 0, "max": 100 }
                ]
            },
            "aggregations": [
                { "field": "rating", "reducer": "sum" },
                { "field": "rating", "reducer": "max" }
            ]
        },
        {
            "name": "score",
            "field": "score",
            "kind": {
                "type": "double_range",
                "ranges": [
                    { "label": "low", "min": 0.0, "max": 1.0, "max_inclusive": false },
                    { "label": "high", "min": 1.0, "min_inclusive": false }
                ]
            }
        },
        {
            "name": "categories",
            "field": "category",
            "kind": { "type": "taxonomy" }
        }
    ]"#;

    fn index() -> (IndexSearcher, Taxonomy) {
        let docs = vec![
            Document::new(0)
                .with_long("price", 5)
                .with_long("rating", 4)
                .with_double("score", 0.5)
                .with_category("category", "Author/Bob"),
            Document::new(1)
                .with_long("price", 12)
                .with_long("rating", 2)
                .with_double("score", 1.5)
                .with_category("category", "Author/Lisa"),
            Document::new(2)
                .with_long("price", 25)
                .with_long("rating", 5)
                .with_double("score", 2.5)
                .with_category("category", "Author/Lisa"),
            Document::new(3)
                .with_long("price", 8)
                .with_long("rating", 3)
                .with_double("score", 3.5)
                .with_category("category", "Year/2010"),
        ];
        let mut taxonomy = Taxonomy::new();
        let segments = build_segments(&docs, 2, Some(&mut taxonomy)).unwrap();
        let searcher = IndexSearcher::new(segments).with_settings(SearchSettings::sequential());
        (searcher, taxonomy)
    }

    #[test]
    fn test_load_all() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REQUESTS.as_bytes()).unwrap();

        let requests = FacetRequest::load_all(file.path()).unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].aggregations[1].reducer, Reducer::Max);
        assert_eq!(requests[0].aggregations[1].name(), "max(rating)");
        match &requests[0].kind {
            FacetKind::LongRange { ranges, multi_valued } => {
                assert!(!multi_valued);
                assert_eq!(ranges[0].min, None);
                assert!(!ranges[0].max_inclusive);
                assert!(ranges[1].min_inclusive);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(
            requests[2].kind,
            FacetKind::Taxonomy {
                dims: Vec::new(),
                path: None
            }
        );
    }

    #[test]
    fn test_load_all_errors() {
        let missing = FacetRequest::load_all("/nonexistent/requests.json");
        assert!(matches!(missing, Err(FacetError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            FacetRequest::load_all(file.path()),
            Err(FacetError::Serialization(_))
        ));
    }

    #[test]
    fn test_search_facets() {
        let (searcher, taxonomy) = index();
        let requests: Vec<FacetRequest> = serde_json::from_str(REQUESTS).unwrap();
        let (results, stats) = search_facets(&searcher, &AllDocs, &requests, Some(&taxonomy)).unwrap();
        assert_eq!(stats.documents_collected, 4);

        let price = &results[0];
        assert_eq!(price.aggregations, vec!["sum(rating)", "max(rating)"]);
        let cheap = price.bucket("cheap").unwrap();
        assert_eq!(cheap.count, 2);
        assert_eq!(cheap.aggregations, vec![Some(7), Some(4)]);
        let mid = price.bucket("mid").unwrap();
        assert_eq!(mid.count, 1);
        assert_eq!(mid.aggregations, vec![Some(2), Some(2)]);
        let all = price.bucket("all").unwrap();
        assert_eq!(all.count, 4);
        assert_eq!(all.aggregations, vec![Some(14), Some(5)]);

        let score = &results[1];
        assert_eq!(score.bucket("low").unwrap().count, 1);
        assert_eq!(score.bucket("high").unwrap().count, 3);

        let categories = &results[2];
        let summary: Vec<(&str, u64)> = categories
            .buckets
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(summary, vec![("Author", 3), ("Year", 1)]);
    }

    #[test]
    fn test_filtered_search_reports_empty_ranges() {
        let (searcher, taxonomy) = index();
        let requests: Vec<FacetRequest> = serde_json::from_str(REQUESTS).unwrap();
        let filter = LongRangeFilter::new("price").gte(20);
        let (results, _) = search_facets(&searcher, &filter, &requests, Some(&taxonomy)).unwrap();

        let price = &results[0];
        assert_eq!(price.buckets.len(), 3);
        let cheap = price.bucket("cheap").unwrap();
        assert_eq!(cheap.count, 0);
        assert_eq!(cheap.aggregations, vec![None, None]);
        assert_eq!(price.bucket("all").unwrap().count, 1);
    }

    #[test]
    fn test_taxonomy_path_and_top_n() {
        let (searcher, taxonomy) = index();
        let request = FacetRequest {
            name: "authors".to_string(),
            field: "category".to_string(),
            kind: FacetKind::Taxonomy {
                dims: vec!["Author".to_string()],
                path: Some("Author".to_string()),
            },
            aggregations: Vec::new(),
            top_n: Some(1),
        };
        let (results, _) =
            search_facets(&searcher, &AllDocs, &[request], Some(&taxonomy)).unwrap();
        let buckets = &results[0].buckets;
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "Author/Lisa");
        assert_eq!(buckets[0].count, 2);
    }

    #[test]
    fn test_aggregations_share_the_count_collector() {
        let requests: Vec<FacetRequest> = serde_json::from_str(REQUESTS).unwrap();
        let price = requests[0].prepare(None).unwrap();
        let mut multi = MultiCollector::new();
        price.register(&mut multi);
        assert_eq!(multi.len(), 1);
    }

    #[test]
    fn test_prepare_rejects_bad_requests() {
        let taxonomy_request = FacetRequest {
            name: "categories".to_string(),
            field: "category".to_string(),
            kind: FacetKind::Taxonomy {
                dims: Vec::new(),
                path: None,
            },
            aggregations: Vec::new(),
            top_n: None,
        };
        assert!(matches!(
            taxonomy_request.prepare(None),
            Err(FacetError::InvalidArgument(_))
        ));

        let mut zero_top_n = taxonomy_request.clone();
        zero_top_n.top_n = Some(0);
        assert!(zero_top_n.prepare(Some(&Taxonomy::new())).is_err());

        let empty_range = FacetRequest {
            name: "price".to_string(),
            field: "price".to_string(),
            kind: FacetKind::LongRange {
                ranges: vec![LongRangeSpec {
                    label: "none".to_string(),
                    min: Some(5),
                    min_inclusive: false,
                    max: Some(6),
                    max_inclusive: false,
                }],
                multi_valued: false,
            },
            aggregations: Vec::new(),
            top_n: None,
        };
        assert!(matches!(
            empty_range.prepare(None),
            Err(FacetError::InvalidRange(_))
        ));
    }
}
