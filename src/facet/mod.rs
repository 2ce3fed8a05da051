//! Faceting: cutting documents into facet ordinals and recording values per ordinal
//!
//! # Architecture
//!
//! - `FacetCutter` / `LeafFacetCutter`: map a document to the ordinals it belongs to
//!   (requested ranges, taxonomy categories)
//! - `FacetRecorder` / `LeafFacetRecorder`: accumulate per-ordinal values per segment,
//!   merged once by `reduce`
//! - `FacetRollup`: parent/child structure that `reduce` folds descendants into
//! - `FacetFieldCollector`: pairs a cutter with a recorder during a search
//! - `FacetRequest`: JSON facet description producing the above

pub mod aggregations;
pub mod collector;
pub mod count;
pub mod cutter;
pub mod ordinals;
pub mod range;
pub mod recorder;
pub mod request;
pub mod rollup;
pub mod taxonomy;

pub use aggregations::{AggregationOrdToComparable, LongAggregationsFacetRecorder, Reducer};
pub use collector::FacetFieldCollector;
pub use count::{CountFacetRecorder, CountOrdToComparable};
pub use cutter::{FacetCutter, LeafFacetCutter};
pub use ordinals::{
    ords, EmptyOrdinalIterator, FacetOrd, OrdToComparable, OrdinalIterator, Ords,
    SliceOrdinalIterator, TopnOrdinalIterator, VecOrdinalIterator,
};
pub use range::{
    DoubleRange, DoubleRangeFacetCutter, DoubleRangeSource, LongRange, LongRangeFacetCutter,
    LongRangeSource, RangeLayout,
};
pub use recorder::{
    merge_into_seed, FacetRecorder, LeafFacetRecorder, LeafRegistry, PairedFacetRecorder,
};
pub use request::{
    search_facets, AggregationSpec, DoubleRangeSpec, FacetBucket, FacetKind, FacetRequest,
    FacetResult, LongRangeSpec, PreparedFacet,
};
pub use rollup::FacetRollup;
pub use taxonomy::{
    Taxonomy, TaxonomyArrays, TaxonomyChildrenOrdinalIterator, TaxonomyFacetCutter,
    TaxonomyFacetRollup, ROOT_ORD,
};
