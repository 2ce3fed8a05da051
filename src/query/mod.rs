//! Document matching and segment-parallel collection
//!
//! A search runs a [`DocMatcher`] over every segment of an [`IndexSearcher`]
//! and feeds the matching live documents to a [`Collector`]. Facet collectors
//! live in [`crate::facet`]; this module only knows about documents.

pub mod collector;
pub mod executor;
pub mod matcher;

pub use collector::{Collector, LeafCollector, MultiCollector};
pub use executor::{IndexSearcher, SearchStats};
pub use matcher::{AllDocs, BitmapMatcher, DocMatcher, LongRangeFilter};
