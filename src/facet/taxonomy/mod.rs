//! Hierarchical category facets backed by an in-memory taxonomy.

pub mod children;
pub mod cutter;
pub mod directory;
pub mod rollup;

pub use children::TaxonomyChildrenOrdinalIterator;
pub use cutter::TaxonomyFacetCutter;
pub use directory::{ChildOrdinalIterator, Taxonomy, TaxonomyArrays, PATH_DELIMITER, ROOT_ORD};
pub use rollup::TaxonomyFacetRollup;
