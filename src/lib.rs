pub mod config;
pub mod error;
pub mod facet;
pub mod metrics;
pub mod models;
pub mod query;
pub mod segment;

pub use config::SearchSettings;
pub use error::{FacetError, Result};
pub use metrics::FacetMetrics;
pub use models::*;
pub use query::{AllDocs, BitmapMatcher, Collector, DocMatcher, IndexSearcher, LongRangeFilter, SearchStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
