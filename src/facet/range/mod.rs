//! Range faceting over long and double values.

pub mod double_cutter;
pub mod elementary;
pub mod interval_tracker;
pub mod long_cutter;
pub mod segment_tree;
pub mod sortable;
pub mod types;

pub use double_cutter::{DoubleRangeFacetCutter, DoubleRangeSource};
pub use interval_tracker::IntervalTracker;
pub use long_cutter::{LongRangeFacetCutter, LongRangeSource, RangeLayout};
pub use segment_tree::{NodeIndex, RangeNode, SegmentTree};
pub use sortable::{double_to_sortable_long, sortable_long_to_double};
pub use types::{DoubleRange, InclusiveRange, LongRange, RangeAndPos};
