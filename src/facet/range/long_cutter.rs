//! Range facet cutter over long values.
//!
//! The requested ranges are turned into elementary intervals once, when the
//! cutter is built. Per document the cutter only finds the elementary intervals
//! hit by the document's values and maps them to request positions, either
//! directly (disjoint ranges) or through the segment tree (overlapping ranges).

use std::sync::Arc;

use tracing::{debug, trace};

use super::elementary::{
    are_overlapping, boundaries, build_disjoint_intervals, build_overlapping_intervals,
    disjoint_positions, find_interval,
};
use super::interval_tracker::IntervalTracker;
use super::segment_tree::SegmentTree;
use super::types::{check_unique_labels, sorted_ranges, LongRange};
use crate::error::{FacetError, Result};
use crate::facet::cutter::{FacetCutter, LeafFacetCutter};
use crate::facet::ordinals::{FacetOrd, OrdinalIterator};
use crate::segment::{
    DocNo, LongValues, LongValuesSource, MultiLongValues, MultiLongValuesSource, SegmentReader,
};

/// Where the cutter reads document values from
#[derive(Clone)]
pub enum LongRangeSource {
    Single(Arc<dyn LongValuesSource>),
    Multi(Arc<dyn MultiLongValuesSource>),
}

impl LongRangeSource {
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, LongRangeSource::Multi(_))
    }
}

/// How elementary intervals map back to requested ranges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeLayout {
    /// Every elementary interval belongs to at most one requested range
    Disjoint,
    /// Requested ranges may share values; resolved with a segment tree
    Overlapping,
}

#[derive(Debug)]
struct RangePartition {
    layout: RangeLayout,
    /// Inclusive end of each elementary interval
    boundaries: Vec<i64>,
    /// Request position per elementary interval, disjoint layout only
    positions: Vec<Option<usize>>,
    /// Overlapping layout only
    tree: Option<SegmentTree>,
    range_count: usize,
}

/// [`FacetCutter`] assigning documents to the requested long ranges they fall in
///
/// The facet ordinal of a range is its position in the request.
#[derive(Clone)]
pub struct LongRangeFacetCutter {
    source: LongRangeSource,
    ranges: Vec<LongRange>,
    partition: Arc<RangePartition>,
}

impl LongRangeFacetCutter {
    /// Build a cutter, choosing the disjoint layout when no two ranges overlap
    pub fn create(source: LongRangeSource, ranges: Vec<LongRange>) -> Result<Self> {
        let overlapping = are_overlapping(&sorted_ranges(&ranges));
        let layout = if overlapping {
            RangeLayout::Overlapping
        } else {
            RangeLayout::Disjoint
        };
        Self::with_layout(source, ranges, layout)
    }

    /// Build a cutter for pairwise disjoint ranges
    pub fn disjoint(source: LongRangeSource, ranges: Vec<LongRange>) -> Result<Self> {
        if are_overlapping(&sorted_ranges(&ranges)) {
            return Err(FacetError::InvalidRange(
                "ranges overlap; use the overlapping layout".to_string(),
            ));
        }
        Self::with_layout(source, ranges, RangeLayout::Disjoint)
    }

    /// Build a cutter backed by a segment tree; accepts any ranges
    pub fn overlapping(source: LongRangeSource, ranges: Vec<LongRange>) -> Result<Self> {
        Self::with_layout(source, ranges, RangeLayout::Overlapping)
    }

    fn with_layout(
        source: LongRangeSource,
        ranges: Vec<LongRange>,
        layout: RangeLayout,
    ) -> Result<Self> {
        check_unique_labels(ranges.iter().map(|r| r.label()))?;
        let sorted = sorted_ranges(&ranges);

        let partition = match layout {
            RangeLayout::Disjoint => {
                let intervals = build_disjoint_intervals(&sorted);
                let boundaries = boundaries(&intervals);
                let positions = disjoint_positions(&boundaries, &sorted);
                RangePartition {
                    layout,
                    boundaries,
                    positions,
                    tree: None,
                    range_count: ranges.len(),
                }
            }
            RangeLayout::Overlapping => {
                let intervals = build_overlapping_intervals(&sorted);
                let tree = SegmentTree::with_outputs(&intervals, &sorted);
                trace!(tree = %tree, "range segment tree");
                RangePartition {
                    layout,
                    boundaries: boundaries(&intervals),
                    positions: Vec::new(),
                    tree: Some(tree),
                    range_count: ranges.len(),
                }
            }
        };

        debug!(
            ranges = ranges.len(),
            elementary_intervals = partition.boundaries.len(),
            layout = ?layout,
            multi_valued = source.is_multi_valued(),
            "built long range facet cutter"
        );

        Ok(Self {
            source,
            ranges,
            partition: Arc::new(partition),
        })
    }

    pub fn layout(&self) -> RangeLayout {
        self.partition.layout
    }

    /// Requested ranges, indexed by facet ordinal
    pub fn ranges(&self) -> &[LongRange] {
        &self.ranges
    }

    /// Label of the range with the given ordinal
    pub fn label(&self, ord: FacetOrd) -> Option<&str> {
        self.ranges.get(ord as usize).map(|r| r.label())
    }

    pub fn elementary_interval_count(&self) -> usize {
        self.partition.boundaries.len()
    }
}

impl FacetCutter for LongRangeFacetCutter {
    fn create_leaf_cutter(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetCutter>> {
        let interval_count = self.partition.boundaries.len();
        let range_count = self.partition.range_count;
        let (values, elementary) = match &self.source {
            LongRangeSource::Single(source) => (
                LeafValues::Single(source.values(segment)?),
                IntervalTracker::single(interval_count),
            ),
            LongRangeSource::Multi(source) => (
                LeafValues::Multi(source.values(segment)?),
                IntervalTracker::multi(interval_count),
            ),
        };
        let requested = match (self.partition.layout, &values) {
            (RangeLayout::Disjoint, LeafValues::Single(_)) => IntervalTracker::single(range_count),
            _ => IntervalTracker::multi(range_count),
        };
        Ok(Box::new(RangeLeafCutter {
            values,
            partition: self.partition.clone(),
            elementary,
            requested,
        }))
    }
}

enum LeafValues {
    Single(Box<dyn LongValues>),
    Multi(Box<dyn MultiLongValues>),
}

struct RangeLeafCutter {
    values: LeafValues,
    partition: Arc<RangePartition>,
    elementary: IntervalTracker,
    requested: IntervalTracker,
}

impl RangeLeafCutter {
    /// Record the elementary intervals hit by the current document
    fn classify(&mut self) {
        let boundaries = &self.partition.boundaries;
        match &mut self.values {
            LeafValues::Single(values) => {
                let index = find_interval(boundaries, values.long_value(), 0);
                self.elementary.set(index);
            }
            LeafValues::Multi(values) => {
                // Values arrive ascending, so the search never moves backwards
                let last = boundaries.len() - 1;
                let mut from = 0;
                for _ in 0..values.value_count() {
                    let index = find_interval(boundaries, values.next_value(), from);
                    self.elementary.set(index);
                    if index == last {
                        break;
                    }
                    from = index;
                }
            }
        }
    }

    /// Translate elementary interval hits into requested range hits
    fn map_to_requested(&mut self) {
        match &self.partition.tree {
            Some(tree) => tree.roll_up(&self.elementary, &mut self.requested),
            None => {
                let positions = &self.partition.positions;
                let requested = &mut self.requested;
                self.elementary.for_each_hit(|index| {
                    if let Some(pos) = positions[index] {
                        requested.set(pos);
                    }
                });
            }
        }
    }
}

impl LeafFacetCutter for RangeLeafCutter {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.elementary.clear();
        self.requested.clear();

        let has_value = match &mut self.values {
            LeafValues::Single(values) => values.advance_exact(doc)?,
            LeafValues::Multi(values) => values.advance_exact(doc)?,
        };
        if !has_value {
            return Ok(false);
        }

        self.classify();
        self.map_to_requested();
        self.requested.freeze();
        Ok(true)
    }
}

impl OrdinalIterator for RangeLeafCutter {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        self.requested.next_ord()
    }
}
