//! Count recorder: number of (document, ordinal) observations per ordinal.

use std::collections::HashMap;
use std::sync::Arc;

use super::ordinals::{FacetOrd, OrdToComparable, OrdinalIterator, VecOrdinalIterator};
use super::recorder::{merge_into_seed, FacetRecorder, LeafFacetRecorder, LeafRegistry};
use super::rollup::{FacetRollup, RollupPath};
use crate::error::{FacetError, Result};
use crate::segment::{DocNo, SegmentReader};

type CountMap = HashMap<FacetOrd, u64>;

/// [`FacetRecorder`] that counts facet ordinals
pub struct CountFacetRecorder {
    registry: Arc<LeafRegistry<CountMap>>,
    values: Option<CountMap>,
    reduced: bool,
}

impl CountFacetRecorder {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(LeafRegistry::new()),
            values: None,
            reduced: false,
        }
    }

    /// Count for an ordinal, zero when nothing was recorded
    pub fn count(&self, ord: FacetOrd) -> Result<u64> {
        Ok(self.values()?.get(&ord).copied().unwrap_or(0))
    }

    /// Sum of all recorded counts
    pub fn total(&self) -> Result<u64> {
        Ok(self.values()?.values().sum())
    }

    fn values(&self) -> Result<&CountMap> {
        self.values.as_ref().ok_or(FacetError::NotReduced)
    }
}

impl Default for CountFacetRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl FacetRecorder for CountFacetRecorder {
    fn leaf_recorder(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetRecorder>> {
        Ok(Box::new(CountLeafRecorder {
            segment_ord: segment.ord(),
            values: CountMap::new(),
            registry: self.registry.clone(),
        }))
    }

    fn reduce(&mut self, rollup: Option<&dyn FacetRollup>) -> Result<()> {
        if self.reduced {
            return Err(FacetError::AlreadyReduced);
        }
        self.reduced = true;

        let mut values = merge_into_seed(self.registry.drain(), |seed, other| {
            for (ord, count) in other {
                *seed.entry(ord).or_insert(0) += count;
            }
        });

        if let Some(rollup) = rollup {
            let mut path = RollupPath::default();
            let mut dims = rollup.dim_ords_to_rollup()?;
            while let Some(dim) = dims.next_ord() {
                let below = rollup_counts(&mut values, dim, rollup, &mut path)?;
                if below > 0 {
                    *values.entry(dim).or_insert(0) += below;
                }
            }
        }

        self.values = Some(values);
        Ok(())
    }

    fn recorded_ords(&self) -> Result<Box<dyn OrdinalIterator + '_>> {
        let mut ords: Vec<FacetOrd> = self.values()?.keys().copied().collect();
        ords.sort_unstable();
        Ok(Box::new(VecOrdinalIterator::new(ords)))
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.values()?.is_empty())
    }

    fn contains(&self, ord: FacetOrd) -> Result<bool> {
        Ok(self.values()?.contains_key(&ord))
    }
}

/// Adds each child's rolled-up count into the child and returns the sum of the
/// children's final counts.
fn rollup_counts(
    values: &mut CountMap,
    ord: FacetOrd,
    rollup: &dyn FacetRollup,
    path: &mut RollupPath,
) -> Result<u64> {
    path.enter(ord)?;
    let mut accum = 0;
    let mut children = rollup.children_ords(ord)?;
    while let Some(child) = children.next_ord() {
        let below = rollup_counts(values, child, rollup, path)?;
        let child_count = if below > 0 {
            let count = values.entry(child).or_insert(0);
            *count += below;
            *count
        } else {
            values.get(&child).copied().unwrap_or(0)
        };
        accum += child_count;
    }
    path.leave(ord);
    Ok(accum)
}

struct CountLeafRecorder {
    segment_ord: usize,
    values: CountMap,
    registry: Arc<LeafRegistry<CountMap>>,
}

impl LeafFacetRecorder for CountLeafRecorder {
    fn record(&mut self, _doc: DocNo, ord: FacetOrd) -> Result<()> {
        *self.values.entry(ord).or_insert(0) += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) {
        let CountLeafRecorder {
            segment_ord,
            values,
            registry,
        } = *self;
        registry.append(segment_ord, values);
    }
}

/// Ranks ordinals by their reduced count
pub struct CountOrdToComparable<'a> {
    recorder: &'a CountFacetRecorder,
}

impl<'a> CountOrdToComparable<'a> {
    pub fn new(recorder: &'a CountFacetRecorder) -> Self {
        Self { recorder }
    }
}

impl OrdToComparable for CountOrdToComparable<'_> {
    type Comparable = u64;

    fn comparable(&self, ord: FacetOrd) -> Result<u64> {
        self.recorder.count(ord)
    }
}
