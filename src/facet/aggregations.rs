//! Long aggregations recorder: one or more reduced long statistics per ordinal.
//!
//! Each configured value source is paired with a [`Reducer`]. When a document is
//! recorded for an ordinal, every source that has a value for the document folds
//! it into the ordinal's accumulator slot for that source.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ordinals::{FacetOrd, OrdToComparable, OrdinalIterator, VecOrdinalIterator};
use super::recorder::{merge_into_seed, FacetRecorder, LeafFacetRecorder, LeafRegistry};
use super::rollup::{FacetRollup, RollupPath};
use crate::error::{FacetError, Result};
use crate::segment::{DocNo, LongValues, LongValuesSource, SegmentReader};

type AggregationMap = HashMap<FacetOrd, Box<[i64]>>;

/// Associative and commutative combination of two long values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    /// Wrapping sum
    Sum,
    Max,
    Min,
}

impl Reducer {
    pub fn reduce(self, a: i64, b: i64) -> i64 {
        match self {
            Reducer::Sum => a.wrapping_add(b),
            Reducer::Max => a.max(b),
            Reducer::Min => a.min(b),
        }
    }

    /// Value `v` such that `reduce(v, x) == x` for every `x`
    pub fn identity(self) -> i64 {
        match self {
            Reducer::Sum => 0,
            Reducer::Max => i64::MIN,
            Reducer::Min => i64::MAX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Reducer::Sum => "sum",
            Reducer::Max => "max",
            Reducer::Min => "min",
        }
    }
}

fn identities(reducers: &[Reducer]) -> Box<[i64]> {
    reducers.iter().map(|r| r.identity()).collect()
}

fn reduce_into(accum: &mut [i64], other: &[i64], reducers: &[Reducer]) {
    for ((acc, value), reducer) in accum.iter_mut().zip(other).zip(reducers) {
        *acc = reducer.reduce(*acc, *value);
    }
}

/// [`FacetRecorder`] computing long aggregations per ordinal
pub struct LongAggregationsFacetRecorder {
    sources: Vec<Arc<dyn LongValuesSource>>,
    reducers: Arc<[Reducer]>,
    registry: Arc<LeafRegistry<AggregationMap>>,
    values: Option<AggregationMap>,
    reduced: bool,
}

impl LongAggregationsFacetRecorder {
    pub fn new(sources: Vec<Arc<dyn LongValuesSource>>, reducers: Vec<Reducer>) -> Result<Self> {
        if sources.is_empty() {
            return Err(FacetError::InvalidArgument(
                "at least one aggregation is required".to_string(),
            ));
        }
        if sources.len() != reducers.len() {
            return Err(FacetError::InvalidArgument(format!(
                "{} value sources but {} reducers",
                sources.len(),
                reducers.len()
            )));
        }
        Ok(Self {
            sources,
            reducers: reducers.into(),
            registry: Arc::new(LeafRegistry::new()),
            values: None,
            reduced: false,
        })
    }

    /// Number of configured aggregations
    pub fn aggregation_count(&self) -> usize {
        self.reducers.len()
    }

    pub fn reducers(&self) -> &[Reducer] {
        &self.reducers
    }

    /// Reduced value of aggregation `index` for `ord`
    ///
    /// `None` when the ordinal has no accumulator, which is distinct from a
    /// recorded zero.
    pub fn recorded_value(&self, ord: FacetOrd, index: usize) -> Result<Option<i64>> {
        if index >= self.reducers.len() {
            return Err(FacetError::AggregationIndexOutOfRange {
                index,
                count: self.reducers.len(),
            });
        }
        Ok(self.values()?.get(&ord).map(|accum| accum[index]))
    }

    fn values(&self) -> Result<&AggregationMap> {
        self.values.as_ref().ok_or(FacetError::NotReduced)
    }

    /// Reduce every child's subtree into its accumulator and return the
    /// accumulator of `ord`, if any.
    ///
    /// The accumulator for `ord` is created only once some child contributes.
    fn rollup(
        values: &mut AggregationMap,
        ord: FacetOrd,
        rollup: &dyn FacetRollup,
        reducers: &[Reducer],
        path: &mut RollupPath,
    ) -> Result<Option<Box<[i64]>>> {
        path.enter(ord)?;
        let mut children = rollup.children_ords(ord)?;
        while let Some(child) = children.next_ord() {
            if let Some(current) = Self::rollup(values, child, rollup, reducers, path)? {
                let accum = values.entry(ord).or_insert_with(|| identities(reducers));
                reduce_into(accum, &current, reducers);
            }
        }
        path.leave(ord);
        Ok(values.get(&ord).cloned())
    }
}

impl FacetRecorder for LongAggregationsFacetRecorder {
    fn leaf_recorder(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetRecorder>> {
        let values = self
            .sources
            .iter()
            .map(|source| source.values(segment))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(AggregationsLeafRecorder {
            segment_ord: segment.ord(),
            values,
            reducers: self.reducers.clone(),
            per_ord: AggregationMap::new(),
            registry: self.registry.clone(),
        }))
    }

    fn reduce(&mut self, rollup: Option<&dyn FacetRollup>) -> Result<()> {
        if self.reduced {
            return Err(FacetError::AlreadyReduced);
        }
        self.reduced = true;

        let reducers = self.reducers.clone();
        let mut values = merge_into_seed(self.registry.drain(), |seed, other| {
            for (ord, accum) in other {
                match seed.get_mut(&ord) {
                    Some(existing) => reduce_into(existing, &accum, &reducers),
                    None => {
                        seed.insert(ord, accum);
                    }
                }
            }
        });

        if let Some(rollup) = rollup {
            let mut path = RollupPath::default();
            let mut dims = rollup.dim_ords_to_rollup()?;
            while let Some(dim) = dims.next_ord() {
                Self::rollup(&mut values, dim, rollup, &reducers, &mut path)?;
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

struct AggregationsLeafRecorder {
    segment_ord: usize,
    values: Vec<Box<dyn LongValues>>,
    reducers: Arc<[Reducer]>,
    per_ord: AggregationMap,
    registry: Arc<LeafRegistry<AggregationMap>>,
}

impl LeafFacetRecorder for AggregationsLeafRecorder {
    fn record(&mut self, doc: DocNo, ord: FacetOrd) -> Result<()> {
        let reducers = &self.reducers;
        let accum = self
            .per_ord
            .entry(ord)
            .or_insert_with(|| identities(reducers));

        for ((slot, values), reducer) in accum.iter_mut().zip(&mut self.values).zip(reducers.iter())
        {
            if values.advance_exact(doc)? {
                *slot = reducer.reduce(*slot, values.long_value());
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>) {
        let AggregationsLeafRecorder {
            segment_ord,
            per_ord,
            registry,
            ..
        } = *self;
        registry.append(segment_ord, per_ord);
    }
}

/// Ranks ordinals by one aggregation; ordinals without a value rank lowest
pub struct AggregationOrdToComparable<'a> {
    recorder: &'a LongAggregationsFacetRecorder,
    index: usize,
}

impl<'a> AggregationOrdToComparable<'a> {
    pub fn new(recorder: &'a LongAggregationsFacetRecorder, index: usize) -> Result<Self> {
        if index >= recorder.aggregation_count() {
            return Err(FacetError::AggregationIndexOutOfRange {
                index,
                count: recorder.aggregation_count(),
            });
        }
        Ok(Self { recorder, index })
    }
}

impl OrdToComparable for AggregationOrdToComparable<'_> {
    type Comparable = Option<i64>;

    fn comparable(&self, ord: FacetOrd) -> Result<Option<i64>> {
        self.recorder.recorded_value(ord, self.index)
    }
}
