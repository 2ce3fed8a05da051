//! Recorders accumulate per-ordinal statistics for the documents a cutter
//! assigns to facets.
//!
//! Every segment gets its own [`LeafFacetRecorder`] with an unshared map. When
//! the segment is done the leaf hands its map to the recorder's
//! [`LeafRegistry`], which is the only state touched by more than one thread.
//! `reduce` then runs once, single-threaded, and merges all maps.

use parking_lot::Mutex;
use tracing::warn;

use super::ordinals::{FacetOrd, OrdinalIterator, VecOrdinalIterator};
use super::rollup::FacetRollup;
use crate::error::Result;
use crate::segment::{DocNo, SegmentReader};

/// Per-segment accumulator, owned by the thread collecting that segment
pub trait LeafFacetRecorder {
    /// Record one (document, ordinal) observation
    fn record(&mut self, doc: DocNo, ord: FacetOrd) -> Result<()>;

    /// Hand the accumulated values over for the final merge
    ///
    /// A leaf that is dropped without `finish` contributes nothing.
    fn finish(self: Box<Self>);
}

/// Shared recorder producing leaf recorders and owning the merged result
pub trait FacetRecorder: Send + Sync {
    fn leaf_recorder(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetRecorder>>;

    /// Merge all finished leaves and apply the optional rollup
    ///
    /// Must run exactly once, after every segment finished collecting. A second
    /// call fails with `FacetError::AlreadyReduced`.
    fn reduce(&mut self, rollup: Option<&dyn FacetRollup>) -> Result<()>;

    /// Ordinals with a recorded value, ascending, each exactly once
    fn recorded_ords(&self) -> Result<Box<dyn OrdinalIterator + '_>>;

    fn is_empty(&self) -> Result<bool>;

    fn contains(&self, ord: FacetOrd) -> Result<bool>;
}

struct RegistryState<M> {
    slots: Vec<(usize, M)>,
    sealed: bool,
}

/// Append-only collection of finished per-segment maps
///
/// Slots are tagged with the segment's ordinal so merges happen in segment
/// order regardless of which worker finished first.
pub struct LeafRegistry<M> {
    state: Mutex<RegistryState<M>>,
}

impl<M> LeafRegistry<M> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                slots: Vec::new(),
                sealed: false,
            }),
        }
    }

    /// Append a finished segment map; maps arriving after `drain` are dropped
    pub fn append(&self, segment_ord: usize, values: M) {
        let mut state = self.state.lock();
        if state.sealed {
            warn!(segment_ord, "segment finished after reduce, its facet values are ignored");
            return;
        }
        state.slots.push((segment_ord, values));
    }

    /// Number of maps appended so far
    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seal the registry and take every map, ordered by segment ordinal
    pub fn drain(&self) -> Vec<M> {
        let mut state = self.state.lock();
        state.sealed = true;
        let mut slots = std::mem::take(&mut state.slots);
        slots.sort_by_key(|(segment_ord, _)| *segment_ord);
        slots.into_iter().map(|(_, values)| values).collect()
    }
}

impl<M> Default for LeafRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold every map into the first one using `merge`
///
/// The seed map is moved, not copied. No maps produce `M::default()`.
pub fn merge_into_seed<M, F>(maps: Vec<M>, mut merge: F) -> M
where
    M: Default,
    F: FnMut(&mut M, M),
{
    let mut maps = maps.into_iter();
    let mut seed = maps.next().unwrap_or_default();
    for other in maps {
        merge(&mut seed, other);
    }
    seed
}

/// Two recorders fed from one cutter pass
///
/// Every observation goes to `first` and, when present, to `second`, so a
/// collector cuts each document once however many statistics it keeps.
pub struct PairedFacetRecorder<A, B> {
    first: A,
    second: Option<B>,
}

impl<A: FacetRecorder, B: FacetRecorder> PairedFacetRecorder<A, B> {
    pub fn new(first: A, second: Option<B>) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> Option<&B> {
        self.second.as_ref()
    }
}

impl<A: FacetRecorder, B: FacetRecorder> FacetRecorder for PairedFacetRecorder<A, B> {
    fn leaf_recorder(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetRecorder>> {
        let first = self.first.leaf_recorder(segment)?;
        let second = match &self.second {
            Some(second) => Some(second.leaf_recorder(segment)?),
            None => None,
        };
        Ok(Box::new(PairedLeafRecorder { first, second }))
    }

    fn reduce(&mut self, rollup: Option<&dyn FacetRollup>) -> Result<()> {
        self.first.reduce(rollup)?;
        if let Some(second) = self.second.as_mut() {
            second.reduce(rollup)?;
        }
        Ok(())
    }

    fn recorded_ords(&self) -> Result<Box<dyn OrdinalIterator + '_>> {
        let mut ords = self.first.recorded_ords()?.to_vec();
        if let Some(second) = &self.second {
            ords.extend(second.recorded_ords()?.to_vec());
            ords.sort_unstable();
            ords.dedup();
        }
        Ok(Box::new(VecOrdinalIterator::new(ords)))
    }

    fn is_empty(&self) -> Result<bool> {
        if !self.first.is_empty()? {
            return Ok(false);
        }
        match &self.second {
            Some(second) => second.is_empty(),
            None => Ok(true),
        }
    }

    fn contains(&self, ord: FacetOrd) -> Result<bool> {
        if self.first.contains(ord)? {
            return Ok(true);
        }
        match &self.second {
            Some(second) => second.contains(ord),
            None => Ok(false),
        }
    }
}

struct PairedLeafRecorder {
    first: Box<dyn LeafFacetRecorder>,
    second: Option<Box<dyn LeafFacetRecorder>>,
}

impl LeafFacetRecorder for PairedLeafRecorder {
    fn record(&mut self, doc: DocNo, ord: FacetOrd) -> Result<()> {
        self.first.record(doc, ord)?;
        if let Some(second) = self.second.as_mut() {
            second.record(doc, ord)?;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) {
        let PairedLeafRecorder { first, second } = *self;
        first.finish();
        if let Some(second) = second {
            second.finish();
        }
    }
}
