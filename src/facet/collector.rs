//! Collector pairing a facet cutter with a facet recorder.

use super::cutter::{FacetCutter, LeafFacetCutter};
use super::recorder::{FacetRecorder, LeafFacetRecorder};
use super::rollup::FacetRollup;
use crate::error::Result;
use crate::query::{Collector, LeafCollector};
use crate::segment::{DocNo, SegmentReader};

/// Cuts every collected document into facet ordinals and records each one
///
/// After the search, call [`reduce`](Self::reduce) once and read the results from
/// the recorder.
pub struct FacetFieldCollector<C, R> {
    cutter: C,
    recorder: R,
}

impl<C: FacetCutter, R: FacetRecorder> FacetFieldCollector<C, R> {
    pub fn new(cutter: C, recorder: R) -> Self {
        Self { cutter, recorder }
    }

    /// Merge per-segment results and apply the optional rollup
    pub fn reduce(&mut self, rollup: Option<&dyn FacetRollup>) -> Result<()> {
        self.recorder.reduce(rollup)
    }

    pub fn cutter(&self) -> &C {
        &self.cutter
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_parts(self) -> (C, R) {
        (self.cutter, self.recorder)
    }
}

impl<C: FacetCutter, R: FacetRecorder> Collector for FacetFieldCollector<C, R> {
    fn leaf_collector(&self, segment: &SegmentReader) -> Result<Box<dyn LeafCollector>> {
        Ok(Box::new(FacetLeafCollector {
            cutter: self.cutter.create_leaf_cutter(segment)?,
            recorder: self.recorder.leaf_recorder(segment)?,
        }))
    }
}

struct FacetLeafCollector {
    cutter: Box<dyn LeafFacetCutter>,
    recorder: Box<dyn LeafFacetRecorder>,
}

impl LeafCollector for FacetLeafCollector {
    fn collect(&mut self, doc: DocNo) -> Result<()> {
        if !self.cutter.advance_exact(doc)? {
            return Ok(());
        }
        while let Some(ord) = self.cutter.next_ord() {
            self.recorder.record(doc, ord)?;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        self.recorder.finish();
        Ok(())
    }
}
