//! Collectors receive the matching documents of each segment.
//!
//! A [`Collector`] is shared by every worker of a search and hands out one
//! [`LeafCollector`] per segment. Leaf collectors are confined to the thread
//! collecting their segment; matching documents arrive in ascending docno order.

use crate::error::Result;
use crate::segment::{DocNo, SegmentReader};

/// Per-segment document sink
pub trait LeafCollector {
    fn collect(&mut self, doc: DocNo) -> Result<()>;

    /// Called once after the last document of the segment
    fn finish(self: Box<Self>) -> Result<()>;
}

pub trait Collector: Sync {
    fn leaf_collector(&self, segment: &SegmentReader) -> Result<Box<dyn LeafCollector>>;
}

/// Feeds the same documents to several collectors
#[derive(Default)]
pub struct MultiCollector<'a> {
    collectors: Vec<&'a dyn Collector>,
}

impl<'a> MultiCollector<'a> {
    pub fn new() -> Self {
        Self {
            collectors: Vec::new(),
        }
    }

    pub fn with(mut self, collector: &'a dyn Collector) -> Self {
        self.collectors.push(collector);
        self
    }

    pub fn push(&mut self, collector: &'a dyn Collector) {
        self.collectors.push(collector);
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl Collector for MultiCollector<'_> {
    fn leaf_collector(&self, segment: &SegmentReader) -> Result<Box<dyn LeafCollector>> {
        let leaves = self
            .collectors
            .iter()
            .map(|c| c.leaf_collector(segment))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(MultiLeafCollector { leaves }))
    }
}

struct MultiLeafCollector {
    leaves: Vec<Box<dyn LeafCollector>>,
}

impl LeafCollector for MultiLeafCollector {
    fn collect(&mut self, doc: DocNo) -> Result<()> {
        for leaf in &mut self.leaves {
            leaf.collect(doc)?;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        for leaf in self.leaves {
            leaf.finish()?;
        }
        Ok(())
    }
}
