//! Segment tree over elementary intervals, used to map elementary interval hits
//! to the (possibly overlapping) requested ranges that contain them.
//!
//! Nodes live in an arena and refer to their children by [`NodeIndex`]. Each
//! requested range is attached to the maximal nodes whose span lies inside it, so
//! a bottom-up pass that knows which leaves were hit can mark every requested
//! range touching those leaves without looking at ranges one by one.

use std::fmt;
use std::ops::Index;

use super::interval_tracker::IntervalTracker;
use super::types::{InclusiveRange, RangeAndPos};

/// Index of a node in the tree's arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub struct RangeNode {
    pub start: i64,
    pub end: i64,
    pub left: Option<NodeIndex>,
    pub right: Option<NodeIndex>,
    /// Position of the elementary interval, leaves only
    pub elementary_interval: Option<usize>,
    /// Request positions of the ranges this node is a maximal part of
    pub outputs: Vec<usize>,
}

impl RangeNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }

    fn span(&self) -> InclusiveRange {
        InclusiveRange::new(self.start, self.end)
    }
}

#[derive(Clone, Debug)]
pub struct SegmentTree {
    nodes: Vec<RangeNode>,
    root: NodeIndex,
}

impl SegmentTree {
    /// Build a balanced tree whose leaves are `intervals`, in order
    pub fn build(intervals: &[InclusiveRange]) -> Self {
        let mut tree = SegmentTree {
            nodes: Vec::with_capacity(intervals.len() * 2),
            root: NodeIndex(0),
        };
        tree.root = if intervals.is_empty() {
            tree.push(RangeNode {
                start: i64::MIN,
                end: i64::MAX,
                left: None,
                right: None,
                elementary_interval: None,
                outputs: Vec::new(),
            })
        } else {
            tree.split(intervals, 0, intervals.len())
        };
        tree
    }

    /// Build the tree and attach every requested range
    pub fn with_outputs(intervals: &[InclusiveRange], ranges: &[RangeAndPos]) -> Self {
        let mut tree = Self::build(intervals);
        for range in ranges {
            tree.add_outputs(range);
        }
        tree
    }

    fn push(&mut self, node: RangeNode) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        index
    }

    fn split(&mut self, intervals: &[InclusiveRange], start: usize, end: usize) -> NodeIndex {
        if start + 1 == end {
            let interval = intervals[start];
            return self.push(RangeNode {
                start: interval.start,
                end: interval.end,
                left: None,
                right: None,
                elementary_interval: Some(start),
                outputs: Vec::new(),
            });
        }
        let mid = start + (end - start) / 2;
        let left = self.split(intervals, start, mid);
        let right = self.split(intervals, mid, end);
        self.push(RangeNode {
            start: self[left].start,
            end: self[right].end,
            left: Some(left),
            right: Some(right),
            elementary_interval: None,
            outputs: Vec::new(),
        })
    }

    /// Attach `range` to the maximal nodes lying inside it
    pub fn add_outputs(&mut self, range: &RangeAndPos) {
        self.add_outputs_at(self.root, range);
    }

    fn add_outputs_at(&mut self, index: NodeIndex, range: &RangeAndPos) {
        let node = &self.nodes[index.as_usize()];
        let span = node.span();
        if span.is_within(&range.range) {
            self.nodes[index.as_usize()].outputs.push(range.pos);
        } else if span.end >= range.range.start && span.start <= range.range.end {
            if let (Some(left), Some(right)) = (node.left, node.right) {
                self.add_outputs_at(left, range);
                self.add_outputs_at(right, range);
            }
        }
    }

    /// Mark in `requested` every range attached to a node with a hit leaf below it
    pub fn roll_up(&self, elementary: &IntervalTracker, requested: &mut IntervalTracker) {
        if elementary.is_empty() {
            return;
        }
        self.roll_up_at(self.root, elementary, requested);
    }

    fn roll_up_at(
        &self,
        index: NodeIndex,
        elementary: &IntervalTracker,
        requested: &mut IntervalTracker,
    ) -> bool {
        let node = &self[index];
        let contains_hit = match (node.left, node.right) {
            (Some(left), Some(right)) => {
                let left_hit = self.roll_up_at(left, elementary, requested);
                let right_hit = self.roll_up_at(right, elementary, requested);
                left_hit || right_hit
            }
            _ => node
                .elementary_interval
                .map_or(false, |interval| elementary.get(interval)),
        };
        if contains_hit {
            for &pos in &node.outputs {
                requested.set(pos);
            }
        }
        contains_hit
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, index: NodeIndex, depth: usize) -> fmt::Result {
        let node = &self[index];
        let kind = if node.is_leaf() { "leaf" } else { "node" };
        write!(f, "{:indent$}{}: {} to {}", "", kind, node.start, node.end, indent = depth * 2)?;
        if !node.outputs.is_empty() {
            write!(f, " outputs={:?}", node.outputs)?;
        }
        writeln!(f)?;
        if let (Some(left), Some(right)) = (node.left, node.right) {
            self.fmt_node(f, left, depth + 1)?;
            self.fmt_node(f, right, depth + 1)?;
        }
        Ok(())
    }
}

impl Index<NodeIndex> for SegmentTree {
    type Output = RangeNode;

    fn index(&self, index: NodeIndex) -> &RangeNode {
        &self.nodes[index.as_usize()]
    }
}

impl fmt::Display for SegmentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}
