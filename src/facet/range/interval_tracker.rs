//! Per-document record of which intervals a document's values hit.

use roaring::RoaringBitmap;

use crate::facet::ordinals::{FacetOrd, OrdinalIterator};

/// Set of hit interval indices in `0..size`, reset for every document
///
/// `Single` holds at most one hit and is used where a document can only land in
/// one interval. `Multi` is bitmap backed. After `freeze`, the tracker yields its
/// hits in ascending order through [`OrdinalIterator`].
#[derive(Clone, Debug)]
pub enum IntervalTracker {
    Single(SingleTracker),
    Multi(MultiTracker),
}

#[derive(Clone, Debug)]
pub struct SingleTracker {
    size: usize,
    hit: Option<usize>,
    emitted: bool,
}

#[derive(Clone, Debug)]
pub struct MultiTracker {
    size: usize,
    hits: RoaringBitmap,
    cursor: u32,
}

impl IntervalTracker {
    pub fn single(size: usize) -> Self {
        IntervalTracker::Single(SingleTracker {
            size,
            hit: None,
            emitted: false,
        })
    }

    pub fn multi(size: usize) -> Self {
        IntervalTracker::Multi(MultiTracker {
            size,
            hits: RoaringBitmap::new(),
            cursor: 0,
        })
    }

    /// Mark interval `index` as hit; a `Single` tracker keeps only the last hit
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.size(), "interval {index} out of bounds");
        match self {
            IntervalTracker::Single(t) => t.hit = Some(index),
            IntervalTracker::Multi(t) => {
                t.hits.insert(index as u32);
            }
        }
    }

    pub fn get(&self, index: usize) -> bool {
        match self {
            IntervalTracker::Single(t) => t.hit == Some(index),
            IntervalTracker::Multi(t) => t.hits.contains(index as u32),
        }
    }

    /// Forget all hits before moving to the next document
    pub fn clear(&mut self) {
        match self {
            IntervalTracker::Single(t) => {
                t.hit = None;
                t.emitted = false;
            }
            IntervalTracker::Multi(t) => {
                t.hits.clear();
                t.cursor = 0;
            }
        }
    }

    /// Finish setting hits and rewind iteration to the first hit
    pub fn freeze(&mut self) {
        match self {
            IntervalTracker::Single(t) => t.emitted = false,
            IntervalTracker::Multi(t) => t.cursor = 0,
        }
    }

    /// Number of trackable intervals
    pub fn size(&self) -> usize {
        match self {
            IntervalTracker::Single(t) => t.size,
            IntervalTracker::Multi(t) => t.size,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IntervalTracker::Single(t) => t.hit.is_none(),
            IntervalTracker::Multi(t) => t.hits.is_empty(),
        }
    }

    /// Visit every hit in ascending order without consuming the iteration
    pub fn for_each_hit(&self, mut f: impl FnMut(usize)) {
        match self {
            IntervalTracker::Single(t) => {
                if let Some(hit) = t.hit {
                    f(hit);
                }
            }
            IntervalTracker::Multi(t) => t.hits.iter().for_each(|hit| f(hit as usize)),
        }
    }
}

impl OrdinalIterator for IntervalTracker {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        match self {
            IntervalTracker::Single(t) => {
                if t.emitted {
                    return None;
                }
                t.emitted = true;
                t.hit.map(|hit| hit as FacetOrd)
            }
            IntervalTracker::Multi(t) => {
                let hit = t.hits.select(t.cursor)?;
                t.cursor += 1;
                Some(hit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tracker() {
        let mut tracker = IntervalTracker::single(4);
        assert!(tracker.is_empty());
        assert_eq!(tracker.next_ord(), None);

        tracker.clear();
        tracker.set(2);
        tracker.freeze();
        assert!(tracker.get(2));
        assert!(!tracker.get(1));
        assert_eq!(tracker.to_vec(), vec![2]);
        assert_eq!(tracker.next_ord(), None);

        tracker.clear();
        assert!(!tracker.get(2));
        assert_eq!(tracker.size(), 4);
    }

    #[test]
    fn test_multi_tracker_yields_ascending() {
        let mut tracker = IntervalTracker::multi(100);
        for index in [42, 3, 99, 3, 0] {
            tracker.set(index);
        }
        tracker.freeze();
        assert_eq!(tracker.to_vec(), vec![0, 3, 42, 99]);
        assert_eq!(tracker.next_ord(), None);

        // freeze rewinds
        tracker.freeze();
        assert_eq!(tracker.next_ord(), Some(0));

        let mut seen = Vec::new();
        tracker.for_each_hit(|hit| seen.push(hit));
        assert_eq!(seen, vec![0, 3, 42, 99]);

        tracker.clear();
        assert!(tracker.is_empty());
        tracker.freeze();
        assert_eq!(tracker.next_ord(), None);
    }
}
