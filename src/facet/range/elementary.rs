//! Elementary intervals: the partition of the long domain induced by the
//! requested ranges' endpoints.
//!
//! Every requested range is exactly the union of a run of elementary intervals,
//! so classifying a value only needs the single elementary interval it falls in.

use std::collections::BTreeMap;

use super::types::{InclusiveRange, RangeAndPos};

const START: u8 = 1;
const END: u8 = 2;

/// Partition for ranges that may overlap
///
/// Endpoints are flagged as range starts, range ends, or both. A point that is
/// both becomes its own singleton interval so ranges that only touch there can be
/// told apart.
pub fn build_overlapping_intervals(ranges: &[RangeAndPos]) -> Vec<InclusiveRange> {
    let mut ends: BTreeMap<i64, u8> = BTreeMap::new();
    ends.insert(i64::MIN, START);
    *ends.entry(i64::MAX).or_insert(0) |= END;
    for r in ranges {
        *ends.entry(r.range.start).or_insert(0) |= START;
        *ends.entry(r.range.end).or_insert(0) |= END;
    }

    let mut intervals = Vec::with_capacity(ends.len() * 2);
    let mut ends = ends.into_iter();
    // The map always holds i64::MIN
    let mut prev = match ends.next() {
        Some((v, flags)) if flags == START | END => {
            intervals.push(InclusiveRange::new(v, v));
            v.checked_add(1)
        }
        Some((v, _)) => Some(v),
        None => return vec![InclusiveRange::new(i64::MIN, i64::MAX)],
    };

    for (v, flags) in ends {
        let Some(p) = prev else { break };
        if flags == START | END {
            if v > p {
                intervals.push(InclusiveRange::new(p, v - 1));
            }
            intervals.push(InclusiveRange::new(v, v));
            prev = v.checked_add(1);
        } else if flags == START {
            if v > p {
                intervals.push(InclusiveRange::new(p, v - 1));
            }
            prev = Some(v);
        } else {
            intervals.push(InclusiveRange::new(p, v));
            prev = v.checked_add(1);
        }
    }
    intervals
}

/// Partition for pairwise disjoint ranges sorted by start
///
/// Each requested range is one interval; the gaps between them are filled with
/// intervals that map to no range.
pub fn build_disjoint_intervals(ranges: &[RangeAndPos]) -> Vec<InclusiveRange> {
    let mut intervals = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut prev = Some(i64::MIN);
    for r in ranges {
        let Some(p) = prev else { break };
        if r.range.start > p {
            intervals.push(InclusiveRange::new(p, r.range.start - 1));
        }
        intervals.push(r.range);
        prev = r.range.end.checked_add(1);
    }
    if let Some(p) = prev {
        intervals.push(InclusiveRange::new(p, i64::MAX));
    }
    intervals
}

/// True when any two ranges share a value; input must be sorted by start
pub fn are_overlapping(sorted: &[RangeAndPos]) -> bool {
    sorted
        .windows(2)
        .any(|pair| pair[1].range.start <= pair[0].range.end)
}

/// Inclusive end of each interval, ascending
pub(crate) fn boundaries(intervals: &[InclusiveRange]) -> Vec<i64> {
    intervals.iter().map(|i| i.end).collect()
}

/// For disjoint layouts: request position of the range each interval is, if any
pub(crate) fn disjoint_positions(boundaries: &[i64], sorted: &[RangeAndPos]) -> Vec<Option<usize>> {
    let mut pos = vec![None; boundaries.len()];
    let mut current = sorted.iter().peekable();
    for (i, boundary) in boundaries.iter().enumerate() {
        if let Some(range) = current.peek() {
            if *boundary == range.range.end {
                pos[i] = Some(range.pos);
                current.next();
            }
        }
    }
    pos
}

/// Index of the first interval at or after `from` whose end is `>= value`
///
/// The last boundary is `i64::MAX`, so any `from` within bounds finds one.
pub(crate) fn find_interval(boundaries: &[i64], value: i64, from: usize) -> usize {
    from + boundaries[from..].partition_point(|&end| end < value)
}
