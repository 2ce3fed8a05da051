//! Requested ranges and the inclusive long intervals they normalize to.

use std::collections::HashSet;
use std::fmt;

use super::sortable::{double_to_sortable_long, next_down, next_up};
use crate::error::{FacetError, Result};

/// Closed interval `[start, end]` over the sortable long domain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InclusiveRange {
    pub start: i64,
    pub end: i64,
}

impl InclusiveRange {
    pub fn new(start: i64, end: i64) -> Self {
        debug_assert!(start <= end, "empty interval [{start}, {end}]");
        Self { start, end }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.start <= value && value <= self.end
    }

    /// True when `self` lies entirely inside `other`
    pub fn is_within(&self, other: &InclusiveRange) -> bool {
        other.start <= self.start && self.end <= other.end
    }
}

impl fmt::Display for InclusiveRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Labeled range of long values, stored with inclusive bounds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LongRange {
    label: String,
    min: i64,
    max: i64,
}

impl LongRange {
    /// Build a range; exclusive bounds are moved inward by one
    pub fn new(
        label: impl Into<String>,
        min: i64,
        min_inclusive: bool,
        max: i64,
        max_inclusive: bool,
    ) -> Result<Self> {
        let label = label.into();
        let min = if min_inclusive {
            Some(min)
        } else {
            min.checked_add(1)
        };
        let max = if max_inclusive {
            Some(max)
        } else {
            max.checked_sub(1)
        };
        match (min, max) {
            (Some(min), Some(max)) if min <= max => Ok(Self { label, min, max }),
            _ => Err(FacetError::InvalidRange(format!(
                "range '{}' does not contain any value",
                label
            ))),
        }
    }

    /// Range with both bounds inclusive
    pub fn inclusive(label: impl Into<String>, min: i64, max: i64) -> Result<Self> {
        Self::new(label, min, true, max, true)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn bounds(&self) -> InclusiveRange {
        InclusiveRange::new(self.min, self.max)
    }

    pub fn contains(&self, value: i64) -> bool {
        self.bounds().contains(value)
    }
}

/// Labeled range of double values
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleRange {
    label: String,
    min: f64,
    min_inclusive: bool,
    max: f64,
    max_inclusive: bool,
}

impl DoubleRange {
    pub fn new(
        label: impl Into<String>,
        min: f64,
        min_inclusive: bool,
        max: f64,
        max_inclusive: bool,
    ) -> Result<Self> {
        let label = label.into();
        if min.is_nan() || max.is_nan() {
            return Err(FacetError::InvalidRange(format!(
                "range '{}' has a NaN bound",
                label
            )));
        }
        let range = Self {
            label,
            min,
            min_inclusive,
            max,
            max_inclusive,
        };
        // Rejects empty ranges
        range.to_sortable_long_range()?;
        Ok(range)
    }

    pub fn inclusive(label: impl Into<String>, min: f64, max: f64) -> Result<Self> {
        Self::new(label, min, true, max, true)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether `value` falls in this range under the sortable order
    ///
    /// Agrees with the cutters: `-0.0` sorts below `0.0`, so `[0.0, 1.0]`
    /// excludes `-0.0`. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        match self.to_sortable_long_range() {
            Ok(range) => range.contains(double_to_sortable_long(value)),
            Err(_) => false,
        }
    }

    /// Equivalent inclusive long range over the sortable domain
    ///
    /// Exclusive bounds first move to the adjacent double, skipping the other
    /// zero, so `(-0.0, x]` starts at the smallest positive subnormal.
    pub fn to_sortable_long_range(&self) -> Result<LongRange> {
        let min = if self.min_inclusive {
            Some(self.min)
        } else if self.min == f64::INFINITY {
            None
        } else {
            Some(next_up(self.min))
        };
        let max = if self.max_inclusive {
            Some(self.max)
        } else if self.max == f64::NEG_INFINITY {
            None
        } else {
            Some(next_down(self.max))
        };
        match (min, max) {
            (Some(min), Some(max)) => LongRange::inclusive(
                self.label.clone(),
                double_to_sortable_long(min),
                double_to_sortable_long(max),
            ),
            _ => Err(FacetError::InvalidRange(format!(
                "range '{}' does not contain any value",
                self.label
            ))),
        }
    }
}

/// Requested range together with its position in the request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeAndPos {
    pub range: InclusiveRange,
    pub pos: usize,
}

/// Pair each range with its request position, sorted by start then end
pub(crate) fn sorted_ranges(ranges: &[LongRange]) -> Vec<RangeAndPos> {
    let mut sorted: Vec<RangeAndPos> = ranges
        .iter()
        .enumerate()
        .map(|(pos, range)| RangeAndPos {
            range: range.bounds(),
            pos,
        })
        .collect();
    sorted.sort_by_key(|r| (r.range.start, r.range.end));
    sorted
}

pub(crate) fn check_unique_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(FacetError::InvalidRange(format!(
                "duplicate range label '{}'",
                label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_bounds_normalize() {
        let range = LongRange::new("r", 0, false, 10, false).unwrap();
        assert_eq!((range.min(), range.max()), (1, 9));
        assert!(!range.contains(0));
        assert!(range.contains(9));

        let point = LongRange::new("p", 4, true, 5, false).unwrap();
        assert_eq!((point.min(), point.max()), (4, 4));
    }

    #[test]
    fn test_empty_long_ranges_rejected() {
        assert!(LongRange::inclusive("r", 5, 4).is_err());
        assert!(LongRange::new("r", 4, false, 5, false).is_err());
        assert!(LongRange::new("r", i64::MAX, false, i64::MAX, true).is_err());
        assert!(LongRange::new("r", i64::MIN, true, i64::MIN, false).is_err());
        assert!(LongRange::inclusive("full", i64::MIN, i64::MAX).is_ok());
    }

    #[test]
    fn test_double_range_validation() {
        assert!(DoubleRange::inclusive("nan", f64::NAN, 1.0).is_err());
        assert!(DoubleRange::inclusive("backwards", 2.0, 1.0).is_err());
        assert!(DoubleRange::new("empty", 1.0, false, 1.0, true).is_err());

        let range = DoubleRange::new("r", 0.0, false, 1.0, true).unwrap();
        assert!(!range.contains(0.0));
        assert!(range.contains(1.0));

        let long = range.to_sortable_long_range().unwrap();
        assert_eq!(long.min(), double_to_sortable_long(0.0) + 1);
        assert_eq!(long.max(), double_to_sortable_long(1.0));
        assert_eq!(long.label(), "r");
    }

    #[test]
    fn test_sorted_ranges_keep_positions() {
        let ranges = vec![
            LongRange::inclusive("b", 10, 20).unwrap(),
            LongRange::inclusive("a", 0, 5).unwrap(),
            LongRange::inclusive("c", 0, 3).unwrap(),
        ];
        let sorted = sorted_ranges(&ranges);
        let positions: Vec<usize> = sorted.iter().map(|r| r.pos).collect();
        assert_eq!(positions, vec![2, 1, 0]);
    }

    #[test]
    fn test_duplicate_labels() {
        assert!(check_unique_labels(["a", "b"]).is_ok());
        assert!(matches!(
            check_unique_labels(["a", "b", "a"]),
            Err(FacetError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_exclusive_zero_bounds_skip_other_zero() {
        let tiny = f64::from_bits(1);

        let above = DoubleRange::new("a", -0.0, false, 1.0, true).unwrap();
        let long = above.to_sortable_long_range().unwrap();
        assert_eq!(long.min(), double_to_sortable_long(tiny));
        assert!(!long.contains(double_to_sortable_long(-0.0)));
        assert!(!long.contains(double_to_sortable_long(0.0)));
        assert!(!above.contains(0.0));
        assert!(above.contains(tiny));

        let below = DoubleRange::new("b", -1.0, true, 0.0, false).unwrap();
        let long = below.to_sortable_long_range().unwrap();
        assert_eq!(long.max(), double_to_sortable_long(-tiny));
        assert!(!long.contains(double_to_sortable_long(-0.0)));
        assert!(!long.contains(double_to_sortable_long(0.0)));
        assert!(!below.contains(-0.0));
        assert!(below.contains(-tiny));
    }

    #[test]
    fn test_contains_follows_sortable_order() {
        let unit = DoubleRange::inclusive("unit", 0.0, 1.0).unwrap();
        assert!(unit.contains(0.0));
        assert!(!unit.contains(-0.0));
        assert!(!unit.contains(f64::NAN));

        let zeroes = DoubleRange::inclusive("zeroes", -0.0, 0.0).unwrap();
        assert!(zeroes.contains(-0.0));
        assert!(zeroes.contains(0.0));
        assert!(!zeroes.contains(f64::from_bits(1)));

        let open =
            DoubleRange::new("open", f64::NEG_INFINITY, true, f64::INFINITY, false).unwrap();
        assert!(open.contains(f64::NEG_INFINITY));
        assert!(open.contains(f64::MAX));
        assert!(!open.contains(f64::INFINITY));
    }

    #[test]
    fn test_exclusive_infinite_bounds_are_empty() {
        assert!(DoubleRange::new("up", f64::INFINITY, false, f64::INFINITY, true).is_err());
        let down = DoubleRange::new("down", f64::NEG_INFINITY, true, f64::NEG_INFINITY, false);
        assert!(down.is_err());
        assert!(DoubleRange::new("point", 0.0, false, f64::from_bits(1), true).is_ok());
    }
}
