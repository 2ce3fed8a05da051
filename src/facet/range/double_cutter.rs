//! Range facet cutter over double values, delegating to the long cutter in the
//! sortable long domain.

use std::sync::Arc;

use super::long_cutter::{LongRangeFacetCutter, LongRangeSource, RangeLayout};
use super::types::{check_unique_labels, DoubleRange, LongRange};
use crate::error::Result;
use crate::facet::cutter::{FacetCutter, LeafFacetCutter};
use crate::facet::ordinals::FacetOrd;
use crate::segment::{
    DoubleValuesSource, MultiDoubleValuesSource, SegmentReader, SortableLongValuesSource,
    SortableMultiLongValuesSource,
};

#[derive(Clone)]
pub enum DoubleRangeSource {
    Single(Arc<dyn DoubleValuesSource>),
    Multi(Arc<dyn MultiDoubleValuesSource>),
}

impl DoubleRangeSource {
    fn to_sortable(&self) -> LongRangeSource {
        match self {
            DoubleRangeSource::Single(source) => {
                LongRangeSource::Single(Arc::new(SortableLongValuesSource::new(source.clone())))
            }
            DoubleRangeSource::Multi(source) => LongRangeSource::Multi(Arc::new(
                SortableMultiLongValuesSource::new(source.clone()),
            )),
        }
    }
}

/// [`FacetCutter`] assigning documents to the requested double ranges they fall in
#[derive(Clone)]
pub struct DoubleRangeFacetCutter {
    ranges: Vec<DoubleRange>,
    inner: LongRangeFacetCutter,
}

impl DoubleRangeFacetCutter {
    pub fn create(source: DoubleRangeSource, ranges: Vec<DoubleRange>) -> Result<Self> {
        check_unique_labels(ranges.iter().map(|r| r.label()))?;
        let long_ranges = ranges
            .iter()
            .map(DoubleRange::to_sortable_long_range)
            .collect::<Result<Vec<LongRange>>>()?;
        let inner = LongRangeFacetCutter::create(source.to_sortable(), long_ranges)?;
        Ok(Self { ranges, inner })
    }

    pub fn layout(&self) -> RangeLayout {
        self.inner.layout()
    }

    pub fn ranges(&self) -> &[DoubleRange] {
        &self.ranges
    }

    pub fn label(&self, ord: FacetOrd) -> Option<&str> {
        self.ranges.get(ord as usize).map(|r| r.label())
    }
}

impl FacetCutter for DoubleRangeFacetCutter {
    fn create_leaf_cutter(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetCutter>> {
        self.inner.create_leaf_cutter(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::segment::{DocNo, DoubleField, MultiDoubleField, SegmentId, SegmentWriter};

    fn segment() -> SegmentReader {
        let mut writer = SegmentWriter::new(SegmentId(0));
        let docs = [
            Document::new(0).with_double("d", -0.5).with_doubles("m", vec![-2.0, 0.25]),
            Document::new(1).with_double("d", 0.0).with_doubles("m", vec![1.0, 7.5]),
            Document::new(2).with_double("d", 1.0),
            Document::new(3).with_double("d", f64::INFINITY),
        ];
        for doc in &docs {
            writer.add_document(doc, None).unwrap();
        }
        writer.finish()
    }

    fn cut_all(cutter: &DoubleRangeFacetCutter, segment: &SegmentReader) -> Vec<Vec<u32>> {
        let mut leaf = cutter.create_leaf_cutter(segment).unwrap();
        (0..segment.max_doc())
            .map(|doc| {
                if leaf.advance_exact(DocNo(doc)).unwrap() {
                    leaf.to_vec()
                } else {
                    Vec::new()
                }
            })
            .collect()
    }

    #[test]
    fn test_single_valued_double_ranges() {
        let ranges = vec![
            DoubleRange::new("negative", f64::NEG_INFINITY, true, 0.0, false).unwrap(),
            DoubleRange::new("unit", 0.0, true, 1.0, true).unwrap(),
            DoubleRange::new("above_one", 1.0, false, f64::INFINITY, true).unwrap(),
        ];
        let source = DoubleRangeSource::Single(Arc::new(DoubleField::new("d")));
        let cutter = DoubleRangeFacetCutter::create(source, ranges).unwrap();
        assert_eq!(cutter.layout(), RangeLayout::Disjoint);
        assert_eq!(cutter.label(2), Some("above_one"));

        assert_eq!(
            cut_all(&cutter, &segment()),
            vec![vec![0], vec![1], vec![1], vec![2]]
        );
    }

    #[test]
    fn test_multi_valued_overlapping_double_ranges() {
        let ranges = vec![
            DoubleRange::inclusive("small", -1.0, 1.0).unwrap(),
            DoubleRange::inclusive("wide", -10.0, 10.0).unwrap(),
        ];
        let source = DoubleRangeSource::Multi(Arc::new(MultiDoubleField::new("m")));
        let cutter = DoubleRangeFacetCutter::create(source, ranges).unwrap();
        assert_eq!(cutter.layout(), RangeLayout::Overlapping);

        assert_eq!(
            cut_all(&cutter, &segment()),
            vec![vec![0, 1], vec![0, 1], vec![], vec![]]
        );
    }

    #[test]
    fn test_exclusive_signed_zero_bounds() {
        let tiny = f64::from_bits(1);
        let mut writer = SegmentWriter::new(SegmentId(0));
        for (id, value) in [-tiny, -0.0, 0.0, tiny].into_iter().enumerate() {
            let doc = Document::new(id as u64).with_double("d", value);
            writer.add_document(&doc, None).unwrap();
        }
        let segment = writer.finish();

        let ranges = vec![
            DoubleRange::new("above_neg_zero", -0.0, false, 1.0, true).unwrap(),
            DoubleRange::new("below_pos_zero", -1.0, true, 0.0, false).unwrap(),
        ];
        let source = DoubleRangeSource::Single(Arc::new(DoubleField::new("d")));
        let cutter = DoubleRangeFacetCutter::create(source, ranges).unwrap();

        assert_eq!(
            cut_all(&cutter, &segment),
            vec![vec![1], vec![], vec![], vec![0]]
        );
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let ranges = vec![
            DoubleRange::inclusive("x", 0.0, 1.0).unwrap(),
            DoubleRange::inclusive("x", 2.0, 3.0).unwrap(),
        ];
        let source = DoubleRangeSource::Single(Arc::new(DoubleField::new("d")));
        assert!(DoubleRangeFacetCutter::create(source, ranges).is_err());
    }
}
