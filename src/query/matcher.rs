//! Document matchers deciding which documents of a segment are collected.

use std::collections::HashMap;

use roaring::RoaringBitmap;

use crate::error::Result;
use crate::segment::{DocValuesColumn, SegmentId, SegmentReader};

/// Selects the matching documents of a segment
///
/// Deleted documents are removed by the searcher, so matchers may ignore them.
pub trait DocMatcher: Send + Sync {
    fn matches(&self, segment: &SegmentReader) -> Result<RoaringBitmap>;

    fn matcher_type(&self) -> &'static str;
}

/// Matches every document
#[derive(Clone, Copy, Debug, Default)]
pub struct AllDocs;

impl DocMatcher for AllDocs {
    fn matches(&self, segment: &SegmentReader) -> Result<RoaringBitmap> {
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert_range(0..segment.max_doc());
        Ok(bitmap)
    }

    fn matcher_type(&self) -> &'static str {
        "all_docs"
    }
}

/// Matches documents with at least one long value in `[min, max]`
#[derive(Clone, Debug)]
pub struct LongRangeFilter {
    field: String,
    min: i64,
    max: i64,
}

impl LongRangeFilter {
    /// Unbounded filter on `field`; documents without a value never match
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    pub fn gte(mut self, value: i64) -> Self {
        self.min = value;
        self
    }

    pub fn gt(mut self, value: i64) -> Self {
        self.min = value.saturating_add(1);
        self
    }

    pub fn lte(mut self, value: i64) -> Self {
        self.max = value;
        self
    }

    pub fn lt(mut self, value: i64) -> Self {
        self.max = value.saturating_sub(1);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl DocMatcher for LongRangeFilter {
    fn matches(&self, segment: &SegmentReader) -> Result<RoaringBitmap> {
        if self.min > self.max {
            return Ok(RoaringBitmap::new());
        }
        let docvalues = segment.docvalues();
        if !docvalues.has_field(&self.field) {
            return Ok(RoaringBitmap::new());
        }
        match docvalues.column(&self.field)? {
            DocValuesColumn::MultiNumeric(column) => Ok(column.range_query(self.min, self.max)),
            _ => Ok(docvalues
                .numeric(&self.field)?
                .range_query(self.min, self.max)),
        }
    }

    fn matcher_type(&self) -> &'static str {
        "long_range"
    }
}

/// Matches precomputed document sets, keyed by segment
#[derive(Clone, Debug, Default)]
pub struct BitmapMatcher {
    docs: HashMap<SegmentId, RoaringBitmap>,
}

impl BitmapMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_segment(mut self, segment: SegmentId, docs: RoaringBitmap) -> Self {
        self.docs.insert(segment, docs);
        self
    }
}

impl DocMatcher for BitmapMatcher {
    fn matches(&self, segment: &SegmentReader) -> Result<RoaringBitmap> {
        let mut docs = self.docs.get(&segment.id()).cloned().unwrap_or_default();
        docs.remove_range(segment.max_doc()..);
        Ok(docs)
    }

    fn matcher_type(&self) -> &'static str {
        "bitmap"
    }
}
