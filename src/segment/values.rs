//! Per-document value access for cutters and recorders
//!
//! A `*ValuesSource` is shared by all segments of a search and produces a fresh,
//! thread-confined `*Values` reader for each segment. Readers are positioned with
//! `advance_exact` and must be advanced in ascending docno order within a segment.
//! Multi-valued readers yield a document's values in ascending order.

use std::sync::Arc;

use super::docvalues::{DoubleColumn, MultiDoubleColumn, MultiNumericColumn, NumericColumn};
use super::reader::SegmentReader;
use super::types::DocNo;
use crate::error::Result;
use crate::facet::range::sortable::double_to_sortable_long;

/// Single long value per document
pub trait LongValues {
    /// Position on `doc`; returns false when the document has no value
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool>;
    /// Value of the current document, valid after `advance_exact` returned true
    fn long_value(&self) -> i64;
}

/// Zero or more long values per document, in ascending order
pub trait MultiLongValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool>;
    fn value_count(&self) -> usize;
    /// Next value of the current document; call at most `value_count` times
    fn next_value(&mut self) -> i64;
}

/// Single double value per document
pub trait DoubleValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool>;
    fn double_value(&self) -> f64;
}

/// Zero or more double values per document, in ascending order
pub trait MultiDoubleValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool>;
    fn value_count(&self) -> usize;
    fn next_value(&mut self) -> f64;
}

pub trait LongValuesSource: Send + Sync {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn LongValues>>;
}

pub trait MultiLongValuesSource: Send + Sync {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn MultiLongValues>>;
}

pub trait DoubleValuesSource: Send + Sync {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn DoubleValues>>;
}

pub trait MultiDoubleValuesSource: Send + Sync {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn MultiDoubleValues>>;
}

/// Long values read from a single-valued numeric column
#[derive(Clone, Debug)]
pub struct LongField {
    field: String,
}

impl LongField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

struct NumericColumnValues {
    column: Arc<NumericColumn>,
    current: i64,
}

impl LongValues for NumericColumnValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        match self.column.get(doc) {
            Some(v) => {
                self.current = v;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn long_value(&self) -> i64 {
        self.current
    }
}

impl LongValuesSource for LongField {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn LongValues>> {
        let column = segment.docvalues().numeric(&self.field)?;
        Ok(Box::new(NumericColumnValues { column, current: 0 }))
    }
}

/// Long values read from either a numeric or a multi numeric column
#[derive(Clone, Debug)]
pub struct MultiLongField {
    field: String,
}

impl MultiLongField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

struct MultiNumericColumnValues {
    column: Arc<MultiNumericColumn>,
    doc: DocNo,
    upto: usize,
}

impl MultiLongValues for MultiNumericColumnValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.doc = doc;
        self.upto = 0;
        Ok(!self.column.get(doc).is_empty())
    }

    fn value_count(&self) -> usize {
        self.column.get(self.doc).len()
    }

    fn next_value(&mut self) -> i64 {
        let value = self.column.get(self.doc)[self.upto];
        self.upto += 1;
        value
    }
}

/// Presents a single-valued reader as a multi-valued one with at most one value
struct SingletonLongValues {
    inner: Box<dyn LongValues>,
}

impl MultiLongValues for SingletonLongValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.inner.advance_exact(doc)
    }

    fn value_count(&self) -> usize {
        1
    }

    fn next_value(&mut self) -> i64 {
        self.inner.long_value()
    }
}

impl MultiLongValuesSource for MultiLongField {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn MultiLongValues>> {
        let docvalues = segment.docvalues();
        if let Ok(column) = docvalues.multi_numeric(&self.field) {
            return Ok(Box::new(MultiNumericColumnValues {
                column,
                doc: DocNo(0),
                upto: 0,
            }));
        }
        let column = docvalues.numeric(&self.field)?;
        Ok(Box::new(SingletonLongValues {
            inner: Box::new(NumericColumnValues { column, current: 0 }),
        }))
    }
}

/// Double values read from a single-valued double column
#[derive(Clone, Debug)]
pub struct DoubleField {
    field: String,
}

impl DoubleField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

struct DoubleColumnValues {
    column: Arc<DoubleColumn>,
    current: f64,
}

impl DoubleValues for DoubleColumnValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        match self.column.get(doc) {
            Some(v) => {
                self.current = v;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn double_value(&self) -> f64 {
        self.current
    }
}

impl DoubleValuesSource for DoubleField {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn DoubleValues>> {
        let column = segment.docvalues().double(&self.field)?;
        Ok(Box::new(DoubleColumnValues {
            column,
            current: 0.0,
        }))
    }
}

/// Double values read from either a double or a multi double column
#[derive(Clone, Debug)]
pub struct MultiDoubleField {
    field: String,
}

impl MultiDoubleField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

struct MultiDoubleColumnValues {
    column: Arc<MultiDoubleColumn>,
    doc: DocNo,
    upto: usize,
}

impl MultiDoubleValues for MultiDoubleColumnValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.doc = doc;
        self.upto = 0;
        Ok(!self.column.get(doc).is_empty())
    }

    fn value_count(&self) -> usize {
        self.column.get(self.doc).len()
    }

    fn next_value(&mut self) -> f64 {
        let value = self.column.get(self.doc)[self.upto];
        self.upto += 1;
        value
    }
}

struct SingletonDoubleValues {
    inner: Box<dyn DoubleValues>,
}

impl MultiDoubleValues for SingletonDoubleValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.inner.advance_exact(doc)
    }

    fn value_count(&self) -> usize {
        1
    }

    fn next_value(&mut self) -> f64 {
        self.inner.double_value()
    }
}

impl MultiDoubleValuesSource for MultiDoubleField {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn MultiDoubleValues>> {
        let docvalues = segment.docvalues();
        if let Ok(column) = docvalues.multi_double(&self.field) {
            return Ok(Box::new(MultiDoubleColumnValues {
                column,
                doc: DocNo(0),
                upto: 0,
            }));
        }
        let column = docvalues.double(&self.field)?;
        Ok(Box::new(SingletonDoubleValues {
            inner: Box::new(DoubleColumnValues {
                column,
                current: 0.0,
            }),
        }))
    }
}

/// Exposes double values as sortable longs, preserving order
pub struct SortableLongValuesSource {
    inner: Arc<dyn DoubleValuesSource>,
}

impl SortableLongValuesSource {
    pub fn new(inner: Arc<dyn DoubleValuesSource>) -> Self {
        Self { inner }
    }
}

struct SortableLongValues {
    inner: Box<dyn DoubleValues>,
}

impl LongValues for SortableLongValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.inner.advance_exact(doc)
    }

    fn long_value(&self) -> i64 {
        double_to_sortable_long(self.inner.double_value())
    }
}

impl LongValuesSource for SortableLongValuesSource {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn LongValues>> {
        Ok(Box::new(SortableLongValues {
            inner: self.inner.values(segment)?,
        }))
    }
}

/// Multi-valued counterpart of [`SortableLongValuesSource`]
pub struct SortableMultiLongValuesSource {
    inner: Arc<dyn MultiDoubleValuesSource>,
}

impl SortableMultiLongValuesSource {
    pub fn new(inner: Arc<dyn MultiDoubleValuesSource>) -> Self {
        Self { inner }
    }
}

struct SortableMultiLongValues {
    inner: Box<dyn MultiDoubleValues>,
}

impl MultiLongValues for SortableMultiLongValues {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.inner.advance_exact(doc)
    }

    fn value_count(&self) -> usize {
        self.inner.value_count()
    }

    fn next_value(&mut self) -> i64 {
        double_to_sortable_long(self.inner.next_value())
    }
}

impl MultiLongValuesSource for SortableMultiLongValuesSource {
    fn values(&self, segment: &SegmentReader) -> Result<Box<dyn MultiLongValues>> {
        Ok(Box::new(SortableMultiLongValues {
            inner: self.inner.values(segment)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::segment::{SegmentId, SegmentWriter};

    fn segment() -> SegmentReader {
        let mut writer = SegmentWriter::new(SegmentId(0));
        let docs = [
            Document::new(1).with_long("single", 4).with_doubles("multi_d", vec![2.5, -1.0]),
            Document::new(2).with_longs("multi", vec![3, 1]),
            Document::new(3).with_long("single", -2).with_double("d", 1.5),
        ];
        for doc in &docs {
            writer.add_document(doc, None).unwrap();
        }
        writer.finish()
    }

    fn drain(values: &mut dyn MultiLongValues) -> Vec<i64> {
        (0..values.value_count()).map(|_| values.next_value()).collect()
    }

    #[test]
    fn test_long_field() {
        let segment = segment();
        let mut values = LongField::new("single").values(&segment).unwrap();

        assert!(values.advance_exact(DocNo(0)).unwrap());
        assert_eq!(values.long_value(), 4);
        assert!(!values.advance_exact(DocNo(1)).unwrap());
        assert!(values.advance_exact(DocNo(2)).unwrap());
        assert_eq!(values.long_value(), -2);
    }

    #[test]
    fn test_multi_long_field_over_both_column_types() {
        let segment = segment();

        let mut multi = MultiLongField::new("multi").values(&segment).unwrap();
        assert!(!multi.advance_exact(DocNo(0)).unwrap());
        assert!(multi.advance_exact(DocNo(1)).unwrap());
        assert_eq!(drain(multi.as_mut()), vec![1, 3]);

        let mut single = MultiLongField::new("single").values(&segment).unwrap();
        assert!(single.advance_exact(DocNo(2)).unwrap());
        assert_eq!(drain(single.as_mut()), vec![-2]);
    }

    #[test]
    fn test_sortable_sources_preserve_order() {
        let segment = segment();
        let source = SortableMultiLongValuesSource::new(Arc::new(MultiDoubleField::new("multi_d")));
        let mut values = source.values(&segment).unwrap();

        assert!(values.advance_exact(DocNo(0)).unwrap());
        let longs = drain(values.as_mut());
        assert_eq!(
            longs,
            vec![double_to_sortable_long(-1.0), double_to_sortable_long(2.5)]
        );
        assert!(longs[0] < longs[1]);

        let single = SortableLongValuesSource::new(Arc::new(DoubleField::new("d")));
        let mut values = single.values(&segment).unwrap();
        assert!(values.advance_exact(DocNo(2)).unwrap());
        assert_eq!(values.long_value(), double_to_sortable_long(1.5));
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let segment = segment();
        assert!(LongField::new("nope").values(&segment).is_err());
        assert!(MultiLongField::new("d").values(&segment).is_err());
    }
}
