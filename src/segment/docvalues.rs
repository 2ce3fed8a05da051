//! DocValues for columnar per-document values
//!
//! typed column stores with:
//! - numeric: one optional long per document, with null bitmap and min/max
//! - multi numeric: sorted longs per document (offset encoded)
//! - double / multi double: same layout for floating point values
//! - ordinals: sorted taxonomy ordinals per document

use std::collections::HashMap;
use std::sync::Arc;

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

use super::types::DocNo;
use crate::error::{FacetError, Result};

/// Column types for doc values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    MultiNumeric,
    Double,
    MultiDouble,
    Ordinals,
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::MultiNumeric => "multi numeric",
            ColumnType::Double => "double",
            ColumnType::MultiDouble => "multi double",
            ColumnType::Ordinals => "ordinals",
        }
    }
}

/// Numeric column with one optional value per document
#[derive(Clone, Debug)]
pub struct NumericColumn {
    /// Values indexed by docno (None for missing values)
    values: Vec<Option<i64>>,
    /// Null bitmap
    nulls: RoaringBitmap,
    /// Global min value
    min_value: Option<i64>,
    /// Global max value
    max_value: Option<i64>,
}

impl NumericColumn {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            nulls: RoaringBitmap::new(),
            min_value: None,
            max_value: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Add a value for the next docno
    pub fn add(&mut self, value: Option<i64>) {
        let docno = self.values.len() as u32;

        if let Some(v) = value {
            self.min_value = Some(self.min_value.map_or(v, |m| m.min(v)));
            self.max_value = Some(self.max_value.map_or(v, |m| m.max(v)));
        } else {
            self.nulls.insert(docno);
        }

        self.values.push(value);
    }

    /// Get value for a docno
    pub fn get(&self, docno: DocNo) -> Option<i64> {
        self.values.get(docno.as_usize()).copied().flatten()
    }

    /// Check if a docno has a null value
    pub fn is_null(&self, docno: DocNo) -> bool {
        self.nulls.contains(docno.as_u32())
    }

    /// Get documents with value in range [min, max]
    pub fn range_query(&self, min: i64, max: i64) -> RoaringBitmap {
        let mut result = RoaringBitmap::new();
        if self.max_value.map_or(true, |m| m < min) || self.min_value.map_or(true, |m| m > max) {
            return result;
        }
        for (docno, value) in self.values.iter().enumerate() {
            if let Some(v) = value {
                if *v >= min && *v <= max {
                    result.insert(docno as u32);
                }
            }
        }
        result
    }

    pub fn min_value(&self) -> Option<i64> {
        self.min_value
    }

    pub fn max_value(&self) -> Option<i64> {
        self.max_value
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for NumericColumn {
    fn default() -> Self {
        Self::new()
    }
}

/// Column with zero or more values per document, stored sorted per document
#[derive(Clone, Debug)]
pub struct MultiValueColumn<T> {
    /// offsets[docno]..offsets[docno + 1] indexes into values
    offsets: Vec<u32>,
    values: Vec<T>,
}

impl<T: Copy> MultiValueColumn<T> {
    fn empty() -> Self {
        Self {
            offsets: vec![0],
            values: Vec::new(),
        }
    }

    fn push_sorted(&mut self, sorted: impl IntoIterator<Item = T>) {
        self.values.extend(sorted);
        self.offsets.push(self.values.len() as u32);
    }

    /// Values for a docno, sorted ascending; empty when the document has none
    pub fn get(&self, docno: DocNo) -> &[T] {
        let idx = docno.as_usize();
        if idx + 1 >= self.offsets.len() {
            return &[];
        }
        let start = self.offsets[idx] as usize;
        let end = self.offsets[idx + 1] as usize;
        &self.values[start..end]
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of values across all documents
    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

/// Sorted longs per document
pub type MultiNumericColumn = MultiValueColumn<i64>;

impl MultiNumericColumn {
    pub fn new() -> Self {
        Self::empty()
    }

    /// Add values for the next docno
    pub fn add(&mut self, values: &[i64]) {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        self.push_sorted(sorted);
    }

    /// Get documents with at least one value in range [min, max]
    pub fn range_query(&self, min: i64, max: i64) -> RoaringBitmap {
        let mut result = RoaringBitmap::new();
        for docno in 0..self.len() as u32 {
            if self
                .get(DocNo(docno))
                .iter()
                .any(|v| *v >= min && *v <= max)
            {
                result.insert(docno);
            }
        }
        result
    }
}

impl Default for MultiNumericColumn {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted doubles per document
pub type MultiDoubleColumn = MultiValueColumn<f64>;

impl MultiDoubleColumn {
    pub fn new() -> Self {
        Self::empty()
    }

    /// Add values for the next docno
    pub fn add(&mut self, values: &[f64]) {
        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        self.push_sorted(sorted);
    }
}

impl Default for MultiDoubleColumn {
    fn default() -> Self {
        Self::new()
    }
}

/// Taxonomy ordinals per document, sorted and deduplicated
pub type OrdinalColumn = MultiValueColumn<u32>;

impl OrdinalColumn {
    pub fn new() -> Self {
        Self::empty()
    }

    /// Add ordinals for the next docno
    pub fn add(&mut self, ordinals: &[u32]) {
        let mut sorted = ordinals.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        self.push_sorted(sorted);
    }
}

impl Default for OrdinalColumn {
    fn default() -> Self {
        Self::new()
    }
}

/// Double column with one optional value per document
#[derive(Clone, Debug, Default)]
pub struct DoubleColumn {
    values: Vec<Option<f64>>,
}

impl DoubleColumn {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a value for the next docno
    pub fn add(&mut self, value: Option<f64>) {
        self.values.push(value);
    }

    /// Get value for a docno
    pub fn get(&self, docno: DocNo) -> Option<f64> {
        self.values.get(docno.as_usize()).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A typed column shared between the segment and the value readers built on it
#[derive(Clone, Debug)]
pub enum DocValuesColumn {
    Numeric(Arc<NumericColumn>),
    MultiNumeric(Arc<MultiNumericColumn>),
    Double(Arc<DoubleColumn>),
    MultiDouble(Arc<MultiDoubleColumn>),
    Ordinals(Arc<OrdinalColumn>),
}

impl DocValuesColumn {
    pub fn column_type(&self) -> ColumnType {
        match self {
            DocValuesColumn::Numeric(_) => ColumnType::Numeric,
            DocValuesColumn::MultiNumeric(_) => ColumnType::MultiNumeric,
            DocValuesColumn::Double(_) => ColumnType::Double,
            DocValuesColumn::MultiDouble(_) => ColumnType::MultiDouble,
            DocValuesColumn::Ordinals(_) => ColumnType::Ordinals,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DocValuesColumn::Numeric(c) => c.len(),
            DocValuesColumn::MultiNumeric(c) => c.len(),
            DocValuesColumn::Double(c) => c.len(),
            DocValuesColumn::MultiDouble(c) => c.len(),
            DocValuesColumn::Ordinals(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Combined doc values reader for a segment
#[derive(Clone, Debug, Default)]
pub struct DocValuesReader {
    columns: HashMap<String, DocValuesColumn>,
}

impl DocValuesReader {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
        }
    }

    /// Register a column under a field name, replacing any previous column
    pub fn insert(&mut self, field: impl Into<String>, column: DocValuesColumn) {
        self.columns.insert(field.into(), column);
    }

    pub fn column(&self, field: &str) -> Result<&DocValuesColumn> {
        self.columns
            .get(field)
            .ok_or_else(|| FacetError::UnknownField(field.to_string()))
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.columns.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn numeric(&self, field: &str) -> Result<Arc<NumericColumn>> {
        match self.column(field)? {
            DocValuesColumn::Numeric(c) => Ok(c.clone()),
            _ => Err(mismatch(field, ColumnType::Numeric)),
        }
    }

    pub fn multi_numeric(&self, field: &str) -> Result<Arc<MultiNumericColumn>> {
        match self.column(field)? {
            DocValuesColumn::MultiNumeric(c) => Ok(c.clone()),
            _ => Err(mismatch(field, ColumnType::MultiNumeric)),
        }
    }

    pub fn double(&self, field: &str) -> Result<Arc<DoubleColumn>> {
        match self.column(field)? {
            DocValuesColumn::Double(c) => Ok(c.clone()),
            _ => Err(mismatch(field, ColumnType::Double)),
        }
    }

    pub fn multi_double(&self, field: &str) -> Result<Arc<MultiDoubleColumn>> {
        match self.column(field)? {
            DocValuesColumn::MultiDouble(c) => Ok(c.clone()),
            _ => Err(mismatch(field, ColumnType::MultiDouble)),
        }
    }

    pub fn ordinals(&self, field: &str) -> Result<Arc<OrdinalColumn>> {
        match self.column(field)? {
            DocValuesColumn::Ordinals(c) => Ok(c.clone()),
            _ => Err(mismatch(field, ColumnType::Ordinals)),
        }
    }
}

fn mismatch(field: &str, expected: ColumnType) -> FacetError {
    FacetError::FieldTypeMismatch {
        field: field.to_string(),
        expected: expected.name(),
    }
}
