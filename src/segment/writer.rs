//! Segment writer for creating immutable in-memory segments
//!
//! Documents are buffered row by row; `finish` infers one column per field and
//! pads every column to the segment's document count.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::docvalues::{
    DocValuesColumn, DocValuesReader, DoubleColumn, MultiDoubleColumn, MultiNumericColumn,
    NumericColumn, OrdinalColumn,
};
use super::reader::SegmentReader;
use super::types::{DocNo, SegmentId};
use crate::error::{FacetError, Result};
use crate::facet::taxonomy::Taxonomy;
use crate::facet::FacetOrd;
use crate::models::{Document, DocumentId, FieldValue};

/// Column shape inferred from the values seen for a field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldShape {
    Long { multi: bool },
    Double { multi: bool },
    Category,
}

impl FieldShape {
    fn of(value: &FieldValue) -> Self {
        match value {
            FieldValue::Long(_) => FieldShape::Long { multi: false },
            FieldValue::Longs(_) => FieldShape::Long { multi: true },
            FieldValue::Double(_) => FieldShape::Double { multi: false },
            FieldValue::Doubles(_) => FieldShape::Double { multi: true },
            FieldValue::Category(_) | FieldValue::Categories(_) => FieldShape::Category,
        }
    }

    fn merge(self, other: FieldShape) -> Option<FieldShape> {
        match (self, other) {
            (FieldShape::Long { multi: a }, FieldShape::Long { multi: b }) => {
                Some(FieldShape::Long { multi: a || b })
            }
            (FieldShape::Double { multi: a }, FieldShape::Double { multi: b }) => {
                Some(FieldShape::Double { multi: a || b })
            }
            (FieldShape::Category, FieldShape::Category) => Some(FieldShape::Category),
            _ => None,
        }
    }
}

/// A buffered field value with categories already resolved to ordinals
#[derive(Clone, Debug)]
enum RowValue {
    Longs(Vec<i64>),
    Doubles(Vec<f64>),
    Ordinals(Vec<FacetOrd>),
}

/// Writer for creating new segments from documents
pub struct SegmentWriter {
    segment_id: SegmentId,
    doc_ids: Vec<DocumentId>,
    rows: Vec<BTreeMap<String, RowValue>>,
    shapes: BTreeMap<String, FieldShape>,
}

impl SegmentWriter {
    pub fn new(segment_id: SegmentId) -> Self {
        Self {
            segment_id,
            doc_ids: Vec::new(),
            rows: Vec::new(),
            shapes: BTreeMap::new(),
        }
    }

    /// Buffer a document, returning the docno it will have in the segment
    ///
    /// Category fields are resolved against `taxonomy`, adding missing paths.
    pub fn add_document(
        &mut self,
        doc: &Document,
        mut taxonomy: Option<&mut Taxonomy>,
    ) -> Result<DocNo> {
        let mut row = BTreeMap::new();

        for (name, value) in &doc.fields {
            let shape = FieldShape::of(value);
            let merged = match self.shapes.get(name) {
                Some(existing) => existing.merge(shape).ok_or_else(|| {
                    FacetError::InvalidArgument(format!(
                        "field '{}' of document {} mixes value types",
                        name, doc.id
                    ))
                })?,
                None => shape,
            };

            let row_value = match value {
                FieldValue::Long(v) => RowValue::Longs(vec![*v]),
                FieldValue::Longs(vs) => RowValue::Longs(vs.clone()),
                FieldValue::Double(v) => RowValue::Doubles(vec![*v]),
                FieldValue::Doubles(vs) => RowValue::Doubles(vs.clone()),
                FieldValue::Category(path) => {
                    let taxonomy = require_taxonomy(taxonomy.as_deref_mut(), name)?;
                    RowValue::Ordinals(vec![taxonomy.add_label(path)?])
                }
                FieldValue::Categories(paths) => {
                    let taxonomy = require_taxonomy(taxonomy.as_deref_mut(), name)?;
                    let ords = paths
                        .iter()
                        .map(|path| taxonomy.add_label(path))
                        .collect::<Result<Vec<_>>>()?;
                    RowValue::Ordinals(ords)
                }
            };

            self.shapes.insert(name.clone(), merged);
            row.insert(name.clone(), row_value);
        }

        let docno = DocNo(self.rows.len() as u32);
        self.doc_ids.push(doc.id);
        self.rows.push(row);
        Ok(docno)
    }

    /// Number of buffered documents
    pub fn doc_count(&self) -> usize {
        self.rows.len()
    }

    /// External document ids in docno order
    pub fn doc_ids(&self) -> &[DocumentId] {
        &self.doc_ids
    }

    /// Build the immutable segment
    pub fn finish(self) -> SegmentReader {
        let max_doc = self.rows.len() as u32;
        let mut docvalues = DocValuesReader::new();

        for (field, shape) in &self.shapes {
            let column = match shape {
                FieldShape::Long { multi: false } => {
                    let mut col = NumericColumn::with_capacity(self.rows.len());
                    for row in &self.rows {
                        col.add(match row.get(field) {
                            Some(RowValue::Longs(vs)) => vs.first().copied(),
                            _ => None,
                        });
                    }
                    DocValuesColumn::Numeric(Arc::new(col))
                }
                FieldShape::Long { multi: true } => {
                    let mut col = MultiNumericColumn::new();
                    for row in &self.rows {
                        match row.get(field) {
                            Some(RowValue::Longs(vs)) => col.add(vs),
                            _ => col.add(&[]),
                        }
                    }
                    DocValuesColumn::MultiNumeric(Arc::new(col))
                }
                FieldShape::Double { multi: false } => {
                    let mut col = DoubleColumn::new();
                    for row in &self.rows {
                        col.add(match row.get(field) {
                            Some(RowValue::Doubles(vs)) => vs.first().copied(),
                            _ => None,
                        });
                    }
                    DocValuesColumn::Double(Arc::new(col))
                }
                FieldShape::Double { multi: true } => {
                    let mut col = MultiDoubleColumn::new();
                    for row in &self.rows {
                        match row.get(field) {
                            Some(RowValue::Doubles(vs)) => col.add(vs),
                            _ => col.add(&[]),
                        }
                    }
                    DocValuesColumn::MultiDouble(Arc::new(col))
                }
                FieldShape::Category => {
                    let mut col = OrdinalColumn::new();
                    for row in &self.rows {
                        match row.get(field) {
                            Some(RowValue::Ordinals(ords)) => col.add(ords),
                            _ => col.add(&[]),
                        }
                    }
                    DocValuesColumn::Ordinals(Arc::new(col))
                }
            };
            docvalues.insert(field.clone(), column);
        }

        debug!(
            segment = %self.segment_id,
            docs = max_doc,
            fields = self.shapes.len(),
            "built segment"
        );

        SegmentReader::from_memory(self.segment_id, max_doc, docvalues)
    }
}

fn require_taxonomy<'a>(taxonomy: Option<&'a mut Taxonomy>, field: &str) -> Result<&'a mut Taxonomy> {
    taxonomy.ok_or_else(|| {
        FacetError::InvalidArgument(format!(
            "category field '{}' requires a taxonomy",
            field
        ))
    })
}

/// Split documents into segments of at most `segment_size` documents
pub fn build_segments(
    docs: &[Document],
    segment_size: usize,
    mut taxonomy: Option<&mut Taxonomy>,
) -> Result<Vec<SegmentReader>> {
    if segment_size == 0 {
        return Err(FacetError::InvalidArgument(
            "segment size must be positive".to_string(),
        ));
    }

    let mut segments = Vec::new();
    let mut segment_id = SegmentId::new(0);
    for chunk in docs.chunks(segment_size) {
        let mut writer = SegmentWriter::new(segment_id);
        for doc in chunk {
            writer.add_document(doc, taxonomy.as_deref_mut())?;
        }
        segments.push(writer.finish());
        segment_id = segment_id.next();
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::ColumnType;

    #[test]
    fn test_writer_infers_columns() {
        let mut taxonomy = Taxonomy::new();
        let mut writer = SegmentWriter::new(SegmentId(1));

        writer
            .add_document(
                &Document::new(10).with_long("price", 5).with_category("author", "Author/Bob"),
                Some(&mut taxonomy),
            )
            .unwrap();
        writer
            .add_document(
                &Document::new(11).with_longs("price", vec![9, 1]),
                Some(&mut taxonomy),
            )
            .unwrap();
        writer
            .add_document(&Document::new(12).with_double("score", 0.5), None)
            .unwrap();

        assert_eq!(writer.doc_ids(), &[10, 11, 12]);
        let segment = writer.finish();
        assert_eq!(segment.max_doc(), 3);

        let dv = segment.docvalues();
        assert_eq!(
            dv.column("price").unwrap().column_type(),
            ColumnType::MultiNumeric
        );
        let price = dv.multi_numeric("price").unwrap();
        assert_eq!(price.get(DocNo(0)), &[5]);
        assert_eq!(price.get(DocNo(1)), &[1, 9]);
        assert!(price.get(DocNo(2)).is_empty());

        let score = dv.double("score").unwrap();
        assert_eq!(score.get(DocNo(2)), Some(0.5));
        assert_eq!(score.get(DocNo(0)), None);

        let author = dv.ordinals("author").unwrap();
        let bob = taxonomy.ord_for_label("Author/Bob").unwrap();
        assert_eq!(author.get(DocNo(0)), &[bob]);
    }

    #[test]
    fn test_writer_rejects_mixed_types() {
        let mut writer = SegmentWriter::new(SegmentId(0));
        writer
            .add_document(&Document::new(1).with_long("x", 1), None)
            .unwrap();
        let err = writer
            .add_document(&Document::new(2).with_double("x", 1.0), None)
            .unwrap_err();
        assert!(matches!(err, FacetError::InvalidArgument(_)));
    }

    #[test]
    fn test_category_without_taxonomy() {
        let mut writer = SegmentWriter::new(SegmentId(0));
        let err = writer
            .add_document(&Document::new(1).with_category("a", "A/b"), None)
            .unwrap_err();
        assert!(matches!(err, FacetError::InvalidArgument(_)));
    }

    #[test]
    fn test_build_segments_chunks() {
        let docs: Vec<Document> = (0..5).map(|i| Document::new(i).with_long("v", i as i64)).collect();
        let segments = build_segments(&docs, 2, None).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].max_doc(), 1);
        assert_eq!(segments[2].id(), SegmentId(2));
        assert!(build_segments(&docs, 0, None).is_err());
    }
}
