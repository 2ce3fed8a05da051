//! Immutable in-memory segment reader
//!
//! A `SegmentReader` is the per-segment context handed to cutters, recorders
//! and matchers. It is cheap to clone; columns and tombstones sit behind `Arc`.

use std::sync::Arc;

use roaring::RoaringBitmap;

use super::docvalues::DocValuesReader;
use super::types::{DocNo, SegmentId};

/// Immutable segment reader backed by in-memory columns
#[derive(Clone, Debug)]
pub struct SegmentReader {
    /// Unique segment identifier
    id: SegmentId,
    /// Position of this segment within the searcher (0..segment_count)
    ord: usize,
    /// Number of documents in the segment, deleted or not
    max_doc: u32,
    /// DocValues reader
    docvalues: Arc<DocValuesReader>,
    /// Tombstone bitmap (deleted documents)
    deleted: Arc<RoaringBitmap>,
}

impl SegmentReader {
    /// Create a segment reader from in-memory data
    pub fn from_memory(id: SegmentId, max_doc: u32, docvalues: DocValuesReader) -> Self {
        Self {
            id,
            ord: 0,
            max_doc,
            docvalues: Arc::new(docvalues),
            deleted: Arc::new(RoaringBitmap::new()),
        }
    }

    /// Return a copy of this reader placed at the given position in a searcher
    pub fn with_ord(mut self, ord: usize) -> Self {
        self.ord = ord;
        self
    }

    /// Return a copy of this reader with the given documents marked deleted
    pub fn with_deletes(mut self, deleted: RoaringBitmap) -> Self {
        self.deleted = Arc::new(deleted);
        self
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn ord(&self) -> usize {
        self.ord
    }

    pub fn max_doc(&self) -> u32 {
        self.max_doc
    }

    /// Number of documents that are not deleted
    pub fn live_doc_count(&self) -> u64 {
        self.max_doc as u64 - self.deleted.len()
    }

    pub fn is_deleted(&self, docno: DocNo) -> bool {
        self.deleted.contains(docno.as_u32())
    }

    pub fn deleted_docs(&self) -> &RoaringBitmap {
        &self.deleted
    }

    /// Bitmap of all live documents
    pub fn live_docs(&self) -> RoaringBitmap {
        let mut all = RoaringBitmap::new();
        all.insert_range(0..self.max_doc);
        all - self.deleted.as_ref()
    }

    pub fn docvalues(&self) -> &DocValuesReader {
        &self.docvalues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_docs_exclude_deletes() {
        let mut deleted = RoaringBitmap::new();
        deleted.insert(1);

        let reader = SegmentReader::from_memory(SegmentId(3), 4, DocValuesReader::new())
            .with_ord(2)
            .with_deletes(deleted);

        assert_eq!(reader.id(), SegmentId(3));
        assert_eq!(reader.ord(), 2);
        assert_eq!(reader.live_doc_count(), 3);
        assert!(reader.is_deleted(DocNo(1)));
        assert_eq!(reader.live_docs().iter().collect::<Vec<_>>(), vec![0, 2, 3]);
    }
}
