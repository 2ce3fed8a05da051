//! Cutters translate a document into the facet ordinals it belongs to.

use std::sync::Arc;

use super::ordinals::OrdinalIterator;
use crate::error::Result;
use crate::segment::{DocNo, SegmentReader};

/// Per-segment cutter, owned by the thread collecting that segment
///
/// When `advance_exact` returns true, `next_ord` yields every ordinal of the
/// document and then `None`. When it returns false the document has no facet
/// value and `next_ord` must not be called. Documents are visited in ascending
/// docno order.
pub trait LeafFacetCutter: OrdinalIterator {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool>;
}

/// Shared cutter that builds one [`LeafFacetCutter`] per segment
pub trait FacetCutter: Send + Sync {
    fn create_leaf_cutter(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetCutter>>;
}

impl<T: FacetCutter + ?Sized> FacetCutter for Arc<T> {
    fn create_leaf_cutter(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetCutter>> {
        (**self).create_leaf_cutter(segment)
    }
}

impl<T: FacetCutter + ?Sized> FacetCutter for Box<T> {
    fn create_leaf_cutter(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetCutter>> {
        (**self).create_leaf_cutter(segment)
    }
}
