//! Selects the children of one taxonomy node out of another ordinal stream,
//! e.g. to list the recorded children of a dimension.

use super::directory::TaxonomyArrays;
use crate::error::{FacetError, Result};
use crate::facet::ordinals::{FacetOrd, OrdinalIterator};

/// Yields the ordinals of `source` whose parent is `parent`, in source order
pub struct TaxonomyChildrenOrdinalIterator<'a, I> {
    source: I,
    arrays: &'a TaxonomyArrays,
    parent: FacetOrd,
}

impl<'a, I: OrdinalIterator> TaxonomyChildrenOrdinalIterator<'a, I> {
    pub fn new(source: I, arrays: &'a TaxonomyArrays, parent: FacetOrd) -> Result<Self> {
        if parent as usize >= arrays.size() {
            return Err(FacetError::InvalidArgument(format!(
                "parent ordinal {} is not in the taxonomy",
                parent
            )));
        }
        Ok(Self {
            source,
            arrays,
            parent,
        })
    }
}

impl<I: OrdinalIterator> OrdinalIterator for TaxonomyChildrenOrdinalIterator<'_, I> {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        while let Some(ord) = self.source.next_ord() {
            if self.arrays.parent(ord) == Some(self.parent) {
                return Some(ord);
            }
        }
        None
    }
}
