//! Cutter yielding the taxonomy ordinals indexed for each document.

use std::sync::Arc;

use crate::error::Result;
use crate::facet::cutter::{FacetCutter, LeafFacetCutter};
use crate::facet::ordinals::{FacetOrd, OrdinalIterator};
use crate::segment::{DocNo, OrdinalColumn, SegmentReader};

/// [`FacetCutter`] over a category field's ordinal column
#[derive(Clone, Debug)]
pub struct TaxonomyFacetCutter {
    field: String,
}

impl TaxonomyFacetCutter {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl FacetCutter for TaxonomyFacetCutter {
    fn create_leaf_cutter(&self, segment: &SegmentReader) -> Result<Box<dyn LeafFacetCutter>> {
        let column = segment.docvalues().ordinals(&self.field)?;
        Ok(Box::new(TaxonomyLeafCutter {
            column,
            doc: DocNo(0),
            upto: 0,
        }))
    }
}

struct TaxonomyLeafCutter {
    column: Arc<OrdinalColumn>,
    doc: DocNo,
    upto: usize,
}

impl LeafFacetCutter for TaxonomyLeafCutter {
    fn advance_exact(&mut self, doc: DocNo) -> Result<bool> {
        self.doc = doc;
        self.upto = 0;
        Ok(!self.column.get(doc).is_empty())
    }
}

impl OrdinalIterator for TaxonomyLeafCutter {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        let ord = self.column.get(self.doc).get(self.upto).copied()?;
        self.upto += 1;
        Some(ord)
    }
}
