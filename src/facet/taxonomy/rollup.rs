//! [`FacetRollup`] over a taxonomy's parent/child structure.

use std::sync::Arc;

use super::directory::{Taxonomy, TaxonomyArrays};
use crate::error::{FacetError, Result};
use crate::facet::ordinals::{FacetOrd, OrdinalIterator, VecOrdinalIterator};
use crate::facet::rollup::FacetRollup;

/// Rolls values of descendants up into the configured dimension ordinals
#[derive(Clone, Debug)]
pub struct TaxonomyFacetRollup {
    arrays: Arc<TaxonomyArrays>,
    dims: Vec<FacetOrd>,
}

impl TaxonomyFacetRollup {
    /// Roll up the given ordinals; each must exist in `arrays`
    pub fn new(arrays: Arc<TaxonomyArrays>, dims: Vec<FacetOrd>) -> Result<Self> {
        if let Some(unknown) = dims.iter().find(|d| **d as usize >= arrays.size()) {
            return Err(FacetError::InvalidArgument(format!(
                "rollup dimension ordinal {} is not in the taxonomy",
                unknown
            )));
        }
        Ok(Self { arrays, dims })
    }

    /// Roll up the named dimensions (top-level labels such as `Author`)
    pub fn for_labels(taxonomy: &Taxonomy, labels: &[&str]) -> Result<Self> {
        let dims = labels
            .iter()
            .map(|label| {
                taxonomy.ord_for_label(label).ok_or_else(|| {
                    FacetError::InvalidArgument(format!("unknown facet dimension '{}'", label))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(Arc::new(taxonomy.arrays()), dims)
    }

    /// Roll up every top-level dimension
    pub fn all_dims(taxonomy: &Taxonomy) -> Self {
        let arrays = taxonomy.arrays();
        let dims = arrays.children_of(super::ROOT_ORD).to_vec();
        Self {
            arrays: Arc::new(arrays),
            dims,
        }
    }

    pub fn arrays(&self) -> &TaxonomyArrays {
        &self.arrays
    }
}

impl FacetRollup for TaxonomyFacetRollup {
    fn dim_ords_to_rollup(&self) -> Result<Box<dyn OrdinalIterator + '_>> {
        Ok(Box::new(VecOrdinalIterator::new(self.dims.clone())))
    }

    fn children_ords(&self, ord: FacetOrd) -> Result<Box<dyn OrdinalIterator + '_>> {
        Ok(Box::new(self.arrays.children_of(ord)))
    }
}
