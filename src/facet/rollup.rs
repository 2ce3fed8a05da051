//! Hierarchy collaborator used by recorders to roll child values into parents.

use std::collections::HashSet;

use super::ordinals::{FacetOrd, OrdinalIterator};
use crate::error::{FacetError, Result};

/// Topology of ordinals that need rollup after the merge
pub trait FacetRollup {
    /// Top-level ordinals whose subtrees are rolled up
    fn dim_ords_to_rollup(&self) -> Result<Box<dyn OrdinalIterator + '_>>;

    /// Direct children of `ord`
    fn children_ords(&self, ord: FacetOrd) -> Result<Box<dyn OrdinalIterator + '_>>;
}

/// Ordinals on the current root-to-node path of a rollup recursion
///
/// A hierarchy that leads back to an ordinal already on the path would recurse
/// forever, so entering it is an error.
#[derive(Debug, Default)]
pub(crate) struct RollupPath {
    on_path: HashSet<FacetOrd>,
}

impl RollupPath {
    pub(crate) fn enter(&mut self, ord: FacetOrd) -> Result<()> {
        if !self.on_path.insert(ord) {
            return Err(FacetError::InvalidArgument(format!(
                "facet hierarchy has a cycle through ordinal {}",
                ord
            )));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self, ord: FacetOrd) {
        self.on_path.remove(&ord);
    }
}
