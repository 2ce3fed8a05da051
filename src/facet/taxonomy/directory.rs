//! In-memory taxonomy: a dictionary from category paths to dense ordinals.
//!
//! Ordinal 0 is the root (the empty path). Every prefix of an added path gets
//! its own ordinal, and a child is always assigned a larger ordinal than its
//! parent.

use std::collections::HashMap;

use crate::error::{FacetError, Result};
use crate::facet::ordinals::{FacetOrd, OrdinalIterator};

pub const ROOT_ORD: FacetOrd = 0;

/// Separator between path components in a label
pub const PATH_DELIMITER: char = '/';

#[derive(Clone, Debug)]
pub struct Taxonomy {
    /// Last path component per ordinal; empty for the root
    components: Vec<String>,
    parents: Vec<Option<FacetOrd>>,
    by_parent: HashMap<(FacetOrd, String), FacetOrd>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self {
            components: vec![String::new()],
            parents: vec![None],
            by_parent: HashMap::new(),
        }
    }

    /// Add a path and all its prefixes, returning the ordinal of the full path
    pub fn add_path<S: AsRef<str>>(&mut self, path: &[S]) -> Result<FacetOrd> {
        let mut ord = ROOT_ORD;
        for component in path {
            let component = component.as_ref();
            if component.is_empty() {
                return Err(FacetError::InvalidArgument(
                    "category path has an empty component".to_string(),
                ));
            }
            ord = match self.by_parent.get(&(ord, component.to_string())) {
                Some(child) => *child,
                None => self.push(ord, component),
            };
        }
        Ok(ord)
    }

    /// Add a `/`-separated label such as `Author/Bob`
    pub fn add_label(&mut self, label: &str) -> Result<FacetOrd> {
        if label.is_empty() {
            return Err(FacetError::InvalidArgument(
                "category label is empty".to_string(),
            ));
        }
        let path: Vec<&str> = label.split(PATH_DELIMITER).collect();
        self.add_path(&path)
    }

    fn push(&mut self, parent: FacetOrd, component: &str) -> FacetOrd {
        let ord = self.components.len() as FacetOrd;
        self.components.push(component.to_string());
        self.parents.push(Some(parent));
        self.by_parent.insert((parent, component.to_string()), ord);
        ord
    }

    /// Ordinal of an existing path
    pub fn ord<S: AsRef<str>>(&self, path: &[S]) -> Option<FacetOrd> {
        path.iter().try_fold(ROOT_ORD, |parent, component| {
            self.by_parent
                .get(&(parent, component.as_ref().to_string()))
                .copied()
        })
    }

    pub fn ord_for_label(&self, label: &str) -> Option<FacetOrd> {
        let path: Vec<&str> = label.split(PATH_DELIMITER).collect();
        self.ord(&path)
    }

    /// Components of the path of `ord`, root first
    pub fn path(&self, ord: FacetOrd) -> Option<Vec<&str>> {
        let mut path = Vec::new();
        let mut current = ord;
        while current != ROOT_ORD {
            path.push(self.components.get(current as usize)?.as_str());
            current = (*self.parents.get(current as usize)?)?;
        }
        path.reverse();
        Some(path)
    }

    /// Label of `ord` with components joined by `/`
    pub fn label(&self, ord: FacetOrd) -> Option<String> {
        let separator = PATH_DELIMITER.to_string();
        self.path(ord).map(|path| path.join(&separator))
    }

    /// Parent of `ord`; `None` for the root and unknown ordinals
    pub fn parent(&self, ord: FacetOrd) -> Option<FacetOrd> {
        self.parents.get(ord as usize).copied().flatten()
    }

    /// Number of ordinals, including the root
    pub fn size(&self) -> usize {
        self.parents.len()
    }

    pub fn arrays(&self) -> TaxonomyArrays {
        TaxonomyArrays::from_parents(self.parents.clone())
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new()
    }
}

/// Parent, first child and next sibling of every ordinal
///
/// Children of an ordinal are linked in ascending ordinal order.
#[derive(Clone, Debug, Default)]
pub struct TaxonomyArrays {
    parents: Vec<Option<FacetOrd>>,
    children: Vec<Option<FacetOrd>>,
    siblings: Vec<Option<FacetOrd>>,
}

impl TaxonomyArrays {
    pub fn from_parents(parents: Vec<Option<FacetOrd>>) -> Self {
        let mut children = vec![None; parents.len()];
        let mut siblings = vec![None; parents.len()];
        for ord in (0..parents.len()).rev() {
            if let Some(parent) = parents[ord] {
                if let Some(first) = children.get_mut(parent as usize) {
                    siblings[ord] = *first;
                    *first = Some(ord as FacetOrd);
                }
            }
        }
        Self {
            parents,
            children,
            siblings,
        }
    }

    pub fn size(&self) -> usize {
        self.parents.len()
    }

    pub fn parent(&self, ord: FacetOrd) -> Option<FacetOrd> {
        self.parents.get(ord as usize).copied().flatten()
    }

    pub fn first_child(&self, ord: FacetOrd) -> Option<FacetOrd> {
        self.children.get(ord as usize).copied().flatten()
    }

    pub fn next_sibling(&self, ord: FacetOrd) -> Option<FacetOrd> {
        self.siblings.get(ord as usize).copied().flatten()
    }

    /// Direct children of `ord`, ascending
    pub fn children_of(&self, ord: FacetOrd) -> ChildOrdinalIterator<'_> {
        ChildOrdinalIterator {
            arrays: self,
            next: self.first_child(ord),
        }
    }
}

/// Walks the sibling chain below one parent
pub struct ChildOrdinalIterator<'a> {
    arrays: &'a TaxonomyArrays,
    next: Option<FacetOrd>,
}

impl OrdinalIterator for ChildOrdinalIterator<'_> {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        let current = self.next?;
        self.next = self.arrays.next_sibling(current);
        Some(current)
    }
}
