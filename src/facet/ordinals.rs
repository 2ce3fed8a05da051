//! Facet ordinals and the lazy iteration protocol shared by cutters, recorders
//! and rollups.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::{FacetError, Result};

/// Dense identifier of one facet value (category or range bucket)
pub type FacetOrd = u32;

/// Forward-only, finite sequence of facet ordinals
///
/// `None` marks exhaustion. Implementations keep returning `None` once exhausted.
/// Iterators are single-consumer; ask the producer for a fresh one to restart.
pub trait OrdinalIterator {
    fn next_ord(&mut self) -> Option<FacetOrd>;

    /// Drain the remaining ordinals into a vector
    fn to_vec(&mut self) -> Vec<FacetOrd> {
        let mut ords = Vec::new();
        while let Some(ord) = self.next_ord() {
            ords.push(ord);
        }
        ords
    }
}

impl<T: OrdinalIterator + ?Sized> OrdinalIterator for Box<T> {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        (**self).next_ord()
    }
}

impl<T: OrdinalIterator + ?Sized> OrdinalIterator for &mut T {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        (**self).next_ord()
    }
}

/// Adapter exposing an [`OrdinalIterator`] as a std iterator
pub struct Ords<I>(I);

impl<I: OrdinalIterator> Iterator for Ords<I> {
    type Item = FacetOrd;

    fn next(&mut self) -> Option<FacetOrd> {
        self.0.next_ord()
    }
}

/// Iterate the ordinals of `iter` with std iterator combinators
pub fn ords<I: OrdinalIterator>(iter: I) -> Ords<I> {
    Ords(iter)
}

/// Iterator that is exhausted from the start
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyOrdinalIterator;

impl OrdinalIterator for EmptyOrdinalIterator {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        None
    }
}

/// Ordinals from an owned vector, in vector order
#[derive(Clone, Debug, Default)]
pub struct VecOrdinalIterator {
    ords: Vec<FacetOrd>,
    upto: usize,
}

impl VecOrdinalIterator {
    pub fn new(ords: Vec<FacetOrd>) -> Self {
        Self { ords, upto: 0 }
    }
}

impl From<Vec<FacetOrd>> for VecOrdinalIterator {
    fn from(ords: Vec<FacetOrd>) -> Self {
        Self::new(ords)
    }
}

impl OrdinalIterator for VecOrdinalIterator {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        let ord = self.ords.get(self.upto).copied()?;
        self.upto += 1;
        Some(ord)
    }
}

/// Ordinals from a borrowed slice, in slice order
#[derive(Clone, Debug)]
pub struct SliceOrdinalIterator<'a> {
    ords: std::slice::Iter<'a, FacetOrd>,
}

impl<'a> SliceOrdinalIterator<'a> {
    pub fn new(ords: &'a [FacetOrd]) -> Self {
        Self { ords: ords.iter() }
    }
}

impl OrdinalIterator for SliceOrdinalIterator<'_> {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        self.ords.next().copied()
    }
}

/// Produces something ordinals can be ranked by, e.g. to pick the top N
pub trait OrdToComparable {
    type Comparable: Ord;

    fn comparable(&self, ord: FacetOrd) -> Result<Self::Comparable>;
}

#[derive(Debug, PartialEq, Eq)]
struct Ranked<C> {
    comparable: C,
    ord: FacetOrd,
}

impl<C: Ord> Ord for Ranked<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Smaller ordinal wins ties
        self.comparable
            .cmp(&other.comparable)
            .then_with(|| other.ord.cmp(&self.ord))
    }
}

impl<C: Ord> PartialOrd for Ranked<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Yields the `top_n` best ordinals of a source iterator, best first
///
/// The source is consumed eagerly on construction using a bounded min-heap.
#[derive(Debug)]
pub struct TopnOrdinalIterator {
    ranked: std::vec::IntoIter<FacetOrd>,
}

impl TopnOrdinalIterator {
    pub fn new<S, C>(mut source: S, to_comparable: &C, top_n: usize) -> Result<Self>
    where
        S: OrdinalIterator,
        C: OrdToComparable,
    {
        if top_n == 0 {
            return Err(FacetError::InvalidArgument(
                "top_n must be positive".to_string(),
            ));
        }

        let mut heap: BinaryHeap<Reverse<Ranked<C::Comparable>>> =
            BinaryHeap::with_capacity(top_n + 1);
        while let Some(ord) = source.next_ord() {
            let candidate = Ranked {
                comparable: to_comparable.comparable(ord)?,
                ord,
            };
            if heap.len() < top_n {
                heap.push(Reverse(candidate));
            } else if let Some(Reverse(worst)) = heap.peek() {
                if candidate > *worst {
                    heap.pop();
                    heap.push(Reverse(candidate));
                }
            }
        }

        // into_sorted_vec is ascending in Reverse order, i.e. best first
        let ranked: Vec<FacetOrd> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(r)| r.ord)
            .collect();
        Ok(Self {
            ranked: ranked.into_iter(),
        })
    }
}

impl OrdinalIterator for TopnOrdinalIterator {
    fn next_ord(&mut self) -> Option<FacetOrd> {
        self.ranked.next()
    }
}
