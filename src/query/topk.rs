//! Bounded top-k selection for fuzzy candidates.
//!
//! Candidates are ranked by score (descending), then key length
//! (ascending), then key bytes (ascending). The ordering is total, so the
//! selected set and its order are identical on every run regardless of the
//! order candidates arrive in.

use crate::store::RowId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scored candidate row
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow<'a> {
    pub row: RowId,
    pub key: &'a str,
    pub score: f64,
}

/// Ranking order: `Less` means `a` ranks ahead of `b`
pub fn rank_cmp(a: &ScoredRow<'_>, b: &ScoredRow<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.key.len().cmp(&b.key.len()))
        .then_with(|| a.key.cmp(b.key))
        .then_with(|| a.row.cmp(&b.row))
}

/// Heap entry. The heap's maximum is the worst-ranked entry, so it is the
/// one evicted when a better candidate arrives.
#[derive(Debug)]
struct HeapEntry<'a>(ScoredRow<'a>);

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        rank_cmp(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for HeapEntry<'_> {}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        rank_cmp(&self.0, &other.0)
    }
}

/// Top-K heap for tracking the best candidates while scoring.
pub struct TopKHeap<'a> {
    heap: BinaryHeap<HeapEntry<'a>>,
    capacity: usize,
}

impl<'a> TopKHeap<'a> {
    /// Create a new top-k heap with the given capacity
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k + 1),
            capacity: k,
        }
    }

    /// Lowest score currently in the heap once it is full.
    /// Returns `None` while there is still room.
    #[inline]
    pub fn threshold(&self) -> Option<f64> {
        if self.is_full() {
            self.heap.peek().map(|e| e.0.score)
        } else {
            None
        }
    }

    /// Check if a candidate would enter the top-k
    pub fn would_enter(&self, candidate: &ScoredRow<'_>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.heap.peek() {
            Some(worst) if self.is_full() => rank_cmp(candidate, &worst.0) == Ordering::Less,
            _ => true,
        }
    }

    /// Try to insert a candidate. Returns true if it was inserted.
    pub fn try_insert(&mut self, candidate: ScoredRow<'a>) -> bool {
        if !self.would_enter(&candidate) {
            return false;
        }
        if self.is_full() {
            self.heap.pop();
        }
        self.heap.push(HeapEntry(candidate));
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Consume the heap and return candidates best first
    pub fn into_sorted_vec(self) -> Vec<ScoredRow<'a>> {
        let mut entries: Vec<ScoredRow<'a>> = self.heap.into_iter().map(|e| e.0).collect();
        entries.sort_by(rank_cmp);
        entries
    }
}
