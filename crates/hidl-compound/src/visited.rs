// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Per-query record of types already entered during a graph traversal.

use crate::types::TypeId;

const WORD_BITS: usize = u64::BITS as usize;

/// Bitset indexed by [`TypeId`].
///
/// One set belongs to exactly one top-level query and is threaded through its
/// recursion by `&mut`; two queries never share a set.
#[derive(Clone, Debug, Default)]
pub struct VisitSet {
    words: Vec<u64>,
}

impl VisitSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for an arena of `len` types.
    #[must_use]
    pub fn with_capacity(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
        }
    }

    pub fn contains(&self, id: TypeId) -> bool {
        let (word, bit) = Self::slot(id);
        self.words
            .get(word)
            .is_some_and(|value| *value & (1u64 << bit) != 0)
    }

    /// Mark `id`; returns `false` if it was already marked.
    pub fn insert(&mut self, id: TypeId) -> bool {
        let (word, bit) = Self::slot(id);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask: u64 = 1 << bit;
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    fn slot(id: TypeId) -> (usize, usize) {
        (id.index() / WORD_BITS, id.index() % WORD_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::VisitSet;
    use crate::types::TypeId;

    #[test]
    fn insert_reports_first_visit_only() {
        let mut set = VisitSet::new();
        let id = TypeId::from_index(70);
        assert!(!set.contains(id));
        assert!(set.insert(id));
        assert!(!set.insert(id));
        assert!(set.contains(id));
        assert!(!set.contains(TypeId::from_index(6)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn presized_set_starts_empty() {
        let set = VisitSet::with_capacity(130);
        assert!(set.is_empty());
        assert!(!set.contains(TypeId::from_index(129)));
    }
}
