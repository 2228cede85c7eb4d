//! Sort-based in-memory dedup pool.
//!
//! Words are appended unsorted into the arena; pouring sorts the item array
//! in place and collapses runs of equal keys into single records. The pool
//! is strictly fill-then-drain: `pour` consumes it, and the arena (and with
//! it every pooled suffix) dies at the same time.

use crate::dedup::arena::Arena;
use crate::dedup::bloom::{prefix_of, suffix_of, BloomKey, NO_SUFFIX};
use crate::dedup::DedupItem;
use crate::error::Result;
use crate::profile::{ProfileItem, ProfileWriter};
use std::cmp::Ordering;

pub struct DedupPool<'m> {
    arena: Arena<'m>,
}

impl<'m> DedupPool<'m> {
    /// Build a fresh pool over the (reused) working memory region.
    pub fn new(region: &'m mut [u8]) -> Self {
        Self {
            arena: Arena::new(region),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Record one occurrence of `word` at byte `offset`.
    ///
    /// Returns false - leaving the arena untouched - when the word does not
    /// fit; the caller pours and retries on a fresh pool. `word` must be
    /// non-empty and NUL-free (the tokenizer guarantees both).
    pub fn insert(&mut self, word: &[u8], offset: u64) -> bool {
        debug_assert!(!word.is_empty());
        debug_assert!(!word.contains(&0));

        let suffix = suffix_of(word);
        let pool_bytes = if suffix.is_empty() { 0 } else { suffix.len() + 1 };
        let Some((idx, pool_off)) = self.arena.alloc(pool_bytes) else {
            return false;
        };

        let suffix_off = if suffix.is_empty() {
            NO_SUFFIX
        } else {
            self.arena.pool_write(pool_off, suffix);
            self.arena.pool_write(pool_off + suffix.len(), &[0]);
            pool_off as u64
        };

        *self.arena.item_mut(idx) = DedupItem {
            bloom: BloomKey {
                prefix: prefix_of(word),
                suffix_off,
            },
            occur: offset,
        };
        true
    }

    /// Sort, deduplicate and stream the pool into `output` as one profile
    /// run. Duplicated words become repeated records; unique words keep the
    /// offset they arrived with. Returns the physical size of the run.
    pub fn pour(mut self, mut output: ProfileWriter) -> Result<u64> {
        let (items, pool) = self.arena.parts();
        items.sort_unstable_by(|a, b| pool.compare(&a.bloom, &b.bloom));

        let mut i = 0;
        while i < items.len() {
            let mut j = i + 1;
            while j < items.len()
                && pool.compare(&items[i].bloom, &items[j].bloom) == Ordering::Equal
            {
                j += 1;
            }
            let word = pool.reconstruct(&items[i].bloom);
            let item = if j - i == 1 {
                ProfileItem::singleton(word, items[i].occur)
            } else {
                ProfileItem::repeated(word)
            };
            output.push(&item)?;
            i = j;
        }
        output.close()
    }
}
