//! Index Module
//!
//! The sorted key index of a file pair, in its two on-disk forms:
//! - `text`: the line-oriented index written by the writer
//! - `cache`: a binary copy built by the reader for fast reopen
//!
//! In memory the index is either parsed into a `Vec` or served directly from
//! a mapped cache file; [`SortedIndex`] hides which.

mod cache;
mod entry;
pub mod text;

pub use cache::{cache_path, record_size, remove_caches, save as save_cache, CachedIndex};
pub use entry::{sort_entries, IndexEntry};
pub(crate) use entry::sort_for_kind;

use crate::key::Key;

/// An index sorted ascending by key
pub enum SortedIndex {
    /// Parsed from the text index, heap-owned
    Owned(Vec<IndexEntry>),
    /// Served from a mapped cache file
    Cached(CachedIndex),
}

impl SortedIndex {
    pub fn len(&self) -> usize {
        match self {
            SortedIndex::Owned(entries) => entries.len(),
            SortedIndex::Cached(cache) => cache.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, SortedIndex::Cached(_))
    }

    pub fn get(&self, position: usize) -> Option<IndexEntry> {
        match self {
            SortedIndex::Owned(entries) => entries.get(position).copied(),
            SortedIndex::Cached(cache) => cache.get(position),
        }
    }

    fn key_at(&self, position: usize) -> Key {
        match self {
            SortedIndex::Owned(entries) => entries[position].key,
            SortedIndex::Cached(cache) => cache.key_at(position),
        }
    }

    /// Position of the first entry whose key is >= `key` (`len()` if none)
    pub fn lower_bound(&self, key: &Key) -> usize {
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.key_at(mid) < *key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Position of the first entry equal to `key`
    pub fn find(&self, key: &Key) -> Option<usize> {
        let position = self.lower_bound(key);
        (position < self.len() && self.key_at(position) == *key).then_some(position)
    }

    /// All entries in index order
    pub fn iter(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}
