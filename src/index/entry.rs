//! Index entries and the sort policy applied to them.

use crate::key::{Key, KeyKind};

/// Location of one stored record
///
/// `offset` is where the record starts in the data file; `length` counts
/// the record's bytes including its trailing terminator byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: Key,
    pub length: u64,
    pub offset: u64,
}

impl IndexEntry {
    pub fn new(key: Key, length: u64, offset: u64) -> Self {
        Self { key, length, offset }
    }

    /// One past the last byte of the record, `None` on overflow
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }
}

/// Stable sort ascending by key; equal keys keep their relative order
pub fn sort_entries(entries: &mut [IndexEntry]) {
    entries.sort_by(|a, b| a.key.cmp(&b.key));
}

/// Sort entries loaded from a text index
///
/// Token indexes are produced pre-sorted and are left as read.
pub(crate) fn sort_for_kind(kind: KeyKind, entries: &mut [IndexEntry]) {
    match kind {
        KeyKind::Int => sort_entries(entries),
        KeyKind::Token => {}
    }
}
