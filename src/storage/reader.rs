//! Reader
//!
//! Opens a data/index file pair and answers O(log n) key lookups plus
//! positional access to record bytes, length and offset.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::config::{Config, OpenMode};
use crate::error::{FfdbError, Result};
use crate::index::{self, text, CachedIndex, IndexEntry, SortedIndex};
use crate::key::{Key, KeyKind};

use super::DataRegion;

/// Read access to a file pair
///
/// ## Open
/// 1. With `USE_DATA`, map the whole data file
/// 2. If the cache for this index/mode/kind exists, serve the index from it
/// 3. Otherwise parse the text index, sort it, and persist the cache
///
/// ## Concurrency
/// All lookups take `&self`; one reader can be shared across threads.
/// Mutating mapped bytes needs `&mut self` and `USE_WRITABLE`. Independent
/// readers may open the same pair at once; readers that miss the cache each
/// install a complete copy.
pub struct Reader {
    data_path: PathBuf,
    index_path: PathBuf,
    /// `None` when caching is disabled
    cache_path: Option<PathBuf>,
    mode: OpenMode,
    kind: KeyKind,
    region: DataRegion,
    index: SortedIndex,
}

impl Reader {
    /// Open a file pair with default settings for everything but mode and kind
    pub fn open(
        data_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        mode: OpenMode,
        kind: KeyKind,
    ) -> Result<Self> {
        let config = Config::builder().mode(mode).key_kind(kind).build();
        Self::open_with_config(data_path, index_path, &config)
    }

    /// Open a file pair
    pub fn open_with_config(
        data_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        config: &Config,
    ) -> Result<Self> {
        let data_path = data_path.as_ref();
        let index_path = index_path.as_ref();
        let mode = config.mode;
        let kind = config.key_kind;

        let region = if mode.contains(OpenMode::USE_DATA) {
            DataRegion::open(data_path, mode.contains(OpenMode::USE_WRITABLE))?
        } else {
            DataRegion::Absent
        };

        let cache_path = config
            .cache_enabled
            .then(|| index::cache_path(index_path, mode, kind));

        let index = match &cache_path {
            Some(path) if path.exists() => SortedIndex::Cached(CachedIndex::load(path, kind)?),
            _ => {
                let mut entries = text::read_index(index_path, kind)?;
                index::sort_for_kind(kind, &mut entries);
                if let Some(path) = &cache_path {
                    index::save_cache(path, kind, &entries)?;
                }
                SortedIndex::Owned(entries)
            }
        };

        tracing::debug!(
            "Opened {} ({} entries, {} data bytes, cached={})",
            index_path.display(),
            index.len(),
            region.len(),
            index.is_cached()
        );

        Ok(Self {
            data_path: data_path.to_path_buf(),
            index_path: index_path.to_path_buf(),
            cache_path,
            mode,
            kind,
            region,
            index,
        })
    }

    /// Release mappings and the index
    pub fn close(self) {}

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Number of index entries
    pub fn size(&self) -> usize {
        self.index.len()
    }

    /// Bytes in the mapped data region (0 without `USE_DATA`)
    pub fn data_size(&self) -> usize {
        self.region.len()
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn key_kind(&self) -> KeyKind {
        self.kind
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Cache file backing this reader's index, if caching is enabled
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Whether the index was loaded from a cache file
    pub fn is_cached(&self) -> bool {
        self.index.is_cached()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Position of the first entry with `key`, in O(log n)
    ///
    /// Searches for the first entry whose key is >= `key`; duplicates
    /// resolve to the lowest position.
    pub fn lookup_id(&self, key: &Key) -> Result<usize> {
        if key.kind() != self.kind {
            return Err(FfdbError::Mode(format!(
                "{:?} key used with a {:?} index",
                key.kind(),
                self.kind
            )));
        }
        self.index.find(key).ok_or(FfdbError::KeyNotFound)
    }

    pub fn get_db_key(&self, position: usize) -> Result<Key> {
        Ok(self.entry(position)?.key)
    }

    pub fn get_length(&self, position: usize) -> Result<u64> {
        Ok(self.entry(position)?.length)
    }

    pub fn get_offset(&self, position: usize) -> Result<u64> {
        Ok(self.entry(position)?.offset)
    }

    /// Full index entry at `position`
    pub fn entry(&self, position: usize) -> Result<IndexEntry> {
        self.index.get(position).ok_or(FfdbError::OutOfBounds {
            position,
            size: self.size(),
        })
    }

    /// All entries in index order
    pub fn entries(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        self.index.iter()
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Record bytes at `position`, including the trailing terminator byte
    pub fn get_data(&self, position: usize) -> Result<&[u8]> {
        self.require_mode(OpenMode::USE_DATA)?;
        let range = self.data_range(position)?;
        Ok(&self.region.as_slice()[range])
    }

    /// Mutable record bytes at `position`
    ///
    /// Changes stay in this reader's private mapping and never reach the file.
    pub fn get_data_mut(&mut self, position: usize) -> Result<&mut [u8]> {
        self.require_mode(OpenMode::USE_DATA | OpenMode::USE_WRITABLE)?;
        let range = self.data_range(position)?;
        let bytes = self
            .region
            .as_mut_slice()
            .ok_or_else(|| FfdbError::Mode("data region is not writable".to_string()))?;
        Ok(&mut bytes[range])
    }

    fn require_mode(&self, required: OpenMode) -> Result<()> {
        if self.mode.contains(required) {
            Ok(())
        } else {
            Err(FfdbError::Mode(format!(
                "reader for {} is open with mode {:#x}, needs {:#x}",
                self.index_path.display(),
                self.mode.bits(),
                required.bits()
            )))
        }
    }

    /// Byte range of the record at `position` within the data region
    fn data_range(&self, position: usize) -> Result<Range<usize>> {
        let entry = self.entry(position)?;
        let data_size = self.data_size() as u64;
        let out_of_bounds = FfdbError::OutOfBounds {
            position,
            size: self.size(),
        };

        if entry.offset >= data_size {
            return Err(out_of_bounds);
        }
        match entry.end() {
            Some(end) if end <= data_size => Ok(entry.offset as usize..end as usize),
            _ => Err(out_of_bounds),
        }
    }
}
