//! Index Cache
//!
//! Binary side-file holding a sorted, pre-parsed index so repeated opens
//! skip text parsing.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (20 bytes, bincode fixed-int little-endian)      │
//! │   Magic: "FFXC" (4) | Version: u16 (2) | KeyKind: u8    │
//! │   Pad: u8 | EntryCount: u64 (8) | RecordSize: u32 (4)   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Records (EntryCount × RecordSize)                       │
//! │   [Key: 4 or 32][Length: u64][Offset: u64]              │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (4 bytes)                                        │
//! │   RecordsCRC: u32                                       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are decoded on access straight from the mapped file. Offsets are
//! relative to the data file, never addresses.
//!
//! A cache is trusted as long as it is well formed: it is NOT compared
//! against the text index it was built from. Rebuilding the text index
//! requires removing its caches ([`remove_caches`]).

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, BytesMut};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::config::OpenMode;
use crate::error::{FfdbError, Result};
use crate::key::{Key, KeyKind};

use super::IndexEntry;

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes identifying an index cache
pub(crate) const MAGIC: [u8; 4] = *b"FFXC";

/// Current cache format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + KeyKind (1) + Pad (1) + Count (8) + RecordSize (4)
pub(crate) const HEADER_SIZE: usize = 20;

/// Footer size: CRC (4)
pub(crate) const FOOTER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CacheHeader {
    magic: [u8; 4],
    version: u16,
    key_kind: u8,
    pad: u8,
    entry_count: u64,
    record_size: u32,
}

/// Bytes per record: key, then length and offset (8 each)
pub fn record_size(kind: KeyKind) -> usize {
    kind.encoded_len() + 16
}

/// Cache file for an index opened with `mode` and `kind`
///
/// Each mode/kind combination gets its own file next to the index.
pub fn cache_path(index_path: &Path, mode: OpenMode, kind: KeyKind) -> PathBuf {
    let mut name = OsString::from(index_path.as_os_str());
    name.push(format!(".cache.{}.{}", mode.bits(), kind.tag()));
    PathBuf::from(name)
}

/// Directory holding `path`, `.` for bare file names
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn cache_err(path: &Path, what: &str, e: impl std::fmt::Display) -> FfdbError {
    FfdbError::Cache(format!("{} {}: {}", what, path.display(), e))
}

// =============================================================================
// Save
// =============================================================================

/// Persist sorted entries to `path`
///
/// Each call writes its own uniquely named temporary file next to `path` and
/// renames it into place. Readers racing to build the same cache each
/// install a complete file; the last rename wins and earlier mappings keep
/// the file they opened.
pub fn save(path: &Path, kind: KeyKind, entries: &[IndexEntry]) -> Result<()> {
    let record_size = record_size(kind);

    let mut records = BytesMut::with_capacity(entries.len() * record_size);
    for entry in entries {
        if entry.key.kind() != kind {
            return Err(FfdbError::Cache(format!(
                "entry key {} does not match cache key kind {:?}",
                entry.key, kind
            )));
        }
        entry.key.encode(&mut records);
        records.put_u64_le(entry.length);
        records.put_u64_le(entry.offset);
    }
    let crc = crc32fast::hash(&records);

    let header = CacheHeader {
        magic: MAGIC,
        version: VERSION,
        key_kind: kind.code(),
        pad: 0,
        entry_count: entries.len() as u64,
        record_size: record_size as u32,
    };
    let header_bytes =
        bincode::serialize(&header).map_err(|e| cache_err(path, "could not encode header for", e))?;

    let mut tmp = NamedTempFile::new_in(parent_dir(path))
        .map_err(|e| cache_err(path, "could not create temporary file for", e))?;

    let write = |file: &mut File| -> std::io::Result<()> {
        let mut writer = BufWriter::new(file);
        writer.write_all(&header_bytes)?;
        writer.write_all(&records)?;
        writer.write_all(&crc.to_le_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()
    };
    // The temporary file is removed on drop if anything below fails
    write(tmp.as_file_mut()).map_err(|e| cache_err(path, "could not save index cache", e))?;

    if let Err(e) = tmp.persist(path) {
        // Another reader may have won the race to an identical cache
        if path.is_file() {
            tracing::debug!("Index cache {} already in place: {}", path.display(), e.error);
            return Ok(());
        }
        return Err(cache_err(path, "could not save index cache", e.error));
    }

    tracing::debug!("Saved index cache {} ({} entries)", path.display(), entries.len());
    Ok(())
}

// =============================================================================
// Load
// =============================================================================

/// A validated, memory-mapped index cache
pub struct CachedIndex {
    mmap: Mmap,
    kind: KeyKind,
    len: usize,
    record_size: usize,
}

impl CachedIndex {
    /// Map and validate the cache at `path`
    pub fn load(path: &Path, kind: KeyKind) -> Result<Self> {
        let file = File::open(path).map_err(|e| cache_err(path, "could not load index cache", e))?;
        // SAFETY: cache files are written once under a temporary name and
        // renamed into place; they are never modified afterwards.
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| cache_err(path, "could not map index cache", e))?;

        if mmap.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(cache_err(path, "truncated index cache", mmap.len()));
        }

        let header: CacheHeader = bincode::deserialize(&mmap[..HEADER_SIZE])
            .map_err(|e| cache_err(path, "could not decode header of", e))?;

        if header.magic != MAGIC {
            return Err(cache_err(path, "bad magic in", format!("{:?}", header.magic)));
        }
        if header.version != VERSION {
            return Err(cache_err(path, "unsupported version in", header.version));
        }
        if header.key_kind != kind.code() {
            return Err(cache_err(path, "key kind mismatch in", kind.tag()));
        }

        let record_size = record_size(kind);
        if header.record_size as usize != record_size {
            return Err(cache_err(path, "record size mismatch in", header.record_size));
        }

        let len = usize::try_from(header.entry_count)
            .map_err(|e| cache_err(path, "entry count too large in", e))?;
        let expected = len
            .checked_mul(record_size)
            .and_then(|n| n.checked_add(HEADER_SIZE + FOOTER_SIZE))
            .ok_or_else(|| cache_err(path, "entry count too large in", len))?;
        if mmap.len() != expected {
            return Err(cache_err(
                path,
                "length mismatch in",
                format!("expected {} bytes, found {}", expected, mmap.len()),
            ));
        }

        let records_end = HEADER_SIZE + len * record_size;
        let stored_crc = (&mmap[records_end..]).get_u32_le();
        if crc32fast::hash(&mmap[HEADER_SIZE..records_end]) != stored_crc {
            return Err(cache_err(path, "checksum mismatch in", "records"));
        }

        tracing::debug!("Loaded index cache {} ({} entries)", path.display(), len);
        Ok(Self {
            mmap,
            kind,
            len,
            record_size,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn record(&self, position: usize) -> &[u8] {
        let start = HEADER_SIZE + position * self.record_size;
        &self.mmap[start..start + self.record_size]
    }

    /// Decode the key of the record at `position` (must be `< len()`)
    pub fn key_at(&self, position: usize) -> Key {
        Key::decode(self.kind, &mut self.record(position))
    }

    /// Decode the record at `position`
    pub fn get(&self, position: usize) -> Option<IndexEntry> {
        if position >= self.len {
            return None;
        }
        let mut buf = self.record(position);
        let key = Key::decode(self.kind, &mut buf);
        let length = buf.get_u64_le();
        let offset = buf.get_u64_le();
        Some(IndexEntry::new(key, length, offset))
    }
}

// =============================================================================
// Invalidation
// =============================================================================

/// Remove every cache file derived from `index_path`
///
/// Returns how many files were removed.
pub fn remove_caches(index_path: &Path) -> Result<usize> {
    let Some(file_name) = index_path.file_name() else {
        return Ok(0);
    };
    let mut prefix = file_name.to_os_string();
    prefix.push(".cache.");
    let prefix = prefix.to_string_lossy().into_owned();

    let mut removed = 0;
    for entry in fs::read_dir(parent_dir(index_path))? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(&prefix) && entry.path().is_file() {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }

    tracing::debug!("Removed {} cache files for {}", removed, index_path.display());
    Ok(removed)
}
