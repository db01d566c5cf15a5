//! Data Region
//!
//! The bytes of a data file as seen by a reader.

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::error::{FfdbError, Result};

/// Mapped contents of a data file
pub enum DataRegion {
    /// Data file not opened (index-only mode)
    Absent,
    /// Zero-length data file; nothing to map
    Empty,
    /// Shared read-only mapping
    ReadOnly(Mmap),
    /// Private copy-on-write mapping; writes never reach the file
    Writable(MmapMut),
}

impl DataRegion {
    /// Map the whole file at `path`
    pub fn open(path: &Path, writable: bool) -> Result<Self> {
        let file = File::open(path).map_err(|e| FfdbError::open_failed(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| FfdbError::open_failed(path, e))?
            .len();

        if len == 0 {
            return Ok(DataRegion::Empty);
        }

        // SAFETY: data files are append-only and complete once their writer
        // has closed; readers must not open a pair that is still being written.
        let region = if writable {
            let mmap = unsafe { MmapOptions::new().map_copy(&file) }
                .map_err(|e| FfdbError::open_failed(path, e))?;
            DataRegion::Writable(mmap)
        } else {
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| FfdbError::open_failed(path, e))?;
            DataRegion::ReadOnly(mmap)
        };

        tracing::debug!(
            "Mapped data file {} ({} bytes, writable={})",
            path.display(),
            len,
            writable
        );
        Ok(region)
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, DataRegion::ReadOnly(_) | DataRegion::Writable(_))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            DataRegion::Absent | DataRegion::Empty => &[],
            DataRegion::ReadOnly(mmap) => &mmap[..],
            DataRegion::Writable(mmap) => &mmap[..],
        }
    }

    /// Mutable view, only for writable mappings
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match self {
            DataRegion::Writable(mmap) => Some(&mut mmap[..]),
            _ => None,
        }
    }
}
