//! Writer
//!
//! Appends records to a new data file and writes the sorted text index on
//! close. Records cannot be updated or deleted; revising a database means
//! writing a new file pair.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{Config, DataFormat};
use crate::error::{FfdbError, Result};
use crate::index::{sort_entries, text, IndexEntry};
use crate::key::{Key, KeyKind};

/// Terminator appended after every record
const TERMINATOR: u8 = 0;

/// Single-producer writer for a new file pair
///
/// The index file is only complete after [`Writer::close`]. Dropping an open
/// writer closes it and logs any failure.
pub struct Writer {
    data_path: PathBuf,
    index_path: PathBuf,
    format: DataFormat,
    /// `None` once closed
    data: Option<BufWriter<File>>,
    index: Option<BufWriter<File>>,
    /// Kind of the first key written
    kind: Option<KeyKind>,
    /// Bytes written to the data file so far
    offset: u64,
    /// Set after a failed data write; the data file may hold a partial record
    failed: bool,
    /// Entries in write order
    entries: Vec<IndexEntry>,
}

impl Writer {
    /// Create a new file pair; fails if either path exists
    pub fn create(
        data_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        format: DataFormat,
    ) -> Result<Self> {
        let config = Config::builder().format(format).build();
        Self::create_with_config(data_path, index_path, &config)
    }

    /// Create a new file pair with explicit settings
    pub fn create_with_config(
        data_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        config: &Config,
    ) -> Result<Self> {
        let data_path = data_path.as_ref();
        let index_path = index_path.as_ref();

        for path in [data_path, index_path] {
            if path.exists() {
                return Err(FfdbError::open_failed(
                    path,
                    io::Error::from(io::ErrorKind::AlreadyExists),
                ));
            }
        }

        let data_file = create_new(data_path)?;
        let index_file = match create_new(index_path) {
            Ok(file) => file,
            Err(e) => {
                drop(data_file);
                let _ = fs::remove_file(data_path);
                return Err(e);
            }
        };

        tracing::debug!(
            "Created file pair {} / {} ({:?})",
            data_path.display(),
            index_path.display(),
            config.format
        );

        Ok(Self {
            data_path: data_path.to_path_buf(),
            index_path: index_path.to_path_buf(),
            format: config.format,
            data: Some(BufWriter::with_capacity(config.write_buffer_size, data_file)),
            index: Some(BufWriter::with_capacity(config.write_buffer_size, index_file)),
            kind: None,
            offset: 0,
            failed: false,
            entries: Vec::new(),
        })
    }

    /// Append a record: `bytes` followed by one terminator byte
    pub fn write(&mut self, key: Key, bytes: &[u8]) -> Result<()> {
        let Some(data) = self.data.as_mut() else {
            return Err(FfdbError::Write(format!(
                "writer for {} is closed",
                self.data_path.display()
            )));
        };
        if self.failed {
            return Err(FfdbError::Write(format!(
                "writer for {} failed on an earlier record",
                self.data_path.display()
            )));
        }

        match self.kind {
            Some(kind) if kind != key.kind() => {
                return Err(FfdbError::Mode(format!(
                    "{:?} key written to a {:?} database",
                    key.kind(),
                    kind
                )));
            }
            _ => {}
        }
        if let Some(token) = key.as_token() {
            if token.iter().any(|&b| b == b'\t' || b == b'\n') {
                return Err(FfdbError::Mode(format!(
                    "token key {:?} contains a tab or newline byte",
                    key.to_string()
                )));
            }
        }

        let write_err = |e: io::Error| {
            FfdbError::Write(format!(
                "could not write to data file {}: {}",
                self.data_path.display(),
                e
            ))
        };
        if let Err(e) = data
            .write_all(bytes)
            .and_then(|()| data.write_all(&[TERMINATOR]))
        {
            // Part of the record may be buffered; later offsets would be wrong
            self.failed = true;
            return Err(write_err(e));
        }

        let length = bytes.len() as u64 + 1;
        self.entries.push(IndexEntry::new(key, length, self.offset));
        self.offset += length;
        self.kind.get_or_insert(key.kind());

        tracing::trace!("Wrote record {} ({} bytes at {})", key, length, self.offset - length);
        Ok(())
    }

    /// Sort the entries, write the index, and release both files
    ///
    /// After a failed write the index covers only the records written before
    /// it. Calling `close` again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let (Some(mut data), Some(mut index)) = (self.data.take(), self.index.take()) else {
            return Ok(());
        };

        sort_entries(&mut self.entries);

        let mut finish = || -> io::Result<()> {
            text::write_index(&mut index, &self.entries)?;
            data.flush()?;
            data.get_ref().sync_all()?;
            index.flush()?;
            index.get_ref().sync_all()
        };
        finish().map_err(|e| {
            FfdbError::Write(format!(
                "could not finish {}: {}",
                self.index_path.display(),
                e
            ))
        })?;

        tracing::info!(
            "Closed {} ({} entries, {} data bytes)",
            self.index_path.display(),
            self.entries.len(),
            self.offset
        );
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.data.is_none()
    }

    /// Whether a data write failed; no further records are accepted
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Records written so far
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Bytes written to the data file so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close writer on drop: {}", e);
        }
    }
}

fn create_new(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| FfdbError::open_failed(path, e))
}
