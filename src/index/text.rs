//! Text Index
//!
//! Line-oriented index file shared by the writer and the reader:
//!
//! ```text
//! <key>\t<offset>\t<length>\n
//! ```
//!
//! Numeric keys are decimal text; token keys are the literal 32 bytes.
//! Lines are handled as raw bytes so tokens need not be UTF-8.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use crate::error::{FfdbError, Result};
use crate::key::{Key, KeyKind};

use super::IndexEntry;

/// Read buffer used when counting lines
const COUNT_BUFFER_SIZE: usize = 1024 * 1024;

/// Count the newline-terminated lines of a file
///
/// A final line without a trailing `\n` is counted too.
pub fn count_lines(path: &Path) -> Result<usize> {
    let mut file = File::open(path).map_err(|e| FfdbError::open_failed(path, e))?;

    let mut buffer = vec![0u8; COUNT_BUFFER_SIZE];
    let mut count = 0;
    let mut last = b'\n';
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        count += buffer[..read].iter().filter(|&&b| b == b'\n').count();
        last = buffer[read - 1];
    }
    if last != b'\n' {
        count += 1;
    }
    Ok(count)
}

/// Parse a whole text index in file order
pub fn read_index(path: &Path, kind: KeyKind) -> Result<Vec<IndexEntry>> {
    let capacity = count_lines(path)?;
    let file = File::open(path).map_err(|e| FfdbError::open_failed(path, e))?;
    let mut reader = BufReader::new(file);

    let mut entries = Vec::with_capacity(capacity);
    let mut line = Vec::new();
    let mut line_no = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_no += 1;
        if line.last() == Some(&b'\n') {
            line.pop();
        }

        let entry = parse_line(&line, kind).map_err(|reason| FfdbError::Format {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        })?;
        entries.push(entry);
    }

    tracing::debug!("Parsed {} index entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse one line (without its `\n`)
pub fn parse_line(line: &[u8], kind: KeyKind) -> std::result::Result<IndexEntry, String> {
    let mut fields = line.split(|&b| b == b'\t');
    let (Some(key), Some(offset), Some(length), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err("expected 3 tab-separated fields".to_string());
    };

    let key = Key::parse_text(key, kind).map_err(|e| e.to_string())?;
    let offset = parse_u64(offset).ok_or_else(|| "invalid offset".to_string())?;
    let length = parse_u64(length).ok_or_else(|| "invalid length".to_string())?;

    Ok(IndexEntry::new(key, length, offset))
}

fn parse_u64(field: &[u8]) -> Option<u64> {
    std::str::from_utf8(field).ok()?.parse().ok()
}

/// Write entries as index lines, in the order given
pub fn write_index<W: Write>(out: &mut W, entries: &[IndexEntry]) -> std::io::Result<()> {
    for entry in entries {
        entry.key.write_text(out)?;
        writeln!(out, "\t{}\t{}", entry.offset, entry.length)?;
    }
    Ok(())
}
