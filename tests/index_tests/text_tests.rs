//! Tests for the text index
//!
//! These tests verify:
//! - Line counting (with and without a trailing newline)
//! - Parsing in file order and error positions
//! - Writing lines in the `<key>\t<offset>\t<length>` layout

use std::fs;
use std::path::PathBuf;

use ffdb::index::{sort_entries, text};
use ffdb::{FfdbError, IndexEntry, Key, KeyKind};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_index(contents: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.index");
    fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

// =============================================================================
// Line Counting Tests
// =============================================================================

#[test]
fn test_count_lines() {
    let (_temp, path) = setup_temp_index(b"1\t0\t2\n2\t2\t2\n");
    assert_eq!(text::count_lines(&path).unwrap(), 2);
}

#[test]
fn test_count_lines_without_trailing_newline() {
    let (_temp, path) = setup_temp_index(b"1\t0\t2\n2\t2\t2");
    assert_eq!(text::count_lines(&path).unwrap(), 2);
}

#[test]
fn test_count_lines_empty_file() {
    let (_temp, path) = setup_temp_index(b"");
    assert_eq!(text::count_lines(&path).unwrap(), 0);
}

#[test]
fn test_count_lines_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = text::count_lines(&temp_dir.path().join("missing.index"));
    assert!(matches!(result, Err(FfdbError::OpenFailed { .. })));
}

#[test]
fn test_count_lines_larger_than_buffer() {
    let mut contents = Vec::new();
    for i in 0..200_000 {
        contents.extend_from_slice(format!("{}\t{}\t1\n", i, i).as_bytes());
    }
    let (_temp, path) = setup_temp_index(&contents);
    assert_eq!(text::count_lines(&path).unwrap(), 200_000);
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_read_index_keeps_file_order() {
    let (_temp, path) = setup_temp_index(b"3\t0\t4\n1\t4\t3\n");

    let entries = text::read_index(&path, KeyKind::Int).unwrap();

    assert_eq!(
        entries,
        vec![
            IndexEntry::new(Key::Int(3), 4, 0),
            IndexEntry::new(Key::Int(1), 3, 4),
        ]
    );
}

#[test]
fn test_read_index_empty_line_is_error() {
    let (_temp, path) = setup_temp_index(b"1\t0\t2\n\n2\t2\t2\n");

    let result = text::read_index(&path, KeyKind::Int);
    assert!(matches!(result, Err(FfdbError::Format { line: 2, .. })));
}

#[test]
fn test_read_index_extra_field_is_error() {
    let (_temp, path) = setup_temp_index(b"1\t0\t2\textra\n");

    let result = text::read_index(&path, KeyKind::Int);
    assert!(matches!(result, Err(FfdbError::Format { line: 1, .. })));
}

#[test]
fn test_read_token_index_with_binary_bytes() {
    let mut token = [0u8; 32];
    token[0] = 0xff;
    token[10] = b'k';
    let mut contents = token.to_vec();
    contents.extend_from_slice(b"\t12\t3\n");
    let (_temp, path) = setup_temp_index(&contents);

    let entries = text::read_index(&path, KeyKind::Token).unwrap();

    assert_eq!(entries, vec![IndexEntry::new(Key::Token(token), 3, 12)]);
}

// =============================================================================
// Writing Tests
// =============================================================================

#[test]
fn test_write_then_read() {
    let mut entries = vec![
        IndexEntry::new(Key::Int(9), 5, 0),
        IndexEntry::new(Key::Int(-2), 3, 5),
        IndexEntry::new(Key::Int(4), 2, 8),
    ];
    sort_entries(&mut entries);

    let mut out = Vec::new();
    text::write_index(&mut out, &entries).unwrap();
    assert_eq!(out, b"-2\t5\t3\n4\t8\t2\n9\t0\t5\n");

    let (_temp, path) = setup_temp_index(&out);
    assert_eq!(text::read_index(&path, KeyKind::Int).unwrap(), entries);
}
