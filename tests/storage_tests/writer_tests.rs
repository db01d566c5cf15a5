//! Tests for the Writer
//!
//! These tests verify:
//! - Exclusive creation (never overwrites)
//! - Record layout in the data file (bytes + terminator)
//! - Offsets/lengths and the sorted text index written on close
//! - Close idempotence, write-after-close, close-on-drop
//! - Key kind and token validation

use std::fs;
use std::path::PathBuf;

use ffdb::{DataFormat, FfdbError, Key, Writer};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_pair() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("db.data");
    let index = temp_dir.path().join("db.index");
    (temp_dir, data, index)
}

// =============================================================================
// Creation Tests
// =============================================================================

#[test]
fn test_create_makes_both_files() {
    let (_temp, data, index) = setup_temp_pair();

    let writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();

    assert!(data.exists());
    assert!(index.exists());
    assert_eq!(writer.entry_count(), 0);
    assert_eq!(writer.offset(), 0);
    assert_eq!(writer.format(), DataFormat::Ascii);
}

#[test]
fn test_create_rejects_existing_data_file() {
    let (_temp, data, index) = setup_temp_pair();
    fs::write(&data, b"keep me").unwrap();

    let result = Writer::create(&data, &index, DataFormat::Ascii);

    assert!(matches!(result, Err(FfdbError::OpenFailed { .. })));
    assert_eq!(fs::read(&data).unwrap(), b"keep me");
    assert!(!index.exists());
}

#[test]
fn test_create_rejects_existing_index_file() {
    let (_temp, data, index) = setup_temp_pair();
    fs::write(&index, b"1\t0\t1\n").unwrap();

    let result = Writer::create(&data, &index, DataFormat::Binary);

    assert!(matches!(result, Err(FfdbError::OpenFailed { .. })));
    assert!(!data.exists(), "data file must not be created on failure");
    assert_eq!(fs::read(&index).unwrap(), b"1\t0\t1\n");
}

#[test]
fn test_data_format_codes() {
    assert_eq!(DataFormat::from_code(0).unwrap(), DataFormat::Ascii);
    assert_eq!(DataFormat::from_code(1).unwrap(), DataFormat::Binary);
    assert!(matches!(DataFormat::from_code(7), Err(FfdbError::Mode(_))));
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_records_are_terminated() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.write(Key::Int(1), b"abc").unwrap();
    writer.write(Key::Int(2), b"").unwrap();
    writer.write(Key::Int(3), b"de").unwrap();
    writer.close().unwrap();

    assert_eq!(fs::read(&data).unwrap(), b"abc\0\0de\0");
}

#[test]
fn test_offset_advances_by_length() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.write(Key::Int(1), b"abc").unwrap();
    assert_eq!(writer.offset(), 4);
    writer.write(Key::Int(2), b"hello").unwrap();
    assert_eq!(writer.offset(), 10);
    assert_eq!(writer.entry_count(), 2);
}

#[test]
fn test_index_written_sorted_on_close() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.write(Key::Int(3), b"aaa").unwrap();
    writer.write(Key::Int(1), b"bb").unwrap();
    writer.write(Key::Int(2), b"c").unwrap();
    writer.close().unwrap();

    let text = fs::read_to_string(&index).unwrap();
    assert_eq!(text, "1\t4\t3\n2\t7\t2\n3\t0\t4\n");
}

#[test]
fn test_duplicate_keys_keep_write_order() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.write(Key::Int(5), b"first").unwrap();
    writer.write(Key::Int(1), b"x").unwrap();
    writer.write(Key::Int(5), b"second").unwrap();
    writer.close().unwrap();

    let text = fs::read_to_string(&index).unwrap();
    assert_eq!(text, "1\t6\t2\n5\t0\t6\n5\t8\t7\n");
}

#[test]
fn test_negative_keys_written_signed() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.write(Key::Int(4), b"a").unwrap();
    writer.write(Key::Int(-4), b"b").unwrap();
    writer.close().unwrap();

    let text = fs::read_to_string(&index).unwrap();
    assert_eq!(text, "-4\t2\t2\n4\t0\t2\n");
}

#[test]
fn test_token_index_lines() {
    let (_temp, data, index) = setup_temp_pair();
    let key = Key::token(b"abc").unwrap();

    let mut writer = Writer::create(&data, &index, DataFormat::Binary).unwrap();
    writer.write(key, b"payload").unwrap();
    writer.close().unwrap();

    let bytes = fs::read(&index).unwrap();
    let mut expected = key.as_token().unwrap().to_vec();
    expected.extend_from_slice(b"\t0\t8\n");
    assert_eq!(bytes, expected);
}

#[test]
fn test_mixed_key_kinds_rejected() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.write(Key::Int(1), b"a").unwrap();
    let result = writer.write(Key::token(b"t").unwrap(), b"b");

    assert!(matches!(result, Err(FfdbError::Mode(_))));
    assert_eq!(writer.entry_count(), 1);
}

#[test]
fn test_token_with_tab_rejected() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    let result = writer.write(Key::token(b"a\tb").unwrap(), b"x");

    assert!(matches!(result, Err(FfdbError::Mode(_))));
    assert_eq!(writer.offset(), 0);
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.write(Key::Int(1), b"a").unwrap();
    writer.close().unwrap();
    writer.close().unwrap();

    assert!(writer.is_closed());
    assert_eq!(fs::read_to_string(&index).unwrap(), "1\t0\t2\n");
}

#[test]
fn test_write_after_close_fails() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.close().unwrap();
    let result = writer.write(Key::Int(1), b"late");

    assert!(matches!(result, Err(FfdbError::Write(_))));
    assert_eq!(fs::read(&data).unwrap(), b"");
}

#[test]
fn test_drop_closes_writer() {
    let (_temp, data, index) = setup_temp_pair();

    {
        let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
        writer.write(Key::Int(2), b"b").unwrap();
        writer.write(Key::Int(1), b"a").unwrap();
    }

    assert_eq!(fs::read(&data).unwrap(), b"b\0a\0");
    assert_eq!(fs::read_to_string(&index).unwrap(), "1\t2\t2\n2\t0\t2\n");
}

#[test]
fn test_empty_database() {
    let (_temp, data, index) = setup_temp_pair();

    let mut writer = Writer::create(&data, &index, DataFormat::Ascii).unwrap();
    writer.close().unwrap();

    assert_eq!(fs::metadata(&data).unwrap().len(), 0);
    assert_eq!(fs::metadata(&index).unwrap().len(), 0);
}
