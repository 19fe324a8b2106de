//! Tests for WAL Reader
//!
//! These tests verify:
//! - Reading entries from WAL file
//! - Iterator functionality
//! - Partial write handling
//! - Empty file handling

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use studentledger::wal::{WalEntry, WalReader, WriteOp, HEADER_SIZE};
use studentledger::ContractError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn entry(lsn: u64) -> WalEntry {
    WalEntry::new(
        lsn,
        format!("tx-{}", lsn),
        vec![WriteOp::Put {
            key: format!("key{}", lsn),
            value: format!("value{}", lsn).into_bytes(),
        }],
        Vec::new(),
    )
}

fn write_entries_to_wal(path: &PathBuf, entries: &[WalEntry]) {
    let mut file = File::create(path).unwrap();
    for entry in entries {
        let bytes = entry.serialize().unwrap();
        file.write_all(&bytes).unwrap();
    }
    file.sync_all().unwrap();
}

// =============================================================================
// Basic Reading Tests
// =============================================================================

#[test]
fn test_read_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();

    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_read_entries_in_order() {
    let (_temp, wal_path) = setup_temp_wal();
    let originals: Vec<WalEntry> = (1..=3).map(entry).collect();
    write_entries_to_wal(&wal_path, &originals);

    let mut reader = WalReader::open(&wal_path).unwrap();

    for original in &originals {
        assert_eq!(&reader.next_entry().unwrap().unwrap(), original);
    }
    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_position_advances_by_frame() {
    let (_temp, wal_path) = setup_temp_wal();
    let first = entry(1);
    write_entries_to_wal(&wal_path, &[first.clone(), entry(2)]);

    let mut reader = WalReader::open(&wal_path).unwrap();
    reader.next_entry().unwrap();

    assert_eq!(reader.position(), first.serialize().unwrap().len());
}

#[test]
fn test_open_missing_file_fails() {
    let (_temp, wal_path) = setup_temp_wal();

    assert!(matches!(WalReader::open(&wal_path), Err(ContractError::Io(_))));
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iterator_yields_all_entries() {
    let (_temp, wal_path) = setup_temp_wal();
    write_entries_to_wal(&wal_path, &(1..=5).map(entry).collect::<Vec<_>>());

    let lsns: Vec<u64> = WalReader::open(&wal_path)
        .unwrap()
        .entries()
        .map(|e| e.unwrap().lsn)
        .collect();

    assert_eq!(lsns, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_iterator_stops_after_error() {
    let mut bytes = entry(1).serialize().unwrap();
    let mut bad = entry(2).serialize().unwrap();
    bad[HEADER_SIZE] ^= 0xFF;
    bytes.extend_from_slice(&bad);
    bytes.extend_from_slice(&entry(3).serialize().unwrap());

    let results: Vec<_> = WalReader::from_bytes(bytes).entries().collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ContractError::WalCorruption(_))));
}

// =============================================================================
// Partial Write Tests
// =============================================================================

#[test]
fn test_torn_tail_is_reported() {
    let (_temp, wal_path) = setup_temp_wal();
    let good = entry(1).serialize().unwrap();
    let torn = entry(2).serialize().unwrap();

    let mut file = File::create(&wal_path).unwrap();
    file.write_all(&good).unwrap();
    file.write_all(&torn[..torn.len() / 2]).unwrap();
    file.sync_all().unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();

    assert_eq!(reader.next_entry().unwrap().unwrap().lsn, 1);
    assert!(matches!(
        reader.next_entry(),
        Err(ContractError::WalCorruption(_))
    ));
}
