//! Tests for WAL Writer
//!
//! These tests verify:
//! - Writing transactions to the WAL
//! - LSN generation and sequencing
//! - Sync strategies (EveryWrite, EveryNEntries)
//! - Reopening continues after the last valid LSN
//! - Integration with reader

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use studentledger::config::WalSyncStrategy;
use studentledger::wal::{WalReader, WalWriter, WriteOp};
use studentledger::ChaincodeEvent;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn put(key: &str, value: &str) -> Vec<WriteOp> {
    vec![WriteOp::Put {
        key: key.to_string(),
        value: value.as_bytes().to_vec(),
    }]
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_write_single_entry() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let entry = writer.append("tx-a", put("k", "v"), Vec::new()).unwrap();

    assert_eq!(entry.lsn, 1);
    assert_eq!(entry.tx_id, "tx-a");
    assert_eq!(writer.next_lsn(), 2);
    assert_eq!(writer.last_lsn(), 1);
    assert!(writer.file_len() > 0);
}

#[test]
fn test_lsn_sequential() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    let lsns: Vec<u64> = (0..5)
        .map(|i| writer.append(&format!("tx-{}", i), put("k", "v"), Vec::new()).unwrap().lsn)
        .collect();

    assert_eq!(lsns, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_fresh_writer_has_no_entries() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    assert_eq!(writer.last_lsn(), 0);
    assert_eq!(writer.file_len(), 0);
    assert!(wal_path.exists());
}

#[test]
fn test_events_only_entry() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    let event = ChaincodeEvent::new("ReadStudent", b"Read student: s1".to_vec());
    writer.append("tx-read", Vec::new(), vec![event.clone()]).unwrap();

    let entry = WalReader::open(&wal_path).unwrap().next_entry().unwrap().unwrap();
    assert!(entry.writes.is_empty());
    assert_eq!(entry.events, vec![event]);
}

// =============================================================================
// Sync Strategy Tests
// =============================================================================

#[test]
fn test_every_write_leaves_nothing_unsynced() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    writer.append("tx", put("k", "v"), Vec::new()).unwrap();

    assert_eq!(writer.unsynced_entries(), 0);
}

#[test]
fn test_every_n_entries_batches_syncs() {
    let (_temp, wal_path) = setup_temp_wal();
    let strategy = WalSyncStrategy::EveryNEntries { count: 3 };
    let mut writer = WalWriter::open(&wal_path, strategy).unwrap();

    writer.append("tx1", put("a", "1"), Vec::new()).unwrap();
    writer.append("tx2", put("b", "2"), Vec::new()).unwrap();
    assert_eq!(writer.unsynced_entries(), 2);

    writer.append("tx3", put("c", "3"), Vec::new()).unwrap();
    assert_eq!(writer.unsynced_entries(), 0);

    writer.append("tx4", put("d", "4"), Vec::new()).unwrap();
    writer.sync().unwrap();
    assert_eq!(writer.unsynced_entries(), 0);
}

// =============================================================================
// Reopen Tests
// =============================================================================

#[test]
fn test_reopen_continues_lsn() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append("tx1", put("a", "1"), Vec::new()).unwrap();
        writer.append("tx2", put("b", "2"), Vec::new()).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let entry = writer.append("tx3", put("c", "3"), Vec::new()).unwrap();

    assert_eq!(entry.lsn, 3);
    let lsns: Vec<u64> = WalReader::open(&wal_path)
        .unwrap()
        .entries()
        .map(|e| e.unwrap().lsn)
        .collect();
    assert_eq!(lsns, vec![1, 2, 3]);
}

#[test]
fn test_reopen_cuts_torn_tail_before_appending() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append("tx1", put("a", "1"), Vec::new()).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&[0xAB; 10]).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    writer.append("tx2", put("b", "2"), Vec::new()).unwrap();

    let entries: Vec<_> = WalReader::open(&wal_path)
        .unwrap()
        .entries()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].tx_id, "tx2");
}

#[test]
fn test_open_at_uses_given_lsn() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open_at(&wal_path, WalSyncStrategy::EveryWrite, 40).unwrap();
    let entry = writer.append("tx", put("k", "v"), Vec::new()).unwrap();

    assert_eq!(entry.lsn, 40);
    assert_eq!(writer.path(), wal_path.as_path());
}
