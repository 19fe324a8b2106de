//! World state table implementation
//!
//! BTreeMap-based state with RwLock for concurrency.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::wal::WriteOp;

use super::UNWRITTEN;

/// Committed world state
pub struct StateTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Live values
    values: BTreeMap<String, Vec<u8>>,

    /// LSN of the last committed write per key, deletes included
    versions: HashMap<String, u64>,

    /// Approximate size of keys and values in bytes
    size: usize,
}

impl StateTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Get a committed value by key
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.read().values.get(key).cloned()
    }

    /// Get a committed value together with its version
    pub fn get_versioned(&self, key: &str) -> (Option<Vec<u8>>, u64) {
        let inner = self.inner.read();
        let version = inner.versions.get(key).copied().unwrap_or(UNWRITTEN);
        (inner.values.get(key).cloned(), version)
    }

    /// Version of a key, `UNWRITTEN` if never written
    pub fn version(&self, key: &str) -> u64 {
        self.inner.read().versions.get(key).copied().unwrap_or(UNWRITTEN)
    }

    /// Apply a committed write set under one write lock
    ///
    /// Returns the new approximate size.
    pub fn apply(&self, writes: &[WriteOp], lsn: u64) -> usize {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        for op in writes {
            match op {
                WriteOp::Put { key, value } => {
                    let added = key.len() + value.len();
                    if let Some(old) = inner.values.insert(key.clone(), value.clone()) {
                        inner.size -= key.len() + old.len();
                    }
                    inner.size += added;
                }
                WriteOp::Delete { key } => {
                    if let Some(old) = inner.values.remove(key) {
                        inner.size -= key.len() + old.len();
                    }
                }
            }
            inner.versions.insert(op.key().to_string(), lsn);
        }

        inner.size
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Number of live keys
    pub fn entry_count(&self) -> usize {
        self.inner.read().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().values.is_empty()
    }

    /// Live keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().values.keys().cloned().collect()
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new()
    }
}
