//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs;
use std::path::Path;

use crate::error::{ContractError, Result};

use super::WalEntry;

/// Reads entries from the WAL file
pub struct WalReader {
    /// Whole file contents
    data: Vec<u8>,

    /// Offset of the next unread frame
    position: usize,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_bytes(fs::read(path)?))
    }

    /// Read frames from an in-memory buffer
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at a clean end of file. A torn frame at the tail
    /// is reported as `WalCorruption`, like a checksum failure.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        if self.position >= self.data.len() {
            return Ok(None);
        }

        match WalEntry::decode(&self.data[self.position..])? {
            Some((entry, consumed)) => {
                self.position += consumed;
                Ok(Some(entry))
            }
            None => Err(ContractError::WalCorruption(format!(
                "incomplete entry at offset {} ({} trailing bytes)",
                self.position,
                self.data.len() - self.position
            ))),
        }
    }

    /// Byte offset of the next unread frame
    pub fn position(&self) -> usize {
        self.position
    }

    /// Iterate over all entries, stopping after the first error
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
