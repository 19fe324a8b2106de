//! WAL Writer
//!
//! Handles appending committed transactions to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::context::ChaincodeEvent;
use crate::error::Result;

use super::{WalEntry, WalRecovery, WriteOp};

/// Writes entries to the WAL file
pub struct WalWriter {
    /// Path of the WAL file
    path: PathBuf,

    /// File handle, opened in append mode
    file: File,

    /// Length of the file after the last complete append
    file_len: u64,

    /// LSN assigned to the next appended entry
    next_lsn: u64,

    /// When to fsync
    sync_strategy: WalSyncStrategy,

    /// Entries appended since the last fsync
    unsynced: usize,

    #[cfg(test)]
    fail_syncs: bool,
}

impl WalWriter {
    /// Open or create a WAL file
    ///
    /// An existing file is recovered first: a torn or corrupt tail is cut
    /// off and numbering continues after the last valid LSN.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let next_lsn = if path.exists() {
            let (_, result) = WalRecovery::recover(path)?;
            result.last_lsn + 1
        } else {
            1
        };

        Self::open_at(path, sync_strategy, next_lsn)
    }

    /// Open or create a WAL file whose tail is already known to be clean
    pub fn open_at(path: &Path, sync_strategy: WalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            file_len,
            next_lsn,
            sync_strategy,
            unsynced: 0,
            #[cfg(test)]
            fail_syncs: false,
        })
    }

    /// Append one transaction to the WAL
    ///
    /// Returns the entry as written, with its assigned LSN. A failed write
    /// or a failed fsync is cut back off the file, so an `Err` always means
    /// the entry is not in the log.
    pub fn append(
        &mut self,
        tx_id: &str,
        writes: Vec<WriteOp>,
        events: Vec<ChaincodeEvent>,
    ) -> Result<WalEntry> {
        let entry = WalEntry::new(self.next_lsn, tx_id, writes, events);
        let frame = entry.serialize()?;

        if let Err(e) = self.file.write_all(&frame) {
            self.cut_back();
            return Err(e.into());
        }

        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced + 1 >= count,
        };
        if should_sync {
            if let Err(e) = self.sync_file() {
                self.cut_back();
                return Err(e.into());
            }
            self.unsynced = 0;
        } else {
            self.unsynced += 1;
        }

        self.file_len += frame.len() as u64;
        self.next_lsn += 1;

        tracing::trace!(lsn = entry.lsn, tx_id, bytes = frame.len(), "WAL append");
        Ok(entry)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.sync_file()?;
        self.unsynced = 0;
        Ok(())
    }

    fn sync_file(&mut self) -> std::io::Result<()> {
        #[cfg(test)]
        if self.fail_syncs {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected fsync failure",
            ));
        }
        self.file.sync_data()
    }

    /// Drop anything written past the last complete append
    fn cut_back(&mut self) {
        if let Err(e) = self.file.set_len(self.file_len) {
            tracing::error!("Failed to cut partial WAL frame at {}: {}", self.file_len, e);
        }
    }

    /// LSN the next append will get
    pub fn next_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// LSN of the last appended entry, 0 if none
    pub fn last_lsn(&self) -> u64 {
        self.next_lsn - 1
    }

    /// Entries written but not yet fsynced
    pub fn unsynced_entries(&self) -> usize {
        self.unsynced
    }

    /// Size of the WAL file in bytes
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Path of the WAL file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
