//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::{ContractError, Result};

use super::WalEntry;

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries found at the tail (0 or 1)
    pub entries_corrupted: u64,

    /// Last valid LSN
    pub last_lsn: u64,

    /// Whether bytes after the last valid entry were (or would be) cut off
    pub was_truncated: bool,

    /// Length of the valid prefix of the file in bytes
    pub valid_len: u64,
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Read all valid entries
    /// 2. Stop at the first torn, corrupt or out-of-order entry
    /// 3. Truncate the file to the valid prefix if that entry is the tail
    /// 4. Return all valid entries in order
    ///
    /// A bad entry followed by more frames is not a tail: recovery fails
    /// with `WalCorruption` and the file is left untouched.
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let data = fs::read(path)?;
        let (entries, result) = Self::scan(&data)?;

        if result.was_truncated {
            tracing::warn!(
                "WAL {} has {} invalid trailing bytes after lsn {}, truncating",
                path.display(),
                data.len() as u64 - result.valid_len,
                result.last_lsn
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    ///
    /// Fails the same way `recover` does on corruption before the tail.
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let data = fs::read(path)?;
        let (_, result) = Self::scan(&data)?;
        Ok(result)
    }

    fn scan(data: &[u8]) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();
        let mut position = 0usize;

        while position < data.len() {
            let reason = match WalEntry::decode(&data[position..]) {
                Ok(Some((entry, consumed))) => {
                    if entry.lsn > result.last_lsn {
                        result.last_lsn = entry.lsn;
                        result.entries_recovered += 1;
                        position += consumed;
                        entries.push(entry);
                        continue;
                    }
                    format!("lsn {} after lsn {}", entry.lsn, result.last_lsn)
                }
                Ok(None) => {
                    tracing::debug!("Torn WAL entry at offset {}", position);
                    break;
                }
                Err(e) => e.to_string(),
            };

            Self::check_tail(data, position, &reason)?;
            tracing::warn!("Corrupt WAL entry at offset {}: {}", position, reason);
            result.entries_corrupted += 1;
            break;
        }

        result.valid_len = position as u64;
        result.was_truncated = position < data.len();

        Ok((entries, result))
    }

    /// Fail unless the bad frame at `position` runs to the end of the file
    fn check_tail(data: &[u8], position: usize, reason: &str) -> Result<()> {
        let frame_end = WalEntry::frame_len(&data[position..])
            .map_or(data.len(), |len| position.saturating_add(len));

        if frame_end < data.len() {
            return Err(ContractError::WalCorruption(format!(
                "bad entry at offset {} ({}) followed by {} bytes of later entries",
                position,
                reason,
                data.len() - frame_end
            )));
        }
        Ok(())
    }
}
