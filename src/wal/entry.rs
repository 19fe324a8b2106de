//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::context::ChaincodeEvent;
use crate::error::{ContractError, Result};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Maximum data section size (64 MB)
pub const MAX_ENTRY_SIZE: u32 = 64 * 1024 * 1024;

/// A single committed transaction in the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,

    /// Id of the transaction this entry commits
    pub tx_id: String,

    /// World-state mutations, in application order
    pub writes: Vec<WriteOp>,

    /// Events emitted by the transaction, in emission order
    pub events: Vec<ChaincodeEvent>,
}

/// A world-state mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
    /// Put a key-value pair
    Put { key: String, value: Vec<u8> },

    /// Delete a key
    Delete { key: String },
}

impl WriteOp {
    /// Key touched by the mutation
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        lsn: u64,
        tx_id: impl Into<String>,
        writes: Vec<WriteOp>,
        events: Vec<ChaincodeEvent>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            timestamp,
            tx_id: tx_id.into(),
            writes,
            events,
        }
    }

    /// Encode the entry as a framed record: header + bincode data
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(self)?;
        if data.len() > MAX_ENTRY_SIZE as usize {
            return Err(ContractError::Serialization(format!(
                "WAL entry too large: {} bytes (max {})",
                data.len(),
                MAX_ENTRY_SIZE
            )));
        }

        let mut frame = Vec::with_capacity(HEADER_SIZE + data.len());
        frame.extend_from_slice(&self.lsn.to_be_bytes());
        frame.extend_from_slice(&Self::compute_crc(&data).to_be_bytes());
        frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
        frame.extend_from_slice(&data);

        Ok(frame)
    }

    /// Decode one framed record from the front of `bytes`
    ///
    /// Returns:
    /// - `Ok(Some((entry, consumed)))` for a complete, valid record
    /// - `Ok(None)` if `bytes` ends before the record does (torn write)
    /// - `Err(WalCorruption)` if the record is complete but invalid
    pub fn decode(bytes: &[u8]) -> Result<Option<(Self, usize)>> {
        if bytes.len() < HEADER_SIZE {
            return Ok(None);
        }

        let mut lsn_bytes = [0u8; 8];
        lsn_bytes.copy_from_slice(&bytes[0..8]);
        let lsn = u64::from_be_bytes(lsn_bytes);
        let crc = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let len = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

        if len > MAX_ENTRY_SIZE {
            return Err(ContractError::WalCorruption(format!(
                "entry length {} exceeds maximum {} (lsn {})",
                len, MAX_ENTRY_SIZE, lsn
            )));
        }

        let total = HEADER_SIZE + len as usize;
        if bytes.len() < total {
            return Ok(None);
        }

        let data = &bytes[HEADER_SIZE..total];
        let actual_crc = Self::compute_crc(data);
        if actual_crc != crc {
            return Err(ContractError::WalCorruption(format!(
                "CRC mismatch at lsn {}: expected {:08x}, got {:08x}",
                lsn, crc, actual_crc
            )));
        }

        let entry: WalEntry = bincode::deserialize(data)
            .map_err(|e| ContractError::WalCorruption(format!("undecodable entry: {}", e)))?;

        if entry.lsn != lsn {
            return Err(ContractError::WalCorruption(format!(
                "header lsn {} does not match entry lsn {}",
                lsn, entry.lsn
            )));
        }

        Ok(Some((entry, total)))
    }

    /// Total frame length claimed by a frame header
    ///
    /// Returns `None` when fewer than `HEADER_SIZE` bytes remain. The length
    /// is taken from the header as-is, without checking the data.
    pub fn frame_len(bytes: &[u8]) -> Option<usize> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let len = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        Some(HEADER_SIZE.saturating_add(len as usize))
    }

    /// CRC32 over an entry's data section
    pub fn compute_crc(data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}
