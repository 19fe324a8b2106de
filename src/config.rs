//! Configuration for StudentLedger
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{ContractError, Result};

/// Reserved world-state key holding the serialized record counter
pub const RECORD_COUNT_KEY: &str = "recordCount";

/// Main configuration for a local ledger instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all ledger files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── ledger.wal       (write-ahead log, one entry per transaction)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // Contract Configuration
    // -------------------------------------------------------------------------
    /// World-state key used for the record counter
    pub record_count_key: String,

    // -------------------------------------------------------------------------
    // Event Configuration
    // -------------------------------------------------------------------------
    /// Number of committed events retained in memory
    pub event_log_capacity: usize,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy)]
pub enum WalSyncStrategy {
    /// fsync after every committed transaction (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./studentledger_data"),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            record_count_key: RECORD_COUNT_KEY.to_string(),
            event_log_capacity: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration for values the ledger cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.record_count_key.is_empty() {
            return Err(ContractError::Config(
                "record_count_key must not be empty".to_string(),
            ));
        }
        if self.event_log_capacity == 0 {
            return Err(ContractError::Config(
                "event_log_capacity must be at least 1".to_string(),
            ));
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(ContractError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all ledger files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the world-state key of the record counter
    pub fn record_count_key(mut self, key: impl Into<String>) -> Self {
        self.config.record_count_key = key.into();
        self
    }

    /// Set how many committed events are kept in memory
    pub fn event_log_capacity(mut self, capacity: usize) -> Self {
        self.config.event_log_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
