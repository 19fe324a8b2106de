//! Error types for StudentLedger
//!
//! Provides a unified error type for contract calls and the local ledger host.

use thiserror::Error;

/// Result type alias using ContractError
pub type Result<T> = std::result::Result<T, ContractError>;

/// Unified error type for StudentLedger operations
#[derive(Debug, Error)]
pub enum ContractError {
    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("a student record with the id '{0}' already exists")]
    AlreadyExists(String),

    #[error("the student {0} does not exist")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Host Errors (world state and event channel)
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(String),

    #[error("Event error: {0}")]
    Event(String),

    #[error("Transaction {tx_id} conflicts on key '{key}'")]
    Conflict { tx_id: String, key: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Invocation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // I/O and WAL Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        ContractError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for ContractError {
    fn from(err: bincode::Error) -> Self {
        ContractError::Serialization(err.to_string())
    }
}
