//! # StudentLedger
//!
//! A student-record contract for a permissioned ledger's world state, with:
//! - CRUD handlers over an injected key-value store and event channel
//! - A running record counter kept under a reserved key
//! - A local, WAL-backed ledger host for running the contract off-network
//! - A command-line client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 CLI / embedding application                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Command (function name + args)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   StudentContract                            │
//! │        create / read / update / delete / count               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  TransactionContext
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │MemoryContext│          │  LedgerTxn  │
//!   │ (in-memory) │          │ (buffered)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ commit
//!                        ┌──────────┴──────────┐
//!                        ▼                     ▼
//!                 ┌─────────────┐       ┌─────────────┐
//!                 │     WAL     │       │ World State │
//!                 │  (Append)   │       │  (RwLock)   │
//!                 └─────────────┘       └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod context;
pub mod contract;
pub mod wal;
pub mod state;
pub mod ledger;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ContractError, Result};
pub use config::Config;
pub use context::{ChaincodeEvent, EventSink, MemoryContext, TransactionContext, WorldState};
pub use contract::{Command, RecordCount, Student, StudentContract};
pub use ledger::{CommitReceipt, Ledger, LedgerTxn, TxOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StudentLedger
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
