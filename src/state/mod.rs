//! World State Module
//!
//! Committed key-value state of the local ledger.
//!
//! ## Responsibilities
//! - Serve reads of committed values to many concurrent transactions
//! - Apply committed write sets atomically
//! - Track a version (the committing LSN) per key for conflict checks
//! - Track approximate size for diagnostics
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in RwLock:
//! - Ordered keys, so dumps and listings are deterministic
//! - Versions outlive deletes, so "read absent, then someone created it"
//!   is still detected as a conflict

mod table;

pub use table::StateTable;

/// Version of a key that has never been written
pub const UNWRITTEN: u64 = 0;
