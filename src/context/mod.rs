//! Transaction Context Module
//!
//! The host-facing seam of the contract. A host runtime hands the contract
//! one transaction context per invocation; the contract only ever reads,
//! writes and deletes single keys and emits named events through it.
//!
//! ## Implementations
//! - [`MemoryContext`]: plain in-memory world state, no durability
//! - [`crate::ledger::LedgerTxn`]: transaction against the WAL-backed ledger

mod memory;

pub use memory::MemoryContext;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key-value world state as seen from inside one transaction
pub trait WorldState {
    /// Read the value stored at `key`, `None` if absent
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` at `key`
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn del_state(&mut self, key: &str) -> Result<()>;
}

/// Event channel of a transaction
pub trait EventSink {
    /// Emit an event with a name and an opaque payload
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()>;
}

/// Everything a contract invocation can touch
pub trait TransactionContext: WorldState + EventSink {}

impl<T: WorldState + EventSink + ?Sized> TransactionContext for T {}

/// An event emitted by a contract invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeEvent {
    /// Event name (e.g. `CreateStudent`)
    pub name: String,

    /// Event payload bytes
    pub payload: Vec<u8>,
}

impl ChaincodeEvent {
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Payload as text, replacing invalid UTF-8
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
