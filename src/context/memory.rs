//! In-memory transaction context
//!
//! BTreeMap world state plus an ordered event list, with switchable
//! failures so store and event errors can be driven from tests.

use std::collections::BTreeMap;

use crate::error::{ContractError, Result};

use super::{ChaincodeEvent, EventSink, WorldState};

/// Non-durable transaction context
#[derive(Debug, Default)]
pub struct MemoryContext {
    /// Current world state
    state: BTreeMap<String, Vec<u8>>,

    /// Events in emission order
    events: Vec<ChaincodeEvent>,

    /// Injected failures
    fail_gets: bool,
    fail_puts: bool,
    fail_deletes: bool,
    fail_events: bool,
}

impl MemoryContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `get_state` fail with a store error
    pub fn fail_gets(&mut self, fail: bool) {
        self.fail_gets = fail;
    }

    /// Make every `put_state` fail with a store error
    pub fn fail_puts(&mut self, fail: bool) {
        self.fail_puts = fail;
    }

    /// Make every `del_state` fail with a store error
    pub fn fail_deletes(&mut self, fail: bool) {
        self.fail_deletes = fail;
    }

    /// Make every `set_event` fail with an event error
    pub fn fail_events(&mut self, fail: bool) {
        self.fail_events = fail;
    }

    /// Current world state
    pub fn state(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.state
    }

    /// Events emitted so far, oldest first
    pub fn events(&self) -> &[ChaincodeEvent] {
        &self.events
    }

    /// Drain the emitted events
    pub fn take_events(&mut self) -> Vec<ChaincodeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Names of the emitted events, oldest first
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }
}

impl WorldState for MemoryContext {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_gets {
            return Err(ContractError::Store(format!(
                "failed to read from world state: key '{}'",
                key
            )));
        }
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        if self.fail_puts {
            return Err(ContractError::Store(format!(
                "failed to put to world state: key '{}'",
                key
            )));
        }
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<()> {
        if self.fail_deletes {
            return Err(ContractError::Store(format!(
                "failed to delete state: key '{}'",
                key
            )));
        }
        self.state.remove(key);
        Ok(())
    }
}

impl EventSink for MemoryContext {
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()> {
        if self.fail_events {
            return Err(ContractError::Event(format!(
                "event {} failed to register",
                name
            )));
        }
        self.events.push(ChaincodeEvent::new(name, payload));
        Ok(())
    }
}
