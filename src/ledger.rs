//! Ledger Module
//!
//! A single-process ledger host for the student contract.
//!
//! ## Responsibilities
//! - Hand out one transaction context per invocation
//! - Commit a transaction's write set and events atomically (one WAL entry)
//! - Reject commits whose reads went stale (MVCC read-set check)
//! - Rebuild world state and the event log from the WAL on startup

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::context::{ChaincodeEvent, EventSink, WorldState};
use crate::contract::{Command, StudentContract};
use crate::error::{ContractError, Result};
use crate::state::StateTable;
use crate::wal::{WalRecovery, WalWriter, WriteOp};

/// An event as recorded by a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedEvent {
    /// LSN of the committing WAL entry
    pub lsn: u64,

    /// Committing transaction
    pub tx_id: String,

    /// The event itself
    pub event: ChaincodeEvent,
}

/// What a successful commit produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: String,
    pub lsn: u64,
    pub events: Vec<ChaincodeEvent>,
}

/// Response payload of a submitted command plus its commit receipt
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub payload: Vec<u8>,
    pub receipt: CommitReceipt,
}

/// The local ledger
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Transactions** run concurrently; each reads committed state through
///   the state table's RwLock and buffers its own writes and events.
/// - **Commits** are serialized by the WAL mutex: validate reads → append
///   WAL entry → apply to state → record events, all under that one lock.
pub struct Ledger {
    /// Ledger configuration
    config: Config,

    /// Path of the WAL file
    wal_path: PathBuf,

    /// Write-ahead log; holding this lock is holding the commit lock
    wal: Mutex<WalWriter>,

    /// Committed world state (internal RwLock)
    state: StateTable,

    /// Most recent committed events, oldest first
    events: RwLock<VecDeque<CommittedEvent>>,

    /// The contract invoked by `submit`/`evaluate`
    contract: StudentContract,

    /// Sequence for transaction ids
    tx_seq: AtomicU64,
}

impl Ledger {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "ledger.wal";

    /// Open or create a ledger with the given config
    ///
    /// On startup:
    /// 1. Validate config and create the data directory
    /// 2. Recover the WAL (cutting off a torn tail) if it exists; corruption
    ///    before the tail fails the open with `WalCorruption`
    /// 3. Replay entries into world state and the event log
    /// 4. Reopen the WAL for appends after the last valid LSN
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let wal_path = Self::wal_path_for(&config.data_dir);
        let state = StateTable::new();
        let mut events = VecDeque::new();

        let wal = if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;

            if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
                tracing::info!(
                    "WAL recovery: {} entries recovered, {} corrupted, last_lsn={}",
                    recovery.entries_recovered,
                    recovery.entries_corrupted,
                    recovery.last_lsn
                );
            }

            for entry in entries {
                state.apply(&entry.writes, entry.lsn);
                for event in entry.events {
                    push_bounded(
                        &mut events,
                        config.event_log_capacity,
                        CommittedEvent {
                            lsn: entry.lsn,
                            tx_id: entry.tx_id.clone(),
                            event,
                        },
                    );
                }
            }

            WalWriter::open_at(&wal_path, config.wal_sync_strategy, recovery.last_lsn + 1)?
        } else {
            WalWriter::open_at(&wal_path, config.wal_sync_strategy, 1)?
        };

        tracing::info!(
            "Ledger opened at {} ({} keys, next lsn {})",
            config.data_dir.display(),
            state.entry_count(),
            wal.next_lsn()
        );

        let contract = StudentContract::with_record_count_key(config.record_count_key.clone());

        Ok(Self {
            config,
            wal_path,
            wal: Mutex::new(wal),
            state,
            events: RwLock::new(events),
            contract,
            tx_seq: AtomicU64::new(0),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Path of the WAL file inside a data directory
    pub fn wal_path_for(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::WAL_FILENAME)
    }

    /// Start a transaction against the current committed state
    pub fn begin(&self) -> LedgerTxn<'_> {
        LedgerTxn {
            state: &self.state,
            tx_id: self.next_tx_id(),
            reads: RefCell::new(BTreeMap::new()),
            writes: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Commit a transaction
    ///
    /// Fails with `Conflict` if any key the transaction read has been
    /// committed by someone else since. Nothing is written in that case.
    pub fn commit(&self, txn: LedgerTxn<'_>) -> Result<CommitReceipt> {
        if !std::ptr::eq(txn.state, &self.state) {
            return Err(ContractError::InvalidArgument(format!(
                "transaction {} was not started on this ledger",
                txn.tx_id
            )));
        }

        let LedgerTxn {
            tx_id,
            reads,
            writes,
            events,
            ..
        } = txn;

        let mut wal = self.wal.lock();

        for (key, seen) in reads.into_inner() {
            if self.state.version(&key) != seen {
                tracing::debug!(tx_id = %tx_id, key = %key, "read conflict");
                return Err(ContractError::Conflict { tx_id, key });
            }
        }

        let writes: Vec<WriteOp> = writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => WriteOp::Put { key, value },
                None => WriteOp::Delete { key },
            })
            .collect();

        let entry = wal.append(&tx_id, writes, events)?;
        self.state.apply(&entry.writes, entry.lsn);

        {
            let mut log = self.events.write();
            for event in &entry.events {
                push_bounded(
                    &mut log,
                    self.config.event_log_capacity,
                    CommittedEvent {
                        lsn: entry.lsn,
                        tx_id: entry.tx_id.clone(),
                        event: event.clone(),
                    },
                );
            }
        }

        tracing::info!(
            tx_id = %entry.tx_id,
            lsn = entry.lsn,
            writes = entry.writes.len(),
            events = entry.events.len(),
            "transaction committed"
        );

        Ok(CommitReceipt {
            tx_id: entry.tx_id,
            lsn: entry.lsn,
            events: entry.events,
        })
    }

    /// Run `f` in a fresh transaction and commit it if `f` succeeds
    ///
    /// On error the transaction is dropped: no writes, no events.
    pub fn transact<T, F>(&self, f: F) -> Result<(T, CommitReceipt)>
    where
        F: FnOnce(&StudentContract, &mut LedgerTxn<'_>) -> Result<T>,
    {
        let mut txn = self.begin();
        let value = match f(&self.contract, &mut txn) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(tx_id = %txn.tx_id, "transaction rolled back: {}", e);
                return Err(e);
            }
        };

        let receipt = self.commit(txn)?;
        Ok((value, receipt))
    }

    /// Execute a command and commit its effects
    pub fn submit(&self, command: &Command) -> Result<TxOutcome> {
        tracing::debug!("submit {}", command.function().name());
        let (payload, receipt) =
            self.transact(|contract, txn| contract.execute(txn, command))?;
        Ok(TxOutcome { payload, receipt })
    }

    /// Execute a command without committing anything (query)
    pub fn evaluate(&self, command: &Command) -> Result<Vec<u8>> {
        tracing::debug!("evaluate {}", command.function().name());
        let mut txn = self.begin();
        self.contract.execute(&mut txn, command)
    }

    /// Sync the WAL and close the ledger
    pub fn close(self) -> Result<()> {
        self.wal.lock().sync()?;
        tracing::info!("Ledger at {} closed", self.config.data_dir.display());
        Ok(())
    }

    fn next_tx_id(&self) -> String {
        let seq = self.tx_seq.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        format!("tx-{:x}-{}", nanos, seq)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get a committed value by key
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.state.get(key)
    }

    /// Committed keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.state.keys()
    }

    /// Retained committed events, oldest first
    pub fn events(&self) -> Vec<CommittedEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// LSN of the last committed transaction, 0 if none
    pub fn last_lsn(&self) -> u64 {
        self.wal.lock().last_lsn()
    }

    /// Number of live keys in world state
    pub fn entry_count(&self) -> usize {
        self.state.entry_count()
    }

    /// Approximate world state size in bytes
    pub fn state_size(&self) -> usize {
        self.state.size()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL file path
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The contract this ledger runs
    pub fn contract(&self) -> &StudentContract {
        &self.contract
    }
}

/// A transaction context over the ledger's committed state
///
/// Reads see the transaction's own writes first. Writes and events stay
/// private until [`Ledger::commit`]; dropping the transaction discards them.
pub struct LedgerTxn<'a> {
    state: &'a StateTable,
    tx_id: String,

    /// Version of every committed key read, as first seen
    reads: RefCell<BTreeMap<String, u64>>,

    /// Pending writes, `None` marks a delete
    writes: BTreeMap<String, Option<Vec<u8>>>,

    events: Vec<ChaincodeEvent>,
}

impl LedgerTxn<'_> {
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Events emitted so far
    pub fn events(&self) -> &[ChaincodeEvent] {
        &self.events
    }

    /// Number of pending writes
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Committed keys this transaction has read
    pub fn read_keys(&self) -> Vec<String> {
        self.reads.borrow().keys().cloned().collect()
    }
}

impl WorldState for LedgerTxn<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(pending) = self.writes.get(key) {
            return Ok(pending.clone());
        }

        let (value, version) = self.state.get_versioned(key);
        self.reads
            .borrow_mut()
            .entry(key.to_string())
            .or_insert(version);
        Ok(value)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        if key.is_empty() {
            return Err(ContractError::Store("key must not be empty".to_string()));
        }
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(ContractError::Store("key must not be empty".to_string()));
        }
        self.writes.insert(key.to_string(), None);
        Ok(())
    }
}

impl EventSink for LedgerTxn<'_> {
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()> {
        if name.is_empty() {
            return Err(ContractError::Event("event name must not be empty".to_string()));
        }
        self.events.push(ChaincodeEvent::new(name, payload));
        Ok(())
    }
}

fn push_bounded(log: &mut VecDeque<CommittedEvent>, capacity: usize, event: CommittedEvent) {
    if log.len() == capacity {
        log.pop_front();
    }
    log.push_back(event);
}
