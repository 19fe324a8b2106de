//! Contract Module
//!
//! CRUD handlers for student records over a transaction context.
//!
//! ## Persisted Layout
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────┐
//! │ Key              │ Value (JSON)                             │
//! ├──────────────────┼──────────────────────────────────────────┤
//! │ <student id>     │ {"id","name","dateOfBirth","gender",     │
//! │                  │  "graduationStatus"}                     │
//! │ recordCount      │ {"count": <creates - deletes>}           │
//! └──────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! ## Events
//! - `CreateStudent` / `UpdateStudent` / `DeleteStudent` on each mutation
//! - `ReadStudent` on every successful read, including the read that
//!   precedes an update

mod command;
pub mod events;
mod student;

pub use command::{parse_bool, parse_date, Command, Function};
pub use student::{RecordCount, Student};

use chrono::{DateTime, Utc};

use crate::config::RECORD_COUNT_KEY;
use crate::context::TransactionContext;
use crate::error::{ContractError, Result};

/// The student record contract
///
/// Stateless apart from the counter key; every call works against the
/// transaction context it is handed.
#[derive(Debug, Clone)]
pub struct StudentContract {
    record_count_key: String,
}

impl Default for StudentContract {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentContract {
    /// Contract using the default `recordCount` counter key
    pub fn new() -> Self {
        Self {
            record_count_key: RECORD_COUNT_KEY.to_string(),
        }
    }

    /// Contract keeping its counter under a different key
    pub fn with_record_count_key(key: impl Into<String>) -> Self {
        Self {
            record_count_key: key.into(),
        }
    }

    /// Key the record counter is stored under
    pub fn record_count_key(&self) -> &str {
        &self.record_count_key
    }

    /// Execute a parsed command
    ///
    /// Returns the response payload: record JSON for reads, the count as
    /// decimal text for `GetRecordCount`, empty otherwise.
    pub fn execute<C>(&self, ctx: &mut C, command: &Command) -> Result<Vec<u8>>
    where
        C: TransactionContext + ?Sized,
    {
        match command {
            Command::CreateStudent {
                id,
                name,
                date_of_birth,
                gender,
                graduation_status,
            } => {
                self.create_student(ctx, id, name, *date_of_birth, gender, *graduation_status)?;
                Ok(Vec::new())
            }
            Command::ReadStudent { id } => {
                let student = self.read_student(ctx, id)?;
                Ok(serde_json::to_vec(&student)?)
            }
            Command::UpdateStudent {
                id,
                name,
                date_of_birth,
                gender,
                graduation_status,
            } => {
                self.update_student(ctx, id, name, *date_of_birth, gender, *graduation_status)?;
                Ok(Vec::new())
            }
            Command::DeleteStudent { id } => {
                self.delete_student(ctx, id)?;
                Ok(Vec::new())
            }
            Command::GetRecordCount => {
                let count = self.get_record_count(&*ctx)?;
                Ok(count.to_string().into_bytes())
            }
        }
    }

    /// Create a new record
    ///
    /// Fails with `AlreadyExists` if `id` is taken. The event and the
    /// counter increment only happen after the record is written.
    pub fn create_student<C>(
        &self,
        ctx: &mut C,
        id: &str,
        name: &str,
        date_of_birth: DateTime<Utc>,
        gender: &str,
        graduation_status: bool,
    ) -> Result<()>
    where
        C: TransactionContext + ?Sized,
    {
        if load(&*ctx, id)?.is_some() {
            return Err(ContractError::AlreadyExists(id.to_string()));
        }

        let student = Student {
            id: id.to_string(),
            name: name.to_string(),
            date_of_birth,
            gender: gender.to_string(),
            graduation_status,
        };
        let student_json = serde_json::to_vec(&student)?;

        ctx.put_state(id, student_json)?;
        ctx.set_event(events::CREATE_STUDENT, events::created(id))?;
        tracing::debug!(id, "student created");

        self.update_record_count(ctx, 1)?;
        Ok(())
    }

    /// Read a record, emitting a `ReadStudent` event
    pub fn read_student<C>(&self, ctx: &mut C, id: &str) -> Result<Student>
    where
        C: TransactionContext + ?Sized,
    {
        let student_json = load(&*ctx, id)?.ok_or_else(|| ContractError::NotFound(id.to_string()))?;
        let student: Student = serde_json::from_slice(&student_json)?;

        ctx.set_event(events::READ_STUDENT, events::read(id))?;
        tracing::trace!(id, "student read");

        Ok(student)
    }

    /// Overwrite every mutable field of an existing record
    ///
    /// Reads first, so a missing record fails with `NotFound` and a
    /// `ReadStudent` event precedes the `UpdateStudent` one.
    pub fn update_student<C>(
        &self,
        ctx: &mut C,
        id: &str,
        name: &str,
        date_of_birth: DateTime<Utc>,
        gender: &str,
        graduation_status: bool,
    ) -> Result<()>
    where
        C: TransactionContext + ?Sized,
    {
        let mut student = self.read_student(ctx, id)?;
        student.name = name.to_string();
        student.date_of_birth = date_of_birth;
        student.gender = gender.to_string();
        student.graduation_status = graduation_status;

        let student_json = serde_json::to_vec(&student)?;
        ctx.put_state(id, student_json)?;
        ctx.set_event(events::UPDATE_STUDENT, events::updated(id))?;
        tracing::debug!(id, "student updated");

        Ok(())
    }

    /// Delete a record
    ///
    /// No existence check: deleting an absent id succeeds and still
    /// decrements the counter.
    pub fn delete_student<C>(&self, ctx: &mut C, id: &str) -> Result<()>
    where
        C: TransactionContext + ?Sized,
    {
        ctx.del_state(id)?;
        ctx.set_event(events::DELETE_STUDENT, events::deleted(id))?;
        tracing::debug!(id, "student deleted");

        self.update_record_count(ctx, -1)?;
        Ok(())
    }

    /// Add `delta` to the record counter, creating it at zero if absent
    ///
    /// Returns the new count.
    pub fn update_record_count<C>(&self, ctx: &mut C, delta: i64) -> Result<i64>
    where
        C: TransactionContext + ?Sized,
    {
        let mut record_count = self.current_count(&*ctx)?;
        record_count.count += delta;

        let count_json = serde_json::to_vec(&record_count)?;
        ctx.put_state(&self.record_count_key, count_json)?;

        Ok(record_count.count)
    }

    /// Net number of records created minus deleted
    ///
    /// An absent counter reads as zero; a malformed one is an error.
    pub fn get_record_count<C>(&self, ctx: &C) -> Result<i64>
    where
        C: TransactionContext + ?Sized,
    {
        Ok(self.current_count(ctx)?.count)
    }

    fn current_count<C>(&self, ctx: &C) -> Result<RecordCount>
    where
        C: TransactionContext + ?Sized,
    {
        match load(ctx, &self.record_count_key)? {
            Some(count_json) => Ok(serde_json::from_slice(&count_json)?),
            None => Ok(RecordCount::default()),
        }
    }
}

/// Read a key, treating an empty value as absent
fn load<C>(ctx: &C, key: &str) -> Result<Option<Vec<u8>>>
where
    C: TransactionContext + ?Sized,
{
    Ok(ctx.get_state(key)?.filter(|value| !value.is_empty()))
}
