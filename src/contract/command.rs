//! Command definitions
//!
//! The invocation surface of the contract: a function name plus string
//! arguments, as a ledger client submits them.
//!
//! ## Functions
//! - `CreateStudent`  - id, name, dateOfBirth, gender, graduationStatus
//! - `ReadStudent`    - id
//! - `UpdateStudent`  - id, name, dateOfBirth, gender, graduationStatus
//! - `DeleteStudent`  - id
//! - `GetRecordCount` - no arguments
//!
//! Dates are RFC 3339 (`2024-01-02T15:04:05Z`) or a plain `YYYY-MM-DD`,
//! which is read as midnight UTC.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ContractError, Result};

/// Function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    CreateStudent,
    ReadStudent,
    UpdateStudent,
    DeleteStudent,
    GetRecordCount,
}

impl Function {
    /// All callable functions
    pub const ALL: [Function; 5] = [
        Function::CreateStudent,
        Function::ReadStudent,
        Function::UpdateStudent,
        Function::DeleteStudent,
        Function::GetRecordCount,
    ];

    /// Name a client uses to invoke the function
    pub fn name(self) -> &'static str {
        match self {
            Function::CreateStudent => "CreateStudent",
            Function::ReadStudent => "ReadStudent",
            Function::UpdateStudent => "UpdateStudent",
            Function::DeleteStudent => "DeleteStudent",
            Function::GetRecordCount => "GetRecordCount",
        }
    }

    /// Look a function up by its invocation name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Number of string arguments the function takes
    pub fn arity(self) -> usize {
        match self {
            Function::CreateStudent | Function::UpdateStudent => 5,
            Function::ReadStudent | Function::DeleteStudent => 1,
            Function::GetRecordCount => 0,
        }
    }
}

/// A parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new student record
    CreateStudent {
        id: String,
        name: String,
        date_of_birth: DateTime<Utc>,
        gender: String,
        graduation_status: bool,
    },

    /// Read a student record
    ReadStudent { id: String },

    /// Overwrite every field of an existing record
    UpdateStudent {
        id: String,
        name: String,
        date_of_birth: DateTime<Utc>,
        gender: String,
        graduation_status: bool,
    },

    /// Delete a student record
    DeleteStudent { id: String },

    /// Read the record counter
    GetRecordCount,
}

impl Command {
    /// Parse a function name and its string arguments
    pub fn parse<S: AsRef<str>>(function: &str, args: &[S]) -> Result<Self> {
        let func = Function::from_name(function).ok_or_else(|| {
            ContractError::InvalidArgument(format!("unknown function '{}'", function))
        })?;

        if args.len() != func.arity() {
            return Err(ContractError::InvalidArgument(format!(
                "{} expects {} arguments, got {}",
                func.name(),
                func.arity(),
                args.len()
            )));
        }

        let arg = |i: usize| args[i].as_ref().to_string();

        let command = match func {
            Function::CreateStudent => Command::CreateStudent {
                id: arg(0),
                name: arg(1),
                date_of_birth: parse_date(args[2].as_ref())?,
                gender: arg(3),
                graduation_status: parse_bool(args[4].as_ref())?,
            },
            Function::UpdateStudent => Command::UpdateStudent {
                id: arg(0),
                name: arg(1),
                date_of_birth: parse_date(args[2].as_ref())?,
                gender: arg(3),
                graduation_status: parse_bool(args[4].as_ref())?,
            },
            Function::ReadStudent => Command::ReadStudent { id: arg(0) },
            Function::DeleteStudent => Command::DeleteStudent { id: arg(0) },
            Function::GetRecordCount => Command::GetRecordCount,
        };

        Ok(command)
    }

    /// Get the function type
    pub fn function(&self) -> Function {
        match self {
            Command::CreateStudent { .. } => Function::CreateStudent,
            Command::ReadStudent { .. } => Function::ReadStudent,
            Command::UpdateStudent { .. } => Function::UpdateStudent,
            Command::DeleteStudent { .. } => Function::DeleteStudent,
            Command::GetRecordCount => Function::GetRecordCount,
        }
    }

    /// Whether the command leaves the world state untouched
    pub fn is_read_only(&self) -> bool {
        matches!(self, Command::ReadStudent { .. } | Command::GetRecordCount)
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ContractError::InvalidArgument(format!("invalid date '{}'", raw)))
}

/// Parse a boolean the way ledger clients encode it
pub fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ContractError::InvalidArgument(format!(
            "invalid boolean '{}'",
            raw
        ))),
    }
}
