//! Student record and record counter definitions
//!
//! Both are stored as JSON in the world state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student record, stored at the key equal to its `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub date_of_birth: DateTime<Utc>,
    pub gender: String,
    pub graduation_status: bool,
}

/// Net number of creates minus deletes, stored under the counter key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCount {
    pub count: i64,
}
