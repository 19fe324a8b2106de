//! Event names and payloads emitted by the student contract

pub const CREATE_STUDENT: &str = "CreateStudent";
pub const READ_STUDENT: &str = "ReadStudent";
pub const UPDATE_STUDENT: &str = "UpdateStudent";
pub const DELETE_STUDENT: &str = "DeleteStudent";

pub(crate) fn created(id: &str) -> Vec<u8> {
    format!("Created student: {}", id).into_bytes()
}

pub(crate) fn read(id: &str) -> Vec<u8> {
    format!("Read student: {}", id).into_bytes()
}

pub(crate) fn updated(id: &str) -> Vec<u8> {
    format!("Updated student: {}", id).into_bytes()
}

pub(crate) fn deleted(id: &str) -> Vec<u8> {
    format!("Deleted student: {}", id).into_bytes()
}
