//! Error types for buildmatrix.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate builder name: {0}")]
    DuplicateBuilderName(String),

    #[error("builder '{builder}' has category '{category}' which no trigger group covers")]
    UnknownCategory { builder: String, category: String },

    #[error("malformed lock reference: {0}")]
    MalformedLockReference(String),

    #[error("builder '{0}' has no eligible workers")]
    EmptyWorkerList(String),

    #[error("trigger group '{group}' references unknown builder '{builder}'")]
    UnknownBuilder { group: String, builder: String },

    #[error("duplicate trigger group: {0}")]
    DuplicateTriggerGroup(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

pub type Result<T> = std::result::Result<T, Error>;
