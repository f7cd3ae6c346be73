use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors reading or rewriting the assessment CSV.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column {0} is missing from the store header")]
    MissingColumn(String),

    #[error("column {column} holds malformed value {value:?}")]
    Malformed { column: String, value: String },

    #[error("unknown category label {0:?}")]
    UnknownLabel(String),
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account {0} already exists")]
    AlreadyExists(String),
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Username already exists.")]
    UsernameTaken(String),

    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0} is not one of the available slots.")]
    UnknownSlot(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model process i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("model did not answer within {0:?}")]
    Timeout(Duration),

    #[error("model exited with {0}")]
    Failed(std::process::ExitStatus),
}

#[derive(Debug, Error)]
pub enum Error {
    /// There is no such question among the 20
    #[error("no such question")]
    IllegalQuestion,
    /// The answer is not on the 0-3 scale
    #[error("answer must be between 0 and 3")]
    IllegalAnswer,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
