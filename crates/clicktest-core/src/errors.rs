use crate::model::{TrialId, UserId};
use crate::submission::SchemaError;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("Username already taken: {username}")]
    UsernameTaken { username: String },

    #[error("Stored value out of range in {column}: {value}")]
    OutOfRange { column: &'static str, value: String },

    #[error("Corrupt row in {table}: {detail}")]
    CorruptRow { table: &'static str, detail: String },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Errors surfaced by the submission service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The trial was stored but the summary could not be recomputed; the
    /// previous summary is untouched and the next recompute repairs it.
    #[error("Trial {trial_id} stored but stats recompute failed: {source}")]
    Aggregation {
        trial_id: TrialId,
        #[source]
        source: StoreError,
    },
}

impl ArenaError {
    /// True for errors the client caused (bad payload), as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ArenaError::Schema(_) | ArenaError::Store(StoreError::UserNotFound { .. })
        )
    }
}
