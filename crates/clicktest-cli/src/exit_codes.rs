//! Process exit codes. Part of the CLI contract.

use clicktest_core::{ArenaError, ConfigError, SchemaError, StoreError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_RUNTIME_ERROR: i32 = 1; // storage or aggregation failure
pub const EXIT_USAGE_ERROR: i32 = 2; // bad flags, bad payload, unknown user, bad config

/// Map a command failure to its exit code.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<ArenaError>() {
        return if e.is_client_error() {
            EXIT_USAGE_ERROR
        } else {
            EXIT_RUNTIME_ERROR
        };
    }
    if err.downcast_ref::<SchemaError>().is_some() || err.downcast_ref::<ConfigError>().is_some() {
        return EXIT_USAGE_ERROR;
    }
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::UserNotFound { .. } | StoreError::UsernameTaken { .. }) => EXIT_USAGE_ERROR,
        _ => EXIT_RUNTIME_ERROR,
    }
}
