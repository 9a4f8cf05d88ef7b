//! Maps a [`taskqueue_core::StoreError`] to a short, actionable message
//! naming the failure kind and offending identifier.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{kind}: {message}")]
    Store {
        kind: &'static str,
        message: String,
    },
}

impl From<taskqueue_core::StoreError> for CliError {
    fn from(err: taskqueue_core::StoreError) -> Self {
        Self::Store {
            kind: err.kind_name(),
            message: err.to_string(),
        }
    }
}
