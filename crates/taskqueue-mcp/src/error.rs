//! The façade's own failure kind, distinct from [`taskqueue_core::StoreError`]:
//! it additionally covers an unknown tool name and a malformed `args` value,
//! neither of which the core has any notion of.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("no such tool: {0}")]
    UnknownTool(String),

    #[error("malformed arguments: {0}")]
    MalformedArgs(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] taskqueue_core::StoreError),
}

impl ToolError {
    /// Short, stable kind name, mirroring
    /// [`taskqueue_core::StoreError::kind_name`].
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "UnknownTool",
            Self::MalformedArgs(_) => "MalformedArgs",
            Self::InvalidArgument(_) => "Validation",
            Self::Store(err) => err.kind_name(),
        }
    }
}
