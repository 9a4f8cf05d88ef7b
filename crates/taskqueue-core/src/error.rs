//! Typed failure kinds returned by every core operation.

use thiserror::Error;

/// The kind of entity a [`StoreError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A queue, identified by name.
    Queue,
    /// A task, identified by id.
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queue => write!(f, "queue"),
            Self::Task => write!(f, "task"),
        }
    }
}

/// Why a checkout attempt failed.
///
/// Distinguished from [`StoreError::NotFound`] because a checkout that loses
/// a race, or targets a task that is not `pending`, is a normal contention
/// outcome a caller may choose to retry -- not evidence that anything is
/// missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutFailure {
    /// The guarded `UPDATE` affected zero rows: another worker won the race.
    LostRace {
        /// The task id the caller was racing to claim.
        task_id: i64,
    },
    /// The targeted task exists but is not `pending`.
    NotPending {
        /// The task id the caller attempted to check out.
        task_id: i64,
        /// The task's actual status at the time of the attempt.
        status: String,
    },
}

impl std::fmt::Display for CheckoutFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LostRace { task_id } => {
                write!(f, "lost checkout race for task {task_id}")
            }
            Self::NotPending { task_id, status } => {
                write!(f, "task {task_id} is not pending (status: {status})")
            }
        }
    }
}

/// Every typed failure the core can return.
///
/// Per the propagation policy, these surface unchanged to callers -- the
/// core never downgrades a typed failure to a neutral value except in the
/// two documented places: a queue-name checkout with no pending task
/// returns `Ok(None)`, and a stored `parameters` document that fails to
/// parse as JSON degrades to `None` on read.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input violates a documented constraint: a malformed name, an empty
    /// title, a priority outside `[1, 10]`, a malformed status string, a
    /// `parameters` value that is not a JSON object, or a non-positive id.
    #[error("validation failed: {message}")]
    Validation {
        /// Human-readable description of the violated constraint.
        message: String,
    },

    /// The referenced queue or task does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Whether the missing entity was a queue or a task.
        kind: EntityKind,
        /// The name or id that was not found.
        id: String,
    },

    /// A queue with this name already exists.
    #[error("queue already exists: {queue_name}")]
    Conflict {
        /// The queue name that collided.
        queue_name: String,
    },

    /// A checkout attempt lost a race, or targeted a task not in `pending`.
    #[error("checkout failed: {0}")]
    Checkout(CheckoutFailure),

    /// A lower-level storage fault: corrupt file, I/O error, or lock
    /// timeout. Carries the underlying `rusqlite` error as its cause.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A filesystem fault encountered while opening the store (e.g. failing
    /// to create the parent directory of the database path). Grouped with
    /// [`StoreError::Database`] under [`kind_name`](StoreError::kind_name)
    /// since both represent a lower-level storage fault.
    #[error("database error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the core.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Short, stable name for the failure kind, as used by façades that
    /// need to name the kind in a user-visible message or a structured
    /// error envelope.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Validation",
            Self::NotFound { .. } => "NotFound",
            Self::Conflict { .. } => "Conflict",
            Self::Checkout(_) => "Checkout",
            Self::Database(_) | Self::Io(_) => "Database",
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn queue_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Queue,
            id: name.into(),
        }
    }

    pub(crate) fn task_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: EntityKind::Task,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(
            StoreError::validation("bad").kind_name(),
            "Validation"
        );
        assert_eq!(StoreError::queue_not_found("q").kind_name(), "NotFound");
        assert_eq!(
            StoreError::Conflict {
                queue_name: "q".into()
            }
            .kind_name(),
            "Conflict"
        );
        assert_eq!(
            StoreError::Checkout(CheckoutFailure::LostRace { task_id: 1 }).kind_name(),
            "Checkout"
        );
    }

    #[test]
    fn not_found_message_names_the_identifier() {
        let err = StoreError::task_not_found(42);
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("task"));
    }
}
