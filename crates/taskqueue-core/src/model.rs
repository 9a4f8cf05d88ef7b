//! Plain data types returned by the core. Callers receive immutable
//! snapshots; the store is the only writer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A task's position in its lifecycle.
///
/// ```text
///                 add                checkout (guarded)
///             ─────────▶  pending  ───────────────────▶  checked_out
///                          │  ▲                          │   │
///                    fail  │  │  reset                   │   │ complete
///                          ▼  │                          ▼   │
///                        failed                      completed
///                          ▲                               │
///                          │  fail (from any state)         │
///                          └────────────────────────────────┘
/// ```
///
/// `pending` is the only state from which checkout is legal; `complete`
/// is legal only from `checked_out`; `reset` and `fail` are legal from
/// any state and are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Newly added or reset; eligible for checkout.
    Pending,
    /// Claimed by exactly one worker.
    CheckedOut,
    /// Finished successfully.
    Completed,
    /// Finished unsuccessfully.
    Failed,
}

impl TaskStatus {
    /// The stable lowercase string stored in the database and accepted on
    /// the wire, matching [`std::fmt::Display`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::CheckedOut => "checked_out",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status string, rejecting anything outside the four
    /// documented values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "checked_out" => Some(Self::CheckedOut),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named container for tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    /// Unique identifier; non-empty, at most 255 characters, restricted to
    /// letters, digits, `-`, `_`, `.`.
    pub name: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Optional free text describing the work contract shared by all tasks
    /// in the queue.
    pub instructions: Option<String>,
    /// RFC 3339 timestamp, set on creation.
    pub created_at: String,
    /// RFC 3339 timestamp, bumped on every update.
    pub updated_at: String,
}

/// A unit of work owned by exactly one queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Monotonically assigned positive integer, unique across the whole
    /// store (not per queue).
    pub id: i64,
    /// The owning queue's name.
    pub queue_name: String,
    /// Non-empty, at most 500 characters.
    pub title: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Integer in `[1, 10]`; higher is dispatched earlier. Default 5.
    pub priority: i64,
    /// Arbitrary JSON-serializable key→value mapping. `None` if never set;
    /// also `None` if the stored document failed to parse (defensive read,
    /// never a hard failure).
    pub parameters: Option<Value>,
    /// Optional free text, a task-specific supplement to the queue's
    /// instructions.
    pub instructions: Option<String>,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Identifier of the current or last worker. Cleared on reset.
    pub worker_id: Option<String>,
    /// RFC 3339 timestamp, set on creation.
    pub created_at: String,
    /// RFC 3339 timestamp, bumped on every update.
    pub updated_at: String,
    /// RFC 3339 timestamp, set on checkout, cleared on reset.
    pub checked_out_at: Option<String>,
    /// RFC 3339 timestamp, set on completion, cleared on reset.
    pub completed_at: Option<String>,
}

/// An append-only observation about a task. Never updated; cleared only by
/// explicit [`clear_journal`](crate::journal::clear_journal) or by cascade
/// when the task or its queue is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Monotonically assigned positive integer.
    pub id: i64,
    /// The task this entry observes.
    pub task_id: i64,
    /// Any of the four task-status values. Validated independently of the
    /// task's current status -- entries are observations, not transitions.
    pub status: String,
    /// Optional free text.
    pub notes: Option<String>,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

/// A snapshot of task counts for one queue, computed from tasks currently
/// owned by the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Total number of tasks in the queue.
    pub total: i64,
    /// Tasks with status `pending`.
    pub pending: i64,
    /// Tasks with status `checked_out`.
    pub checked_out: i64,
    /// Tasks with status `completed`.
    pub completed: i64,
    /// Tasks with status `failed`.
    pub failed: i64,
}

/// The target of a [`checkout`](crate::task::checkout) call.
///
/// Façades translate a raw command-line or tool-call string with the rule
/// "all-digits ⇒ task id, otherwise queue name"; that rule lives in the
/// façade, never here, per the design notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// Check out the highest-priority pending task in the named queue.
    ByQueue(String),
    /// Check out this specific task id.
    ByTaskId(i64),
}
