//! Idempotent schema installation.
//!
//! `apply` is safe to call on every open: every statement is `IF NOT
//! EXISTS`, so opening an older-schema file is a no-op upgrade as long as
//! this schema remains a superset of what is already on disk.

use rusqlite::Connection;

const CREATE_QUEUES: &str = "
CREATE TABLE IF NOT EXISTS queues (
    name         TEXT PRIMARY KEY,
    description  TEXT,
    instructions TEXT,
    created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

const CREATE_TASKS: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    queue_name     TEXT NOT NULL REFERENCES queues(name) ON DELETE CASCADE,
    title          TEXT NOT NULL,
    description    TEXT,
    priority       INTEGER NOT NULL DEFAULT 5 CHECK (priority BETWEEN 1 AND 10),
    parameters     TEXT,
    instructions   TEXT,
    status         TEXT NOT NULL DEFAULT 'pending'
                     CHECK (status IN ('pending', 'checked_out', 'completed', 'failed')),
    worker_id      TEXT,
    created_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    checked_out_at TEXT,
    completed_at   TEXT
)";

const CREATE_JOURNAL: &str = "
CREATE TABLE IF NOT EXISTS task_journal (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id   INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    status    TEXT NOT NULL
                CHECK (status IN ('pending', 'checked_out', 'completed', 'failed')),
    notes     TEXT,
    timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

// Indexes supporting the dispatch-path lookups: queue+status scans for
// checkout, priority ordering, and age tie-breaking.
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_tasks_queue_status ON tasks(queue_name, status)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
    "CREATE INDEX IF NOT EXISTS idx_journal_task_id ON task_journal(task_id)",
    "CREATE INDEX IF NOT EXISTS idx_journal_timestamp ON task_journal(timestamp)",
    // Covers the checkout dispatch query directly: highest priority, then
    // earliest created_at, among pending tasks in one queue.
    "CREATE INDEX IF NOT EXISTS idx_tasks_checkout_order \
        ON tasks(queue_name, status, priority DESC, created_at ASC)",
];

// `updated_at` is stamped on every row update via trigger rather than at
// every call site, so it stays correct even for updates issued directly
// against the connection (e.g. a future migration tool). The `WHEN`
// clause keeps the trigger idempotent: an UPDATE that already set
// `updated_at` itself in the same statement does not get a second bump.
const TRIGGERS: &[&str] = &[
    "CREATE TRIGGER IF NOT EXISTS trg_queues_updated_at
        AFTER UPDATE ON queues
        WHEN NEW.updated_at IS OLD.updated_at
     BEGIN
        UPDATE queues SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE name = NEW.name;
     END",
    "CREATE TRIGGER IF NOT EXISTS trg_tasks_updated_at
        AFTER UPDATE ON tasks
        WHEN NEW.updated_at IS OLD.updated_at
     BEGIN
        UPDATE tasks SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = NEW.id;
     END",
];

/// Installs the three tables, their indexes and `updated_at` triggers, and
/// turns on foreign-key enforcement for this connection. Idempotent.
pub fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(CREATE_QUEUES)?;
    conn.execute_batch(CREATE_TASKS)?;
    conn.execute_batch(CREATE_JOURNAL)?;
    for stmt in INDEXES {
        conn.execute_batch(stmt)?;
    }
    for stmt in TRIGGERS {
        conn.execute_batch(stmt)?;
    }
    Ok(())
}
