//! Append-only observations attached to a task.

use rusqlite::{params, OptionalExtension};

use crate::driver::Store;
use crate::error::{Result, StoreError};
use crate::model::JournalEntry;
use crate::validate;

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        status: row.get("status")?,
        notes: row.get("notes")?,
        timestamp: row.get("timestamp")?,
    })
}

/// Appends an observation about `task_id`. `status` is validated against
/// the four documented task-status values independently of the task's
/// actual current status -- journal entries are observations, not
/// transitions, so a caller may record e.g. an intermediate state a
/// worker chooses not to persist on the task itself. Fails
/// [`StoreError::NotFound`] if the task does not exist.
pub fn add_entry(store: &Store, task_id: i64, status: &str, notes: Option<&str>) -> Result<JournalEntry> {
    validate::positive_id(task_id)?;
    validate::status_string(status)?;

    store.transaction(|tx| {
        let exists: bool = tx
            .query_row("SELECT 1 FROM tasks WHERE id = ?1", params![task_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::task_not_found(task_id));
        }

        tx.execute(
            "INSERT INTO task_journal (task_id, status, notes) VALUES (?1, ?2, ?3)",
            params![task_id, status, notes],
        )?;
        let id = tx.last_insert_rowid();

        Ok(tx.query_row(
            "SELECT id, task_id, status, notes, timestamp FROM task_journal WHERE id = ?1",
            params![id],
            row_to_entry,
        )?)
    })
}

/// Reads every entry for `task_id`, ordered oldest first. Returns an empty
/// `Vec` for a task with no entries or for a task that does not exist --
/// the journal is a log, not an entity with its own existence to assert.
pub fn get_journal(store: &Store, task_id: i64) -> Result<Vec<JournalEntry>> {
    store.transaction(|tx| {
        let mut stmt = tx.prepare(
            "SELECT id, task_id, status, notes, timestamp FROM task_journal \
             WHERE task_id = ?1 ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![task_id], row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    })
}

/// Deletes every entry for `task_id`. Not an error if the task has no
/// entries, or does not exist.
pub fn clear_journal(store: &Store, task_id: i64) -> Result<()> {
    store.transaction(|tx| {
        tx.execute("DELETE FROM task_journal WHERE task_id = ?1", params![task_id])?;
        Ok(())
    })
}
