//! Create / update / delete / list / inspect queues; queue statistics.

use rusqlite::{params, OptionalExtension};

use crate::driver::Store;
use crate::error::{Result, StoreError};
use crate::model::{Queue, QueueStats};
use crate::validate;

fn row_to_queue(row: &rusqlite::Row<'_>) -> rusqlite::Result<Queue> {
    Ok(Queue {
        name: row.get("name")?,
        description: row.get("description")?,
        instructions: row.get("instructions")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Creates a queue. Fails with [`StoreError::Conflict`] if `name` already
/// exists, [`StoreError::Validation`] on malformed input.
pub fn create(
    store: &Store,
    name: &str,
    description: Option<&str>,
    instructions: Option<&str>,
) -> Result<Queue> {
    validate::queue_name(name)?;

    store.transaction(|tx| {
        let exists: bool = tx
            .query_row("SELECT 1 FROM queues WHERE name = ?1", params![name], |_| {
                Ok(())
            })
            .optional()?
            .is_some();
        if exists {
            return Err(StoreError::Conflict {
                queue_name: name.to_string(),
            });
        }

        tx.execute(
            "INSERT INTO queues (name, description, instructions) VALUES (?1, ?2, ?3)",
            params![name, description, instructions],
        )?;

        Ok(tx.query_row(
            "SELECT name, description, instructions, created_at, updated_at \
             FROM queues WHERE name = ?1",
            params![name],
            row_to_queue,
        )?)
    })
}

/// Partial-update semantics: a field that is `None` ("absent") preserves the
/// existing value; a field that is `Some("")` ("empty") clears the stored
/// value to `NULL`. If neither field is supplied the stored row is
/// untouched and the current snapshot is returned. Fails
/// [`StoreError::NotFound`] if the queue does not exist.
pub fn update(
    store: &Store,
    name: &str,
    description: Option<&str>,
    instructions: Option<&str>,
) -> Result<Queue> {
    store.transaction(|tx| {
        let current = tx
            .query_row(
                "SELECT name, description, instructions, created_at, updated_at \
                 FROM queues WHERE name = ?1",
                params![name],
                row_to_queue,
            )
            .optional()?
            .ok_or_else(|| StoreError::queue_not_found(name))?;

        if description.is_none() && instructions.is_none() {
            return Ok(current);
        }

        let next_description = match description {
            None => current.description.clone(),
            Some("") => None,
            Some(value) => Some(value.to_string()),
        };
        let next_instructions = match instructions {
            None => current.instructions.clone(),
            Some("") => None,
            Some(value) => Some(value.to_string()),
        };

        tx.execute(
            "UPDATE queues SET description = ?2, instructions = ?3 WHERE name = ?1",
            params![name, next_description, next_instructions],
        )?;

        Ok(tx.query_row(
            "SELECT name, description, instructions, created_at, updated_at \
             FROM queues WHERE name = ?1",
            params![name],
            row_to_queue,
        )?)
    })
}

/// Removes the queue and cascades to owned tasks and their journal entries.
/// Fails [`StoreError::NotFound`] if absent.
pub fn delete(store: &Store, name: &str) -> Result<()> {
    store.transaction(|tx| {
        let affected = tx.execute("DELETE FROM queues WHERE name = ?1", params![name])?;
        if affected == 0 {
            return Err(StoreError::queue_not_found(name));
        }
        Ok(())
    })
}

/// Reads a queue by name. Returns `Ok(None)` if it does not exist.
pub fn get(store: &Store, name: &str) -> Result<Option<Queue>> {
    store.transaction(|tx| {
        Ok(tx
            .query_row(
                "SELECT name, description, instructions, created_at, updated_at \
                 FROM queues WHERE name = ?1",
                params![name],
                row_to_queue,
            )
            .optional()?)
    })
}

/// Lists all queues, ordered ascending by name.
pub fn list(store: &Store) -> Result<Vec<Queue>> {
    store.transaction(|tx| {
        let mut stmt = tx.prepare(
            "SELECT name, description, instructions, created_at, updated_at \
             FROM queues ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([], row_to_queue)?;
        let mut queues = Vec::new();
        for row in rows {
            queues.push(row?);
        }
        Ok(queues)
    })
}

/// Computes the five task-count counters for one queue in a single grouped
/// read. Fails [`StoreError::NotFound`] if the queue does not exist.
pub fn stats(store: &Store, name: &str) -> Result<QueueStats> {
    store.transaction(|tx| {
        let exists: bool = tx
            .query_row("SELECT 1 FROM queues WHERE name = ?1", params![name], |_| {
                Ok(())
            })
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::queue_not_found(name));
        }

        let mut stats = QueueStats::default();
        let mut stmt = tx.prepare(
            "SELECT status, count(*) FROM tasks WHERE queue_name = ?1 GROUP BY status",
        )?;
        let rows = stmt.query_map(params![name], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;
        for row in rows {
            let (status, count) = row?;
            stats.total += count;
            match status.as_str() {
                "pending" => stats.pending = count,
                "checked_out" => stats.checked_out = count,
                "completed" => stats.completed = count,
                "failed" => stats.failed = count,
                _ => {}
            }
        }
        Ok(stats)
    })
}
