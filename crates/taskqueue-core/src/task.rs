//! Add, partial-update, priority-ordered checkout, complete, reset, fail,
//! delete, list, get.

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::driver::Store;
use crate::error::{CheckoutFailure, Result, StoreError};
use crate::model::{CheckoutTarget, Task, TaskStatus};
use crate::validate;

const TASK_COLUMNS: &str = "id, queue_name, title, description, priority, parameters, \
    instructions, status, worker_id, created_at, updated_at, checked_out_at, completed_at";

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let status_str: String = row.get("status")?;
    let status = TaskStatus::parse(&status_str).unwrap_or(TaskStatus::Pending);
    let parameters_text: Option<String> = row.get("parameters")?;
    // Defensive read: a stored document that fails to parse degrades to
    // `None` rather than failing the whole read.
    let parameters = parameters_text.and_then(|text| serde_json::from_str::<Value>(&text).ok());

    Ok(Task {
        id: row.get("id")?,
        queue_name: row.get("queue_name")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority: row.get("priority")?,
        parameters,
        instructions: row.get("instructions")?,
        status,
        worker_id: row.get("worker_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        checked_out_at: row.get("checked_out_at")?,
        completed_at: row.get("completed_at")?,
    })
}

fn fetch(tx: &rusqlite::Transaction<'_>, id: i64) -> Result<Option<Task>> {
    Ok(tx
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            row_to_task,
        )
        .optional()?)
}

fn queue_exists(tx: &rusqlite::Transaction<'_>, queue_name: &str) -> Result<bool> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM queues WHERE name = ?1",
            params![queue_name],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// A partial update to an existing task.
///
/// `None` preserves the existing value; `Some("")` on `description` or
/// `instructions` clears it to `NULL`; `Some(Value::Null)` on `parameters`
/// clears it to `NULL`. `title` and `priority` have no "clear" form (a task
/// always has a title and a priority); supplying `Some` replaces the value
/// after re-validation. `status`, `worker_id`, and the timestamp fields are
/// never touched by an update.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch<'a> {
    /// Replace the title, if present.
    pub title: Option<&'a str>,
    /// Absent preserves, `Some("")` clears, otherwise replaces.
    pub description: Option<&'a str>,
    /// Replace the priority, if present.
    pub priority: Option<i64>,
    /// Absent preserves, `Some(Value::Null)` clears, otherwise replaces.
    pub parameters: Option<Value>,
    /// Absent preserves, `Some("")` clears, otherwise replaces.
    pub instructions: Option<&'a str>,
}

/// Validates fields; rejects with [`StoreError::NotFound`] if the queue
/// does not exist; persists and returns the hydrated task with status
/// `pending`.
pub fn add(
    store: &Store,
    queue_name: &str,
    title: &str,
    description: Option<&str>,
    priority: Option<i64>,
    parameters: Option<Value>,
    instructions: Option<&str>,
) -> Result<Task> {
    validate::task_title(title)?;
    let priority = priority.unwrap_or(5);
    validate::priority(priority)?;
    if let Some(ref value) = parameters {
        validate::parameters(value)?;
    }
    let parameters_text = parameters
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::validation(format!("failed to serialize parameters: {e}")))?;

    store.transaction(|tx| {
        if !queue_exists(tx, queue_name)? {
            return Err(StoreError::queue_not_found(queue_name));
        }

        tx.execute(
            "INSERT INTO tasks (queue_name, title, description, priority, parameters, instructions) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![queue_name, title, description, priority, parameters_text, instructions],
        )?;
        let id = tx.last_insert_rowid();

        fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))
    })
}

/// Partial-update with the same "absent preserves, empty clears" semantics
/// as [`crate::queue::update`]. Re-validates any field present in `patch`.
/// Does not change `status`, `worker_id`, or timestamp fields.
pub fn update(store: &Store, id: i64, patch: TaskPatch<'_>) -> Result<Task> {
    validate::positive_id(id)?;
    if let Some(title) = patch.title {
        validate::task_title(title)?;
    }
    if let Some(priority) = patch.priority {
        validate::priority(priority)?;
    }
    if let Some(ref value) = patch.parameters {
        if !value.is_null() {
            validate::parameters(value)?;
        }
    }

    store.transaction(|tx| {
        let current = fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))?;

        let next_title = patch.title.map(str::to_string).unwrap_or(current.title);
        let next_priority = patch.priority.unwrap_or(current.priority);
        let next_description = match patch.description {
            None => current.description.clone(),
            Some("") => None,
            Some(value) => Some(value.to_string()),
        };
        let next_instructions = match patch.instructions {
            None => current.instructions.clone(),
            Some("") => None,
            Some(value) => Some(value.to_string()),
        };
        let next_parameters_text = match patch.parameters {
            None => current
                .parameters
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| StoreError::validation(format!("failed to serialize parameters: {e}")))?,
            Some(Value::Null) => None,
            Some(value) => Some(serde_json::to_string(&value).map_err(|e| {
                StoreError::validation(format!("failed to serialize parameters: {e}"))
            })?),
        };

        tx.execute(
            "UPDATE tasks SET title = ?2, description = ?3, priority = ?4, \
             parameters = ?5, instructions = ?6 WHERE id = ?1",
            params![
                id,
                next_title,
                next_description,
                next_priority,
                next_parameters_text,
                next_instructions
            ],
        )?;

        fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))
    })
}

/// The atomic-checkout state machine. See [`CheckoutTarget`] for the two
/// forms `target` can take; the string-or-integer translation rule lives in
/// the façade, never here.
///
/// Returns `Ok(None)` only for a by-queue checkout with no pending task --
/// a normal outcome, not a failure. A by-task-id checkout never returns
/// `None`: it either succeeds or fails with
/// [`StoreError::Checkout`]/[`StoreError::NotFound`].
pub fn checkout(store: &Store, target: CheckoutTarget, worker_id: Option<&str>) -> Result<Option<Task>> {
    store.transaction(|tx| {
        let task_id = match &target {
            CheckoutTarget::ByQueue(queue_name) => {
                if !queue_exists(tx, queue_name)? {
                    return Err(StoreError::queue_not_found(queue_name.as_str()));
                }
                let candidate: Option<i64> = tx
                    .query_row(
                        "SELECT id FROM tasks WHERE queue_name = ?1 AND status = 'pending' \
                         ORDER BY priority DESC, created_at ASC, id ASC LIMIT 1",
                        params![queue_name],
                        |row| row.get(0),
                    )
                    .optional()?;
                match candidate {
                    Some(id) => id,
                    None => return Ok(None),
                }
            }
            CheckoutTarget::ByTaskId(id) => {
                validate::positive_id(*id)?;
                let task = fetch(tx, *id)?.ok_or_else(|| StoreError::task_not_found(*id))?;
                if task.status != TaskStatus::Pending {
                    return Err(StoreError::Checkout(CheckoutFailure::NotPending {
                        task_id: *id,
                        status: task.status.as_str().to_string(),
                    }));
                }
                *id
            }
        };

        let affected = tx.execute(
            "UPDATE tasks SET status = 'checked_out', worker_id = ?2, \
             checked_out_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             WHERE id = ?1 AND status = 'pending'",
            params![task_id, worker_id],
        )?;

        if affected == 0 {
            tracing::debug!(task_id, "checkout lost the race: another worker claimed it first");
            return Err(StoreError::Checkout(CheckoutFailure::LostRace {
                task_id,
            }));
        }

        tracing::debug!(task_id, worker_id, "task checked out");
        Ok(fetch(tx, task_id)?)
    })
}

/// Idempotent for already-`completed` tasks (returns the current snapshot,
/// no timestamp bump, no journal entry). Fails [`StoreError::Validation`]
/// if the task exists but is not currently `checked_out`. Fails
/// [`StoreError::NotFound`] if no such task.
pub fn complete(store: &Store, id: i64) -> Result<Task> {
    store.transaction(|tx| {
        let current = fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))?;
        if current.status == TaskStatus::Completed {
            return Ok(current);
        }
        if current.status != TaskStatus::CheckedOut {
            return Err(StoreError::validation(format!(
                "task {id} cannot be completed from status {}",
                current.status
            )));
        }

        tx.execute(
            "UPDATE tasks SET status = 'completed', \
             completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?1",
            params![id],
        )?;

        fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))
    })
}

/// Idempotent for already-`pending` tasks. Unconditionally restores the
/// task to `pending` from any other state, clearing `worker_id`,
/// `checked_out_at`, and `completed_at`. Any caller can reset any task --
/// this is how stranded or abandoned checkouts are recovered.
pub fn reset(store: &Store, id: i64) -> Result<Task> {
    store.transaction(|tx| {
        let current = fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))?;
        if current.status == TaskStatus::Pending {
            return Ok(current);
        }

        tx.execute(
            "UPDATE tasks SET status = 'pending', worker_id = NULL, \
             checked_out_at = NULL, completed_at = NULL WHERE id = ?1",
            params![id],
        )?;

        fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))
    })
}

/// Idempotent for already-`failed` tasks. Sets status to `failed` from any
/// other state. Does not touch `worker_id` or `checked_out_at` (useful for
/// forensics).
pub fn fail(store: &Store, id: i64) -> Result<Task> {
    store.transaction(|tx| {
        let current = fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))?;
        if current.status == TaskStatus::Failed {
            return Ok(current);
        }

        tx.execute("UPDATE tasks SET status = 'failed' WHERE id = ?1", params![id])?;

        fetch(tx, id)?.ok_or_else(|| StoreError::task_not_found(id))
    })
}

/// Removes the row; cascades to the journal. Fails
/// [`StoreError::NotFound`] if absent.
pub fn delete(store: &Store, id: i64) -> Result<()> {
    store.transaction(|tx| {
        let affected = tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::task_not_found(id));
        }
        Ok(())
    })
}

/// Hydrates `parameters` by parsing the stored JSON document; if parsing
/// fails the field is returned as `None` but the read does not fail.
pub fn get(store: &Store, id: i64) -> Result<Option<Task>> {
    store.transaction(|tx| fetch(tx, id))
}

/// Ordered by `priority DESC, created_at ASC`. Optional status filter;
/// optional positive integer limit.
pub fn list(
    store: &Store,
    queue_name: &str,
    status: Option<TaskStatus>,
    limit: Option<i64>,
) -> Result<Vec<Task>> {
    if let Some(limit) = limit {
        if limit <= 0 {
            return Err(StoreError::validation("limit must be a positive integer"));
        }
    }

    store.transaction(|tx| {
        let sql = match (status, limit) {
            (Some(_), Some(_)) => format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE queue_name = ?1 AND status = ?2 \
                 ORDER BY priority DESC, created_at ASC LIMIT ?3"
            ),
            (Some(_), None) => format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE queue_name = ?1 AND status = ?2 \
                 ORDER BY priority DESC, created_at ASC"
            ),
            (None, Some(_)) => format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE queue_name = ?1 \
                 ORDER BY priority DESC, created_at ASC LIMIT ?2"
            ),
            (None, None) => format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE queue_name = ?1 \
                 ORDER BY priority DESC, created_at ASC"
            ),
        };

        let mut stmt = tx.prepare(&sql)?;
        let rows = match (status, limit) {
            (Some(status), Some(limit)) => {
                stmt.query_map(params![queue_name, status.as_str(), limit], row_to_task)?
            }
            (Some(status), None) => stmt.query_map(params![queue_name, status.as_str()], row_to_task)?,
            (None, Some(limit)) => stmt.query_map(params![queue_name, limit], row_to_task)?,
            (None, None) => stmt.query_map(params![queue_name], row_to_task)?,
        };

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_queue(name: &str) -> Store {
        let store = Store::open_in_memory().unwrap();
        crate::queue::create(&store, name, None, None).unwrap();
        store
    }

    #[test]
    fn add_defaults_priority_and_status() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "do a thing", None, None, None, None).unwrap();
        assert_eq!(task.priority, 5);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.worker_id.is_none());

        let fetched = get(&store, task.id).unwrap().unwrap();
        assert_eq!(fetched, task);
    }

    #[test]
    fn add_rejects_missing_queue() {
        let store = Store::open_in_memory().unwrap();
        let err = add(&store, "missing", "t", None, None, None, None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn add_rejects_empty_title() {
        let store = store_with_queue("q1");
        let err = add(&store, "q1", "", None, None, None, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn add_rejects_out_of_range_priority() {
        let store = store_with_queue("q1");
        let err = add(&store, "q1", "t", None, Some(0), None, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn add_stores_and_retrieves_parameters() {
        let store = store_with_queue("q1");
        let params = serde_json::json!({"nested": {"a": [1, 2, 3]}});
        let task = add(&store, "q1", "t", None, None, Some(params.clone()), None).unwrap();
        assert_eq!(task.parameters, Some(params));
    }

    #[test]
    fn priority_ordered_checkout_sequence() {
        let store = store_with_queue("q1");
        add(&store, "q1", "a", None, Some(3), None, None).unwrap();
        add(&store, "q1", "b", None, Some(9), None, None).unwrap();
        add(&store, "q1", "c", None, Some(5), None, None).unwrap();
        add(&store, "q1", "d", None, Some(7), None, None).unwrap();

        let mut order = Vec::new();
        for _ in 0..4 {
            let task = checkout(&store, CheckoutTarget::ByQueue("q1".to_string()), Some("w1"))
                .unwrap()
                .unwrap();
            order.push(task.priority);
        }
        assert_eq!(order, vec![9, 7, 5, 3]);

        let none_left = checkout(&store, CheckoutTarget::ByQueue("q1".to_string()), Some("w1")).unwrap();
        assert!(none_left.is_none());
    }

    #[test]
    fn checkout_by_id_rejects_non_pending() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w1"))
            .unwrap()
            .unwrap();

        let err = checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w2")).unwrap_err();
        assert!(matches!(err, StoreError::Checkout(CheckoutFailure::NotPending { .. })));
    }

    #[test]
    fn checkout_by_queue_missing_queue_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = checkout(&store, CheckoutTarget::ByQueue("missing".to_string()), None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn complete_requires_checked_out() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        let err = complete(&store, task.id).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn complete_is_idempotent() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w1")).unwrap();
        let completed = complete(&store, task.id).unwrap();
        assert_eq!(completed.status, TaskStatus::Completed);
        assert!(completed.completed_at.is_some());

        let completed_again = complete(&store, task.id).unwrap();
        assert_eq!(completed_again, completed);
    }

    #[test]
    fn reset_clears_worker_and_timestamps() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w1")).unwrap();
        let reset_task = reset(&store, task.id).unwrap();
        assert_eq!(reset_task.status, TaskStatus::Pending);
        assert!(reset_task.worker_id.is_none());
        assert!(reset_task.checked_out_at.is_none());
        assert!(reset_task.completed_at.is_none());
    }

    #[test]
    fn reset_recovers_a_stranded_task_for_a_new_worker() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w1")).unwrap();
        reset(&store, task.id).unwrap();

        let recheckout =
            checkout(&store, CheckoutTarget::ByQueue("q1".to_string()), Some("w2"))
                .unwrap()
                .unwrap();
        assert_eq!(recheckout.id, task.id);
        assert_eq!(recheckout.worker_id.as_deref(), Some("w2"));
    }

    #[test]
    fn fail_is_idempotent() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        let failed = fail(&store, task.id).unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        let failed_again = fail(&store, task.id).unwrap();
        assert_eq!(failed_again, failed);
    }

    #[test]
    fn invalid_checkout_after_completion() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w1")).unwrap();
        complete(&store, task.id).unwrap();

        let err = checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w2")).unwrap_err();
        assert!(matches!(err, StoreError::Checkout(CheckoutFailure::NotPending { .. })));
    }

    #[test]
    fn delete_cascades_and_missing_is_not_found() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        crate::journal::add_entry(&store, task.id, "pending", Some("created")).unwrap();

        delete(&store, task.id).unwrap();
        assert!(get(&store, task.id).unwrap().is_none());
        assert!(crate::journal::get_journal(&store, task.id).unwrap().is_empty());

        let err = delete(&store, task.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn list_filters_by_status_and_limit() {
        let store = store_with_queue("q1");
        let a = add(&store, "q1", "a", None, Some(1), None, None).unwrap();
        add(&store, "q1", "b", None, Some(2), None, None).unwrap();
        checkout(&store, CheckoutTarget::ByTaskId(a.id), Some("w1")).unwrap();

        let pending = list(&store, "q1", Some(TaskStatus::Pending), None).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "b");

        let limited = list(&store, "q1", None, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn update_partial_preserves_and_clears() {
        let store = store_with_queue("q1");
        let task = add(
            &store,
            "q1",
            "t",
            Some("desc"),
            Some(3),
            None,
            Some("do stuff"),
        )
        .unwrap();

        let patch = TaskPatch {
            title: None,
            description: Some(""),
            priority: Some(8),
            parameters: None,
            instructions: None,
        };
        let updated = update(&store, task.id, patch).unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.priority, 8);
        assert_eq!(updated.instructions.as_deref(), Some("do stuff"));
        assert_eq!(updated.title, "t");
    }

    #[test]
    fn update_does_not_touch_status_or_worker() {
        let store = store_with_queue("q1");
        let task = add(&store, "q1", "t", None, None, None, None).unwrap();
        checkout(&store, CheckoutTarget::ByTaskId(task.id), Some("w1")).unwrap();

        let updated = update(
            &store,
            task.id,
            TaskPatch {
                title: Some("renamed"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.status, TaskStatus::CheckedOut);
        assert_eq!(updated.worker_id.as_deref(), Some("w1"));
    }
}
