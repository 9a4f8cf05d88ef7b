//! Input constraints shared by every operation module.

use serde_json::Value;

use crate::error::{Result, StoreError};

const MAX_QUEUE_NAME_LEN: usize = 255;
const MAX_TITLE_LEN: usize = 500;
const MIN_PRIORITY: i64 = 1;
const MAX_PRIORITY: i64 = 10;

/// Validates a queue name: non-empty, at most 255 characters, restricted to
/// letters, digits, `-`, `_`, `.`.
pub fn queue_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::validation("queue name must not be empty"));
    }
    if name.len() > MAX_QUEUE_NAME_LEN {
        return Err(StoreError::validation(format!(
            "queue name exceeds {MAX_QUEUE_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(StoreError::validation(
            "queue name may only contain letters, digits, '-', '_', '.'",
        ));
    }
    Ok(())
}

/// Validates a task title: non-empty, at most 500 characters.
pub fn task_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(StoreError::validation("task title must not be empty"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(StoreError::validation(format!(
            "task title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates a task priority: an integer in `[1, 10]`.
pub fn priority(value: i64) -> Result<()> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&value) {
        return Err(StoreError::validation(format!(
            "priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {value}"
        )));
    }
    Ok(())
}

/// Validates that a `parameters` value, if present, is a JSON object (a
/// key→value mapping whose values may themselves be any JSON tree).
pub fn parameters(value: &Value) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(StoreError::validation(
            "parameters must be a JSON object",
        ))
    }
}

/// Validates a status string against the four documented task-status
/// values, independent of any task's current status.
pub fn status_string(status: &str) -> Result<crate::model::TaskStatus> {
    crate::model::TaskStatus::parse(status).ok_or_else(|| {
        StoreError::validation(format!(
            "status must be one of pending, checked_out, completed, failed; got '{status}'"
        ))
    })
}

/// Validates a positive id (queue-global task id or journal entry id).
pub fn positive_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(StoreError::validation(format!(
            "id must be a positive integer, got {id}"
        )));
    }
    Ok(())
}
