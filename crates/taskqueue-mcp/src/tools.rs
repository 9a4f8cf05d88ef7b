//! One [`Tool`] per core operation: a name, a human description, and a
//! JSON Schema input shape. No transport -- wiring these to stdio/HTTP/
//! WebSocket is the consuming application's job.

use serde::Serialize;
use serde_json::{json, Value};

/// A named tool a transport can list and invoke through [`crate::dispatch`].
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn integer_prop(description: &str) -> Value {
    json!({ "type": "integer", "description": description })
}

fn boolean_prop(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Every tool this façade exposes, in the order operations are listed in
/// the core's module table.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "queue_create",
            description: "Create a named queue.",
            input_schema: object(
                json!({
                    "name": string_prop("Unique queue name."),
                    "description": string_prop("Optional free text."),
                    "instructions": string_prop("Optional work contract shared by tasks in the queue."),
                }),
                &["name"],
            ),
        },
        Tool {
            name: "queue_update",
            description: "Partially update a queue. Omit a field to preserve it; pass an empty string to clear it.",
            input_schema: object(
                json!({
                    "name": string_prop("Queue to update."),
                    "description": string_prop("New description, or \"\" to clear."),
                    "instructions": string_prop("New instructions, or \"\" to clear."),
                }),
                &["name"],
            ),
        },
        Tool {
            name: "queue_delete",
            description: "Delete a queue and cascade its tasks and their journals.",
            input_schema: object(json!({ "name": string_prop("Queue to delete.") }), &["name"]),
        },
        Tool {
            name: "queue_get",
            description: "Fetch one queue by name.",
            input_schema: object(json!({ "name": string_prop("Queue name.") }), &["name"]),
        },
        Tool {
            name: "queue_list",
            description: "List every queue, ordered by name.",
            input_schema: object(json!({}), &[]),
        },
        Tool {
            name: "queue_stats",
            description: "Task-count statistics for one queue.",
            input_schema: object(json!({ "name": string_prop("Queue name.") }), &["name"]),
        },
        Tool {
            name: "task_add",
            description: "Add a task to a queue.",
            input_schema: object(
                json!({
                    "queue_name": string_prop("Owning queue."),
                    "title": string_prop("Task title."),
                    "description": string_prop("Optional free text."),
                    "priority": integer_prop("Integer in [1, 10], default 5; higher dispatches first."),
                    "parameters": { "type": "object", "description": "Arbitrary JSON-serializable key-value mapping." },
                    "instructions": string_prop("Optional task-specific supplement to the queue's instructions."),
                }),
                &["queue_name", "title"],
            ),
        },
        Tool {
            name: "task_update",
            description: "Partially update a task. Omit a field to preserve it.",
            input_schema: object(
                json!({
                    "id": integer_prop("Task id."),
                    "title": string_prop("New title."),
                    "description": string_prop("New description, or \"\" to clear."),
                    "priority": integer_prop("New priority in [1, 10]."),
                    "parameters": { "type": "object", "description": "New parameters document. Ignored if clear_parameters is true." },
                    "clear_parameters": boolean_prop("Clear parameters to null. Takes precedence over parameters."),
                    "instructions": string_prop("New instructions, or \"\" to clear."),
                }),
                &["id"],
            ),
        },
        Tool {
            name: "task_checkout",
            description: "Atomically check out the highest-priority pending task in a queue, or a specific task id.",
            input_schema: object(
                json!({
                    "target": string_prop("Queue name, or a task id (all-digit string)."),
                    "worker_id": string_prop("Optional identifier of the claiming worker."),
                }),
                &["target"],
            ),
        },
        Tool {
            name: "task_complete",
            description: "Mark a checked-out task completed. Idempotent for an already-completed task.",
            input_schema: object(json!({ "id": integer_prop("Task id.") }), &["id"]),
        },
        Tool {
            name: "task_reset",
            description: "Return a task to pending from any state, clearing its worker and timestamps. Idempotent.",
            input_schema: object(json!({ "id": integer_prop("Task id.") }), &["id"]),
        },
        Tool {
            name: "task_fail",
            description: "Mark a task failed from any state. Idempotent.",
            input_schema: object(json!({ "id": integer_prop("Task id.") }), &["id"]),
        },
        Tool {
            name: "task_delete",
            description: "Delete a task and cascade its journal.",
            input_schema: object(json!({ "id": integer_prop("Task id.") }), &["id"]),
        },
        Tool {
            name: "task_get",
            description: "Fetch one task by id.",
            input_schema: object(json!({ "id": integer_prop("Task id.") }), &["id"]),
        },
        Tool {
            name: "task_list",
            description: "List tasks in a queue, highest priority first.",
            input_schema: object(
                json!({
                    "queue_name": string_prop("Queue name."),
                    "status": string_prop("Optional status filter: pending, checked_out, completed, or failed."),
                    "limit": integer_prop("Optional positive maximum number of tasks."),
                }),
                &["queue_name"],
            ),
        },
        Tool {
            name: "journal_add",
            description: "Append an observation about a task.",
            input_schema: object(
                json!({
                    "task_id": integer_prop("Task id."),
                    "status": string_prop("One of pending, checked_out, completed, failed."),
                    "notes": string_prop("Optional free text."),
                }),
                &["task_id", "status"],
            ),
        },
        Tool {
            name: "journal_list",
            description: "List a task's journal, oldest first.",
            input_schema: object(json!({ "task_id": integer_prop("Task id.") }), &["task_id"]),
        },
        Tool {
            name: "journal_clear",
            description: "Delete every journal entry for a task.",
            input_schema: object(json!({ "task_id": integer_prop("Task id.") }), &["task_id"]),
        },
    ]
}
