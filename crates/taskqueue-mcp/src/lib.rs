//! Tool-surface façade exposing the `taskqueue-core` operations as named,
//! schema-described tools behind a single transport-agnostic
//! [`dispatch`] entry point.
//!
//! This crate has no stdio/HTTP/WebSocket listener of its own -- wiring
//! [`Tool::input_schema`] and [`dispatch`] to an actual JSON-RPC transport
//! is left to the embedding application, exactly as a core-only library
//! should.

pub mod error;
pub mod tools;

use serde::Deserialize;
use serde_json::{json, Value};

use taskqueue_core::{CheckoutTarget, Store, TaskPatch, TaskStatus};

pub use error::ToolError;
pub use tools::{tools, Tool};

/// The outcome of one [`dispatch`] call.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResponse {
    Ok { result: Value },
    Err { kind: String, message: String },
}

impl ToolResponse {
    fn from_result(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(value) => Self::Ok { result: value },
            Err(err) => Self::Err {
                kind: err.kind_name().to_string(),
                message: err.to_string(),
            },
        }
    }
}

fn checkout_target(raw: &str) -> CheckoutTarget {
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        CheckoutTarget::ByTaskId(raw.parse().expect("all-digit string parses as i64"))
    } else {
        CheckoutTarget::ByQueue(raw.to_string())
    }
}

#[derive(Deserialize)]
struct QueueCreateArgs {
    name: String,
    description: Option<String>,
    instructions: Option<String>,
}

#[derive(Deserialize)]
struct QueueUpdateArgs {
    name: String,
    description: Option<String>,
    instructions: Option<String>,
}

#[derive(Deserialize)]
struct QueueNameArgs {
    name: String,
}

#[derive(Deserialize)]
struct TaskAddArgs {
    queue_name: String,
    title: String,
    description: Option<String>,
    priority: Option<i64>,
    parameters: Option<Value>,
    instructions: Option<String>,
}

#[derive(Deserialize)]
struct TaskUpdateArgs {
    id: i64,
    title: Option<String>,
    description: Option<String>,
    priority: Option<i64>,
    parameters: Option<Value>,
    /// Explicit `true` clears `parameters` to `NULL`, taking precedence over
    /// `parameters`. A JSON `null` for `parameters` is indistinguishable from
    /// an omitted field once deserialized, so clearing needs its own flag.
    #[serde(default)]
    clear_parameters: bool,
    instructions: Option<String>,
}

#[derive(Deserialize)]
struct TaskCheckoutArgs {
    target: String,
    worker_id: Option<String>,
}

#[derive(Deserialize)]
struct TaskIdArgs {
    id: i64,
}

#[derive(Deserialize)]
struct TaskListArgs {
    queue_name: String,
    status: Option<String>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
struct JournalAddArgs {
    task_id: i64,
    status: String,
    notes: Option<String>,
}

#[derive(Deserialize)]
struct JournalTaskIdArgs {
    task_id: i64,
}

fn parse<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T, ToolError> {
    Ok(serde_json::from_value(args)?)
}

fn call(store: &Store, name: &str, args: Value) -> Result<Value, ToolError> {
    let value = match name {
        "queue_create" => {
            let a: QueueCreateArgs = parse(args)?;
            json!(taskqueue_core::queue::create(
                store,
                &a.name,
                a.description.as_deref(),
                a.instructions.as_deref()
            )?)
        }
        "queue_update" => {
            let a: QueueUpdateArgs = parse(args)?;
            json!(taskqueue_core::queue::update(
                store,
                &a.name,
                a.description.as_deref(),
                a.instructions.as_deref()
            )?)
        }
        "queue_delete" => {
            let a: QueueNameArgs = parse(args)?;
            taskqueue_core::queue::delete(store, &a.name)?;
            json!({ "deleted": a.name })
        }
        "queue_get" => {
            let a: QueueNameArgs = parse(args)?;
            json!(taskqueue_core::queue::get(store, &a.name)?)
        }
        "queue_list" => json!(taskqueue_core::queue::list(store)?),
        "queue_stats" => {
            let a: QueueNameArgs = parse(args)?;
            json!(taskqueue_core::queue::stats(store, &a.name)?)
        }
        "task_add" => {
            let a: TaskAddArgs = parse(args)?;
            json!(taskqueue_core::task::add(
                store,
                &a.queue_name,
                &a.title,
                a.description.as_deref(),
                a.priority,
                a.parameters,
                a.instructions.as_deref()
            )?)
        }
        "task_update" => {
            let a: TaskUpdateArgs = parse(args)?;
            let parameters = if a.clear_parameters {
                Some(Value::Null)
            } else {
                a.parameters
            };
            let patch = TaskPatch {
                title: a.title.as_deref(),
                description: a.description.as_deref(),
                priority: a.priority,
                parameters,
                instructions: a.instructions.as_deref(),
            };
            json!(taskqueue_core::task::update(store, a.id, patch)?)
        }
        "task_checkout" => {
            let a: TaskCheckoutArgs = parse(args)?;
            json!(taskqueue_core::task::checkout(
                store,
                checkout_target(&a.target),
                a.worker_id.as_deref()
            )?)
        }
        "task_complete" => {
            let a: TaskIdArgs = parse(args)?;
            json!(taskqueue_core::task::complete(store, a.id)?)
        }
        "task_reset" => {
            let a: TaskIdArgs = parse(args)?;
            json!(taskqueue_core::task::reset(store, a.id)?)
        }
        "task_fail" => {
            let a: TaskIdArgs = parse(args)?;
            json!(taskqueue_core::task::fail(store, a.id)?)
        }
        "task_delete" => {
            let a: TaskIdArgs = parse(args)?;
            taskqueue_core::task::delete(store, a.id)?;
            json!({ "deleted": a.id })
        }
        "task_get" => {
            let a: TaskIdArgs = parse(args)?;
            json!(taskqueue_core::task::get(store, a.id)?)
        }
        "task_list" => {
            let a: TaskListArgs = parse(args)?;
            let status = a
                .status
                .as_deref()
                .map(TaskStatus::parse)
                .map(|s| s.ok_or_else(|| ToolError::InvalidArgument("unknown task status".to_string())))
                .transpose()?;
            json!(taskqueue_core::task::list(store, &a.queue_name, status, a.limit)?)
        }
        "journal_add" => {
            let a: JournalAddArgs = parse(args)?;
            json!(taskqueue_core::journal::add_entry(
                store,
                a.task_id,
                &a.status,
                a.notes.as_deref()
            )?)
        }
        "journal_list" => {
            let a: JournalTaskIdArgs = parse(args)?;
            json!(taskqueue_core::journal::get_journal(store, a.task_id)?)
        }
        "journal_clear" => {
            let a: JournalTaskIdArgs = parse(args)?;
            taskqueue_core::journal::clear_journal(store, a.task_id)?;
            json!({ "cleared": a.task_id })
        }
        other => return Err(ToolError::UnknownTool(other.to_string())),
    };
    Ok(value)
}

/// Deserializes `args`, calls the named tool's core operation against
/// `store`, and wraps the outcome in [`ToolResponse`]. Never panics on bad
/// input; an unknown tool name or malformed `args` value is a typed
/// [`ToolResponse::Err`], not a panic.
pub fn dispatch(store: &Store, name: &str, args: Value) -> ToolResponse {
    tracing::debug!(tool = name, "dispatching tool call");
    let response = ToolResponse::from_result(call(store, name, args));
    if let ToolResponse::Err { ref kind, .. } = response {
        tracing::debug!(tool = name, kind = kind.as_str(), "tool call failed");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn dispatch_works_against_an_on_disk_store_shared_by_many_tool_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("taskqueue.db")).unwrap();

        dispatch(&store, "queue_create", json!({ "name": "q1" }));
        let added = dispatch(
            &store,
            "task_add",
            json!({ "queue_name": "q1", "title": "persisted task" }),
        );
        let ToolResponse::Ok { result } = added else {
            panic!("expected success")
        };
        let id = result["id"].as_i64().unwrap();

        let fetched = dispatch(&store, "task_get", json!({ "id": id }));
        match fetched {
            ToolResponse::Ok { result } => assert_eq!(result["title"], "persisted task"),
            ToolResponse::Err { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn unknown_tool_is_a_typed_error_not_a_panic() {
        let store = store();
        let response = dispatch(&store, "does_not_exist", json!({}));
        match response {
            ToolResponse::Err { kind, .. } => assert_eq!(kind, "UnknownTool"),
            ToolResponse::Ok { .. } => panic!("expected an error"),
        }
    }

    #[test]
    fn malformed_args_is_a_typed_error() {
        let store = store();
        let response = dispatch(&store, "queue_create", json!({ "name": 5 }));
        match response {
            ToolResponse::Err { kind, .. } => assert_eq!(kind, "MalformedArgs"),
            ToolResponse::Ok { .. } => panic!("expected an error"),
        }
    }

    #[test]
    fn queue_create_then_task_add_and_checkout_round_trip() {
        let store = store();
        let create = dispatch(&store, "queue_create", json!({ "name": "q1" }));
        assert!(matches!(create, ToolResponse::Ok { .. }));

        let added = dispatch(
            &store,
            "task_add",
            json!({ "queue_name": "q1", "title": "do it", "priority": 9 }),
        );
        let ToolResponse::Ok { result } = added else {
            panic!("expected success")
        };
        let id = result["id"].as_i64().unwrap();

        let checked_out = dispatch(
            &store,
            "task_checkout",
            json!({ "target": "q1", "worker_id": "w1" }),
        );
        let ToolResponse::Ok { result } = checked_out else {
            panic!("expected success")
        };
        assert_eq!(result["id"].as_i64(), Some(id));
        assert_eq!(result["status"], json!("checked_out"));
    }

    #[test]
    fn task_update_with_clear_parameters_nulls_out_parameters() {
        let store = store();
        dispatch(&store, "queue_create", json!({ "name": "q1" }));
        let added = dispatch(
            &store,
            "task_add",
            json!({ "queue_name": "q1", "title": "t", "parameters": {"count": 3} }),
        );
        let ToolResponse::Ok { result } = added else {
            panic!("expected success")
        };
        let id = result["id"].as_i64().unwrap();
        assert_eq!(result["parameters"], json!({"count": 3}));

        let updated = dispatch(
            &store,
            "task_update",
            json!({ "id": id, "clear_parameters": true }),
        );
        let ToolResponse::Ok { result } = updated else {
            panic!("expected success")
        };
        assert_eq!(result["parameters"], Value::Null);
    }

    #[test]
    fn checkout_by_task_id_detects_all_digit_target() {
        let store = store();
        dispatch(&store, "queue_create", json!({ "name": "q1" }));
        let added = dispatch(&store, "task_add", json!({ "queue_name": "q1", "title": "t" }));
        let ToolResponse::Ok { result } = added else {
            panic!("expected success")
        };
        let id = result["id"].as_i64().unwrap();

        let checked_out = dispatch(
            &store,
            "task_checkout",
            json!({ "target": id.to_string() }),
        );
        assert!(matches!(checked_out, ToolResponse::Ok { .. }));
    }

    #[test]
    fn not_found_surfaces_with_its_core_kind() {
        let store = store();
        let response = dispatch(&store, "queue_get", json!({ "name": "missing" }));
        // queue_get returns Ok(None), not a NotFound -- verify that contract.
        match response {
            ToolResponse::Ok { result } => assert_eq!(result, Value::Null),
            ToolResponse::Err { .. } => panic!("queue_get should not error for a missing queue"),
        }

        let response = dispatch(&store, "queue_delete", json!({ "name": "missing" }));
        match response {
            ToolResponse::Err { kind, .. } => assert_eq!(kind, "NotFound"),
            ToolResponse::Ok { .. } => panic!("expected NotFound"),
        }
    }

    #[test]
    fn tools_catalog_names_match_dispatch_cases() {
        let names: Vec<_> = tools().into_iter().map(|t| t.name).collect();
        assert!(names.contains(&"task_checkout"));
        assert!(names.contains(&"journal_clear"));
        assert_eq!(names.len(), 18);
    }
}
