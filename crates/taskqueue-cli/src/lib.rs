//! `taskqueue`: a thin command-line façade over `taskqueue-core`.
//!
//! Parses one subcommand per core operation, resolves the database path
//! (§ config), prints either human-readable text or `--json`, and maps
//! every [`taskqueue_core::StoreError`] to a non-zero exit with a message
//! naming the failure kind and offending identifier.
//!
//! Split into a library and a thin `main.rs` binary so the subcommand
//! dispatch and output formatting are exercisable from integration tests
//! without spawning the compiled binary as a subprocess.

pub mod config;
pub mod error;
pub mod params;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use taskqueue_core::{CheckoutTarget, Store, TaskPatch, TaskStatus};

pub use error::CliError;

#[derive(Parser)]
#[command(name = "taskqueue")]
#[command(about = "Durable, concurrency-safe task queue over an embedded SQLite store")]
#[command(version)]
pub struct Cli {
    /// Path to the SQLite database file. Overrides TASKQUEUE_DB_PATH and
    /// any taskqueue.toml.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print machine-readable JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue operations.
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Task operations.
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Journal operations.
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// Create a queue.
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Partially update a queue. Omit a flag to preserve; pass an empty
    /// string to clear.
    Update {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Delete a queue and cascade its tasks and their journals.
    Delete { name: String },
    /// Get one queue by name.
    Get { name: String },
    /// List every queue.
    List,
    /// Task-count statistics for one queue.
    Stats { name: String },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task to a queue.
    Add {
        queue: String,
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        params: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Partially update a task.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        params: Option<String>,
        /// Clear the task's parameters entirely. Conflicts with `--params`.
        #[arg(long, conflicts_with = "params")]
        clear_parameters: bool,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Check out the highest-priority pending task in a queue, or a
    /// specific task id. All-digit `target` is treated as a task id.
    Checkout {
        target: String,
        #[arg(long)]
        worker: Option<String>,
    },
    /// Mark a checked-out task completed.
    Complete { id: i64 },
    /// Return a task to pending from any state.
    Reset { id: i64 },
    /// Mark a task failed from any state.
    Fail { id: i64 },
    /// Delete a task and cascade its journal.
    Delete { id: i64 },
    /// Get one task by id.
    Get { id: i64 },
    /// List tasks in a queue, highest priority first.
    List {
        queue: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum JournalCommands {
    /// Append an observation about a task.
    Add {
        task_id: i64,
        status: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List a task's journal, oldest first.
    List { task_id: i64 },
    /// Delete every journal entry for a task.
    Clear { task_id: i64 },
}

/// Translates a raw `task checkout` target: all-digit strings are a task
/// id, anything else is a queue name. This rule lives in the façade only,
/// never in the core, per the design notes.
pub fn checkout_target(raw: &str) -> CheckoutTarget {
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        CheckoutTarget::ByTaskId(raw.parse().expect("all-digit string parses as i64"))
    } else {
        CheckoutTarget::ByQueue(raw.to_string())
    }
}

pub fn print_value(value: &serde_json::Value, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(value).expect("value is always serializable")
        );
        return;
    }
    print_human(value, 0);
}

/// A minimal "flatten the object tree into indented key: value lines"
/// renderer. Not meant to be pretty -- just legible without `--json`.
fn print_human(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map {
                match v {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{pad}{key}:");
                        print_human(v, indent + 1);
                    }
                    other => println!("{pad}{key}: {other}"),
                }
            }
        }
        serde_json::Value::Array(items) => {
            if items.is_empty() {
                println!("{pad}(none)");
            }
            for (i, item) in items.iter().enumerate() {
                println!("{pad}- [{i}]");
                print_human(item, indent + 1);
            }
        }
        serde_json::Value::Null => println!("{pad}null"),
        other => println!("{pad}{other}"),
    }
}

/// Resolves the database path, opens the store, and dispatches `cli.command`
/// to the matching core operation. Returns the JSON value to print -- the
/// binary's `main` decides how (human text vs. `--json`) and whether to
/// exit non-zero.
pub fn run(cli: Cli) -> Result<serde_json::Value, CliError> {
    let db_path = config::resolve_db_path(cli.db).map_err(|e| CliError::Store {
        kind: "Config",
        message: e.to_string(),
    })?;
    let store = Store::open(db_path)?;
    run_against(&store, cli.command)
}

/// Same as [`run`] but against an already-open [`Store`], so tests can use
/// an isolated tempdir- or in-memory-backed store without touching the
/// resolved default path.
pub fn run_against(store: &Store, command: Commands) -> Result<serde_json::Value, CliError> {
    let value = match command {
        Commands::Queue { command } => match command {
            QueueCommands::Create {
                name,
                description,
                instructions,
            } => json!(taskqueue_core::queue::create(
                store,
                &name,
                description.as_deref(),
                instructions.as_deref()
            )?),
            QueueCommands::Update {
                name,
                description,
                instructions,
            } => json!(taskqueue_core::queue::update(
                store,
                &name,
                description.as_deref(),
                instructions.as_deref()
            )?),
            QueueCommands::Delete { name } => {
                taskqueue_core::queue::delete(store, &name)?;
                json!({"deleted": name})
            }
            QueueCommands::Get { name } => json!(taskqueue_core::queue::get(store, &name)?),
            QueueCommands::List => json!(taskqueue_core::queue::list(store)?),
            QueueCommands::Stats { name } => json!(taskqueue_core::queue::stats(store, &name)?),
        },
        Commands::Task { command } => match command {
            TaskCommands::Add {
                queue,
                title,
                description,
                priority,
                params,
                instructions,
            } => {
                let parameters = params
                    .as_deref()
                    .map(params::parse_params)
                    .transpose()
                    .map_err(|e| CliError::Store {
                        kind: "Validation",
                        message: e.to_string(),
                    })?;
                json!(taskqueue_core::task::add(
                    store,
                    &queue,
                    &title,
                    description.as_deref(),
                    priority,
                    parameters,
                    instructions.as_deref()
                )?)
            }
            TaskCommands::Update {
                id,
                title,
                description,
                priority,
                params,
                clear_parameters,
                instructions,
            } => {
                let parameters = if clear_parameters {
                    Some(serde_json::Value::Null)
                } else {
                    params
                        .as_deref()
                        .map(params::parse_params)
                        .transpose()
                        .map_err(|e| CliError::Store {
                            kind: "Validation",
                            message: e.to_string(),
                        })?
                };
                let patch = TaskPatch {
                    title: title.as_deref(),
                    description: description.as_deref(),
                    priority,
                    parameters,
                    instructions: instructions.as_deref(),
                };
                json!(taskqueue_core::task::update(store, id, patch)?)
            }
            TaskCommands::Checkout { target, worker } => {
                let task = taskqueue_core::task::checkout(
                    store,
                    checkout_target(&target),
                    worker.as_deref(),
                )?;
                json!(task)
            }
            TaskCommands::Complete { id } => json!(taskqueue_core::task::complete(store, id)?),
            TaskCommands::Reset { id } => json!(taskqueue_core::task::reset(store, id)?),
            TaskCommands::Fail { id } => json!(taskqueue_core::task::fail(store, id)?),
            TaskCommands::Delete { id } => {
                taskqueue_core::task::delete(store, id)?;
                json!({"deleted": id})
            }
            TaskCommands::Get { id } => json!(taskqueue_core::task::get(store, id)?),
            TaskCommands::List { queue, status, limit } => {
                let status = status
                    .as_deref()
                    .map(TaskStatus::parse)
                    .map(|s| {
                        s.ok_or_else(|| CliError::Store {
                            kind: "Validation",
                            message: "unknown task status".to_string(),
                        })
                    })
                    .transpose()?;
                json!(taskqueue_core::task::list(store, &queue, status, limit)?)
            }
        },
        Commands::Journal { command } => match command {
            JournalCommands::Add {
                task_id,
                status,
                notes,
            } => json!(taskqueue_core::journal::add_entry(
                store,
                task_id,
                &status,
                notes.as_deref()
            )?),
            JournalCommands::List { task_id } => {
                json!(taskqueue_core::journal::get_journal(store, task_id)?)
            }
            JournalCommands::Clear { task_id } => {
                taskqueue_core::journal::clear_journal(store, task_id)?;
                json!({"cleared": task_id})
            }
        },
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_target_detects_all_digit_strings() {
        assert_eq!(checkout_target("123"), CheckoutTarget::ByTaskId(123));
        assert_eq!(
            checkout_target("q1"),
            CheckoutTarget::ByQueue("q1".to_string())
        );
        assert_eq!(
            checkout_target(""),
            CheckoutTarget::ByQueue(String::new())
        );
    }
}
