//! Durable, concurrency-safe task-queue core over an embedded SQLite store.
//!
//! A [`Store`] owns one SQLite database: a set of named [`Queue`]s, each
//! holding [`Task`]s dispatched in priority order and claimed through a
//! single atomic checkout. Every mutating operation runs inside a
//! `BEGIN IMMEDIATE` transaction, so a [`Store`] shared across threads
//! behind an `Arc` is safe for concurrent producers and workers within one
//! process. There is no network replication and no multi-process
//! coordination; see the crate's design notes for that boundary.
//!
//! Façades (a CLI, an MCP tool surface) build on this crate; it has no
//! knowledge of either.

pub mod driver;
pub mod error;
pub mod journal;
pub mod model;
pub mod queue;
pub mod schema;
pub mod task;
pub mod validate;

pub use driver::Store;
pub use error::{CheckoutFailure, EntityKind, Result, StoreError};
pub use model::{CheckoutTarget, JournalEntry, Queue, QueueStats, Task, TaskStatus};
pub use task::TaskPatch;
