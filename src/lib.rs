//! taskstash - local personal task store
//!
//! This library provides the store core behind the `taskstash` CLI: active
//! tasks, completed tasks and category labels persisted as JSON arrays in a
//! string-keyed store.
//!
//! # Core Concepts
//!
//! - **Task book**: one handle over all collections; serializes mutations
//! - **Active / completed**: every task lives in exactly one of the two
//! - **Categories**: unique labels, with a reserved "none selected" label
//! - **Two-phase moves**: completing and restoring survive a crash midway
//!
//! # Module Organization
//!
//! - `book`: the `TaskBook` handle, move protocol, recovery and repair
//! - `active`: active-task operations
//! - `done`: completed-task operations
//! - `category`: category labels
//! - `sort`: deadline and priority orderings
//! - `task`: task records, wire format and display helpers
//! - `storage`: key-value backends (file and memory)
//! - `lock`: file locking and atomic writes
//! - `config`: configuration loading from `taskstash.toml`
//! - `error`: error types and result aliases
//! - `cli`, `output`: the command-line presentation layer

pub mod active;
pub mod book;
pub mod category;
pub mod cli;
pub mod config;
pub mod done;
pub mod error;
pub mod lock;
pub mod output;
pub mod sort;
pub mod storage;
pub mod task;

pub use book::TaskBook;
pub use error::{CategoryError, Error, Result};
pub use task::{Priority, Task, TaskInput};
