//! tasklist - terminal task list editor
//!
//! A form creates tasks (title, description, due date, status) and a table
//! lists, filters, sorts, edits and deletes them. The whole collection is
//! written to local storage after every change.
//!
//! # Modules
//!
//! - [`task`] - task record, status, edit buffer and id generation
//! - [`storage`] - the `TaskStore` port with file and in-memory stores
//! - [`task_manager`] - editor state and the operations on it
//! - [`ui`] - ratatui front end
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod task;
pub mod task_manager;
pub mod ui;

pub use error::{Error, Result};
pub use storage::{FileStore, MemoryStore, TaskStore};
pub use task::{EditBuffer, Field, Status, Task, TaskId};
pub use task_manager::{SortOrder, StatusFilter, TaskForm, TaskManager};
