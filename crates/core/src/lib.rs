//! Core library for tasksync
//!
//! This crate contains the client-side synchronization engine:
//! - Task model and wire types
//! - Filter criteria and the debouncing filter controller
//! - The remote gateway trait and its HTTP implementation
//! - The synchronization store that owns the visible task list

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod store;
pub mod task;

pub use config::ClientConfig;
pub use engine::SyncEngine;
pub use error::Error;
pub use filter::{FilterController, FilterCriteria, FilterUpdates};
pub use gateway::{HttpTaskGateway, TaskGateway};
pub use store::{Operation, SyncFailure, SyncState, SyncStore};
pub use task::{Priority, Task, TaskDraft, TaskId, TaskPatch, TaskQuery};

pub type Result<T> = std::result::Result<T, Error>;
