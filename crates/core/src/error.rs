//! Error types for the core library

use thiserror::Error;

use crate::task::TaskId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Rejected locally, before any request was made
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Any failure talking to the remote task store
    #[error("Transport error: {0}")]
    Transport(String),

    /// A list response that arrived after a newer list request was issued
    #[error("Stale response discarded: request {request} superseded by {latest}")]
    StaleResponse { request: u64, latest: u64 },

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
