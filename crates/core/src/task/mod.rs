//! Task module
//!
//! This module contains the task record, its draft and patch forms,
//! and the list query sent to the remote store.

mod model;
mod query;

pub use model::*;
pub use query::TaskQuery;
