//! Filter criteria

use serde::{Deserialize, Serialize};

use crate::task::{Priority, TaskQuery};

/// What the user wants to see
///
/// `None` means the field does not constrain the list. It is never sent as
/// `false` or an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub search: String,
}

impl FilterCriteria {
    pub fn with_completed(mut self, completed: Option<bool>) -> Self {
        self.completed = completed;
        self
    }

    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Whether any field narrows the list
    pub fn is_active(&self) -> bool {
        self.completed.is_some() || self.priority.is_some() || !self.search.is_empty()
    }

    /// Translate into the remote query, dropping unset fields
    pub fn to_query(&self) -> TaskQuery {
        TaskQuery {
            completed: self.completed,
            priority: self.priority,
            search: (!self.search.is_empty()).then(|| self.search.clone()),
        }
    }
}
