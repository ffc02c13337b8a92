//! Plain-text rendering of tasks and store state

use std::fmt::Write;

use tasksync_core::{FilterCriteria, SyncState, Task};

pub fn task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{}] #{} {} ({})", mark, task.id, task.title, task.priority)
}

pub fn task_detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task_line(task));
    if !task.description.is_empty() {
        let _ = writeln!(out, "    {}", task.description);
    }
    let _ = writeln!(
        out,
        "    created {}  updated {}",
        task.created_at.format("%Y-%m-%d %H:%M"),
        task.updated_at.format("%Y-%m-%d %H:%M")
    );
    out
}

pub fn task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found\n".to_string();
    }
    tasks.iter().map(|task| task_line(task) + "\n").collect()
}

pub fn filter_summary(criteria: &FilterCriteria, search_input: &str) -> String {
    let status = match criteria.completed {
        None => "all",
        Some(false) => "active",
        Some(true) => "completed",
    };
    let priority = criteria.priority.map_or("all", |p| p.as_str());
    let mut summary = format!(
        "status: {}  priority: {}  search: \"{}\"",
        status, priority, criteria.search
    );
    if search_input != criteria.search {
        let _ = write!(summary, " (typing \"{}\")", search_input);
    }
    summary
}

/// One full screen for the watch session
pub fn frame(state: &SyncState, criteria: &FilterCriteria, search_input: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- {}", filter_summary(criteria, search_input));
    if let Some(failure) = &state.error {
        let _ = writeln!(out, "! {} (type 'dismiss' to hide)", failure);
    }
    if state.loading {
        let _ = writeln!(out, "Loading...");
    }
    out.push_str(&task_list(&state.tasks));
    let active = state.tasks.iter().filter(|task| !task.completed).count();
    let _ = writeln!(out, "{} active / {} total", active, state.tasks.len());
    out
}
