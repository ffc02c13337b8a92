//! Interactive watch session
//!
//! Reads commands from stdin and redraws the list whenever the store
//! changes. Every input line is treated as a keystroke burst: `search`
//! lines go through the debounce window, the other filters apply at once.

use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use tasksync_core::{
    ClientConfig, Error, Priority, SyncEngine, Task, TaskDraft, TaskGateway, TaskId,
};

use crate::render;

const HELP: &str = "\
Commands:
  search <text>                 filter by text (debounced)
  status all|active|completed   filter by completion
  priority all|low|medium|high  filter by priority
  clear                         reset all filters
  refresh                       reload with the current filters
  add [low|medium|high] <title> create a task
  toggle <id>                   flip completion
  delete <id>                   delete a task
  dismiss                       hide the last error
  help                          show this text
  quit                          leave";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Search(String),
    Status(Option<bool>),
    Priority(Option<Priority>),
    Clear,
    Refresh,
    Add { title: String, priority: Priority },
    Toggle(TaskId),
    Delete(TaskId),
    Dismiss,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Input, String> {
    let line = line.trim_start();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let arg = rest.trim();

    match command {
        // Search text is kept as typed, including surrounding spaces
        "search" => Ok(Input::Search(rest.to_string())),
        "status" => match arg {
            "all" => Ok(Input::Status(None)),
            "active" => Ok(Input::Status(Some(false))),
            "completed" => Ok(Input::Status(Some(true))),
            other => Err(format!("Unknown status '{}'", other)),
        },
        "priority" => match arg {
            "all" => Ok(Input::Priority(None)),
            other => Priority::from_str(other)
                .map(|p| Input::Priority(Some(p)))
                .map_err(|e| e.to_string()),
        },
        "clear" => Ok(Input::Clear),
        "refresh" => Ok(Input::Refresh),
        "add" => {
            let (first, remainder) = arg.split_once(' ').unwrap_or((arg, ""));
            match Priority::from_str(first) {
                Ok(priority) if !remainder.trim().is_empty() => Ok(Input::Add {
                    title: remainder.trim().to_string(),
                    priority,
                }),
                _ => Ok(Input::Add {
                    title: arg.to_string(),
                    priority: Priority::Medium,
                }),
            }
        }
        "toggle" => parse_id(arg).map(Input::Toggle),
        "delete" => parse_id(arg).map(Input::Delete),
        "dismiss" => Ok(Input::Dismiss),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        "" => Err("Type 'help' for commands".to_string()),
        other => Err(format!("Unknown command '{}', type 'help'", other)),
    }
}

fn parse_id(arg: &str) -> Result<TaskId, String> {
    arg.parse()
        .map_err(|_| format!("Expected a task id, got '{}'", arg))
}

pub async fn run(gateway: Arc<dyn TaskGateway>, config: &ClientConfig) -> anyhow::Result<()> {
    let mut engine = SyncEngine::start(gateway, config);
    let mut updates = engine.store().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_frame = String::new();
    // Tasks as last drawn, toggles read completion from here
    let mut shown: Vec<Task> = Vec::new();

    println!("{}", HELP);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let (frame, tasks) = {
                    let state = updates.borrow_and_update();
                    let filters = engine.filters();
                    let frame = render::frame(&state, &filters.criteria(), &filters.search_input());
                    (frame, state.tasks.clone())
                };
                if frame != last_frame {
                    print!("{}", frame);
                    last_frame = frame;
                    shown = tasks;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => apply(&mut engine, &shown, input).await,
                    Err(message) => eprintln!("{}", message),
                }
            }
        }
    }

    tracing::debug!("Watch session ended");
    Ok(())
}

async fn apply(engine: &mut SyncEngine, shown: &[Task], input: Input) {
    let result = match input {
        Input::Search(text) => {
            engine.filters_mut().set_search_text(text);
            Ok(())
        }
        Input::Status(completed) => {
            engine.filters_mut().set_completed(completed);
            Ok(())
        }
        Input::Priority(priority) => {
            engine.filters_mut().set_priority(priority);
            Ok(())
        }
        Input::Clear => {
            engine.filters_mut().clear();
            Ok(())
        }
        Input::Refresh => {
            engine.filters().refresh();
            Ok(())
        }
        Input::Add { title, priority } => {
            let draft = TaskDraft::new(title).with_priority(priority);
            engine.store().create(&draft).await.map(|_| ())
        }
        Input::Toggle(id) => match shown.iter().find(|task| task.id == id) {
            Some(task) => engine.store().toggle_complete(task).await.map(|_| ()),
            None => {
                eprintln!("No task #{} in the list", id);
                Ok(())
            }
        },
        Input::Delete(id) => engine.store().delete(id).await,
        Input::Dismiss => {
            engine.store().dismiss_error();
            Ok(())
        }
        Input::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Input::Quit => Ok(()),
    };

    // Transport failures land in the store's error slot and are drawn with the list
    if let Err(Error::Validation(message)) = result {
        eprintln!("{}", message);
    }
}
