//! tasksync command line client

mod render;
mod watch;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tasksync_core::{
    ClientConfig, FilterCriteria, HttpTaskGateway, Priority, SyncStore, TaskDraft, TaskGateway,
    TaskId, TaskPatch,
};

#[derive(Parser, Debug)]
#[command(name = "tasksync", version, about = "Keep a task list in step with a remote task store")]
struct Cli {
    /// Base URL of the task store
    #[arg(long, env = "TASKSYNC_API_URL", global = true)]
    api_url: Option<String>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks matching the filters
    List {
        #[arg(long, value_enum, default_value_t = Status::All)]
        status: Status,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show one task
    Show { id: TaskId },
    /// Create a task
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = Priority::Medium)]
        priority: Priority,
    },
    /// Change fields of a task
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a task between active and completed
    Toggle { id: TaskId },
    /// Delete a task
    Delete { id: TaskId },
    /// Interactive session that follows filter changes live
    Watch,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    All,
    Active,
    Completed,
}

impl Status {
    fn completed(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    let gateway = Arc::new(HttpTaskGateway::new(&config)?);
    tracing::debug!("Using task store at {}", gateway.base_url());

    let store = SyncStore::new(gateway.clone());
    match cli.command {
        Command::List {
            status,
            priority,
            search,
        } => {
            let criteria = FilterCriteria::default()
                .with_completed(status.completed())
                .with_priority(priority)
                .with_search(search);
            store.refetch(criteria).await?;
            print!("{}", render::task_list(&store.tasks()));
        }
        Command::Show { id } => {
            let task = store.gateway().get(id).await?;
            print!("{}", render::task_detail(&task));
        }
        Command::Add {
            title,
            description,
            priority,
        } => {
            let draft = TaskDraft::new(title)
                .with_description(description)
                .with_priority(priority);
            let task = store.create(&draft).await?;
            println!("Created {}", render::task_line(&task));
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            completed,
        } => {
            let patch = TaskPatch {
                title,
                description,
                priority,
                completed,
            };
            if patch.is_empty() {
                bail!("Nothing to change, pass at least one of --title, --description, --priority or --completed");
            }
            let task = store.update(id, &patch).await?;
            println!("Updated {}", render::task_line(&task));
        }
        Command::Toggle { id } => {
            let task = store.gateway().get(id).await?;
            let task = store.toggle_complete(&task).await?;
            println!("Updated {}", render::task_line(&task));
        }
        Command::Delete { id } => {
            store.delete(id).await?;
            println!("Deleted task #{}", id);
        }
        Command::Watch => watch::run(gateway, &config).await?,
    }

    Ok(())
}
