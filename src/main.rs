use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use tasklist::{Backend, CommitTrigger, Config, EditSession, PersistenceAdapter, TaskId, TaskListStore};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "TaskList CLI - Add, complete, edit and delete tasks that persist between sessions")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/tasklist/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage backend, overrides the config file
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Data directory, overrides the config file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage key the list is saved under
    #[arg(short, long)]
    key: Option<String>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all tasks
    List,

    /// Add a new task
    Add {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Mark a task done, or not done again
    Toggle { id: TaskId },

    /// Remove a task
    Delete { id: TaskId },

    /// Replace a task's text
    Edit {
        id: TaskId,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(key) = cli.key {
        config.key = key;
    }

    let adapter = config.open_adapter()?;
    let mut store = TaskListStore::open_with_key(adapter, &config.key);

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => {}
        Commands::Add { text } => {
            store.add_task(&text.join(" "));
        }
        Commands::Toggle { id } => {
            note_unknown(&store, id);
            store.toggle_task(id);
        }
        Commands::Delete { id } => {
            note_unknown(&store, id);
            store.delete_task(id);
        }
        Commands::Edit { id, text } => {
            note_unknown(&store, id);
            if let Some(task) = store.get(id).cloned() {
                let mut session = EditSession::new();
                session.start_edit(&task);
                session.set_buffer(text.join(" "));
                session.commit(&mut store, CommitTrigger::Confirm);
            }
        }
    }

    render(&store);
    Ok(())
}

/// Unknown ids are a no-op in the store; just tell the user
fn note_unknown<A: PersistenceAdapter>(store: &TaskListStore<A>, id: TaskId) {
    if let Some(message) = unknown_id_message(store, id) {
        eprintln!("{}", message.yellow());
    }
}

fn unknown_id_message<A: PersistenceAdapter>(store: &TaskListStore<A>, id: TaskId) -> Option<String> {
    match store.get(id) {
        Some(_) => None,
        None => Some(format!("No task with id {}", id)),
    }
}

fn render<A: PersistenceAdapter>(store: &TaskListStore<A>) {
    if store.is_empty() {
        println!("{}", "No tasks yet".dimmed());
    }

    for (index, task) in store.tasks().iter().enumerate() {
        let number = format!("{}.", index + 1).dimmed();
        let id = format!("(#{})", task.id).dimmed();
        if task.completed {
            println!("{} {} {}  {}", number, "[x]".green(), task.text.strikethrough().dimmed(), id);
        } else {
            println!("{} [ ] {}  {}", number, task.text, id);
        }
    }

    println!();
    println!("{} of {} remaining", store.remaining(), store.len());

    if let Some(error) = store.last_save_error() {
        eprintln!("{} {}", "warning: changes were not saved:".red(), error);
    }
}
