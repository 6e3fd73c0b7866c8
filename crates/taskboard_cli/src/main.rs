//! Command-line front end for the task board.
//!
//! # Responsibility
//! - Collect and validate user input before it reaches the board core.
//! - Render the derived list views as text or JSON.
//!
//! # Invariants
//! - Task names are trimmed and non-empty before `add_task`/`update_task`.
//! - Moves are only offered to lists other than the task's current one.

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::db::open_db;
use taskboard_core::{
    default_log_level, init_logging, normalize_task_name, BoardSnapshot, BoardState, KeyValueStore,
    ListId, SqliteKeyValueStore, TaskId,
};

const DB_FILE_NAME: &str = "taskboard.sqlite3";

#[derive(Parser)]
#[command(name = "taskboard", version)]
#[command(about = "Three-column task board stored in a local SQLite file")]
struct Cli {
    /// Board database file
    #[arg(long, env = "TASKBOARD_DB_PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files (absolute); logging is off without it
    #[arg(long)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every list with its tasks
    Show {
        /// Emit the board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the configured lists
    Lists,
    /// Add a task to a list
    Add {
        list_id: ListId,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Rename a task
    Rename {
        task_id: TaskId,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete a task
    Delete { task_id: TaskId },
    /// Move a task to another list
    Move {
        task_id: TaskId,
        target_list_id: ListId,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(effective_log_level(cli.log_level.as_deref()), log_dir)?;
    }

    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));
    info!("event=cli_start module=cli status=ok db_path={}", db_path.display());

    let conn = open_db(&db_path)
        .map_err(|err| format!("cannot open board at `{}`: {err}", db_path.display()))?;
    let backend = SqliteKeyValueStore::try_new(conn).map_err(|err| err.to_string())?;
    let mut board = BoardState::load(backend);

    match cli.command.unwrap_or(Commands::Show { json: false }) {
        Commands::Show { json } => {
            let snapshot = board.snapshot();
            if json {
                let text = serde_json::to_string_pretty(&snapshot)
                    .map_err(|err| format!("cannot encode board: {err}"))?;
                println!("{text}");
            } else {
                print!("{}", render_board(&snapshot));
            }
        }
        Commands::Lists => {
            for list in board.lists() {
                println!("{}\t{}", list.id, list.name);
            }
        }
        Commands::Add { list_id, name } => {
            if !board.has_list(list_id) {
                return Err(format!("unknown list {list_id}"));
            }
            let name = require_name(&name)?;
            let task_id = board.add_task(list_id, name);
            warn_if_unsaved(&board);
            println!("{task_id}");
        }
        Commands::Rename { task_id, name } => {
            let current = current_list(&board, task_id)?;
            let name = require_name(&name)?;
            board.update_task(current, task_id, name);
            warn_if_unsaved(&board);
        }
        Commands::Delete { task_id } => {
            let current = current_list(&board, task_id)?;
            board.delete_task(current, task_id);
            warn_if_unsaved(&board);
        }
        Commands::Move {
            task_id,
            target_list_id,
        } => {
            let current = current_list(&board, task_id)?;
            let allowed: Vec<ListId> = board
                .transfer_targets(current)
                .iter()
                .map(|spec| spec.id)
                .collect();
            if !allowed.contains(&target_list_id) {
                let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                return Err(format!(
                    "cannot move task {task_id} to list {target_list_id}; choose one of {}",
                    allowed.join(", ")
                ));
            }
            board.transfer_task(current, target_list_id, task_id);
            warn_if_unsaved(&board);
        }
    }

    Ok(())
}

fn effective_log_level(requested: Option<&str>) -> &str {
    requested.unwrap_or(default_log_level())
}

fn require_name(words: &[String]) -> Result<String, String> {
    normalize_task_name(&words.join(" ")).ok_or_else(|| "task name cannot be empty".to_string())
}

fn current_list<S: KeyValueStore>(board: &BoardState<S>, task_id: TaskId) -> Result<ListId, String> {
    board
        .task(task_id)
        .map(|task| task.list_id)
        .ok_or_else(|| format!("no task with id {task_id}"))
}

fn warn_if_unsaved<S: KeyValueStore>(board: &BoardState<S>) {
    if let Some(err) = board.last_persist_error() {
        eprintln!("warning: change applied but not saved: {err}");
    }
}

fn render_board(snapshot: &BoardSnapshot) -> String {
    let mut out = String::new();
    for list in &snapshot.lists {
        out.push_str(&format!("{} [{}] ({})\n", list.name, list.id, list.tasks.len()));
        for task in &list.tasks {
            out.push_str(&format!("  {}  {}\n", task.id, task.name));
        }
    }
    out.push_str(&format!("{} task(s)\n", snapshot.task_count()));
    out
}
