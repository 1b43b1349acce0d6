// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::sync::Arc;
use uuid::Uuid;

use sqlkeep::app_config::{Config, LogLevel};
use sqlkeep::database::{Todo, TodoContext, TodoRepository};
use sqlkeep::persistence::{DbLifecycle, FilenameRegistry, StorageSyncService};
use sqlkeep::storage::{DirectoryBlobStore, WorkDir};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a new todo
    Add {
        /// Short title (at most 100 characters)
        title: String,

        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List all todos
    List,

    /// Mark a todo as completed
    Done {
        /// Id of the todo to complete
        id: Uuid,
    },

    /// Remove a todo
    Remove {
        /// Id of the todo to remove
        id: Uuid,
    },

    /// Print an opaque reference to the current persisted snapshot
    Link,

    /// Print the last sync status code
    Status,
}

/// sqlkeep - SQLite persistence for sandboxed environments
///
/// Keeps a file-backed SQLite database alive across reloads of an
/// environment whose working filesystem is ephemeral, by shuttling
/// consistent snapshots to and from a persistent blob store.
#[derive(Parser, Debug)]
#[command(name = "sqlkeep")]
#[command(version = "0.1.0")]
#[command(about = "Sandboxed SQLite persistence with restore/backup sync")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger { level });
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    let config = Config::from_file_or_default(&options.config_path)?;
    let level = options
        .log_level
        .map(LogLevel::from)
        .unwrap_or(config.log_level);
    CustomLogger::init(level.to_level_filter())?;

    // Wire the subsystem: config -> store -> sync -> lifecycle -> repository
    let registry = Arc::new(FilenameRegistry::new());
    let workdir = WorkDir::new(&config.work_dir)?;
    let store = Arc::new(DirectoryBlobStore::new(&config.store_dir)?);
    let sync = Arc::new(StorageSyncService::new(workdir.clone(), store));
    let lifecycle =
        DbLifecycle::<TodoContext>::new(&config.connection_string, registry, sync, workdir);
    let repository = TodoRepository::new(lifecycle.clone());

    match options.command {
        Commands::Add { title, description } => {
            let todo = Todo::new(title, description)?;
            repository.register(&todo).await?;
            println!("Added {}", todo.id);
        }
        Commands::List => {
            let todos = repository.all().await?;
            if todos.is_empty() {
                println!("No todos yet");
            }
            for todo in todos {
                let mark = if todo.completed { "x" } else { " " };
                if todo.description.is_empty() {
                    println!("[{}] {}  {}", mark, todo.id, todo.title);
                } else {
                    println!("[{}] {}  {}: {}", mark, todo.id, todo.title, todo.description);
                }
            }
        }
        Commands::Done { id } => match repository.get(id).await? {
            Some(mut todo) => {
                todo.mark_completed();
                repository.update(&todo).await?;
                println!("Completed {}", todo.title);
            }
            None => println!("No todo with id {}", id),
        },
        Commands::Remove { id } => {
            if repository.remove(id).await? {
                println!("Removed {}", id);
            } else {
                println!("No todo with id {}", id);
            }
        }
        Commands::Link => {
            // Consume the startup restore so the link reflects current state
            let _ = lifecycle.open().await?;
            let link = lifecycle.download_link().await?;
            if link.is_empty() {
                println!("No persisted snapshot available");
            } else {
                println!("{}", link);
            }
        }
        Commands::Status => {
            let _ = lifecycle.open().await?;
            let status = lifecycle.last_status();
            println!("{} ({})", status.code(), status);
        }
    }

    // Drain in-flight backup pushes before the process exits
    lifecycle.shutdown().await;

    Ok(())
}
