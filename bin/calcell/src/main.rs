mod commands;

use calcell_core::{Config, Paths};
use clap::{CommandFactory, Parser, Subcommand};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "calcell")]
#[command(about = "A plugin-driven calculator with persistent history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base directory for config, history and logs (default: ~/.calcell)
    #[arg(long, global = true)]
    base: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate in postfix notation, e.g. `calcell calc 4 3 add`
    Calc {
        #[arg(allow_hyphen_values = true)]
        a: String,
        #[arg(allow_hyphen_values = true)]
        b: String,
        operation: String,
    },

    /// List available operations
    Menu,

    /// Manage calculation history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Start the interactive shell (default)
    Repl,

    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Show history records
    List {
        /// Only the most recent N records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show every column
        #[arg(long)]
        detail: bool,
    },
    /// Load history from a file (relative paths resolve against the data directory)
    Load { file: Option<String> },
    /// Save history to a file (relative paths resolve against the data directory)
    Save { file: Option<String> },
    /// Clear all history
    Clear,
    /// Delete the record at an index
    Delete { index: usize },
    /// Add a record manually
    Add {
        operation: String,
        #[arg(allow_hyphen_values = true)]
        a: String,
        #[arg(allow_hyphen_values = true)]
        b: String,
        #[arg(allow_hyphen_values = true)]
        result: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base.clone() {
        Some(base) => Paths::with_base(base),
        None => Paths::new(),
    };
    let mut config = Config::load_or_default(&paths)?;
    config.apply_env()?;

    if let Err(e) = paths.ensure_dirs(&config) {
        eprintln!("Warning: could not create {}: {}", paths.base.display(), e);
    }
    setup_logging(cli.verbose, &paths, &config);

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Calc { a, b, operation } => {
            commands::calc::run(&paths, &config, &a, &b, &operation)?;
        }
        Commands::Menu => {
            commands::menu::run(&paths, &config)?;
        }
        Commands::History { command } => match command {
            HistoryCommands::List { limit, detail } => {
                commands::history_cmd::list(&paths, &config, limit, detail)?;
            }
            HistoryCommands::Load { file } => {
                commands::history_cmd::load(&paths, &config, file.as_deref())?;
            }
            HistoryCommands::Save { file } => {
                commands::history_cmd::save(&paths, &config, file.as_deref())?;
            }
            HistoryCommands::Clear => {
                commands::history_cmd::clear(&paths, &config)?;
            }
            HistoryCommands::Delete { index } => {
                commands::history_cmd::delete(&paths, &config, index)?;
            }
            HistoryCommands::Add {
                operation,
                a,
                b,
                result,
            } => {
                commands::history_cmd::add(&paths, &config, &operation, &a, &b, &result)?;
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show(&paths, &config)?;
            }
        },
        Commands::Repl => {
            commands::repl::run(&paths, &config)?;
        }
        Commands::Completions { shell } => {
            commands::completions_cmd::run(&shell, Cli::command())?;
        }
    }

    Ok(())
}

/// File layer always (when the log file opens), stderr layer with `--verbose`
/// or when the file is unavailable.
fn setup_logging(verbose: bool, paths: &Paths, config: &Config) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.effective_level()
    };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = open_log_file(&paths.log_file(config));
    let file_missing = log_file.is_none();
    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });
    let stderr_layer = (verbose || file_missing).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
