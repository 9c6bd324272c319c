//! reqline - send single-line HTTP requests from the terminal
//!
//! Each invocation loads history and saved requests from disk, runs one
//! command against the engine and writes the collections back.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use reqline::app::{commands, open_engine};
use reqline::constants::{APP_NAME, LOG_FILE_NAME};
use reqline::{Config, ReqwestTransport};

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about = "Send HTTP requests written as a single line")]
struct Cli {
    /// Config file (default: ~/.reqline/config.yaml)
    #[arg(long, global = true, env = "REQLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the history file
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,

    /// Override the saved requests file
    #[arg(long, global = true)]
    saved_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Keep history and saved requests in memory for this run
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a request, e.g. `reqline send 'GET https://x q=?a'`
    Send {
        request: String,
        #[command(flatten)]
        vars: Vars,
        /// Also add the request to saved requests
        #[arg(long)]
        save: bool,
    },
    /// Show how a request would be parsed without sending it
    Check {
        request: String,
        #[command(flatten)]
        vars: Vars,
    },
    /// List executed requests, most recent first
    History {
        /// Only show entries whose method and url contain this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Send history entry N again (1 = most recent)
    Replay { number: usize },
    /// Manage saved requests
    #[command(subcommand)]
    Saved(SavedCommand),
}

#[derive(Subcommand, Debug)]
enum SavedCommand {
    List {
        /// Only show requests whose method and url contain this text
        #[arg(long)]
        filter: Option<String>,
    },
    Add {
        request: String,
        #[command(flatten)]
        vars: Vars,
    },
    /// Remove saved request N (numbered from 1)
    Remove { number: usize },
    /// Send saved request N (numbered from 1)
    Run { number: usize },
}

/// JSON data for `{{placeholder}}` substitution
#[derive(clap::Args, Debug)]
struct Vars {
    /// Inline JSON object
    #[arg(long = "vars", conflicts_with = "vars_file")]
    inline: Option<String>,
    /// File containing a JSON object
    #[arg(long)]
    vars_file: Option<PathBuf>,
}

impl Vars {
    fn load(&self) -> Result<Option<Value>> {
        if let Some(inline) = &self.inline {
            let value = serde_json::from_str(inline).context("parsing --vars as JSON")?;
            return Ok(Some(value));
        }
        if let Some(path) = &self.vars_file {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading vars file {}", path.display()))?;
            let value = serde_json::from_str(&content)
                .with_context(|| format!("parsing vars file {}", path.display()))?;
            return Ok(Some(value));
        }
        Ok(None)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &cli.history_file {
        config.history_file = path.clone();
    }
    if let Some(path) = &cli.saved_file {
        config.saved_requests_file = path.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    if cli.in_memory {
        config.persist = false;
    }

    // Initialize logging to file
    let _guard = init_logging(&config.log_file)?;
    tracing::debug!(?config, "Configuration loaded");

    let transport = ReqwestTransport::new(config.timeout()).context("building HTTP client")?;
    let engine = open_engine(transport, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // One-shot: the engine that follows each command is not needed again
    let result = match cli.command {
        Command::Send { request, vars, save } => {
            let vars = vars.load()?;
            commands::send(engine, &request, vars.as_ref(), save, &mut out).1
        }
        Command::Check { request, vars } => {
            let vars = vars.load()?;
            commands::check(&request, vars.as_ref(), &mut out)
        }
        Command::History { filter } => commands::history(&engine, filter.as_deref(), &mut out),
        Command::Replay { number } => commands::replay(engine, number, &mut out).1,
        Command::Saved(SavedCommand::List { filter }) => {
            commands::saved_list(&engine, filter.as_deref(), &mut out)
        }
        Command::Saved(SavedCommand::Add { request, vars }) => {
            let vars = vars.load()?;
            commands::saved_add(engine, &request, vars.as_ref(), &mut out).1
        }
        Command::Saved(SavedCommand::Remove { number }) => {
            commands::saved_remove(engine, number, &mut out).1
        }
        Command::Saved(SavedCommand::Run { number }) => {
            commands::saved_run(engine, number, &mut out).1
        }
    };

    out.flush()?;
    result
}

fn init_logging(log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = log_file
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| LOG_FILE_NAME.into());
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    Ok(guard)
}
