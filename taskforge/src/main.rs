//! Generative task runner CLI.
//!
//! `run` synthesizes a Python script for a task, executes it under `uv`, and
//! repairs it from captured errors up to the configured budget. `read` prints
//! a file from the configured data directory, refusing any path outside it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use taskforge::exit_codes;
use taskforge::io::config::{ForgeConfig, load_config};
use taskforge::io::data_dir::{DataDir, ReadError};
use taskforge::io::gateway::HttpGateway;
use taskforge::io::sandbox::UvSandbox;
use taskforge::looping::{TaskStop, run_task};

#[derive(Parser)]
#[command(
    name = "taskforge",
    version,
    about = "Synthesize, execute, and repair Python scripts for free-text tasks"
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "taskforge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a task to a terminal state and print the report as JSON.
    Run {
        /// Free-text task description.
        task: String,
    },
    /// Print a file from the data directory.
    Read {
        /// Requested path, absolute or relative to the data root.
        path: String,
    },
}

fn main() {
    taskforge::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    match cli.command {
        Command::Run { task } => cmd_run(&config, &task),
        Command::Read { path } => cmd_read(&config, &path),
    }
}

fn cmd_run(config: &ForgeConfig, task: &str) -> Result<i32> {
    let api_key = config.api_key()?;
    let gateway = HttpGateway::new(&config.endpoint, api_key, config.gateway_timeout())
        .context("build model gateway")?;

    let outcome = run_task(config, &gateway, &UvSandbox, task)?;
    match outcome.stop {
        TaskStop::Accepted => {
            println!(
                "{}",
                json!({ "status": "executed", "attempts": outcome.executions })
            );
            Ok(exit_codes::OK)
        }
        TaskStop::Exhausted { last_error } => {
            println!(
                "{}",
                json!({
                    "status": "exhausted",
                    "attempts": outcome.executions,
                    "detail": last_error,
                })
            );
            Ok(exit_codes::EXHAUSTED)
        }
    }
}

fn cmd_read(config: &ForgeConfig, path: &str) -> Result<i32> {
    let data_dir = DataDir::new(&config.data_root)?;
    match data_dir.read(path) {
        Ok(content) => {
            print!("{content}");
            Ok(exit_codes::OK)
        }
        Err(ReadError::NotFound) => {
            eprintln!("not found");
            Ok(exit_codes::NOT_FOUND)
        }
        Err(ReadError::InvalidPath) => {
            eprintln!("invalid path");
            Ok(exit_codes::INVALID)
        }
        Err(err @ ReadError::Io(_)) => Err(err.into()),
    }
}
