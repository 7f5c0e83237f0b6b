//! waf - a chat bot for land claims, todo tasks and overdue reminders.
//!
//! # Overview
//!
//! waf listens for prefixed text commands on a chat gateway, renders
//! interactive paginated and form-based replies, and keeps small units of
//! user data (land claims, todo tasks) in a SQLite database. A background
//! sweep reminds users about overdue tasks.
//!
//! # Bot Commands
//!
//! - `waf help [name]` - command overview or per-command detail
//! - `waf claims create <x> <y> [dimension]` - reserve a spot
//! - `waf claims remove <x> <y> [dimension]` - give it up
//! - `waf claims list` - paginated listing of your claims
//! - `waf todo add <text>` - interactive task creation
//! - `waf todo list [overdue_only]` - paginated task listing
//! - `waf todo remove <task_id>` - delete a task
//! - `waf web search <query>` - build a search link
//!
//! # Architecture
//!
//! - [`registry`] - command tree, cogs and name resolution
//! - [`commands`] - dispatch and per-command handlers
//! - [`sessions`] - interactive paginator/panel lifecycle
//! - [`claims`] / [`tasks`] - domain rules and persistence
//! - [`gateway`] - the transport seam; a console transport is built in
//! - [`bot`] - wiring and the event loop
//!
//! # Usage
//!
//! ```bash
//! waf --config config.yaml --data ./waf-data
//! ```
//!
//! The console transport reads commands from stdin, so the bot can be
//! driven locally without any chat-platform credentials. `RUST_LOG`
//! controls verbosity (default `info`).

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tokio::sync::mpsc;

use crate::bot::Bot;
use crate::config::Config;
use crate::gateway::console::{self, ConsoleGateway};

mod bot;
mod claims;
mod commands;
mod config;
mod db;
mod error;
mod gateway;
mod registry;
mod sessions;
mod tasks;
mod timeparse;

/// Command-line arguments for the waf bot.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// May point at a missing file; every setting has a default and can
    /// also be supplied through `WAF_`-prefixed environment variables.
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Path to the directory for persistent data (the SQLite database).
    #[arg(short, long, default_value = ".")]
    data: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("starting waf {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config file: {}", e);
            return;
        }
    };

    // ":memory:" and absolute paths bypass the data directory.
    let database_path = if config.database.file == ":memory:"
        || Path::new(&config.database.file).is_absolute()
    {
        config.database.file.clone()
    } else {
        Path::new(&args.data)
            .join(&config.database.file)
            .to_string_lossy()
            .into_owned()
    };

    let gateway = Arc::new(ConsoleGateway::new());
    let bot = match Bot::new(&config, &database_path, gateway).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("failed to initialize bot: {}", e);
            return;
        }
    };

    let (events_tx, events_rx) = mpsc::channel(64);
    tokio::spawn(console::read_events(events_tx));
    bot.start(events_rx).await;
}
