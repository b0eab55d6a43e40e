mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use calendarize_core::EventId;
use calendarize_core::settings::Settings;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "calendarize")]
#[command(about = "Import iCalendar feeds and query the imported events")]
struct Cli {
    /// Config file to use instead of ~/.config/calendarize/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download an .ics feed and store its events
    Import {
        /// URL of the iCalendar feed
        #[arg(long)]
        ics_calendar_uri: Option<String>,

        /// Container the imported events are stored in
        #[arg(long)]
        pid: Option<String>,
    },
    /// Print the ids of events whose title or description contains TERM
    Search {
        #[arg(default_value = "")]
        term: String,
    },
    /// Show the occurrence of an event that is next (or was last)
    Next {
        event_id: EventId,

        /// Reference time instead of now (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Show the event imported from a feed UID
    Show { import_id: String },
    /// List the stored events
    Events,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Commands::Import {
            ics_calendar_uri,
            pid,
        } => commands::import::run(&settings, ics_calendar_uri.as_deref(), pid.as_deref()).await,
        Commands::Search { term } => commands::search::run(&settings, &term),
        Commands::Next { event_id, at } => {
            commands::next::run(&settings, event_id, at.unwrap_or_else(Utc::now))
        }
        Commands::Show { import_id } => commands::show::run(&settings, &import_id),
        Commands::Events => commands::events::run(&settings),
    }
}
