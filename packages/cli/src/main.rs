#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operator CLI for patrol reports.
//!
//! ```text
//! patrol_report extract [FILE] [--json]
//! patrol_report submit [FILE]
//! patrol_report reset [--yes]
//! patrol_report totals
//! patrol_report locations
//! patrol_report serve [--memory]
//! ```
//!
//! Report text is read from `FILE` or stdin. Running `patrol_report` with
//! no subcommand enters interactive mode.
//!
//! The server URL comes from `--server`, then `PATROL_REPORT_URL`, then
//! defaults to `http://127.0.0.1:8080`.

mod commands;
mod input;
mod interactive;
mod summary;
mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use patrol_report_client::http::DEFAULT_SERVER_URL;
use patrol_report_server::{ServerConfig, StoreConfig};

#[derive(Parser)]
#[command(
    name = "patrol_report",
    about = "Extract, submit and review police patrol reports"
)]
struct Cli {
    /// Server base URL
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a report locally without contacting the server
    Extract {
        /// Report file (stdin when omitted)
        file: Option<PathBuf>,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Submit a report to the server and show the updated totals
    Submit {
        /// Report file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Delete every stored report and zero the totals
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the accumulated totals
    Totals,
    /// Show the accumulated totals per location
    Locations,
    /// Run the server (configured from BIND_ADDR, PORT, DATABASE_PATH)
    Serve {
        /// Keep reports in memory instead of the database file
        #[arg(long)]
        memory: bool,
    },
}

fn server_url(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("PATROL_REPORT_URL").ok())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let url = server_url(cli.server);

    let Some(command) = cli.command else {
        return interactive::run(commands::controller(&url)?).await;
    };

    match command {
        Commands::Extract { file, json } => {
            let text = input::read_report(file.as_deref())?;
            commands::extract(&text, json)?;
        }
        Commands::Submit { file } => {
            let text = input::read_report(file.as_deref())?;
            let mut controller = commands::controller(&url)?;
            commands::submit(&mut controller, &text).await?;
        }
        Commands::Reset { yes } => {
            let mut controller = commands::controller(&url)?;
            commands::reset(&mut controller, yes).await?;
        }
        Commands::Totals => {
            let mut controller = commands::controller(&url)?;
            commands::totals(&mut controller).await?;
        }
        Commands::Locations => {
            let controller = commands::controller(&url)?;
            commands::locations(&controller).await?;
        }
        Commands::Serve { memory } => {
            let mut config = ServerConfig::from_env();
            if memory {
                config.store = StoreConfig::Memory;
            }
            commands::serve(config).await?;
        }
    }

    Ok(())
}
