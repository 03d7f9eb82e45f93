//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port and database path before
//! starting the server.

use dialoguer::{Confirm, Input};

use crate::{MEMORY_DATABASE, ServerConfig, ServerError, StoreConfig};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults come from [`ServerConfig::from_env`]. Entering `:memory:` as
/// the database path selects the in-memory store.
///
/// # Errors
///
/// Returns [`ServerError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Patrol Report Server");
    println!();

    let defaults = ServerConfig::from_env();
    let default_db = match &defaults.store {
        StoreConfig::Sqlite(path) => path.display().to_string(),
        StoreConfig::Memory => MEMORY_DATABASE.to_string(),
    };

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let db_path: String = Input::new()
        .with_prompt("Database path")
        .default(default_db.clone())
        .interact_text()
        .unwrap_or(default_db);

    let store = if db_path == MEMORY_DATABASE {
        StoreConfig::Memory
    } else {
        StoreConfig::Sqlite(db_path.into())
    };

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(ServerConfig {
        bind_addr,
        port,
        store,
    })
    .await
}
