//! Operations shared by the subcommands and the interactive menu.

use std::error::Error;
use std::sync::Arc;

use dialoguer::Confirm;
use patrol_report_client::ClientError;
use patrol_report_client::controller::{ReconciliationController, SubmitOutcome};
use patrol_report_client::http::HttpAuthority;
use patrol_report_server::ServerConfig;
use patrol_report_server_models::ApiReport;

use crate::summary;
use crate::view::TerminalView;

pub type Controller = ReconciliationController<TerminalView>;

/// Builds a controller talking to the server at `server_url`.
///
/// # Errors
///
/// Returns [`ClientError`] if the HTTP client cannot be built.
pub fn controller(server_url: &str) -> Result<Controller, ClientError> {
    let authority = HttpAuthority::new(server_url)?;
    log::debug!("Using server at {}", authority.base_url());
    Ok(ReconciliationController::new(
        Arc::new(authority),
        TerminalView,
    ))
}

/// Extracts `text` locally and prints it, without contacting the server.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized.
pub fn extract(text: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let record = patrol_report_extract::extract(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&ApiReport::from(record))?);
    } else {
        print!("{}", summary::render_report(&record));
    }

    Ok(())
}

/// Submits `text` and prints the outcome.
///
/// # Errors
///
/// Returns [`ClientError::EmptyReport`] for empty input. Remote failures
/// are not errors: the local result is printed instead.
pub async fn submit(controller: &mut Controller, text: &str) -> Result<(), ClientError> {
    if let SubmitOutcome::LocalOnly { record, .. } = controller.submit(text).await? {
        println!();
        println!("*** RESULTADO LOCAL, NÃO REGISTRADO NO SERVIDOR ***");
        print!("{}", summary::render_report(&record));
    }
    Ok(())
}

/// Clears all stored reports after confirmation.
///
/// # Errors
///
/// Returns an error if the prompt fails or the server does not confirm
/// the reset.
pub async fn reset(controller: &mut Controller, skip_confirm: bool) -> Result<(), Box<dyn Error>> {
    if !skip_confirm
        && !Confirm::new()
            .with_prompt("Zerar TODOS os relatórios e totais? Esta ação não pode ser desfeita.")
            .default(false)
            .interact()?
    {
        println!("Cancelado.");
        return Ok(());
    }

    let removed = controller.reset().await?;
    println!("{removed} relatório(s) removido(s).");
    Ok(())
}

/// Prints the global totals held by the server.
///
/// # Errors
///
/// Returns [`ClientError`] if the totals could not be fetched.
pub async fn totals(controller: &mut Controller) -> Result<(), ClientError> {
    controller.refresh_totals().await?;
    Ok(())
}

/// Prints the totals of every location.
///
/// # Errors
///
/// Returns [`ClientError`] if the totals could not be fetched.
pub async fn locations(controller: &Controller) -> Result<(), ClientError> {
    let locations = controller.locations().await?;
    print!("{}", summary::render_locations(&locations));
    Ok(())
}

/// Runs the server until it stops.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
///
/// # Errors
///
/// Returns an error if the server fails to start or stops with an error.
pub async fn serve(config: ServerConfig) -> Result<(), Box<dyn Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(patrol_report_server::run_server(config))
    })
    .await??;
    Ok(())
}

/// Like [`serve`], prompting for the configuration first.
///
/// # Errors
///
/// Returns an error if the server fails to start or stops with an error.
pub async fn serve_interactive() -> Result<(), Box<dyn Error>> {
    tokio::task::spawn_blocking(|| {
        actix_web::rt::System::new().block_on(patrol_report_server::interactive::run())
    })
    .await??;
    Ok(())
}
