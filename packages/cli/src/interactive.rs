//! Menu-driven mode, used when no subcommand is given.

use std::error::Error;
use std::io;

use dialoguer::Select;
use patrol_report_client::ClientError;

use crate::commands::{self, Controller};
use crate::input;

enum Action {
    Submit,
    ExtractLocal,
    Totals,
    Locations,
    Reset,
    Serve,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Submit,
        Self::ExtractLocal,
        Self::Totals,
        Self::Locations,
        Self::Reset,
        Self::Serve,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Submit => "Analisar e registrar relatório",
            Self::ExtractLocal => "Analisar relatório (somente local)",
            Self::Totals => "Ver totais acumulados",
            Self::Locations => "Ver totais por local",
            Self::Reset => "Zerar dados",
            Self::Serve => "Iniciar servidor",
            Self::Quit => "Sair",
        }
    }
}

fn prompt_report() -> io::Result<String> {
    println!(
        "Cole o relatório e finalize com uma linha contendo apenas \"{}\":",
        input::END_MARKER
    );
    input::read_until_marker(io::stdin().lock())
}

/// Runs the interactive menu until the operator quits.
///
/// Loads the current totals first so the operator sees where the counts
/// stand before submitting anything.
///
/// # Errors
///
/// Returns an error if a prompt fails or the server cannot be started.
/// Failed remote operations are reported and the menu continues.
pub async fn run(mut controller: Controller) -> Result<(), Box<dyn Error>> {
    println!("Relatórios de Patrulha");
    println!();

    if controller.refresh_totals().await.is_err() {
        eprintln!("Servidor indisponível; os totais serão carregados no próximo envio.");
    }

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt("O que deseja fazer?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result: Result<(), Box<dyn Error>> = match Action::ALL[idx] {
            Action::Submit => {
                let text = prompt_report()?;
                match commands::submit(&mut controller, &text).await {
                    Err(ClientError::EmptyReport) => Ok(()),
                    other => other.map_err(Into::into),
                }
            }
            Action::ExtractLocal => {
                let text = prompt_report()?;
                commands::extract(&text, false)
            }
            Action::Totals => commands::totals(&mut controller).await.map_err(Into::into),
            Action::Locations => commands::locations(&controller).await.map_err(Into::into),
            Action::Reset => commands::reset(&mut controller, false).await,
            Action::Serve => return commands::serve_interactive().await,
            Action::Quit => return Ok(()),
        };

        if let Err(e) = result {
            eprintln!("Erro: {e}");
        }
    }
}
