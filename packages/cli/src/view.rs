//! Terminal implementation of [`ReportView`].

use patrol_report_client::controller::{Phase, ReportView, ResultSource};
use patrol_report_models::{AccumulatedTotals, ReportRecord};

use crate::summary;

/// Prints reports, totals and warnings to stdout/stderr.
#[derive(Debug, Default)]
pub struct TerminalView;

impl ReportView for TerminalView {
    fn phase_changed(&mut self, phase: Phase) {
        log::debug!("Submission phase: {phase}");
        if phase == Phase::AwaitingRemote {
            println!("Enviando ao servidor...");
        }
    }

    fn show_report(
        &mut self,
        record: &ReportRecord,
        totals: &AccumulatedTotals,
        source: ResultSource,
    ) {
        match source {
            ResultSource::Local => {
                println!(
                    "Resultado local: {} em {}, {} abordagem(ns)",
                    record.date_display(),
                    record.location,
                    record.total_inspections()
                );
            }
            ResultSource::Remote => {
                println!();
                print!("{}", summary::render_report(record));
                println!();
                print!("{}", summary::render_totals(totals));
            }
        }
    }

    fn show_totals(&mut self, totals: &AccumulatedTotals) {
        print!("{}", summary::render_totals(totals));
    }

    fn cleared(&mut self) {
        println!("Dados zerados.");
    }

    fn warn(&mut self, message: &str) {
        eprintln!("Aviso: {message}");
    }
}
