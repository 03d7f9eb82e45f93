//! Plain-text rendering of reports and totals.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use patrol_report_models::{AccumulatedTotals, Category, CategoryCounts, Grams, ReportRecord};

/// Width of the label column.
const LABEL_WIDTH: usize = 24;

fn push_row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let value = value.to_string();
    let _ = writeln!(out, "  {label:<width$} {value:>8}", width = LABEL_WIDTH);
}

fn push_counts(out: &mut String, counts: &CategoryCounts, drugs: Grams) {
    let _ = writeln!(out, "Abordagens");
    for category in Category::all().iter().filter(|c| c.is_inspection()) {
        push_row(out, category.label(), counts.get(*category));
    }
    push_row(out, "Total de abordagens", counts.inspections());

    let _ = writeln!(out, "Prisões e apreensões");
    for category in Category::all().iter().filter(|c| !c.is_inspection()) {
        push_row(out, category.label(), counts.get(*category));
    }
    push_row(out, "Drogas (g)", drugs);
}

/// Renders one report the way the operator reviews it before printing.
#[must_use]
pub fn render_report(record: &ReportRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "RELATÓRIO DE PATRULHA");
    let _ = writeln!(out, "Local: {} [{}]", record.location, record.shift.badge());
    let _ = writeln!(out, "Data:  {}", record.date_display());
    let _ = writeln!(out, "Turno: {}", record.shift);
    let _ = writeln!(out);
    push_counts(&mut out, &record.counts, record.drugs_seized);
    let _ = writeln!(out);
    let _ = writeln!(out, "Ocorrência: {}", record.occurrence);

    out
}

/// Renders the running totals.
#[must_use]
pub fn render_totals(totals: &AccumulatedTotals) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "TOTAIS ACUMULADOS ({} relatório(s))",
        totals.reports_count
    );
    push_counts(&mut out, &totals.counts, totals.drugs_seized);

    out
}

/// Renders totals per location, one block per location.
#[must_use]
pub fn render_locations(locations: &BTreeMap<String, AccumulatedTotals>) -> String {
    if locations.is_empty() {
        return "Nenhum relatório registrado.\n".to_string();
    }

    let mut out = String::new();
    for (location, totals) in locations {
        let _ = writeln!(out, "== {location} ==");
        out.push_str(&render_totals(totals));
        let _ = writeln!(out);
    }
    out
}
