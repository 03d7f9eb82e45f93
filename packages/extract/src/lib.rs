#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Rule-based field extraction from free-form patrol report text.
//!
//! [`extract`] turns the text an operator pastes into a [`ReportRecord`].
//! It never fails: every field that cannot be found falls back to its
//! documented default (zero counters, [`Location::Unknown`],
//! [`Shift::Unknown`], no date, the "no relevant occurrence" sentinel).
//!
//! Categorical tokens are matched against an upper-cased copy of the
//! input. The date and the occurrence line are captured from the original
//! text so the operator's wording is preserved.
//!
//! The counter patterns live in an ordered rule table ([`rules`]) so each
//! rule can be inspected and tested on its own.
//!
//! [`Location::Unknown`]: patrol_report_models::Location::Unknown
//! [`Shift::Unknown`]: patrol_report_models::Shift::Unknown

pub mod fields;
pub mod gazetteer;
pub mod rules;

use patrol_report_models::ReportRecord;

/// Extracts a [`ReportRecord`] from raw report text.
///
/// Pure and total: the same input always yields the same record, and
/// empty or garbage input yields a record made entirely of defaults.
#[must_use]
pub fn extract(raw_text: &str) -> ReportRecord {
    let upper = raw_text.to_uppercase();

    let record = ReportRecord {
        location: gazetteer::resolve_location(&upper),
        date: fields::extract_date(raw_text),
        shift: fields::classify_shift(&upper),
        counts: rules::extract_counts(&upper),
        drugs_seized: fields::extract_drugs(&upper),
        occurrence: fields::extract_occurrence(raw_text),
    };

    log::debug!(
        "Extracted report: location={} date={} shift={:?} inspections={}",
        record.location,
        record.date_display(),
        record.shift,
        record.total_inspections()
    );

    record
}
