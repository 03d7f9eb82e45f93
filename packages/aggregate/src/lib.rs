#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Folding of [`ReportRecord`]s into [`AccumulatedTotals`].
//!
//! Folding is a commutative, associative sum: every counter and the drug
//! mass are added component-wise and the report count grows by one. The
//! order reports arrive in never changes the result.

use std::collections::BTreeMap;

use patrol_report_models::{AccumulatedTotals, Category, Location, ReportRecord};

/// Returns `totals` with `record` folded in.
///
/// Additions saturate at `u64::MAX` instead of wrapping.
#[must_use]
pub fn fold(totals: AccumulatedTotals, record: &ReportRecord) -> AccumulatedTotals {
    let mut next = totals;

    for category in Category::all() {
        let slot = next.counts.get_mut(*category);
        *slot = slot.saturating_add(record.counts.get(*category));
    }
    next.drugs_seized = next.drugs_seized.saturating_add(record.drugs_seized);
    next.reports_count = next.reports_count.saturating_add(1);

    next
}

/// Returns the empty totals.
#[must_use]
pub const fn reset() -> AccumulatedTotals {
    AccumulatedTotals::ZERO
}

/// Totals for the whole deployment plus one running sum per location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopedTotals {
    global: AccumulatedTotals,
    by_location: BTreeMap<Location, AccumulatedTotals>,
}

impl ScopedTotals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds totals from a sequence of stored records.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ReportRecord>) -> Self {
        let mut totals = Self::new();
        for record in records {
            totals.fold(record);
        }
        log::debug!(
            "Rebuilt totals from {} report(s)",
            totals.global.reports_count
        );
        totals
    }

    /// Folds `record` into the global totals and its location's totals.
    pub fn fold(&mut self, record: &ReportRecord) {
        self.global = fold(self.global, record);
        let scoped = self.by_location.entry(record.location).or_default();
        *scoped = fold(*scoped, record);
    }

    /// Clears every scope.
    pub fn reset(&mut self) {
        self.global = reset();
        self.by_location.clear();
    }

    #[must_use]
    pub const fn global(&self) -> AccumulatedTotals {
        self.global
    }

    /// Totals for `location`, zero if no report named it.
    #[must_use]
    pub fn location(&self, location: Location) -> AccumulatedTotals {
        self.by_location.get(&location).copied().unwrap_or_default()
    }

    /// Every location that has at least one report, in [`Location`] order.
    #[must_use]
    pub const fn by_location(&self) -> &BTreeMap<Location, AccumulatedTotals> {
        &self.by_location
    }
}
