//! Reconciliation of local and remote extraction results.
//!
//! Each submission walks the phases
//! `Idle → Validating → LocalExtracted → AwaitingRemote → Reconciled | RemoteFailed → Idle`.
//! The local record is shown as soon as it is extracted. The remote call
//! runs as a spawned task; its record and totals replace the local ones on
//! success. On failure the local record stays, the totals stay exactly as
//! they were, and the view gets a warning.
//!
//! The controller never folds totals itself. Totals only ever come from
//! the remote authority.

use std::collections::BTreeMap;
use std::sync::Arc;

use patrol_report_models::{AccumulatedTotals, ReportRecord};
use strum_macros::{AsRefStr, Display};

use crate::ClientError;
use crate::authority::RemoteAuthority;

/// Where a submission is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum Phase {
    Idle,
    Validating,
    LocalExtracted,
    AwaitingRemote,
    Reconciled,
    RemoteFailed,
}

/// Which side produced a displayed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Extracted locally, not yet confirmed.
    Local,
    /// Returned by the remote authority.
    Remote,
}

/// Receives everything the operator should see.
pub trait ReportView: Send {
    /// Called on every phase transition.
    fn phase_changed(&mut self, _phase: Phase) {}

    /// A record to display together with the totals currently held.
    fn show_report(
        &mut self,
        record: &ReportRecord,
        totals: &AccumulatedTotals,
        source: ResultSource,
    );

    /// Totals changed without a new record (start-up load).
    fn show_totals(&mut self, _totals: &AccumulatedTotals) {}

    /// The display was cleared by a reset.
    fn cleared(&mut self) {}

    /// A non-fatal problem the operator should know about.
    fn warn(&mut self, message: &str);
}

/// Result of a submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The remote authority accepted the report.
    Reconciled {
        record: ReportRecord,
        totals: AccumulatedTotals,
    },
    /// The remote call failed; only the local record is available and the
    /// totals were not updated.
    LocalOnly { record: ReportRecord, reason: String },
}

impl SubmitOutcome {
    #[must_use]
    pub const fn record(&self) -> &ReportRecord {
        match self {
            Self::Reconciled { record, .. } | Self::LocalOnly { record, .. } => record,
        }
    }
}

/// Drives submissions against a [`RemoteAuthority`] and keeps the view in
/// sync.
///
/// [`Self::submit`] takes `&mut self`, so one controller never has two
/// submissions in flight.
pub struct ReconciliationController<V: ReportView> {
    authority: Arc<dyn RemoteAuthority>,
    view: V,
    phase: Phase,
    displayed: Option<ReportRecord>,
    totals: AccumulatedTotals,
}

impl<V: ReportView> ReconciliationController<V> {
    pub fn new(authority: Arc<dyn RemoteAuthority>, view: V) -> Self {
        Self {
            authority,
            view,
            phase: Phase::Idle,
            displayed: None,
            totals: AccumulatedTotals::ZERO,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The record currently on display.
    #[must_use]
    pub const fn displayed(&self) -> Option<&ReportRecord> {
        self.displayed.as_ref()
    }

    /// The last totals received from the remote authority.
    #[must_use]
    pub const fn totals(&self) -> &AccumulatedTotals {
        &self.totals
    }

    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    fn set_phase(&mut self, phase: Phase) {
        log::trace!("Phase {} -> {phase}", self.phase);
        self.phase = phase;
        self.view.phase_changed(phase);
    }

    /// Submits raw report text.
    ///
    /// Returns [`SubmitOutcome::LocalOnly`] rather than an error when the
    /// remote call fails, since the local record is still usable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyReport`] if `raw_text` is empty or
    /// whitespace only. No remote call is made in that case.
    pub async fn submit(&mut self, raw_text: &str) -> Result<SubmitOutcome, ClientError> {
        self.set_phase(Phase::Validating);

        if raw_text.trim().is_empty() {
            self.view.warn("Cole o texto do relatório antes de enviar.");
            self.set_phase(Phase::Idle);
            return Err(ClientError::EmptyReport);
        }

        let local = patrol_report_extract::extract(raw_text);
        self.displayed = Some(local.clone());
        self.set_phase(Phase::LocalExtracted);
        self.view
            .show_report(&local, &self.totals, ResultSource::Local);

        let authority = Arc::clone(&self.authority);
        let text = raw_text.to_string();
        let remote = tokio::spawn(async move { authority.submit(&text).await });
        self.set_phase(Phase::AwaitingRemote);

        let result = match remote.await {
            Ok(result) => result,
            Err(e) => Err(ClientError::Task(e.to_string())),
        };

        let outcome = match result {
            Ok(reply) => {
                self.totals = reply.totals;
                self.displayed = Some(reply.record.clone());
                self.set_phase(Phase::Reconciled);
                self.view
                    .show_report(&reply.record, &self.totals, ResultSource::Remote);

                SubmitOutcome::Reconciled {
                    record: reply.record,
                    totals: reply.totals,
                }
            }
            Err(e) => {
                log::warn!("Remote submission failed, showing local result: {e}");
                self.set_phase(Phase::RemoteFailed);
                self.view.warn(&format!(
                    "Servidor indisponível, exibindo apenas o resultado local ({e})"
                ));

                SubmitOutcome::LocalOnly {
                    record: local,
                    reason: e.to_string(),
                }
            }
        };

        self.set_phase(Phase::Idle);

        Ok(outcome)
    }

    /// Clears every stored report on the remote authority.
    ///
    /// On success the displayed record is cleared and the totals zeroed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the reset was not confirmed. Nothing
    /// local changes in that case.
    pub async fn reset(&mut self) -> Result<u64, ClientError> {
        match self.authority.reset().await {
            Ok(removed) => {
                log::info!("Reset removed {removed} report(s)");
                self.displayed = None;
                self.totals = AccumulatedTotals::ZERO;
                self.view.cleared();
                Ok(removed)
            }
            Err(e) => {
                log::error!("Reset failed: {e}");
                self.view.warn(&format!("Falha ao zerar os dados: {e}"));
                Err(e)
            }
        }
    }

    /// Loads the current totals from the remote authority.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the totals could not be fetched. The
    /// held totals are unchanged in that case.
    pub async fn refresh_totals(&mut self) -> Result<AccumulatedTotals, ClientError> {
        match self.authority.totals().await {
            Ok(totals) => {
                self.totals = totals;
                self.view.show_totals(&self.totals);
                Ok(totals)
            }
            Err(e) => {
                log::warn!("Could not load totals: {e}");
                Err(e)
            }
        }
    }

    /// Totals per location, straight from the remote authority.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the totals could not be fetched.
    pub async fn locations(&self) -> Result<BTreeMap<String, AccumulatedTotals>, ClientError> {
        self.authority.locations().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use patrol_report_models::{CategoryCounts, Location};
    use tokio::sync::Mutex;

    use super::*;
    use crate::authority::SubmitReply;

    /// In-process authority that extracts and folds like the server.
    #[derive(Default)]
    struct FakeAuthority {
        totals: Mutex<AccumulatedTotals>,
        failing: AtomicBool,
        submits: AtomicUsize,
    }

    impl FakeAuthority {
        fn failing() -> Self {
            let authority = Self::default();
            authority.failing.store(true, Ordering::SeqCst);
            authority
        }

        fn check(&self) -> Result<(), ClientError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ClientError::Status {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteAuthority for FakeAuthority {
        async fn submit(&self, text: &str) -> Result<SubmitReply, ClientError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let record = patrol_report_extract::extract(text);
            let mut totals = self.totals.lock().await;
            *totals = patrol_report_aggregate::fold(*totals, &record);
            Ok(SubmitReply {
                record,
                totals: *totals,
            })
        }

        async fn reset(&self) -> Result<u64, ClientError> {
            self.check()?;
            let mut totals = self.totals.lock().await;
            let removed = totals.reports_count;
            *totals = patrol_report_aggregate::reset();
            Ok(removed)
        }

        async fn totals(&self) -> Result<AccumulatedTotals, ClientError> {
            self.check()?;
            Ok(*self.totals.lock().await)
        }

        async fn locations(&self) -> Result<BTreeMap<String, AccumulatedTotals>, ClientError> {
            self.check()?;
            Ok(BTreeMap::new())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Phase(Phase),
        Report(ResultSource, u64),
        Totals(u64),
        Cleared,
        Warn,
    }

    #[derive(Default)]
    struct RecordingView {
        events: Vec<Event>,
    }

    impl RecordingView {
        fn phases(&self) -> Vec<Phase> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Phase(p) => Some(*p),
                    _ => None,
                })
                .collect()
        }

        fn warnings(&self) -> usize {
            self.events.iter().filter(|e| **e == Event::Warn).count()
        }
    }

    impl ReportView for RecordingView {
        fn phase_changed(&mut self, phase: Phase) {
            self.events.push(Event::Phase(phase));
        }

        fn show_report(
            &mut self,
            record: &ReportRecord,
            _totals: &AccumulatedTotals,
            source: ResultSource,
        ) {
            self.events
                .push(Event::Report(source, record.total_inspections()));
        }

        fn show_totals(&mut self, totals: &AccumulatedTotals) {
            self.events.push(Event::Totals(totals.reports_count));
        }

        fn cleared(&mut self) {
            self.events.push(Event::Cleared);
        }

        fn warn(&mut self, _message: &str) {
            self.events.push(Event::Warn);
        }
    }

    const SAMPLE: &str = "LOCAL: MUANÁ\nDATA: 01/01/2025\nPESSOAS A PÉ: 3\nMOTOS: 1\nCARROS: 0\nBICICLETAS: 2\nOCORRÊNCIA: nada a registrar";

    fn controller(
        authority: Arc<FakeAuthority>,
    ) -> ReconciliationController<RecordingView> {
        ReconciliationController::new(authority, RecordingView::default())
    }

    #[tokio::test]
    async fn successful_submit_shows_local_then_remote() {
        let mut ctl = controller(Arc::new(FakeAuthority::default()));

        let outcome = ctl.submit(SAMPLE).await.unwrap();
        let SubmitOutcome::Reconciled { record, totals } = outcome else {
            panic!("expected a reconciled outcome");
        };
        assert_eq!(record.location, Location::Muana);
        assert_eq!(totals.reports_count, 1);
        assert_eq!(totals.total_inspections(), 6);
        assert_eq!(ctl.totals(), &totals);
        assert_eq!(ctl.displayed(), Some(&record));
        assert_eq!(ctl.phase(), Phase::Idle);

        assert_eq!(
            ctl.view().phases(),
            vec![
                Phase::Validating,
                Phase::LocalExtracted,
                Phase::AwaitingRemote,
                Phase::Reconciled,
                Phase::Idle,
            ]
        );
        let reports: Vec<_> = ctl
            .view()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Report(..)))
            .cloned()
            .collect();
        assert_eq!(
            reports,
            vec![
                Event::Report(ResultSource::Local, 6),
                Event::Report(ResultSource::Remote, 6),
            ]
        );
    }

    #[tokio::test]
    async fn totals_come_from_the_authority() {
        let mut ctl = controller(Arc::new(FakeAuthority::default()));
        ctl.submit(SAMPLE).await.unwrap();
        ctl.submit("CARROS: 4").await.unwrap();

        assert_eq!(ctl.totals().reports_count, 2);
        assert_eq!(ctl.totals().total_inspections(), 10);
    }

    #[tokio::test]
    async fn remote_failure_keeps_local_record_and_totals() {
        let authority = Arc::new(FakeAuthority::default());
        let mut ctl = controller(authority.clone());
        ctl.submit(SAMPLE).await.unwrap();
        let before = *ctl.totals();

        authority.failing.store(true, Ordering::SeqCst);
        let outcome = ctl.submit("PONTA DE PEDRAS\nCARROS: 9").await.unwrap();

        let SubmitOutcome::LocalOnly { record, reason } = outcome else {
            panic!("expected a local-only outcome");
        };
        assert_eq!(record.location, Location::PontaDePedras);
        assert_eq!(record.counts.cars, 9);
        assert!(reason.contains("503"), "{reason}");
        assert_eq!(*ctl.totals(), before);
        assert_eq!(ctl.displayed(), Some(&record));
        assert_eq!(ctl.view().warnings(), 1);
        assert_eq!(
            ctl.view().phases()[5..],
            [
                Phase::Validating,
                Phase::LocalExtracted,
                Phase::AwaitingRemote,
                Phase::RemoteFailed,
                Phase::Idle,
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_makes_no_remote_call() {
        let authority = Arc::new(FakeAuthority::default());
        let mut ctl = controller(authority.clone());

        for text in ["", "  \n\t "] {
            let err = ctl.submit(text).await.unwrap_err();
            assert!(matches!(err, ClientError::EmptyReport));
        }

        assert_eq!(authority.submits.load(Ordering::SeqCst), 0);
        assert_eq!(ctl.displayed(), None);
        assert_eq!(ctl.view().warnings(), 2);
        assert_eq!(
            ctl.view().phases(),
            vec![Phase::Validating, Phase::Idle, Phase::Validating, Phase::Idle]
        );
    }

    #[tokio::test]
    async fn reset_clears_display_and_totals() {
        let mut ctl = controller(Arc::new(FakeAuthority::default()));
        ctl.submit(SAMPLE).await.unwrap();

        assert_eq!(ctl.reset().await.unwrap(), 1);
        assert_eq!(ctl.displayed(), None);
        assert_eq!(*ctl.totals(), AccumulatedTotals::ZERO);
        assert_eq!(ctl.view().events.last(), Some(&Event::Cleared));
    }

    #[tokio::test]
    async fn failed_reset_is_an_error_and_changes_nothing() {
        let authority = Arc::new(FakeAuthority::default());
        let mut ctl = controller(authority.clone());
        ctl.submit(SAMPLE).await.unwrap();
        let before = *ctl.totals();
        let displayed = ctl.displayed().cloned();

        authority.failing.store(true, Ordering::SeqCst);
        assert!(ctl.reset().await.is_err());
        assert_eq!(*ctl.totals(), before);
        assert_eq!(ctl.displayed().cloned(), displayed);
        assert_eq!(ctl.view().events.last(), Some(&Event::Warn));
    }

    #[tokio::test]
    async fn refresh_loads_existing_totals() {
        let authority = Arc::new(FakeAuthority::default());
        *authority.totals.lock().await = AccumulatedTotals {
            counts: CategoryCounts {
                cars: 5,
                ..CategoryCounts::default()
            },
            reports_count: 3,
            ..AccumulatedTotals::ZERO
        };

        let mut ctl = controller(authority);
        let totals = ctl.refresh_totals().await.unwrap();
        assert_eq!(totals.reports_count, 3);
        assert_eq!(ctl.totals().counts.cars, 5);
        assert_eq!(ctl.view().events, vec![Event::Totals(3)]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_totals() {
        let mut ctl = controller(Arc::new(FakeAuthority::failing()));
        assert!(ctl.refresh_totals().await.is_err());
        assert_eq!(*ctl.totals(), AccumulatedTotals::ZERO);
        assert!(ctl.view().events.is_empty());
    }
}
