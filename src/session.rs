use crate::budget::BudgetTable;
use crate::engine::{self, DashboardSummary, MonthlyReport};
use crate::error::{Result, TrackerError};
use crate::ledger::{create_transaction, LedgerStore};
use crate::schema::{AppData, NewTransaction, Transaction};
use crate::sync::{load_app_data, save_app_data, DocumentStore, SyncState};
use crate::utils::{MonthCalendar, YearMonth};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::watch;

/// Result of an optimistic mutation.
///
/// Either the remote document now holds `snapshot`, or the save failed and
/// local state was put back to `restored`, the last persisted state.
#[derive(Debug)]
pub enum MutationOutcome {
    Committed(AppData),
    RolledBack {
        restored: AppData,
        error: TrackerError,
    },
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn snapshot(&self) -> &AppData {
        match self {
            Self::Committed(snapshot) => snapshot,
            Self::RolledBack { restored, .. } => restored,
        }
    }

    /// Collapses to a `Result` for callers that only need to surface the failure.
    pub fn into_result(self) -> Result<AppData> {
        match self {
            Self::Committed(snapshot) => Ok(snapshot),
            Self::RolledBack { error, .. } => Err(error),
        }
    }
}

/// Sole owner of the ledger and budget table for one session.
///
/// Mutations take `&mut self` for the whole save round-trip, so a second
/// mutation cannot start while one is in flight. State transitions are
/// published on a watch channel; see [`Session::subscribe`].
pub struct Session<S: DocumentStore> {
    store: S,
    ledger: LedgerStore,
    budgets: BudgetTable,
    state: watch::Sender<SyncState>,
    calendar: MonthCalendar,
}

impl<S: DocumentStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ledger: LedgerStore::new(),
            budgets: BudgetTable::default(),
            state: watch::Sender::new(SyncState::Loading),
            calendar: MonthCalendar::default(),
        }
    }

    /// Sets the calendar used to bucket transactions into months.
    pub fn with_calendar(mut self, calendar: MonthCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Creates a session and performs the initial load.
    pub async fn connect(store: S) -> Result<Self> {
        let mut session = Self::new(store);
        session.load().await?;
        Ok(session)
    }

    pub async fn load(&mut self) -> Result<()> {
        self.set_state(SyncState::Loading);
        match load_app_data(&self.store).await {
            Ok(data) => {
                self.ledger = LedgerStore::from_transactions(data.transactions);
                self.budgets = data.budgets;
                self.set_state(SyncState::Ready);
                Ok(())
            }
            Err(e) => {
                self.set_state(SyncState::LoadError(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Watches sync state changes, e.g. to drive a "Saving… / Synced"
    /// indicator while a mutation is awaiting the remote write.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn calendar(&self) -> MonthCalendar {
        self.calendar
    }

    /// True while the ledger holds an append the remote document has not
    /// acknowledged.
    pub fn has_unsaved_changes(&self) -> bool {
        self.ledger.is_dirty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn budgets(&self) -> &BudgetTable {
        &self.budgets
    }

    pub fn snapshot(&self) -> AppData {
        AppData {
            transactions: self.ledger.transactions().to_vec(),
            budgets: self.budgets.clone(),
        }
    }

    pub async fn add_transaction(&mut self, input: NewTransaction) -> Result<MutationOutcome> {
        self.add_transaction_at(input, Utc::now()).await
    }

    /// Like [`Session::add_transaction`] with an explicit timestamp.
    pub async fn add_transaction_at(
        &mut self,
        input: NewTransaction,
        date: DateTime<Utc>,
    ) -> Result<MutationOutcome> {
        self.ensure_ready()?;
        let transaction = create_transaction(input, date)?;

        let previous = self.ledger.clone();
        info!(
            "Adding transaction '{}' ({:.2}, {}, paid by {})",
            transaction.description, transaction.amount, transaction.category, transaction.paid_by
        );
        self.ledger.append(transaction);

        let outcome = if self.ledger.is_dirty() {
            self.persist().await
        } else {
            Ok(())
        };
        match &outcome {
            Ok(()) => self.ledger.mark_clean(),
            Err(_) => self.ledger = previous,
        }
        Ok(self.finish(outcome))
    }

    /// Replaces the whole budget table.
    ///
    /// Budget entries under unknown labels are carried over from the current
    /// table so the save does not erase them.
    pub async fn update_budgets(&mut self, mut budgets: BudgetTable) -> Result<MutationOutcome> {
        self.ensure_ready()?;

        budgets.carry_unrecognized_from(&self.budgets);
        let previous = std::mem::replace(&mut self.budgets, budgets);
        info!("Updating budgets (total ceiling {:.2})", self.budgets.total());

        let outcome = self.persist().await;
        if outcome.is_err() {
            self.budgets = previous;
        }
        Ok(self.finish(outcome))
    }

    pub fn dashboard(&self, month: YearMonth) -> DashboardSummary {
        engine::dashboard_summary(
            self.ledger.transactions(),
            &self.budgets,
            month,
            self.calendar,
        )
    }

    pub fn current_month(&self) -> YearMonth {
        self.calendar.current_month()
    }

    pub fn current_dashboard(&self) -> DashboardSummary {
        self.dashboard(self.current_month())
    }

    pub fn monthly_report(&self, month: YearMonth) -> MonthlyReport {
        engine::monthly_report(self.ledger.transactions(), month, self.calendar)
    }

    fn set_state(&self, state: SyncState) {
        debug!("Sync state: {}", state);
        self.state.send_replace(state);
    }

    fn ensure_ready(&self) -> Result<()> {
        let state = self.state.borrow();
        if state.is_ready() {
            Ok(())
        } else {
            Err(TrackerError::NotReady(state.to_string()))
        }
    }

    async fn persist(&mut self) -> Result<()> {
        self.set_state(SyncState::Saving);
        let snapshot = self.snapshot();
        let result = save_app_data(&self.store, &snapshot).await;
        self.set_state(SyncState::Ready);
        result
    }

    fn finish(&self, outcome: Result<()>) -> MutationOutcome {
        match outcome {
            Ok(()) => MutationOutcome::Committed(self.snapshot()),
            Err(error) => {
                warn!("Could not save your changes, local state rolled back: {}", error);
                MutationOutcome::RolledBack {
                    restored: self.snapshot(),
                    error,
                }
            }
        }
    }
}
