//! # Shared Finance Tracker
//!
//! A household expense ledger for two people: log shared expenses with a
//! category and a payer, keep monthly per-category budgets, and derive
//! summaries from the flat list of transactions.
//!
//! ## Core Concepts
//!
//! - **Ledger**: append-only, insertion-ordered list of immutable transactions
//! - **Budget Table**: one monthly ceiling per category; `0` means "not set"
//! - **Aggregation**: pure rollups by payer, by category and by month, plus budget utilization
//! - **Sync**: the whole state lives in one remote JSON document, fetched on load and
//!   overwritten on every mutation; failed saves are rolled back locally
//! - **Advisor** (feature `gemini`): optional model-backed category suggestion that never fails
//!
//! ## Example
//!
//! ```rust,ignore
//! use shared_finance_tracker::*;
//!
//! let store = JsonBlobStore::new("https://jsonblob.com/api/jsonBlob/<id>");
//! let mut session = Session::connect(store).await?;
//!
//! let outcome = session
//!     .add_transaction(NewTransaction::new("Dinner", 45.50, Category::DiningOut, Payer::Husband))
//!     .await?;
//! if let MutationOutcome::RolledBack { error, .. } = &outcome {
//!     eprintln!("Could not save your changes: {}", error);
//! }
//!
//! let summary = session.current_dashboard();
//! println!("Husband spent {:.2}", summary.by_payer.get(Payer::Husband));
//! ```

pub mod budget;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod schema;
pub mod session;
pub mod sync;
pub mod utils;

#[cfg(feature = "gemini")]
pub mod llm;

pub use budget::{
    is_over_budget, utilization, BudgetStatus, BudgetTable, BudgetUtilization,
    DEFAULT_SEED_BUDGETS,
};
pub use config::TrackerConfig;
pub use engine::{
    budget_utilization, category_totals, chart_series, dashboard_summary, filter_by_month,
    monthly_report, payer_totals, sorted_by_date_desc, total_spent, CategoryTotals, ChartPoint,
    DashboardSummary, MonthlyReport, PayerTotals,
};
pub use error::{Result, TrackerError};
pub use ledger::{create_transaction, LedgerStore};
pub use schema::*;
pub use session::{MutationOutcome, Session};
pub use sync::{hydrate, load_app_data, save_app_data, DocumentStore, JsonBlobStore, SyncState};
pub use utils::{MonthCalendar, YearMonth};

#[cfg(feature = "gemini")]
pub use llm::{CategoryAdvisor, CategoryClassifier, GeminiClassifier, GeminiClient};
