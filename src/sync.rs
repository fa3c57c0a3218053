use crate::budget::BudgetTable;
use crate::error::{Result, TrackerError};
use crate::schema::{AppData, Category, StoredDocument};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::fmt;

/// Lifecycle of the session's connection to the remote document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Loading,
    Ready,
    Saving,
    LoadError(String),
}

impl SyncState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "synced"),
            Self::Saving => write!(f, "saving"),
            Self::LoadError(reason) => write!(f, "load error: {}", reason),
        }
    }
}

/// A single remote JSON document that is read whole and overwritten whole.
///
/// No versioning or locking: the last write wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self) -> Result<StoredDocument>;

    async fn store(&self, data: &AppData) -> Result<()>;
}

/// Plain HTTP GET/PUT against a fixed document URL (jsonblob-style).
#[derive(Clone)]
pub struct JsonBlobStore {
    client: Client,
    url: String,
}

impl JsonBlobStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DocumentStore for JsonBlobStore {
    async fn fetch(&self) -> Result<StoredDocument> {
        debug!("GET {}", self.url);
        let res = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TrackerError::LoadFailed(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            return Err(TrackerError::LoadFailed(format!(
                "status {}: {}",
                status, error_text
            )));
        }

        let body = res
            .text()
            .await
            .map_err(|e| TrackerError::LoadFailed(e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(StoredDocument::default());
        }

        serde_json::from_str(&body)
            .map_err(|e| TrackerError::LoadFailed(format!("malformed document: {}", e)))
    }

    async fn store(&self, data: &AppData) -> Result<()> {
        debug!(
            "PUT {} ({} transactions)",
            self.url,
            data.transactions.len()
        );
        let res = self
            .client
            .put(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(data)
            .send()
            .await
            .map_err(|e| TrackerError::SaveFailed(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            return Err(TrackerError::SaveFailed(format!(
                "status {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

/// Turns the fetched document into local state.
///
/// A completely empty document seeds the default budgets and an empty
/// ledger. Otherwise transactions are taken verbatim and the budget table is
/// completed with zeros. Entries under unknown labels are carried through to
/// the next save untouched; invalid values for known categories are dropped
/// and read as zero.
pub fn hydrate(document: StoredDocument) -> AppData {
    if document.is_empty() {
        info!("Remote document is empty, seeding default budgets");
        return AppData {
            transactions: Vec::new(),
            budgets: BudgetTable::seeded(),
        };
    }

    let mut budgets = BudgetTable::default();
    for (label, value) in document.budgets.unwrap_or_default() {
        match Category::from_label(&label) {
            Some(category) => {
                if let Err(e) = budgets.set(category, value) {
                    warn!("Ignoring stored budget: {}", e);
                }
            }
            None => {
                warn!("Keeping budget for unknown category '{}' as-is", label);
                budgets.insert_unrecognized(label, value);
            }
        }
    }

    AppData {
        transactions: document.transactions.unwrap_or_default(),
        budgets,
    }
}

/// Fetches and hydrates. Failures are surfaced, never retried.
pub async fn load_app_data<S>(store: &S) -> Result<AppData>
where
    S: DocumentStore + ?Sized,
{
    match store.fetch().await {
        Ok(document) => {
            let data = hydrate(document);
            info!(
                "Loaded {} transactions from remote document",
                data.transactions.len()
            );
            Ok(data)
        }
        Err(e) => {
            error!("Error fetching app data: {}", e);
            Err(match e {
                TrackerError::LoadFailed(_) => e,
                other => TrackerError::LoadFailed(other.to_string()),
            })
        }
    }
}

/// Writes the full snapshot. Any failure is reported as a save failure.
pub async fn save_app_data<S>(store: &S, data: &AppData) -> Result<()>
where
    S: DocumentStore + ?Sized,
{
    store.store(data).await.map_err(|e| {
        error!("Error saving app data: {}", e);
        match e {
            TrackerError::SaveFailed(_) => e,
            other => TrackerError::SaveFailed(other.to_string()),
        }
    })
}
