use crate::budget::BudgetTable;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    JsonSchema,
)]
pub enum Category {
    Groceries,
    #[serde(rename = "Dining Out")]
    DiningOut,
    Transport,
    Entertainment,
    Shopping,
    Utilities,
    Housing,
    Health,
    Travel,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Groceries,
        Category::DiningOut,
        Category::Transport,
        Category::Entertainment,
        Category::Shopping,
        Category::Utilities,
        Category::Housing,
        Category::Health,
        Category::Travel,
        Category::Other,
    ];

    pub fn all() -> &'static [Category] {
        &Self::ALL
    }

    /// The label used on the wire and shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "Groceries",
            Self::DiningOut => "Dining Out",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
            Self::Housing => "Housing",
            Self::Health => "Health",
            Self::Travel => "Travel",
            Self::Other => "Other",
        }
    }

    /// Exact-label lookup. Anything outside the fixed set yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == label)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(Category::as_str).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Payer {
    Wife,
    Husband,
}

impl Payer {
    pub const ALL: [Payer; 2] = [Payer::Wife, Payer::Husband];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wife => "Wife",
            Self::Husband => "Husband",
        }
    }
}

impl fmt::Display for Payer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A recorded expense. Immutable once it has been appended to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub paid_by: Payer,
    pub date: DateTime<Utc>,
}

/// User input for "add transaction"; id and date are assigned by the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub paid_by: Payer,
}

impl NewTransaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: Category,
        paid_by: Payer,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            category,
            paid_by,
        }
    }
}

/// The unit of persistence: the whole ledger and the whole budget table.
///
/// Always written in full; the remote document has no notion of a delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub transactions: Vec<Transaction>,
    pub budgets: BudgetTable,
}

/// Wire shape of the remote document as read back.
///
/// Both fields tolerate `null` or absence, and budget keys are kept as raw
/// strings so an unrecognised label does not fail the whole load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub budgets: Option<BTreeMap<String, f64>>,
}

impl StoredDocument {
    pub fn is_empty(&self) -> bool {
        let no_transactions = self.transactions.as_ref().map_or(true, Vec::is_empty);
        let no_budgets = self.budgets.as_ref().map_or(true, BTreeMap::is_empty);
        no_transactions && no_budgets
    }
}
