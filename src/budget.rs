use crate::error::{Result, TrackerError};
use crate::schema::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seed ceilings applied when the remote document is completely empty.
pub const DEFAULT_SEED_BUDGETS: [(Category, f64); 2] =
    [(Category::Groceries, 500.0), (Category::DiningOut, 200.0)];

/// Percentage above which a budget row is flagged as a warning.
pub const WARNING_THRESHOLD_PERCENT: f64 = 80.0;

/// Monthly spending ceilings, one entry per category.
///
/// Every category is always present; `0` means "no budget set". Updates are
/// whole-table replacements, never per-key patches.
///
/// Entries stored under labels outside the category list are kept aside and
/// written back unchanged, so a full-snapshot save never erases them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct BudgetTable {
    ceilings: BTreeMap<Category, f64>,
    unrecognized: BTreeMap<String, f64>,
}

impl Default for BudgetTable {
    fn default() -> Self {
        Self {
            ceilings: Category::all().iter().map(|c| (*c, 0.0)).collect(),
            unrecognized: BTreeMap::new(),
        }
    }
}

impl BudgetTable {
    /// The first-run table: zero everywhere except the two seeded categories.
    pub fn seeded() -> Self {
        let mut table = Self::default();
        for (category, amount) in DEFAULT_SEED_BUDGETS {
            table.ceilings.insert(category, amount);
        }
        table
    }

    /// Builds a full table from a possibly partial set of entries.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Category, f64)>,
    {
        let mut table = Self::default();
        for (category, value) in entries {
            table.set(category, value)?;
        }
        Ok(table)
    }

    pub fn set(&mut self, category: Category, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(TrackerError::InvalidBudget { category, value });
        }
        self.ceilings.insert(category, value);
        Ok(())
    }

    pub fn get(&self, category: Category) -> f64 {
        self.ceilings.get(&category).copied().unwrap_or(0.0)
    }

    /// Entries in the fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.ceilings.iter().map(|(c, v)| (*c, *v))
    }

    pub fn total(&self) -> f64 {
        self.ceilings.values().sum()
    }

    /// Keeps a stored entry whose label is not a known category.
    pub fn insert_unrecognized(&mut self, label: impl Into<String>, value: f64) {
        self.unrecognized.insert(label.into(), value);
    }

    pub fn unrecognized(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.unrecognized.iter().map(|(l, v)| (l.as_str(), *v))
    }

    /// Adopts `other`'s unrecognized entries for labels this table lacks.
    pub fn carry_unrecognized_from(&mut self, other: &BudgetTable) {
        for (label, value) in &other.unrecognized {
            self.unrecognized.entry(label.clone()).or_insert(*value);
        }
    }
}

impl TryFrom<BTreeMap<String, f64>> for BudgetTable {
    type Error = TrackerError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self> {
        let mut table = Self::default();
        for (label, value) in map {
            match Category::from_label(&label) {
                Some(category) => table.set(category, value)?,
                None => table.insert_unrecognized(label, value),
            }
        }
        Ok(table)
    }
}

impl From<BudgetTable> for BTreeMap<String, f64> {
    fn from(table: BudgetTable) -> Self {
        let mut map = table.unrecognized;
        for (category, value) in table.ceilings {
            map.insert(category.as_str().to_string(), value);
        }
        map
    }
}

/// Percentage of `budget` consumed by `spent`, capped at 100.
///
/// An unset budget (`<= 0`) always reports 0.
pub fn utilization(spent: f64, budget: f64) -> f64 {
    if budget <= 0.0 {
        0.0
    } else {
        (spent / budget * 100.0).min(100.0)
    }
}

/// A category with no budget set is never over budget.
pub fn is_over_budget(spent: f64, budget: f64) -> bool {
    spent > budget && budget > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    OverBudget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetUtilization {
    pub category: Category,
    pub spent: f64,
    pub budget: f64,
    pub percentage: f64,
    pub over_budget: bool,
    pub status: BudgetStatus,
}

impl BudgetUtilization {
    pub fn new(category: Category, spent: f64, budget: f64) -> Self {
        let percentage = utilization(spent, budget);
        let over_budget = is_over_budget(spent, budget);
        let status = if over_budget {
            BudgetStatus::OverBudget
        } else if percentage > WARNING_THRESHOLD_PERCENT {
            BudgetStatus::Warning
        } else {
            BudgetStatus::OnTrack
        };

        Self {
            category,
            spent,
            budget,
            percentage,
            over_budget,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_is_never_flagged() {
        for spent in [0.0, 0.01, 50.0, 1_000_000.0] {
            assert_eq!(utilization(spent, 0.0), 0.0);
            assert!(!is_over_budget(spent, 0.0));
        }
    }

    #[test]
    fn test_utilization_is_capped() {
        assert_eq!(utilization(600.0, 500.0), 100.0);
        assert!(is_over_budget(600.0, 500.0));
        assert!((utilization(250.0, 500.0) - 50.0).abs() < 1e-9);
        assert!(!is_over_budget(500.0, 500.0));
    }

    #[test]
    fn test_status_thresholds() {
        let row = BudgetUtilization::new(Category::Groceries, 400.0, 500.0);
        assert_eq!(row.status, BudgetStatus::OnTrack);

        let row = BudgetUtilization::new(Category::Groceries, 450.0, 500.0);
        assert_eq!(row.status, BudgetStatus::Warning);

        let row = BudgetUtilization::new(Category::Groceries, 500.0, 500.0);
        assert_eq!(row.status, BudgetStatus::Warning);
        assert!(!row.over_budget);

        let row = BudgetUtilization::new(Category::Groceries, 501.0, 500.0);
        assert_eq!(row.status, BudgetStatus::OverBudget);
    }

    #[test]
    fn test_seeded_table() {
        let table = BudgetTable::seeded();
        assert_eq!(table.get(Category::Groceries), 500.0);
        assert_eq!(table.get(Category::DiningOut), 200.0);
        assert_eq!(table.iter().count(), 10);
        assert_eq!(table.total(), 700.0);
    }

    #[test]
    fn test_partial_entries_are_completed_with_zero() {
        let table = BudgetTable::from_entries([(Category::Travel, 120.0)]).unwrap();
        assert_eq!(table.get(Category::Travel), 120.0);
        assert_eq!(table.get(Category::Groceries), 0.0);
        assert_eq!(table.iter().count(), Category::all().len());
    }

    #[test]
    fn test_negative_and_nan_budgets_rejected() {
        let mut table = BudgetTable::default();
        assert!(matches!(
            table.set(Category::Health, -1.0),
            Err(TrackerError::InvalidBudget { .. })
        ));
        assert!(table.set(Category::Health, f64::NAN).is_err());
        assert_eq!(table.get(Category::Health), 0.0);
    }

    #[test]
    fn test_serializes_as_label_map() {
        let table = BudgetTable::seeded();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["Groceries"], 500.0);
        assert_eq!(json["Dining Out"], 200.0);
        assert_eq!(json["Other"], 0.0);

        let back: BudgetTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_unrecognized_labels_pass_through() {
        let table: BudgetTable =
            serde_json::from_str(r#"{"Groceries":300,"Pets":40}"#).unwrap();
        assert_eq!(table.get(Category::Groceries), 300.0);
        assert_eq!(table.iter().count(), Category::all().len());
        assert_eq!(table.total(), 300.0);
        assert_eq!(table.unrecognized().collect::<Vec<_>>(), vec![("Pets", 40.0)]);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["Pets"], 40.0);

        let mut replacement = BudgetTable::from_entries([(Category::Travel, 90.0)]).unwrap();
        replacement.carry_unrecognized_from(&table);
        assert_eq!(replacement.unrecognized().count(), 1);
        assert_eq!(replacement.get(Category::Groceries), 0.0);
    }
}
