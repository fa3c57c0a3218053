//! Derived views over a snapshot of transactions and budgets.
//!
//! Everything here is a pure function of its inputs: no state is mutated and
//! no I/O happens, so recomputing on an unchanged snapshot always yields the
//! same result.

use crate::budget::{BudgetTable, BudgetUtilization};
use crate::error::Result;
use crate::schema::{Category, Payer, Transaction};
use crate::utils::{round_cents, MonthCalendar, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of the total below which a chart slice loses its label.
pub const LABEL_SHARE_THRESHOLD: f64 = 0.05;

/// Per-payer sums. Both payers are always present, defaulting to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerTotals {
    totals: BTreeMap<Payer, f64>,
}

impl Default for PayerTotals {
    fn default() -> Self {
        Self {
            totals: Payer::ALL.iter().map(|p| (*p, 0.0)).collect(),
        }
    }
}

impl PayerTotals {
    pub fn get(&self, payer: Payer) -> f64 {
        self.totals.get(&payer).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Payer, f64)> + '_ {
        self.totals.iter().map(|(p, v)| (*p, *v))
    }
}

/// Per-category sums, holding only categories that actually occur.
///
/// Entries keep the order in which each category was first seen. A missing
/// category reads as `None`, unlike [`BudgetTable`] which is pre-populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    entries: Vec<(Category, f64)>,
}

impl CategoryTotals {
    pub fn get(&self, category: Category) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, v)| *v)
    }

    /// Spend for a category, reading an absent one as zero.
    pub fn spent(&self, category: Category) -> f64 {
        self.get(category).unwrap_or(0.0)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.get(category).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.entries.iter().copied()
    }

    fn add(&mut self, category: Category, amount: f64) {
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((category, amount)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub category: Category,
    pub amount: f64,
    /// Fraction of the series total, in `0.0..=1.0`.
    pub share: f64,
    pub show_label: bool,
}

impl ChartPoint {
    pub fn display_amount(&self) -> f64 {
        round_cents(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: YearMonth,
    pub chart: Vec<ChartPoint>,
    pub total_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub month: YearMonth,
    pub total_spent: f64,
    pub by_payer: PayerTotals,
    pub budgets: Vec<BudgetUtilization>,
    pub recent: Vec<Transaction>,
}

/// Transactions whose date falls in `year`/`month` on `calendar`.
pub fn filter_by_month(
    transactions: &[Transaction],
    year: i32,
    month: u32,
    calendar: MonthCalendar,
) -> Result<Vec<&Transaction>> {
    let target = YearMonth::new(year, month)?;
    Ok(transactions_in(transactions, target, calendar))
}

pub fn transactions_in(
    transactions: &[Transaction],
    month: YearMonth,
    calendar: MonthCalendar,
) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|t| calendar.month_of(&t.date) == month)
        .collect()
}

pub fn total_spent<'a, I>(transactions: I) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions.into_iter().map(|t| t.amount).sum()
}

pub fn payer_totals<'a, I>(transactions: I) -> PayerTotals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = PayerTotals::default();
    for t in transactions {
        *totals.totals.entry(t.paid_by).or_insert(0.0) += t.amount;
    }
    totals
}

pub fn category_totals<'a, I>(transactions: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = CategoryTotals::default();
    for t in transactions {
        totals.add(t.category, t.amount);
    }
    totals
}

/// One row per category in fixed order, comparing spend against budget.
pub fn budget_utilization<'a, I>(
    transactions: I,
    budgets: &BudgetTable,
) -> Vec<BudgetUtilization>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let spent = category_totals(transactions);
    budgets
        .iter()
        .map(|(category, budget)| BudgetUtilization::new(category, spent.spent(category), budget))
        .collect()
}

/// Category totals sorted by amount, largest first.
///
/// Ties keep first-seen order. Small slices are still included, only their
/// labels are suppressed.
pub fn chart_series(totals: &CategoryTotals) -> Vec<ChartPoint> {
    let grand_total = totals.total();
    let mut points: Vec<ChartPoint> = totals
        .iter()
        .map(|(category, amount)| {
            let share = if grand_total > 0.0 {
                amount / grand_total
            } else {
                0.0
            };
            ChartPoint {
                category,
                amount,
                share,
                show_label: share >= LABEL_SHARE_THRESHOLD,
            }
        })
        .collect();

    points.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    points
}

/// Newest first. Transactions sharing a timestamp keep ledger order.
pub fn sorted_by_date_desc(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

pub fn monthly_report(
    transactions: &[Transaction],
    month: YearMonth,
    calendar: MonthCalendar,
) -> MonthlyReport {
    let in_month = transactions_in(transactions, month, calendar);
    let totals = category_totals(in_month.iter().copied());

    MonthlyReport {
        month,
        chart: chart_series(&totals),
        total_spent: total_spent(in_month.iter().copied()),
    }
}

/// Payer totals cover the whole ledger; budget rows cover `month` only.
pub fn dashboard_summary(
    transactions: &[Transaction],
    budgets: &BudgetTable,
    month: YearMonth,
    calendar: MonthCalendar,
) -> DashboardSummary {
    let by_payer = payer_totals(transactions);
    let in_month = transactions_in(transactions, month, calendar);

    DashboardSummary {
        month,
        total_spent: by_payer.total(),
        by_payer,
        budgets: budget_utilization(in_month.iter().copied(), budgets),
        recent: sorted_by_date_desc(transactions),
    }
}
