use crate::error::{Result, TrackerError};
use crate::schema::{NewTransaction, Transaction};
use chrono::{DateTime, Utc};
use log::debug;
use uuid::Uuid;

/// In-memory, insertion-ordered collection of transactions.
///
/// Append-only: there is no edit or delete. Each append marks the ledger
/// dirty until the owner acknowledges a successful persist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerStore {
    transactions: Vec<Transaction>,
    dirty: bool,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            dirty: false,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn append(&mut self, transaction: Transaction) {
        debug!(
            "Appending transaction {} ({:.2}, {})",
            transaction.id, transaction.amount, transaction.category
        );
        self.transactions.push(transaction);
        self.dirty = true;
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }
}

/// Validates user input and stamps it with a fresh id and the given time.
pub fn create_transaction(input: NewTransaction, now: DateTime<Utc>) -> Result<Transaction> {
    let description = input.description.trim();
    if description.is_empty() {
        return Err(TrackerError::InvalidTransaction(
            "description must not be empty".to_string(),
        ));
    }

    if !input.amount.is_finite() || input.amount <= 0.0 {
        return Err(TrackerError::InvalidTransaction(format!(
            "amount must be a positive number, got {}",
            input.amount
        )));
    }

    Ok(Transaction {
        id: Uuid::new_v4().to_string(),
        description: description.to_string(),
        amount: input.amount,
        category: input.category,
        paid_by: input.paid_by,
        date: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Category, Payer};

    fn dinner() -> NewTransaction {
        NewTransaction::new("Dinner", 45.50, Category::DiningOut, Payer::Husband)
    }

    #[test]
    fn test_append_preserves_insertion_order_and_marks_dirty() {
        let mut ledger = LedgerStore::new();
        assert!(!ledger.is_dirty());

        let first = create_transaction(dinner(), Utc::now()).unwrap();
        let second = create_transaction(
            NewTransaction::new("Bus pass", 30.0, Category::Transport, Payer::Wife),
            Utc::now(),
        )
        .unwrap();

        ledger.append(first.clone());
        ledger.append(second.clone());

        assert!(ledger.is_dirty());
        assert_eq!(ledger.transactions(), &[first, second]);

        ledger.mark_clean();
        assert!(!ledger.is_dirty());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = create_transaction(dinner(), Utc::now()).unwrap();
        let b = create_transaction(dinner(), Utc::now()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        for amount in [0.0, -12.0, f64::NAN, f64::INFINITY] {
            let input = NewTransaction::new("Coffee", amount, Category::DiningOut, Payer::Wife);
            assert!(matches!(
                create_transaction(input, Utc::now()),
                Err(TrackerError::InvalidTransaction(_))
            ));
        }
    }

    #[test]
    fn test_rejects_blank_description() {
        let input = NewTransaction::new("   ", 10.0, Category::Other, Payer::Wife);
        assert!(create_transaction(input, Utc::now()).is_err());
    }
}
