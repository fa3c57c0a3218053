use thiserror::Error;

use crate::schema::Category;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Failed to load financial data: {0}")]
    LoadFailed(String),

    #[error("Could not save changes: {0}")]
    SaveFailed(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid budget {value} for {category}: must be a finite, non-negative amount")]
    InvalidBudget { category: Category, value: f64 },

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session is not ready for mutations (state: {0})")]
    NotReady(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
