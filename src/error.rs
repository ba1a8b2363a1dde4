//! Error types for ledger and ranking operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A referenced user or event does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Vote amount exceeds the user's remaining budget
    #[error("insufficient vote budget: requested {requested}, remaining {remaining}")]
    InsufficientBudget { requested: i64, remaining: i64 },

    /// Bid does not beat the trade currently holding the slot
    #[error("insufficient bid: offered {offered}, current {current}")]
    InsufficientBid { offered: f64, current: f64 },

    #[error("amount must be positive")]
    InvalidAmount,

    /// A counter would leave the representable range
    #[error("{field} overflow")]
    Overflow { field: &'static str },

    #[error("ranking slot must be >= 1, got {0}")]
    InvalidRanking(u32),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn user_not_found(id: i64) -> Self {
        LedgerError::NotFound { entity: "user", id }
    }

    pub fn event_not_found(id: i64) -> Self {
        LedgerError::NotFound { entity: "event", id }
    }

    /// True for rejections caused by the request itself rather than the backend
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::Database(_) | LedgerError::Serialization(_))
    }
}
