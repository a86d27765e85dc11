use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type TransactionId = Uuid;

/// Discriminant for a transaction. The kind carries the sign: amounts are
/// stored as positive magnitudes everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(pub String);

impl std::fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown transaction kind '{}'", self.0)
    }
}

impl std::error::Error for ParseKindError {}

/// One recorded income or expense event. Transactions are immutable once
/// recorded - there is no edit operation, only delete and re-add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    /// Magnitude in cents, always positive. Sign is derived from `kind`.
    pub amount_cents: Cents,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// When the transaction was recorded. Set by the ledger, not the caller.
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction with a fresh id. Callers validate inputs first;
    /// the amount must already be a positive magnitude.
    pub fn new(
        description: impl Into<String>,
        amount_cents: Cents,
        category: impl Into<String>,
        kind: TransactionKind,
        date: DateTime<Utc>,
    ) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount_cents,
            category: category.into(),
            kind,
            date,
        }
    }

    /// Signed value: income counts positive, expense negative.
    pub fn signed_cents(&self) -> Cents {
        match self.kind {
            TransactionKind::Income => self.amount_cents,
            TransactionKind::Expense => -self.amount_cents,
        }
    }

    /// Label for listings. Falls back to the category when the description is
    /// empty, which can happen for records loaded from older snapshots.
    pub fn display_label(&self) -> &str {
        if self.description.is_empty() {
            &self.category
        } else {
            &self.description
        }
    }
}
