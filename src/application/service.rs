use std::io::Read;

use chrono::Utc;
use tracing::warn;

use crate::domain::{self, Cents, Statistics, Transaction, TransactionId, TransactionKind};
use crate::io::import::{ImportReport, read_transactions_csv};
use crate::storage::{BlobStore, LoadReport, Snapshot, decode_snapshot};

use super::AppError;

/// The ledger owns the full transaction collection and its persistence.
/// This is the primary interface for any client (CLI, TUI, tests).
///
/// Every mutation re-saves the whole snapshot. Store failures never undo the
/// in-memory change: the ledger keeps running memory-only and retries on the
/// next mutation.
pub struct Ledger {
    store: Box<dyn BlobStore>,
    transactions: Vec<Transaction>,
    unsaved: bool,
}

impl Ledger {
    /// Open a ledger backed by `store`, rehydrating any saved snapshot.
    /// Missing or corrupt data degrades to an empty ledger, never a failure;
    /// individually malformed records are dropped and counted in the report.
    pub fn open(store: Box<dyn BlobStore>) -> (Self, LoadReport) {
        let (transactions, report) = match store.read() {
            Ok(Some(blob)) => match decode_snapshot(&blob) {
                Ok(loaded) => loaded,
                Err(err) => {
                    warn!("unreadable snapshot, starting empty: {err}");
                    (Vec::new(), LoadReport::default())
                }
            },
            Ok(None) => (Vec::new(), LoadReport::default()),
            Err(err) => {
                warn!("failed to read snapshot, starting empty: {err:#}");
                (Vec::new(), LoadReport::default())
            }
        };

        let ledger = Self {
            store,
            transactions,
            unsaved: false,
        };
        (ledger, report)
    }

    /// Record a new transaction. The ledger assigns the id and date.
    /// Validation failures reject the operation with no state change.
    pub fn add(
        &mut self,
        description: &str,
        amount_cents: Cents,
        category: &str,
        kind: TransactionKind,
    ) -> Result<Transaction, AppError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::Validation("description must not be empty".into()));
        }
        if amount_cents <= 0 {
            return Err(AppError::Validation("amount must be positive".into()));
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::Validation("category must not be empty".into()));
        }

        let transaction = Transaction::new(description, amount_cents, category, kind, Utc::now());
        self.transactions.push(transaction.clone());
        self.persist();
        Ok(transaction)
    }

    /// Remove the transaction with the given id. An absent id is a no-op, not
    /// an error; returns whether anything was removed. Idempotent.
    pub fn delete(&mut self, id: TransactionId) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        let removed = self.transactions.len() < before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Empty the collection unconditionally and return the prior count.
    /// There is no undo; callers confirm destructive intent first.
    pub fn clear(&mut self) -> usize {
        let count = self.transactions.len();
        self.transactions.clear();
        self.persist();
        count
    }

    /// Import transactions from CSV. Bad rows are skipped individually and
    /// reported; accepted rows get fresh ids and are appended without
    /// deduplication against existing entries.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportReport, AppError> {
        let (accepted, report) = read_transactions_csv(reader)?;
        if report.skipped > 0 {
            warn!("skipped {} malformed CSV row(s) during import", report.skipped);
        }
        if !accepted.is_empty() {
            self.transactions.extend(accepted);
            self.persist();
        }
        Ok(report)
    }

    /// The full collection in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Filtered view of the collection; see [`domain::filter`]. Pure.
    pub fn filter(
        &self,
        query: &str,
        kind: Option<TransactionKind>,
        category: Option<&str>,
    ) -> Vec<&Transaction> {
        domain::filter(&self.transactions, query, kind, category)
    }

    /// Aggregates over the full, unfiltered collection. None when empty.
    pub fn statistics(&self) -> Option<Statistics> {
        domain::compute_statistics(&self.transactions)
    }

    /// True when the last store write failed and in-memory state is ahead of
    /// the persisted snapshot.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Write the full snapshot to the store, surfacing any failure.
    pub fn save(&mut self) -> Result<(), AppError> {
        let blob = Snapshot::new(&self.transactions)
            .encode()
            .map_err(|err| AppError::Persistence(err.into()))?;
        self.store.write(&blob)?;
        self.unsaved = false;
        Ok(())
    }

    /// Best-effort save after a mutation. On failure the in-memory state
    /// stands and the ledger stays unsaved until a later write succeeds.
    fn persist(&mut self) {
        if let Err(err) = self.save() {
            warn!("failed to persist ledger snapshot: {err}");
            self.unsaved = true;
        }
    }
}
