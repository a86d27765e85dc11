use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Cents, Transaction, TransactionId};

/// Current snapshot schema version. Bump on incompatible layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted envelope for the whole collection: one blob, overwritten on
/// every save. The version tag allows future migrations.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub transactions: &'a [Transaction],
}

impl<'a> Snapshot<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            transactions,
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Counts from rehydrating a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: usize,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    transactions: Vec<serde_json::Value>,
}

/// A record as found on disk, before schema validation. Every field is
/// optional so one malformed record cannot poison the rest of the load.
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: Option<TransactionId>,
    description: Option<String>,
    amount_cents: Option<Cents>,
    category: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    date: Option<DateTime<Utc>>,
}

impl RawRecord {
    /// Accept the record only when every required field is present and valid.
    /// An empty description is tolerated (display falls back to the category);
    /// an empty category is not.
    fn validate(self) -> Option<Transaction> {
        let amount_cents = self.amount_cents?;
        if amount_cents <= 0 {
            return None;
        }
        let category = self.category?;
        if category.is_empty() {
            return None;
        }
        let kind = self.kind?.parse().ok()?;

        Some(Transaction {
            id: self.id?,
            description: self.description?,
            amount_cents,
            category,
            kind,
            date: self.date?,
        })
    }
}

/// Decode a snapshot blob. Individually malformed records are dropped and
/// counted; only a fully unreadable blob is an error. Blobs saved before the
/// version envelope existed (a bare JSON array) are still accepted.
pub fn decode_snapshot(blob: &str) -> serde_json::Result<(Vec<Transaction>, LoadReport)> {
    let (version, raw_records) = match serde_json::from_str::<RawSnapshot>(blob) {
        Ok(snapshot) => (snapshot.version, snapshot.transactions),
        Err(_) => (None, serde_json::from_str::<Vec<serde_json::Value>>(blob)?),
    };

    if let Some(version) = version {
        if version > SNAPSHOT_VERSION {
            warn!(
                "snapshot version {version} is newer than supported {SNAPSHOT_VERSION}, loading best-effort"
            );
        }
    }

    let mut transactions = Vec::with_capacity(raw_records.len());
    let mut dropped = 0;
    for value in raw_records {
        match serde_json::from_value::<RawRecord>(value)
            .ok()
            .and_then(RawRecord::validate)
        {
            Some(transaction) => transactions.push(transaction),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("dropped {dropped} malformed record(s) while loading snapshot");
    }

    let report = LoadReport {
        loaded: transactions.len(),
        dropped,
    };
    Ok((transactions, report))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::domain::TransactionKind;

    use super::*;

    fn sample() -> Transaction {
        Transaction::new("March pay", 100000, "Salary", TransactionKind::Income, Utc::now())
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let transactions = vec![
            sample(),
            Transaction::new("Electricity", 25000, "Bills", TransactionKind::Expense, Utc::now()),
        ];
        let blob = Snapshot::new(&transactions).encode().unwrap();

        let (decoded, report) = decode_snapshot(&blob).unwrap();
        assert_eq!(report, LoadReport { loaded: 2, dropped: 0 });
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, transactions[0].id);
        assert_eq!(decoded[1].kind, TransactionKind::Expense);
        assert_eq!(decoded[1].amount_cents, 25000);
    }

    #[test]
    fn test_record_missing_category_is_dropped() {
        let good = sample();
        let blob = format!(
            r#"{{"version":1,"saved_at":"2024-01-05T00:00:00Z","transactions":[
                {},
                {{"id":"a3bb189e-8bf9-3888-9912-ace4e6543002","description":"orphan",
                  "amount_cents":500,"type":"expense","date":"2024-01-05T00:00:00Z"}}
            ]}}"#,
            serde_json::to_string(&good).unwrap()
        );

        let (decoded, report) = decode_snapshot(&blob).unwrap();
        assert_eq!(report, LoadReport { loaded: 1, dropped: 1 });
        assert_eq!(decoded[0].id, good.id);
    }

    #[test]
    fn test_invalid_amounts_and_kinds_are_dropped() {
        let blob = r#"{"version":1,"saved_at":"2024-01-05T00:00:00Z","transactions":[
            {"id":"a3bb189e-8bf9-3888-9912-ace4e6543002","description":"zero",
             "amount_cents":0,"category":"Food","type":"expense","date":"2024-01-05T00:00:00Z"},
            {"id":"a3bb189e-8bf9-3888-9912-ace4e6543003","description":"bad kind",
             "amount_cents":100,"category":"Food","type":"transfer","date":"2024-01-05T00:00:00Z"},
            {"id":"not-a-uuid","description":"bad id",
             "amount_cents":100,"category":"Food","type":"expense","date":"2024-01-05T00:00:00Z"}
        ]}"#;

        let (decoded, report) = decode_snapshot(blob).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(report, LoadReport { loaded: 0, dropped: 3 });
    }

    #[test]
    fn test_legacy_bare_array_still_loads() {
        let transactions = vec![sample()];
        let blob = serde_json::to_string(&transactions).unwrap();

        let (decoded, report) = decode_snapshot(&blob).unwrap();
        assert_eq!(report, LoadReport { loaded: 1, dropped: 0 });
        assert_eq!(decoded[0].description, "March pay");
    }

    #[test]
    fn test_garbage_blob_is_an_error() {
        assert!(decode_snapshot("not json at all").is_err());
    }
}
