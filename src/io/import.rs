use std::io::Read;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Transaction, TransactionKind, parse_cents};

/// Outcome of a CSV import. Rows fail individually; the import as a whole
/// only fails when the input itself cannot be read.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    fn skip(&mut self, line: usize, field: Option<&'static str>, reason: impl Into<String>) {
        self.skipped += 1;
        self.errors.push(RowError {
            line,
            field,
            reason: reason.into(),
        });
    }
}

/// Why a row was rejected.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based line number in the input, counting the header.
    pub line: usize,
    pub field: Option<&'static str>,
    pub reason: String,
}

/// Parse CSV rows into transactions. The header row is required to align
/// columns but its names are not validated. Accepted rows get fresh ids;
/// rejected rows are skipped and reported, never a hard failure.
///
/// Column layout: Date, Description, Category, Type, Amount. Amounts may be
/// signed (older exports stored expenses negative); the magnitude is kept and
/// the Type column decides the sign.
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<(Vec<Transaction>, ImportReport)> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut accepted = Vec::new();
    let mut report = ImportReport::default();

    for (index, result) in csv_reader.records().enumerate() {
        let line = index + 2; // +2 for the header row and 0-indexing

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                report.skip(line, None, format!("CSV parse error: {err}"));
                continue;
            }
        };

        let date = match parse_import_date(record.get(0).unwrap_or("")) {
            Some(date) => date,
            None => {
                report.skip(line, Some("date"), "unparseable date");
                continue;
            }
        };

        let description = record.get(1).unwrap_or("").trim();
        if description.is_empty() {
            report.skip(line, Some("description"), "empty description");
            continue;
        }

        let category = record.get(2).unwrap_or("").trim();
        if category.is_empty() {
            report.skip(line, Some("category"), "empty category");
            continue;
        }

        let kind: TransactionKind = match record.get(3).unwrap_or("").parse() {
            Ok(kind) => kind,
            Err(err) => {
                report.skip(line, Some("type"), err.to_string());
                continue;
            }
        };

        let amount_cents = match parse_cents(record.get(4).unwrap_or("")) {
            Ok(0) => {
                report.skip(line, Some("amount"), "zero amount");
                continue;
            }
            Ok(cents) => cents.abs(),
            Err(err) => {
                report.skip(line, Some("amount"), err.to_string());
                continue;
            }
        };

        accepted.push(Transaction::new(description, amount_cents, category, kind, date));
        report.imported += 1;
    }

    Ok((accepted, report))
}

/// Accepted date shapes, tried in order: full RFC 3339 timestamps, exported
/// calendar dates ("Jan 5, 2024"), and ISO dates ("2024-01-05"). Date-only
/// values land at midnight UTC.
fn parse_import_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in ["%b %d, %Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}
