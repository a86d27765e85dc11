use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::{Transaction, format_cents};

/// Column layout shared by export and import.
pub const CSV_HEADERS: [&str; 5] = ["Date", "Description", "Category", "Type", "Amount"];

/// Render a calendar date the way listings and exports show it: "Jan 5, 2024".
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Suggested filename for a fresh export: "tally-2024-01-05.csv".
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("tally-{}.csv", date.format("%Y-%m-%d"))
}

/// Exporter for serializing a transaction collection to CSV.
pub struct Exporter<'a> {
    transactions: &'a [Transaction],
}

impl<'a> Exporter<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self { transactions }
    }

    /// Write all transactions as CSV in collection order (no implicit sort).
    /// Dates lose their time component; amounts are unsigned magnitudes with
    /// two decimals. Returns the number of data rows written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_HEADERS)?;

        let mut count = 0;
        for transaction in self.transactions {
            csv_writer.write_record([
                format_calendar_date(transaction.date.date_naive()),
                transaction.description.clone(),
                transaction.category.clone(),
                transaction.kind.as_str().to_string(),
                format_cents(transaction.amount_cents),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::domain::TransactionKind;

    use super::*;

    fn export_to_string(transactions: &[Transaction]) -> String {
        let mut buffer = Vec::new();
        Exporter::new(transactions).export_csv(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_export_escapes_quotes_and_commas() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap();
        let transaction =
            Transaction::new(r#"He said "hi""#, 1250, "Food", TransactionKind::Expense, date);

        let csv = export_to_string(&[transaction]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Date,Description,Category,Type,Amount"));
        // The calendar date contains a comma, so the field is quoted
        assert_eq!(
            lines.next(),
            Some(r#""Jan 5, 2024","He said ""hi""",Food,expense,12.50"#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_preserves_collection_order() {
        let newer = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let transactions = vec![
            Transaction::new("second", 100, "Misc", TransactionKind::Income, newer),
            Transaction::new("first", 200, "Misc", TransactionKind::Expense, older),
        ];

        let csv = export_to_string(&transactions);
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[1].contains("second"));
        assert!(lines[2].contains("first"));
    }

    #[test]
    fn test_export_empty_collection_is_header_only() {
        let csv = export_to_string(&[]);
        assert_eq!(csv, "Date,Description,Category,Type,Amount\n");
    }

    #[test]
    fn test_default_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(default_export_filename(date), "tally-2024-03-09.csv");
    }
}
