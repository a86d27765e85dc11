use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::Ledger;
use crate::domain::{
    self, Transaction, TransactionKind, format_cents, format_cents_signed, parse_cents,
};
use crate::io::export::{Exporter, default_export_filename, format_calendar_date};
use crate::io::import::ImportReport;
use crate::storage::JsonFileStore;

/// Tally - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A local-first tracker for income and expense transactions")]
#[command(version)]
pub struct Cli {
    /// Data file path
    #[arg(short, long, default_value = "tally.json")]
    pub data: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a transaction
    Add {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Description of the transaction
        #[arg(short = 'm', long)]
        description: String,

        /// Category (e.g., "Bills", "Salary")
        #[arg(short, long)]
        category: String,

        /// Kind: income or expense
        #[arg(short, long)]
        kind: String,
    },

    /// List transactions, newest first
    List {
        /// Case-insensitive search over description and category
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by kind: income, expense, all
        #[arg(short, long)]
        kind: Option<String>,

        /// Filter by category ("all" for no filter)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show totals, balance, and the per-category expense breakdown
    Stats,

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Delete ALL transactions
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Export all transactions to CSV
    Export {
        /// Output file (defaults to tally-<date>.csv)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import transactions from a CSV file
    Import {
        /// Input file
        input: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let store = JsonFileStore::new(&self.data);
        let (mut ledger, report) = Ledger::open(Box::new(store));
        if report.dropped > 0 {
            eprintln!(
                "Warning: dropped {} malformed record(s) from saved data",
                report.dropped
            );
        }

        match self.command {
            Commands::Add {
                amount,
                description,
                category,
                kind,
            } => {
                let amount_cents = parse_cents(&amount)
                    .context("Invalid amount format. Use '50.00' or '50'")?;
                let kind: TransactionKind = kind
                    .parse()
                    .context("Invalid kind. Use 'income' or 'expense'")?;

                let transaction = ledger.add(&description, amount_cents, &category, kind)?;
                println!(
                    "Recorded {}: {} {} ({})",
                    transaction.kind,
                    format_cents(transaction.amount_cents),
                    transaction.description,
                    transaction.id
                );
            }

            Commands::List {
                search,
                kind,
                category,
            } => {
                run_list_command(&ledger, search.as_deref(), kind.as_deref(), category.as_deref())?;
            }

            Commands::Stats => {
                run_stats_command(&ledger);
            }

            Commands::Delete { id } => {
                let id = Uuid::parse_str(&id)
                    .context("Invalid transaction ID format (expected UUID)")?;
                if ledger.delete(id) {
                    println!("Deleted transaction {id}");
                } else {
                    println!("No transaction with ID {id}");
                }
            }

            Commands::Clear { yes } => {
                if ledger.is_empty() {
                    println!("No transactions to clear.");
                } else if yes || confirm_clear(ledger.len())? {
                    let removed = ledger.clear();
                    println!("Cleared {removed} transaction(s).");
                } else {
                    println!("Aborted.");
                }
            }

            Commands::Export { output } => {
                if ledger.is_empty() {
                    println!("No transactions to export.");
                } else {
                    let path = output
                        .unwrap_or_else(|| default_export_filename(Utc::now().date_naive()));
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create output file: {path}"))?;
                    let count = Exporter::new(ledger.transactions()).export_csv(file)?;
                    println!("Exported {count} transaction(s) to {path}");
                }
            }

            Commands::Import { input } => {
                let file = File::open(&input)
                    .with_context(|| format!("Failed to open input file: {input}"))?;
                let report = ledger.import_csv(file)?;
                print_import_report(&report, self.verbose);
            }
        }

        if ledger.has_unsaved_changes() {
            eprintln!("Warning: changes could not be saved to {}", self.data);
        }

        Ok(())
    }
}

fn run_list_command(
    ledger: &Ledger,
    search: Option<&str>,
    kind: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let kind_filter = match kind {
        None => None,
        Some(k) if k.eq_ignore_ascii_case("all") => None,
        Some(k) => Some(
            k.parse::<TransactionKind>()
                .context("Invalid kind filter. Use 'income', 'expense' or 'all'")?,
        ),
    };
    let category_filter = category.filter(|c| !c.eq_ignore_ascii_case("all"));

    let mut view = ledger.filter(search.unwrap_or(""), kind_filter, category_filter);
    domain::sort_newest_first(&mut view);

    if view.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<12} {:<24} {:<14} {:>12}",
        "ID", "DATE", "DESCRIPTION", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(102));
    for transaction in view {
        print_transaction_row(transaction);
    }
    Ok(())
}

fn print_transaction_row(transaction: &Transaction) {
    println!(
        "{} {:<12} {:<24.24} {:<14.14} {:>12}",
        transaction.id,
        format_calendar_date(transaction.date.date_naive()),
        transaction.display_label(),
        transaction.category,
        format_cents_signed(transaction.signed_cents())
    );
}

fn run_stats_command(ledger: &Ledger) {
    let Some(stats) = ledger.statistics() else {
        println!("No transactions recorded yet.");
        return;
    };

    println!(
        "Income:   {} ({} transaction(s), avg {})",
        format_cents(stats.total_income),
        stats.income_count,
        format_cents(stats.average_income)
    );
    println!(
        "Expenses: {} ({} transaction(s), avg {})",
        format_cents(stats.total_expenses),
        stats.expense_count,
        format_cents(stats.average_expense)
    );
    println!("Balance:  {}", format_cents(stats.balance));

    if !stats.per_category.is_empty() {
        println!();
        println!("Expenses by category:");
        println!(
            "{:<20} {:>12} {:>7} {:>12}",
            "CATEGORY", "TOTAL", "COUNT", "AVERAGE"
        );
        println!("{}", "-".repeat(54));

        let mut categories: Vec<_> = stats.per_category.iter().collect();
        categories.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        for (name, category) in categories {
            println!(
                "{:<20.20} {:>12} {:>7} {:>12}",
                name,
                format_cents(category.total),
                category.count,
                format_cents(category.average)
            );
        }
    }
}

fn print_import_report(report: &ImportReport, verbose: bool) {
    if report.skipped > 0 {
        println!(
            "Imported {} transaction(s), skipped {} row(s)",
            report.imported, report.skipped
        );
    } else {
        println!("Imported {} transaction(s)", report.imported);
    }

    if verbose {
        for error in &report.errors {
            match error.field {
                Some(field) => eprintln!("  line {}: {}: {}", error.line, field, error.reason),
                None => eprintln!("  line {}: {}", error.line, error.reason),
            }
        }
    }
}

fn confirm_clear(count: usize) -> Result<bool> {
    print!("Delete ALL {count} transaction(s)? This cannot be undone. [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
