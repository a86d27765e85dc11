use std::collections::HashMap;

use super::{Cents, Transaction, TransactionKind};

/// Aggregate report over the full transaction collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_income: Cents,
    /// Sum of expense magnitudes (positive).
    pub total_expenses: Cents,
    /// total_income - total_expenses
    pub balance: Cents,
    pub average_income: Cents,
    pub average_expense: Cents,
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
    /// Per-category breakdown, expense transactions only.
    pub per_category: HashMap<String, CategoryStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStats {
    pub total: Cents,
    pub count: usize,
    pub average: Cents,
}

/// Compute aggregates over a collection. Returns None when the collection is
/// empty so callers can tell "no data" from "all zero". Averages use integer
/// cents with truncating division.
pub fn compute_statistics(transactions: &[Transaction]) -> Option<Statistics> {
    if transactions.is_empty() {
        return None;
    }

    let mut total_income: Cents = 0;
    let mut total_expenses: Cents = 0;
    let mut income_count = 0;
    let mut expense_count = 0;
    let mut per_category: HashMap<String, CategoryStats> = HashMap::new();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => {
                income_count += 1;
                total_income += transaction.amount_cents;
            }
            TransactionKind::Expense => {
                expense_count += 1;
                total_expenses += transaction.amount_cents;

                let entry = per_category
                    .entry(transaction.category.clone())
                    .or_insert(CategoryStats {
                        total: 0,
                        count: 0,
                        average: 0,
                    });
                entry.total += transaction.amount_cents;
                entry.count += 1;
            }
        }
    }

    for stats in per_category.values_mut() {
        stats.average = stats.total / stats.count as Cents;
    }

    Some(Statistics {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        average_income: safe_average(total_income, income_count),
        average_expense: safe_average(total_expenses, expense_count),
        transaction_count: transactions.len(),
        income_count,
        expense_count,
        per_category,
    })
}

fn safe_average(total: Cents, count: usize) -> Cents {
    if count == 0 { 0 } else { total / count as Cents }
}

/// Select the transactions matching all three predicates:
/// - `query`: case-insensitive substring of the description OR the category
/// - `kind`: None matches everything
/// - `category`: None matches everything, otherwise case-insensitive equality
///
/// Pure: never mutates the collection. Preserves insertion order.
pub fn filter<'a>(
    transactions: &'a [Transaction],
    query: &str,
    kind: Option<TransactionKind>,
    category: Option<&str>,
) -> Vec<&'a Transaction> {
    let query = query.trim().to_lowercase();

    transactions
        .iter()
        .filter(|t| {
            let matches_query = query.is_empty()
                || t.description.to_lowercase().contains(&query)
                || t.category.to_lowercase().contains(&query);
            let matches_kind = kind.is_none_or(|k| t.kind == k);
            let matches_category = category.is_none_or(|c| t.category.eq_ignore_ascii_case(c));

            matches_query && matches_kind && matches_category
        })
        .collect()
}

/// Order a view newest-first for display. The sort is stable, so entries with
/// identical timestamps keep their insertion order.
pub fn sort_newest_first(view: &mut [&Transaction]) {
    view.sort_by(|a, b| b.date.cmp(&a.date));
}
