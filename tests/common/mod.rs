// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use tally::application::Ledger;
use tally::domain::TransactionKind;
use tally::storage::MemoryStore;

/// Helper to create a ledger over a shared in-memory store.
pub fn memory_ledger() -> (Ledger, MemoryStore) {
    let store = MemoryStore::new();
    let (ledger, _) = Ledger::open(Box::new(store.clone()));
    (ledger, store)
}

/// Seed the worked-example collection: one income, one expense.
pub fn seed_example(ledger: &mut Ledger) {
    ledger
        .add("March pay", 100000, "Salary", TransactionKind::Income)
        .unwrap();
    ledger
        .add("Electricity", 25000, "Bills", TransactionKind::Expense)
        .unwrap();
}
