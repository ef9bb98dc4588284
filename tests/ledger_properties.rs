mod common;

use std::collections::HashSet;

use common::{assert_bucket_invariant, date, expense, income, month};
use monthly_ledger::{
    errors::LedgerError,
    ledger::{EntryKind, EntryPatch, LedgerStore, MonthTotals},
};

#[test]
fn ids_stay_unique_across_mixed_operations() {
    let mut store = LedgerStore::new(month("2024-01"));
    let rent = store.add_entry(expense(date(2024, 1, 31), "Rent", 1500.0)).unwrap();
    let salary = store.add_entry(income(date(2024, 1, 5), "Salary", 5000.0)).unwrap();
    store.duplicate_entry(rent.id).unwrap();
    store.remove_entry(salary.id).unwrap();
    store.roll_month_forward(month("2024-01")).unwrap();
    let late = store.add_entry(expense(date(2024, 2, 10), "Late", 10.0)).unwrap();

    let mut seen = HashSet::new();
    for bucket in store.history().values() {
        for entry in bucket {
            assert!(seen.insert(entry.id), "duplicate id {}", entry.id);
        }
    }
    assert!(!seen.contains(&salary.id));
    assert!(late.id > salary.id);
    assert_bucket_invariant(&store);
}

#[test]
fn roll_forward_clamps_to_month_end() {
    let mut store = LedgerStore::new(month("2024-01"));
    store.add_entry(expense(date(2024, 1, 31), "Rent", 1500.0)).unwrap();
    store.add_entry(expense(date(2024, 1, 15), "Gym", 80.0)).unwrap();

    let created = store.roll_month_forward(month("2024-01")).unwrap();
    let dates: Vec<_> = created.iter().map(|entry| entry.date).collect();
    assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 2, 15)]);
    assert!(created.iter().all(|entry| !entry.paid));
    assert_eq!(store.entries_for_month(month("2024-01")).len(), 2);

    let err = store.roll_month_forward(month("2023-12")).unwrap_err();
    assert!(matches!(err, LedgerError::NoOp(_)));
}

#[test]
fn december_rolls_into_next_year() {
    let mut store = LedgerStore::new(month("2024-12"));
    store.add_entry(income(date(2024, 12, 31), "Bonus", 900.0)).unwrap();
    let created = store.roll_month_forward(month("2024-12")).unwrap();
    assert_eq!(created[0].date, date(2025, 1, 31));
    assert_eq!(store.list_month_keys(), vec![month("2025-01"), month("2024-12")]);
}

#[test]
fn editing_the_date_moves_entries_between_buckets() {
    let mut store = LedgerStore::new(month("2024-03"));
    let entry = store.add_entry(expense(date(2024, 3, 10), "Phone", 60.0)).unwrap();
    store
        .update_entry(
            entry.id,
            EntryPatch {
                date: Some(date(2024, 5, 1)),
                kind: Some(EntryKind::Income),
                ..EntryPatch::default()
            },
        )
        .unwrap();

    assert!(store.entries_for_month(month("2024-03")).is_empty());
    assert_eq!(store.list_month_keys(), vec![month("2024-05")]);
    assert_bucket_invariant(&store);
}

#[test]
fn totals_identities_hold() {
    let mut store = LedgerStore::new(month("2024-03"));
    let paid = store.add_entry(expense(date(2024, 3, 2), "Water", 45.3)).unwrap();
    store.add_entry(expense(date(2024, 3, 30), "Power", 120.0)).unwrap();
    store.add_entry(expense(date(2024, 3, 31), "Card", 800.0)).unwrap();
    let salary = store.add_entry(income(date(2024, 3, 5), "Salary", 4000.0)).unwrap();
    store.add_entry(income(date(2024, 3, 25), "Freela", 350.0)).unwrap();
    store.toggle_paid(paid.id).unwrap();
    store.toggle_paid(salary.id).unwrap();

    let totals = store.selected_totals();
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
    assert!(close(totals.net_balance, totals.total_income - totals.total_expense));
    assert!(close(totals.total_expense, totals.paid_expense + totals.unpaid_expense));
    assert!(close(totals.unpaid_expense, totals.due_early_month + totals.due_end_of_month));
    assert!(close(totals.due_end_of_month, 800.0));
    assert!(close(totals.paid_income, 4000.0));

    let recomputed = MonthTotals::compute(store.selected_entries());
    assert_eq!(recomputed, totals);
}

#[test]
fn overdue_uses_the_given_day() {
    let mut store = LedgerStore::new(month("2024-03"));
    store.add_entry(expense(date(2024, 3, 9), "Past", 1.0)).unwrap();
    store.add_entry(expense(date(2024, 3, 10), "Today", 1.0)).unwrap();
    let overdue = store.overdue_entries(date(2024, 3, 10));
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].description, "Past");
    assert_eq!(store.expense_entries().len(), 2);
    assert!(store.income_entries().is_empty());
}

#[test]
fn failed_operations_leave_the_store_unchanged() {
    let mut store = LedgerStore::new(month("2024-03"));
    let entry = store.add_entry(expense(date(2024, 3, 9), "Rent", 1000.0)).unwrap();
    let before = store.history().clone();

    assert!(store.add_entry(expense(date(2024, 3, 9), " ", 10.0)).is_err());
    assert!(store
        .update_entry(
            entry.id,
            EntryPatch {
                amount: Some(0.0),
                date: Some(date(2024, 7, 1)),
                ..EntryPatch::default()
            }
        )
        .is_err());
    assert!(matches!(store.remove_entry(999), Err(LedgerError::NotFound(999))));
    assert!(store.toggle_paid(999).is_err());
    assert!(store.duplicate_entry(999).is_err());

    assert_eq!(store.history(), &before);
    assert_eq!(store.id_counter(), 2);
}
