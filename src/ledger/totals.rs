use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::entry::{Entry, EntryKind};

/// Aggregate figures for one month's entries, recomputed from scratch on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
    pub paid_expense: f64,
    pub unpaid_expense: f64,
    /// Unpaid expenses dated on days 1 through 30.
    pub due_early_month: f64,
    /// Unpaid expenses dated on day 31. Always zero for shorter months.
    pub due_end_of_month: f64,
    pub paid_income: f64,
}

impl MonthTotals {
    pub fn compute<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let mut totals = MonthTotals::default();
        for entry in entries {
            match entry.kind {
                EntryKind::Income => {
                    totals.total_income += entry.amount;
                    if entry.paid {
                        totals.paid_income += entry.amount;
                    }
                }
                EntryKind::Expense => {
                    totals.total_expense += entry.amount;
                    if entry.paid {
                        totals.paid_expense += entry.amount;
                    } else {
                        totals.unpaid_expense += entry.amount;
                        match entry.date.day() {
                            1..=30 => totals.due_early_month += entry.amount,
                            31 => totals.due_end_of_month += entry.amount,
                            _ => {}
                        }
                    }
                }
            }
        }
        totals.net_balance = totals.total_income - totals.total_expense;
        totals
    }
}

/// An entry is overdue when it is still unpaid and its date is strictly before `today`.
pub fn is_overdue(entry: &Entry, today: NaiveDate) -> bool {
    !entry.paid && entry.date < today
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, day: (i32, u32, u32), amount: f64, kind: EntryKind, paid: bool) -> Entry {
        Entry {
            id,
            date: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
            description: format!("entry {id}"),
            amount,
            kind,
            category: String::new(),
            paid,
        }
    }

    #[test]
    fn empty_month_is_all_zero() {
        assert_eq!(MonthTotals::compute(&Vec::<Entry>::new()), MonthTotals::default());
    }

    #[test]
    fn splits_income_expense_and_paid_status() {
        let entries = vec![
            entry(1, (2024, 3, 5), 100.0, EntryKind::Expense, false),
            entry(2, (2024, 3, 20), 50.0, EntryKind::Income, false),
            entry(3, (2024, 3, 10), 30.0, EntryKind::Expense, true),
            entry(4, (2024, 3, 31), 20.0, EntryKind::Expense, false),
            entry(5, (2024, 3, 1), 1000.0, EntryKind::Income, true),
        ];
        let totals = MonthTotals::compute(&entries);

        assert_eq!(totals.total_income, 1050.0);
        assert_eq!(totals.total_expense, 150.0);
        assert_eq!(totals.net_balance, 900.0);
        assert_eq!(totals.paid_expense, 30.0);
        assert_eq!(totals.unpaid_expense, 120.0);
        assert_eq!(totals.due_early_month, 100.0);
        assert_eq!(totals.due_end_of_month, 20.0);
        assert_eq!(totals.paid_income, 1000.0);
        assert_eq!(
            totals.paid_expense + totals.unpaid_expense,
            totals.total_expense
        );
    }

    #[test]
    fn day_thirty_in_short_month_stays_in_early_bucket() {
        let entries = vec![
            entry(1, (2024, 4, 30), 75.0, EntryKind::Expense, false),
            entry(2, (2024, 2, 29), 25.0, EntryKind::Expense, false),
        ];
        let totals = MonthTotals::compute(&entries);
        assert_eq!(totals.due_early_month, 100.0);
        assert_eq!(totals.due_end_of_month, 0.0);
    }

    #[test]
    fn overdue_requires_unpaid_and_strictly_past() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let past = entry(1, (2024, 3, 9), 1.0, EntryKind::Expense, false);
        let same_day = entry(2, (2024, 3, 10), 1.0, EntryKind::Expense, false);
        let paid = entry(3, (2024, 3, 1), 1.0, EntryKind::Expense, true);
        let income = entry(4, (2024, 3, 1), 1.0, EntryKind::Income, false);

        assert!(is_overdue(&past, today));
        assert!(!is_overdue(&same_day, today));
        assert!(!is_overdue(&paid, today));
        assert!(is_overdue(&income, today));
    }
}
