#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use monthly_ledger::{
    config::ConfigManager,
    ledger::{EntryDraft, EntryKind, LedgerStore, MonthKey},
    storage::JsonFileStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique base directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// File-backed storage and config rooted in an isolated directory.
pub fn setup_test_env() -> (JsonFileStorage, ConfigManager, PathBuf) {
    let base = temp_base();
    let storage = JsonFileStorage::new(base.join("storage")).expect("create json storage");
    let config = ConfigManager::with_base_dir(base.clone()).expect("create config manager");
    (storage, config, base)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn month(raw: &str) -> MonthKey {
    raw.parse().expect("valid month key")
}

pub fn expense(on: NaiveDate, description: &str, amount: f64) -> EntryDraft {
    EntryDraft::new(on, description, amount, EntryKind::Expense, "Outros Gastos")
}

pub fn income(on: NaiveDate, description: &str, amount: f64) -> EntryDraft {
    EntryDraft::new(on, description, amount, EntryKind::Income, "Salário")
}

/// Every entry sits in the bucket of its own month and no bucket is empty.
pub fn assert_bucket_invariant(store: &LedgerStore) {
    for (key, bucket) in store.history() {
        assert!(!bucket.is_empty(), "bucket {key} is empty");
        for entry in bucket {
            assert_eq!(entry.month_key(), *key, "entry #{} misfiled", entry.id);
        }
    }
}
