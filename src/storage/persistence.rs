use std::{collections::BTreeMap, io::ErrorKind};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    errors::{LedgerError, LedgerResult},
    ledger::{Entry, EntryId, LedgerStore, MonthKey},
};

use super::KeyValueStorage;

/// Key holding the month-bucketed history.
pub const HISTORY_KEY: &str = "ledgerHistory";
/// Key of the older flat layout, migrated on first load.
pub const LEGACY_KEY: &str = "ledger";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryDocument<'a> {
    monthly_history: &'a BTreeMap<MonthKey, Vec<Entry>>,
    id_counter: EntryId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHistory {
    #[serde(alias = "historicoMensal")]
    monthly_history: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    id_counter: EntryId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLedger {
    #[serde(alias = "lancamentos")]
    entries: Vec<Value>,
    #[serde(default)]
    id_counter: EntryId,
}

/// Writes the full store under [`HISTORY_KEY`].
pub fn save(storage: &mut dyn KeyValueStorage, store: &LedgerStore) -> LedgerResult<()> {
    let document = HistoryDocument {
        monthly_history: store.history(),
        id_counter: store.id_counter(),
    };
    let json = serde_json::to_string_pretty(&document)?;
    storage.set(HISTORY_KEY, &json)?;
    debug!(entries = store.len(), "ledger history saved");
    Ok(())
}

/// Rebuilds the store from storage.
///
/// Malformed data never fails the load. A document that cannot be read at all is logged and
/// the store starts empty; a single unreadable entry is logged and dropped while the rest load.
/// A legacy flat ledger is migrated into month buckets, saved, and its key removed.
pub fn load(storage: &mut dyn KeyValueStorage, selected: MonthKey) -> LedgerResult<LedgerStore> {
    let stored = match storage.get(HISTORY_KEY) {
        Err(err) if is_undecodable(&err) => {
            warn!("stored ledger history is not valid UTF-8, starting empty: {err}");
            return Ok(LedgerStore::new(selected));
        }
        other => other?,
    };
    if let Some(raw) = stored {
        return Ok(match serde_json::from_str::<StoredHistory>(&raw) {
            Ok(stored) => {
                let history = rekey(stored.monthly_history);
                LedgerStore::from_history(history, stored.id_counter, selected)
            }
            Err(err) => {
                warn!("stored ledger history is malformed, starting empty: {err}");
                LedgerStore::new(selected)
            }
        });
    }

    let legacy = match storage.get(LEGACY_KEY) {
        Err(err) if is_undecodable(&err) => {
            warn!("legacy ledger is not valid UTF-8, starting empty: {err}");
            return Ok(LedgerStore::new(selected));
        }
        other => other?,
    };
    let Some(raw) = legacy else {
        return Ok(LedgerStore::new(selected));
    };
    match serde_json::from_str::<LegacyLedger>(&raw) {
        Ok(legacy) => {
            let mut history: BTreeMap<MonthKey, Vec<Entry>> = BTreeMap::new();
            for entry in decode_entries(legacy.entries, LEGACY_KEY) {
                history.entry(entry.month_key()).or_default().push(entry);
            }
            let store = LedgerStore::from_history(history, legacy.id_counter, selected);
            save(storage, &store)?;
            storage.remove(LEGACY_KEY)?;
            info!(
                entries = store.len(),
                months = store.history().len(),
                "migrated legacy ledger into monthly history"
            );
            Ok(store)
        }
        Err(err) => {
            warn!("legacy ledger is malformed, starting empty: {err}");
            Ok(LedgerStore::new(selected))
        }
    }
}

fn is_undecodable(err: &LedgerError) -> bool {
    matches!(err, LedgerError::Io(io) if io.kind() == ErrorKind::InvalidData)
}

/// Decodes stored entries one by one; unreadable ones are logged and dropped.
fn decode_entries(values: Vec<Value>, bucket: &str) -> Vec<Entry> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Entry>(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(bucket, "dropping unreadable stored entry: {err}");
                None
            }
        })
        .collect()
}

/// Parses bucket keys; entries under an unreadable key fall back to their own month.
fn rekey(raw: BTreeMap<String, Vec<Value>>) -> BTreeMap<MonthKey, Vec<Entry>> {
    let mut history: BTreeMap<MonthKey, Vec<Entry>> = BTreeMap::new();
    for (key, values) in raw {
        let entries = decode_entries(values, &key);
        match key.parse::<MonthKey>() {
            Ok(month) => history.entry(month).or_default().extend(entries),
            Err(_) => {
                warn!(key = %key, "unreadable month key in stored history");
                for entry in entries {
                    history.entry(entry.month_key()).or_default().push(entry);
                }
            }
        }
    }
    history
}
