//! JSON documents exchanged with the outside world: single-month reports and full history.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    errors::{LedgerError, LedgerResult},
    ledger::{Entry, LedgerStore, MonthKey},
    time::Clock,
};

/// Headline figures carried by a month report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReportTotals {
    #[serde(alias = "receitas")]
    pub income: f64,
    #[serde(alias = "gastos")]
    pub expense: f64,
    #[serde(alias = "saldo")]
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthReport {
    pub month: MonthKey,
    pub month_name: String,
    pub entries: Vec<Entry>,
    pub totals: ReportTotals,
    #[serde(with = "rfc3339")]
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExport {
    pub history: BTreeMap<MonthKey, Vec<Entry>>,
    pub months: Vec<MonthKey>,
    #[serde(with = "rfc3339")]
    pub exported_at: DateTime<Utc>,
}

/// Builds the export document for one month. Exporting an empty month is a no-op.
pub fn month_report(
    store: &LedgerStore,
    month: MonthKey,
    locale: &str,
    clock: &dyn Clock,
) -> LedgerResult<MonthReport> {
    let entries: Vec<Entry> = store
        .entries_for_month(month)
        .into_iter()
        .cloned()
        .collect();
    if entries.is_empty() {
        return Err(LedgerError::NoOp(format!("month {month} has no entries to export")));
    }
    let totals = store.totals_for(month);
    Ok(MonthReport {
        month,
        month_name: month.display_name(locale),
        entries,
        totals: ReportTotals {
            income: totals.total_income,
            expense: totals.total_expense,
            balance: totals.net_balance,
        },
        exported_at: clock.now(),
    })
}

pub fn history_export(store: &LedgerStore, clock: &dyn Clock) -> HistoryExport {
    let history = store
        .history()
        .keys()
        .map(|month| {
            let entries: Vec<Entry> = store
                .entries_for_month(*month)
                .into_iter()
                .cloned()
                .collect();
            (*month, entries)
        })
        .collect();
    HistoryExport {
        history,
        months: store.list_month_keys(),
        exported_at: clock.now(),
    }
}

/// Shape accepted on import: only `month` and `entries` are required.
#[derive(Debug, Deserialize)]
struct MonthReportInput {
    #[serde(default, alias = "mes")]
    month: Option<MonthKey>,
    #[serde(default, alias = "lancamentos")]
    entries: Option<Vec<Entry>>,
}

#[derive(Debug, Deserialize)]
struct HistoryInput {
    #[serde(default, alias = "historico")]
    history: Option<BTreeMap<String, Vec<Entry>>>,
}

/// Summary of a JSON import.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonImport {
    pub month: Option<MonthKey>,
    pub entries: Vec<Entry>,
}

/// Replaces a month's bucket with the entries of a month report.
pub fn import_month_report(store: &mut LedgerStore, json: &str) -> LedgerResult<JsonImport> {
    let input: MonthReportInput = serde_json::from_str(json)?;
    let (Some(month), Some(entries)) = (input.month, input.entries) else {
        return Err(LedgerError::InvalidDocument(
            "month report must contain `month` and `entries`".into(),
        ));
    };
    if entries.is_empty() {
        return Err(LedgerError::NoOp(format!("report for {month} has no entries")));
    }
    let stored = store.replace_month(month, entries)?;
    info!(month = %month, count = stored.len(), "month report imported");
    Ok(JsonImport {
        month: Some(month),
        entries: stored,
    })
}

/// Replaces the whole ledger with the contents of a history export.
pub fn import_history(store: &mut LedgerStore, json: &str) -> LedgerResult<JsonImport> {
    let input: HistoryInput = serde_json::from_str(json)?;
    let history = input.history.ok_or_else(|| {
        LedgerError::InvalidDocument("history export must contain `history`".into())
    })?;
    let entries: Vec<Entry> = history.into_values().flatten().collect();
    if entries.is_empty() {
        return Err(LedgerError::NoOp("history export has no entries".into()));
    }
    let stored = store.replace_all(entries)?;
    info!(count = stored.len(), "history imported");
    Ok(JsonImport {
        month: None,
        entries: stored,
    })
}

pub fn to_pretty_json<T: Serialize>(document: &T) -> LedgerResult<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

mod rfc3339 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|stamp| stamp.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
