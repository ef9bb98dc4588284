use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{LedgerError, LedgerResult};

use super::month::{MonthKey, YEAR_RANGE};

/// Store-assigned entry identifier. Never reused within a store's lifetime.
pub type EntryId = u64;

/// Whether an entry brings money in or takes it out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntryKind {
    #[serde(rename = "EXPENSE", alias = "GASTO")]
    Expense,
    #[serde(rename = "INCOME", alias = "RECEITA")]
    Income,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Expense => "EXPENSE",
            EntryKind::Income => "INCOME",
        }
    }

    /// Strict spreadsheet spelling: upper case English or the legacy Portuguese labels.
    pub fn from_sheet_label(label: &str) -> Option<Self> {
        match label.trim() {
            "EXPENSE" | "GASTO" => Some(EntryKind::Expense),
            "INCOME" | "RECEITA" => Some(EntryKind::Income),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" | "gasto" => Ok(EntryKind::Expense),
            "income" | "receita" => Ok(EntryKind::Income),
            other => Err(LedgerError::Validation(format!(
                "unknown entry kind `{other}` (expected expense or income)"
            ))),
        }
    }
}

/// One income or expense line of the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    #[serde(alias = "data", deserialize_with = "deserialize_entry_date")]
    pub date: NaiveDate,
    #[serde(alias = "descricao")]
    pub description: String,
    #[serde(alias = "valor")]
    pub amount: f64,
    #[serde(alias = "tipo")]
    pub kind: EntryKind,
    #[serde(default, alias = "categoria")]
    pub category: String,
    #[serde(default, alias = "pago")]
    pub paid: bool,
}

impl Entry {
    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == EntryKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == EntryKind::Income
    }

    /// Copies the user-editable fields back into a draft.
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            kind: self.kind,
            category: self.category.clone(),
        }
    }
}

/// Candidate entry handed to `LedgerStore::add_entry`; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: EntryKind,
    pub category: String,
}

impl EntryDraft {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: f64,
        kind: EntryKind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            kind,
            category: category.into(),
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        validate_date(self.date)?;
        validate_description(&self.description)?;
        validate_amount(self.amount)
    }

    pub(crate) fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            date: self.date,
            description: self.description.trim().to_string(),
            amount: self.amount,
            kind: self.kind,
            category: self.category.trim().to_string(),
            paid: false,
        }
    }
}

/// Partial update applied by `LedgerStore::update_entry`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<EntryKind>,
    pub category: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.category.is_none()
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if let Some(date) = self.date {
            validate_date(date)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        Ok(())
    }

    pub(crate) fn apply(self, entry: &mut Entry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(description) = self.description {
            entry.description = description.trim().to_string();
        }
        if let Some(amount) = self.amount {
            entry.amount = amount;
        }
        if let Some(kind) = self.kind {
            entry.kind = kind;
        }
        if let Some(category) = self.category {
            entry.category = category.trim().to_string();
        }
    }
}

fn validate_date(date: NaiveDate) -> LedgerResult<()> {
    if !YEAR_RANGE.contains(&date.year()) {
        return Err(LedgerError::Validation(format!(
            "date {date} is outside the years 0000-9999"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> LedgerResult<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "description must not be empty".into(),
        ));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> LedgerResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}

/// Accepts plain `YYYY-MM-DD` as well as full timestamps written by older exports.
fn deserialize_entry_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_stored_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid entry date `{raw}`"))
    })
}

pub(crate) fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
