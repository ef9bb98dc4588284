use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    errors::{LedgerError, LedgerResult},
    ledger::MonthKey,
    utils::paths::{app_data_dir, config_file_in, ensure_dir, write_atomic},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub locale: String,
    pub currency_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected_month: Option<MonthKey>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency_symbol: "R$".into(),
            last_selected_month: None,
        }
    }
}

impl Config {
    /// Sets a user-facing setting by name (`locale` or `currency`).
    pub fn set(&mut self, key: &str, value: &str) -> LedgerResult<()> {
        let value = value.trim();
        match key {
            "locale" => {
                if value.is_empty() {
                    return Err(LedgerError::Validation("locale must not be empty".into()));
                }
                self.locale = value.to_string();
            }
            "currency" => self.currency_symbol = value.to_string(),
            other => {
                return Err(LedgerError::Validation(format!(
                    "unknown setting `{other}` (expected locale or currency)"
                )))
            }
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] as pretty JSON under the application data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> LedgerResult<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> LedgerResult<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    pub fn load(&self) -> LedgerResult<Config> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, config: &Config) -> LedgerResult<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
