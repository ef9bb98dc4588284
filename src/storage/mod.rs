//! Key/value persistence modelled on browser local storage, plus the ledger's save/load rules.

pub mod json_backend;
pub mod memory;
pub mod persistence;

use crate::errors::LedgerResult;

/// String-keyed store of string values. Writes replace the previous value wholesale.
pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> LedgerResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> LedgerResult<()>;
    fn remove(&mut self, key: &str) -> LedgerResult<()>;
}

pub use json_backend::JsonFileStorage;
pub use memory::MemoryStorage;
pub use persistence::{load, save, HISTORY_KEY, LEGACY_KEY};
