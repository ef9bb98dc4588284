use thiserror::Error;

use crate::ledger::EntryId;

/// Error type that captures ledger engine, persistence, and interchange failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Entry not found: {0}")]
    NotFound(EntryId),
    #[error("Nothing to do: {0}")]
    NoOp(String),
    #[error("Invalid month key `{0}` (expected YYYY-MM)")]
    InvalidMonthKey(String),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// True for failures the caller can simply report and move on from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::Validation(_)
                | LedgerError::NotFound(_)
                | LedgerError::NoOp(_)
                | LedgerError::InvalidMonthKey(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_mistakes_are_recoverable_but_io_is_not() {
        assert!(LedgerError::NotFound(3).is_recoverable());
        assert!(LedgerError::NoOp("empty".into()).is_recoverable());
        let io = LedgerError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_recoverable());
        assert_eq!(LedgerError::NotFound(3).to_string(), "Entry not found: 3");
    }
}
