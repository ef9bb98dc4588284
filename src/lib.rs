#![doc(test(attr(deny(warnings))))]

//! Monthly ledger: a personal income/expense tracker organised in month buckets, with
//! derived totals, JSON and CSV interchange, and local persistence.

pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod exchange;
pub mod ledger;
pub mod storage;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Monthly ledger tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
