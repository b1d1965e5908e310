#![doc(test(attr(deny(warnings))))]

//! Daily Ledger keeps per-day CAD/IDR transactions, screen time and journal notes in a
//! `YYYY/MM/DD` directory tree, with a cached day service, bounded undo history and a
//! currency converter that survives going offline.

pub mod config;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use currency::{CurrencyConverter, RateSource};
pub use errors::LedgerError;
pub use ledger::{DateRange, Day, Entry, LedgerService, SharedDay, UndoManager};
pub use storage::{CsvDayStore, DayStore};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Daily Ledger tracing initialized.");
    });
}
