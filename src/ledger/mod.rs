//! Day, entry and range models plus the cached service and undo history built on them.

pub mod date_range;
pub mod dates;
pub mod day;
pub mod entry;
pub mod service;
pub mod undo;

pub use date_range::DateRange;
pub use dates::{parse_date, today};
pub use day::{filter_entries, Day};
pub use entry::Entry;
pub use service::{LedgerService, SharedDay};
pub use undo::{UndoAction, UndoKind, UndoManager};
