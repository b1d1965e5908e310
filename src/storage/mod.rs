pub mod csv_backend;

use std::path::Path;

use chrono::NaiveDate;

use crate::{
    errors::LedgerError,
    ledger::{DateRange, Day},
};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends capable of storing one [`Day`] per calendar date.
///
/// A missing day is never an error: loads return an empty [`Day`] and deletes are idempotent.
pub trait DayStore {
    fn load_day(&self, date: NaiveDate) -> Result<Day>;
    /// Writes the tabular file only when the day has entries and the journal only when it is
    /// non-empty. Nothing is deleted implicitly.
    fn save_day(&self, day: &Day) -> Result<()>;
    fn delete_day(&self, date: NaiveDate) -> Result<()>;
    fn delete_journal(&self, date: NaiveDate) -> Result<()>;
    fn file_exists(&self, date: NaiveDate) -> bool;
    fn journal_exists(&self, date: NaiveDate) -> bool;
    /// Dates with tabular or journal data, ascending.
    fn list_available_dates(&self) -> Result<Vec<NaiveDate>>;
    /// Writes every entry of `range` into one combined file named `filename`.
    fn export_date_range(&self, range: &DateRange, filename: &str) -> Result<()>;
    fn data_dir(&self) -> &Path;

    fn day_has_data(&self, date: NaiveDate) -> bool {
        self.file_exists(date) || self.journal_exists(date)
    }

    /// Loads every day in `[start, end]` that has a tabular file, skipping empty results.
    fn load_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<DateRange> {
        let mut range = DateRange::new(start, end);
        for date in crate::ledger::dates::days_in_range(start, end) {
            if !self.file_exists(date) {
                continue;
            }
            let day = self.load_day(date)?;
            if !day.is_empty() {
                range.add_day(day);
            }
        }
        Ok(range)
    }
}

pub use csv_backend::{CsvDayStore, CSV_FILE_NAME, CSV_HEADER, JOURNAL_FILE_NAME};
