use std::{cell::RefCell, collections::HashMap, path::PathBuf, rc::Rc};

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::{
    errors::LedgerError,
    storage::{CsvDayStore, DayStore},
};

use super::{date_range::DateRange, dates, day::Day, entry::Entry};

/// A cached day handed out by [`LedgerService`].
///
/// Every caller asking for the same date receives the same instance, so a mutation made
/// through one handle is visible through all of them until the date is invalidated.
pub type SharedDay = Rc<RefCell<Day>>;

type Result<T> = std::result::Result<T, LedgerError>;

/// Single point of access for day and range reads and writes.
///
/// Single days are cached by calendar date; range loads go straight to the store.
pub struct LedgerService {
    store: Box<dyn DayStore>,
    cache: HashMap<NaiveDate, SharedDay>,
}

impl LedgerService {
    pub fn new(store: Box<dyn DayStore>) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Service over a [`CsvDayStore`] rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(CsvDayStore::new(data_dir)))
    }

    pub fn store(&self) -> &dyn DayStore {
        self.store.as_ref()
    }

    pub fn get_day(&mut self, date: NaiveDate) -> Result<SharedDay> {
        if let Some(day) = self.cache.get(&date) {
            debug!(%date, "day cache hit");
            return Ok(Rc::clone(day));
        }
        let day = Rc::new(RefCell::new(self.store.load_day(date)?));
        self.cache.insert(date, Rc::clone(&day));
        Ok(day)
    }

    pub fn get_today(&mut self) -> Result<SharedDay> {
        self.get_day(dates::today())
    }

    /// Caches `day` under its date, then persists it. Empty days only update the cache.
    pub fn save_day(&mut self, day: &SharedDay) -> Result<()> {
        let date = day.borrow().date;
        self.cache.insert(date, Rc::clone(day));
        let snapshot = day.borrow();
        self.store.save_day(&snapshot)
    }

    pub fn add_entry(&mut self, day: &SharedDay, entry: Entry) -> Result<Uuid> {
        let id = day.borrow_mut().add_entry(entry);
        self.save_day(day)?;
        Ok(id)
    }

    /// Removes `id` and saves. When the save fails the entry is put back.
    ///
    /// Removing the last entry leaves the previous tabular file on disk; call
    /// [`LedgerService::delete_day`] to remove it.
    pub fn remove_entry(&mut self, day: &SharedDay, id: Uuid) -> Result<Option<Entry>> {
        let Some(removed) = day.borrow_mut().remove_entry(id) else {
            return Ok(None);
        };
        if let Err(err) = self.save_day(day) {
            day.borrow_mut().add_entry(removed);
            return Err(err);
        }
        Ok(Some(removed))
    }

    /// Replaces the entry sharing `entry.id`; unknown ids leave the day untouched.
    pub fn update_entry(&mut self, day: &SharedDay, entry: Entry) -> Result<bool> {
        if !day.borrow_mut().update_entry(entry) {
            return Ok(false);
        }
        self.save_day(day)?;
        Ok(true)
    }

    pub fn set_screen_time(&mut self, day: &SharedDay, screen_time: &str) -> Result<()> {
        day.borrow_mut().set_screen_time(screen_time);
        self.save_day(day)
    }

    /// Replaces the journal; clearing it also removes the journal file.
    pub fn set_journal(&mut self, day: &SharedDay, journal: &str) -> Result<()> {
        day.borrow_mut().journal = journal.to_string();
        self.save_day(day)?;
        if journal.is_empty() {
            let date = day.borrow().date;
            self.store.delete_journal(date)?;
        }
        Ok(())
    }

    pub fn day_exists(&self, date: NaiveDate) -> bool {
        self.store.file_exists(date)
    }

    pub fn get_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<DateRange> {
        self.store.load_date_range(start, end)
    }

    /// Writes `range` to `<start>_to_<end>.csv` in the data directory and returns the file name.
    pub fn export_date_range(&self, range: &DateRange) -> Result<String> {
        let filename = format!(
            "{}_to_{}.csv",
            dates::format_date_storage(range.start),
            dates::format_date_storage(range.end)
        );
        self.store.export_date_range(range, &filename)?;
        Ok(filename)
    }

    pub fn list_available_dates(&self) -> Result<Vec<NaiveDate>> {
        self.store.list_available_dates()
    }

    /// Removes the tabular file for `date`. A cached instance is left as is.
    pub fn delete_day(&self, date: NaiveDate) -> Result<()> {
        self.store.delete_day(date)
    }

    /// Removes the journal file for `date`. A cached instance is left as is.
    pub fn delete_journal(&self, date: NaiveDate) -> Result<()> {
        self.store.delete_journal(date)
    }

    pub fn invalidate_cache(&mut self, date: NaiveDate) {
        self.cache.remove(&date);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn is_cached(&self, date: NaiveDate) -> bool {
        self.cache.contains_key(&date)
    }
}
