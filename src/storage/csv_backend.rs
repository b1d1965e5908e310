use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, warn};

use crate::{
    errors::LedgerError,
    ledger::{dates, DateRange, Day, Entry},
    utils::persistence::{ensure_dir, read_bytes_optional, remove_if_exists, write_atomic},
};

use super::{DayStore, Result};

pub const CSV_FILE_NAME: &str = "data.csv";
pub const JOURNAL_FILE_NAME: &str = "entry.md";
pub const CSV_HEADER: [&str; 5] = ["date", "description", "cad", "idr", "screen_time"];

/// Filesystem store laid out as `<data_dir>/<YYYY>/<MM>/<DD>/{data.csv,entry.md}`.
#[derive(Debug, Clone)]
pub struct CsvDayStore {
    data_dir: PathBuf,
}

impl CsvDayStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string())
            .join(date.format("%d").to_string())
    }

    pub fn data_file_path(&self, date: NaiveDate) -> PathBuf {
        self.day_dir(date).join(CSV_FILE_NAME)
    }

    pub fn journal_path(&self, date: NaiveDate) -> PathBuf {
        self.day_dir(date).join(JOURNAL_FILE_NAME)
    }

    /// Journal text; invalid UTF-8 is replaced rather than rejected.
    pub fn load_journal(&self, date: NaiveDate) -> Result<String> {
        Ok(read_bytes_optional(&self.journal_path(date))?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default())
    }

    pub fn save_journal(&self, date: NaiveDate, content: &str) -> Result<()> {
        write_atomic(&self.journal_path(date), content.as_bytes())
    }

    fn load_entries(&self, day: &mut Day) -> Result<()> {
        let path = self.data_file_path(day.date);
        let Some(data) = read_bytes_optional(&path)? else {
            return Ok(());
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_slice());
        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    warn!(path = %path.display(), row = index + 1, error = %err, "skipping unreadable row");
                    continue;
                }
            };
            let Some(entry) = parse_row(&record) else {
                warn!(path = %path.display(), row = index + 1, "skipping malformed row");
                continue;
            };
            let screen_time = entry.screen_time.clone();
            day.add_entry(entry);
            if day.screen_time.is_empty() && !screen_time.is_empty() {
                day.set_screen_time(screen_time);
            }
        }
        Ok(())
    }
}

impl DayStore for CsvDayStore {
    fn load_day(&self, date: NaiveDate) -> Result<Day> {
        let mut day = Day::new(date);
        self.load_entries(&mut day)?;
        day.journal = self.load_journal(date)?;
        debug!(%date, entries = day.entries.len(), journal = day.has_journal(), "loaded day");
        Ok(day)
    }

    fn save_day(&self, day: &Day) -> Result<()> {
        if !day.entries.is_empty() {
            let rows = day.entries.iter().map(|entry| (entry, day.screen_time.as_str()));
            let bytes = render_csv(rows)?;
            write_atomic(&self.data_file_path(day.date), &bytes)?;
        }
        if day.has_journal() {
            self.save_journal(day.date, &day.journal)?;
        }
        debug!(date = %day.date, entries = day.entries.len(), "saved day");
        Ok(())
    }

    fn delete_day(&self, date: NaiveDate) -> Result<()> {
        remove_if_exists(&self.data_file_path(date))
    }

    fn delete_journal(&self, date: NaiveDate) -> Result<()> {
        remove_if_exists(&self.journal_path(date))
    }

    fn file_exists(&self, date: NaiveDate) -> bool {
        self.data_file_path(date).is_file()
    }

    fn journal_exists(&self, date: NaiveDate) -> bool {
        self.journal_path(date).is_file()
    }

    fn list_available_dates(&self) -> Result<Vec<NaiveDate>> {
        let years = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut found = Vec::new();
        for year in subdirectories(years) {
            let Ok(months) = fs::read_dir(&year) else { continue };
            for month in subdirectories(months) {
                let Ok(days) = fs::read_dir(&month) else { continue };
                for day in subdirectories(days) {
                    let Some(date) = date_from_dirs(&year, &month, &day) else {
                        continue;
                    };
                    if self.day_has_data(date) {
                        found.push(date);
                    }
                }
            }
        }
        found.sort();
        Ok(found)
    }

    fn export_date_range(&self, range: &DateRange, filename: &str) -> Result<()> {
        ensure_dir(&self.data_dir)?;
        let rows = range.days.iter().flat_map(|day| {
            day.entries
                .iter()
                .map(move |entry| (entry, day.screen_time.as_str()))
        });
        let bytes = render_csv(rows)?;
        write_atomic(&self.data_dir.join(filename), &bytes)?;
        debug!(filename, days = range.days.len(), "exported range");
        Ok(())
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Header plus one row per entry. The screen time column comes from the owning day.
fn render_csv<'a>(rows: impl Iterator<Item = (&'a Entry, &'a str)>) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for (entry, screen_time) in rows {
        writer.write_record([
            entry.date_string(),
            entry.description.clone(),
            format!("{:.2}", entry.cad),
            format!("{:.0}", entry.idr),
            screen_time.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| {
            LedgerError::Io(std::io::Error::new(
                err.error().kind(),
                err.error().to_string(),
            ))
        })
}

/// Rows with fewer than five fields or a bad date are dropped; bad amounts become zero.
fn parse_row(record: &StringRecord) -> Option<Entry> {
    if record.len() < CSV_HEADER.len() {
        return None;
    }
    let date = dates::parse_storage_date(record.get(0)?)?;
    let cad = parse_amount(record.get(2)?);
    let idr = parse_amount(record.get(3)?);
    Some(Entry::new(date, record.get(1)?, cad, idr, record.get(4)?))
}

fn parse_amount(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

fn subdirectories(entries: fs::ReadDir) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn date_from_dirs(year: &Path, month: &Path, day: &Path) -> Option<NaiveDate> {
    let name = |path: &Path| path.file_name()?.to_str().map(str::to_string);
    let raw = format!("{}-{}-{}", name(year)?, name(month)?, name(day)?);
    dates::parse_storage_date(&raw)
}
