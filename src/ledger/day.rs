use chrono::NaiveDate;
use uuid::Uuid;

use super::{dates, entry::Entry};

/// Everything recorded for one calendar date.
///
/// `entries` keeps insertion order, which is also the on-disk row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Day {
    pub date: NaiveDate,
    pub entries: Vec<Entry>,
    pub screen_time: String,
    pub journal: String,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
            screen_time: String::new(),
            journal: String::new(),
        }
    }

    /// Appends `entry`, stamping it with the day's screen time.
    pub fn add_entry(&mut self, mut entry: Entry) -> Uuid {
        entry.screen_time = self.screen_time.clone();
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Removes the entry with `id`. Missing ids are ignored.
    pub fn remove_entry(&mut self, id: Uuid) -> Option<Entry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn entry(&self, id: Uuid) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: Uuid) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// Replaces the entry sharing `entry.id` in place. Returns false when no such entry exists.
    pub fn update_entry(&mut self, entry: Entry) -> bool {
        match self.entry_mut(entry.id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    /// Sets the day's screen time and rewrites it on every entry.
    pub fn set_screen_time(&mut self, screen_time: impl Into<String>) {
        self.screen_time = screen_time.into();
        for entry in &mut self.entries {
            entry.screen_time = self.screen_time.clone();
        }
    }

    pub fn has_journal(&self) -> bool {
        !self.journal.is_empty()
    }

    /// No entries and no journal; empty days are never written to disk.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.journal.is_empty()
    }

    pub fn total_cad(&self) -> f64 {
        self.entries.iter().map(|entry| entry.cad).sum()
    }

    pub fn total_idr(&self) -> f64 {
        self.entries.iter().map(|entry| entry.idr).sum()
    }

    /// Entries matching `query`, in list order.
    pub fn filter(&self, query: &str) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|entry| entry.matches_query(query))
            .collect()
    }

    pub fn filtered_total_cad(&self, query: &str) -> f64 {
        self.filter(query).iter().map(|entry| entry.cad).sum()
    }

    pub fn filtered_total_idr(&self, query: &str) -> f64 {
        self.filter(query).iter().map(|entry| entry.idr).sum()
    }

    /// Whole-day match used by range listings: date, screen time, or any entry.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let lowered = query.to_lowercase();
        if dates::date_matches_query(self.date, &lowered, false) {
            return true;
        }
        if self.screen_time.to_lowercase().contains(&lowered) {
            return true;
        }
        self.entries.iter().any(|entry| entry.matches_query(query))
    }

    pub fn journal_matches(&self, query: &str) -> bool {
        self.has_journal()
            && (query.is_empty() || self.journal.to_lowercase().contains(&query.to_lowercase()))
    }

    pub fn date_string(&self) -> String {
        dates::format_date_storage(self.date)
    }

    pub fn date_display(&self) -> String {
        dates::format_date_display(self.date)
    }

    pub fn format_date_long(&self) -> String {
        dates::format_date_long(self.date)
    }
}

/// Convenience wrapper over [`Day::filter`].
pub fn filter_entries<'a>(day: &'a Day, query: &str) -> Vec<&'a Entry> {
    day.filter(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn sample_day() -> Day {
        let mut day = Day::new(jan_15());
        day.set_screen_time("1h00m");
        day.add_entry(Entry::new(jan_15(), "Coffee", 4.50, 53100.0, ""));
        day.add_entry(Entry::new(jan_15(), "Lunch", 12.00, 141600.0, ""));
        day
    }

    #[test]
    fn totals_sum_all_entries() {
        let day = sample_day();
        assert!((day.total_cad() - 16.50).abs() < 1e-9);
        assert!((day.total_idr() - 194700.0).abs() < 1e-9);
    }

    #[test]
    fn add_entry_inherits_day_screen_time() {
        let day = sample_day();
        assert!(day.entries.iter().all(|entry| entry.screen_time == "1h00m"));
    }

    #[test]
    fn screen_time_propagates_to_existing_entries() {
        let mut day = sample_day();
        day.set_screen_time("2h30m");
        assert_eq!(day.screen_time, "2h30m");
        assert!(day.entries.iter().all(|entry| entry.screen_time == "2h30m"));
    }

    #[test]
    fn remove_is_idempotent_for_unknown_ids() {
        let mut day = sample_day();
        assert!(day.remove_entry(Uuid::new_v4()).is_none());
        assert_eq!(day.entries.len(), 2);
        let coffee = day.entries[0].id;
        assert_eq!(day.remove_entry(coffee).map(|e| e.description), Some("Coffee".into()));
        assert!(day.remove_entry(coffee).is_none());
        assert_eq!(day.entries.len(), 1);
    }

    #[test]
    fn update_replaces_matching_entry_only() {
        let mut day = sample_day();
        let mut edited = day.entries[1].clone();
        edited.description = "Dinner".into();
        assert!(day.update_entry(edited));
        assert_eq!(day.entries[1].description, "Dinner");
        assert_eq!(day.entries[0].description, "Coffee");

        let stranger = Entry::new(jan_15(), "Ghost", 0.0, 0.0, "");
        assert!(!day.update_entry(stranger));
        assert_eq!(day.entries.len(), 2);
    }

    #[test]
    fn emptiness_requires_no_entries_and_no_journal() {
        let mut day = Day::new(jan_15());
        assert!(day.is_empty());
        day.journal = "Quiet day.".into();
        assert!(!day.is_empty());
        day.journal.clear();
        day.add_entry(Entry::new(jan_15(), "Bus", 3.0, 35400.0, ""));
        assert!(!day.is_empty());
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let day = sample_day();
        let all = filter_entries(&day, "");
        let names: Vec<_> = all.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Lunch"]);
    }

    #[test]
    fn filtered_totals_restrict_to_matches() {
        let day = sample_day();
        assert_eq!(day.filter("lun").len(), 1);
        assert!((day.filtered_total_cad("lun") - 12.0).abs() < 1e-9);
        assert!((day.filtered_total_idr("coffee") - 53100.0).abs() < 1e-9);
        assert_eq!(day.filtered_total_cad("nothing-matches"), 0.0);
    }

    #[test]
    fn day_level_match_includes_screen_time() {
        let day = sample_day();
        assert!(day.matches_query("1H00"));
        assert!(day.matches_query("january 15"));
        assert!(day.matches_query("lunch"));
        assert!(!day.matches_query("groceries"));
    }
}
