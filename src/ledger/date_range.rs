use chrono::NaiveDate;

use super::{dates, day::Day, entry::Entry};

/// Days with data between two inclusive bounds, kept sorted by date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<Day>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            days: Vec::new(),
        }
    }

    /// Inserts `day` at its sorted position.
    pub fn add_day(&mut self, day: Day) {
        let index = self.days.partition_point(|existing| existing.date <= day.date);
        self.days.insert(index, day);
    }

    pub fn total_cad(&self) -> f64 {
        self.days.iter().map(Day::total_cad).sum()
    }

    pub fn total_idr(&self) -> f64 {
        self.days.iter().map(Day::total_idr).sum()
    }

    /// Matching entries from every day, in date then list order.
    pub fn all_entries(&self, query: &str) -> Vec<&Entry> {
        self.days.iter().flat_map(|day| day.filter(query)).collect()
    }

    pub fn filtered_total_cad(&self, query: &str) -> f64 {
        self.days.iter().map(|day| day.filtered_total_cad(query)).sum()
    }

    pub fn filtered_total_idr(&self, query: &str) -> f64 {
        self.days.iter().map(|day| day.filtered_total_idr(query)).sum()
    }

    pub fn matching_days(&self, query: &str) -> Vec<&Day> {
        self.days.iter().filter(|day| day.matches_query(query)).collect()
    }

    /// Days whose journal contains `query`.
    pub fn journal_matches(&self, query: &str) -> Vec<&Day> {
        self.days
            .iter()
            .filter(|day| day.journal_matches(query))
            .collect()
    }

    /// `01/01/2025 - 01/31/2025`
    pub fn format_range_display(&self) -> String {
        format!(
            "{} - {}",
            dates::format_date_display(self.start),
            dates::format_date_display(self.end)
        )
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn day_with(day: u32, description: &str, cad: f64, idr: f64) -> Day {
        let mut d = Day::new(date(day));
        d.add_entry(Entry::new(date(day), description, cad, idr, ""));
        d
    }

    #[test]
    fn keeps_days_sorted_regardless_of_insert_order() {
        let mut range = DateRange::new(date(1), date(31));
        range.add_day(day_with(20, "Rent", 900.0, 10_620_000.0));
        range.add_day(day_with(3, "Coffee", 4.5, 53100.0));
        range.add_day(day_with(11, "Books", 30.0, 354000.0));
        let order: Vec<_> = range.days.iter().map(|d| d.date).collect();
        assert_eq!(order, vec![date(3), date(11), date(20)]);
    }

    #[test]
    fn aggregates_totals_and_filters() {
        let mut range = DateRange::new(date(1), date(31));
        range.add_day(day_with(3, "Coffee", 4.5, 53100.0));
        range.add_day(day_with(4, "Coffee beans", 15.0, 177000.0));
        range.add_day(day_with(5, "Lunch", 12.0, 141600.0));

        assert!((range.total_cad() - 31.5).abs() < 1e-9);
        assert!((range.total_idr() - 371700.0).abs() < 1e-9);
        assert_eq!(range.all_entries("coffee").len(), 2);
        assert!((range.filtered_total_cad("coffee") - 19.5).abs() < 1e-9);
        assert!((range.filtered_total_idr("lunch") - 141600.0).abs() < 1e-9);
        assert_eq!(range.all_entries("").len(), 3);
        assert_eq!(range.matching_days("lunch").len(), 1);
    }

    #[test]
    fn journal_search_only_considers_days_with_journals() {
        let mut range = DateRange::new(date(1), date(31));
        let mut with_journal = day_with(2, "Tea", 2.0, 23600.0);
        with_journal.journal = "Met Ana at the Library".into();
        range.add_day(with_journal);
        range.add_day(day_with(3, "Library fine", 1.0, 11800.0));

        let hits = range.journal_matches("library");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].date, date(2));
        assert_eq!(range.journal_matches("").len(), 1);
    }

    #[test]
    fn renders_bounds() {
        let range = DateRange::new(date(1), date(31));
        assert_eq!(range.format_range_display(), "01/01/2025 - 01/31/2025");
        assert!(range.is_empty());
    }
}
