use chrono::NaiveDate;
use uuid::Uuid;

use super::dates;

/// A single dated transaction carrying amounts in both currencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub cad: f64,
    pub idr: f64,
    /// Copy of the owning day's screen time at the last write.
    pub screen_time: String,
}

impl Entry {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        cad: f64,
        idr: f64,
        screen_time: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            description: description.into(),
            cad,
            idr,
            screen_time: screen_time.into(),
        }
    }

    /// `$4.50` / `-$4.50`
    pub fn format_cad(&self) -> String {
        if self.cad >= 0.0 {
            format!("${:.2}", self.cad)
        } else {
            format!("-${:.2}", -self.cad)
        }
    }

    /// `Rp 53100` / `-Rp 53100`
    pub fn format_idr(&self) -> String {
        if self.idr >= 0.0 {
            format!("Rp {:.0}", self.idr)
        } else {
            format!("-Rp {:.0}", -self.idr)
        }
    }

    /// Storage form, `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        dates::format_date_storage(self.date)
    }

    pub fn date_display(&self) -> String {
        dates::format_date_display(self.date)
    }

    pub fn format_date_long(&self) -> String {
        dates::format_date_long(self.date)
    }

    /// Case-insensitive match against description, display dates and rendered amounts.
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        if self.description.to_lowercase().contains(&query) {
            return true;
        }
        if dates::date_matches_query(self.date, &query, true) {
            return true;
        }
        format!("{:.2}", self.cad).contains(&query) || format!("{:.0}", self.idr).contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coffee() -> Entry {
        Entry::new(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            "Coffee at Blenz",
            4.5,
            53100.0,
            "1h00m",
        )
    }

    #[test]
    fn ids_do_not_collide_for_identical_input() {
        let a = coffee();
        let b = coffee();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn clone_is_independent_of_later_edits() {
        let mut live = coffee();
        let snapshot = live.clone();
        live.description = "Tea".into();
        live.cad = 3.0;
        assert_eq!(snapshot.description, "Coffee at Blenz");
        assert_eq!(snapshot.cad, 4.5);
        assert_eq!(snapshot.id, live.id);
    }

    #[test]
    fn formats_amounts_with_sign() {
        let mut entry = coffee();
        assert_eq!(entry.format_cad(), "$4.50");
        assert_eq!(entry.format_idr(), "Rp 53100");
        entry.cad = -12.0;
        entry.idr = -141600.0;
        assert_eq!(entry.format_cad(), "-$12.00");
        assert_eq!(entry.format_idr(), "-Rp 141600");
    }

    #[test]
    fn matches_across_fields() {
        let entry = coffee();
        assert!(entry.matches_query(""));
        assert!(entry.matches_query("BLENZ"));
        assert!(entry.matches_query("01/15/2025"));
        assert!(entry.matches_query("1/15/2025"));
        assert!(entry.matches_query("january 15"));
        assert!(entry.matches_query("jan 15"));
        assert!(entry.matches_query("4.50"));
        assert!(entry.matches_query("53100"));
        assert!(!entry.matches_query("lunch"));
    }
}
