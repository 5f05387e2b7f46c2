//! Time cursor over the supported calendar range.
//!
//! Dates are calendar days (`NaiveDate`), so two dates are equal exactly when
//! their UTC year/month/day triples are. Anything carrying a time of day is
//! normalised to its UTC date before comparison.

use chrono::{DateTime, Days, NaiveDate, Utc};

pub const FIRST_DAY: (i32, u32, u32) = (2000, 1, 1);
pub const LAST_DAY: (i32, u32, u32) = (2099, 12, 31);

const DAY_FORMAT: &str = "%Y-%m-%d";

fn ymd((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("literal calendar date is valid")
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `YYYY-MM-DD`, the key format of the position table.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its UTC date).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DAY_FORMAT).ok().or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
    })
}

/// The ordered, gapless sequence of supported days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidDates {
    first: NaiveDate,
    last: NaiveDate,
}

impl Default for ValidDates {
    fn default() -> Self {
        Self {
            first: ymd(FIRST_DAY),
            last: ymd(LAST_DAY),
        }
    }
}

impl ValidDates {
    /// A custom inclusive range; `first` and `last` are swapped if given backwards.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        if last < first {
            Self { first: last, last: first }
        } else {
            Self { first, last }
        }
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, cursor: usize) -> Option<NaiveDate> {
        if cursor >= self.len() {
            return None;
        }
        self.first.checked_add_days(Days::new(cursor as u64))
    }

    /// Falls back to today when `cursor` is out of range.
    pub fn date_from_cursor(&self, cursor: usize) -> NaiveDate {
        self.get(cursor).unwrap_or_else(today)
    }

    /// `None` when `date` is outside the range.
    pub fn cursor_from_date(&self, date: NaiveDate) -> Option<usize> {
        if date < self.first || date > self.last {
            return None;
        }
        Some((date - self.first).num_days() as usize)
    }

    pub fn format_cursor(&self, cursor: usize) -> String {
        day_key(self.date_from_cursor(cursor))
    }

    pub fn parse_cursor(&self, text: &str) -> Option<usize> {
        parse_date(text).and_then(|date| self.cursor_from_date(date))
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.len())
    }
}

/// Index of the displayed day. Always within `0..len`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateCursor {
    index: usize,
    len: usize,
}

impl DateCursor {
    pub fn new(dates: &ValidDates, index: usize) -> Self {
        let len = dates.len();
        Self {
            index: index.min(len - 1),
            len,
        }
    }

    /// Today when it is in range, the first day otherwise.
    pub fn starting_today(dates: &ValidDates) -> Self {
        Self::new(dates, dates.cursor_from_date(today()).unwrap_or(0))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn last_index(&self) -> usize {
        self.len - 1
    }

    pub fn is_at_end(&self) -> bool {
        self.index == self.last_index()
    }

    /// Clamps into range. Returns whether the index changed.
    pub fn set(&mut self, index: usize) -> bool {
        let index = index.min(self.last_index());
        let changed = index != self.index;
        self.index = index;
        changed
    }

    /// Moves one day forward. Returns false, without moving, at the last day.
    pub fn advance(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn case_01_range() {
        let dates = ValidDates::default();
        assert_eq!(36525, dates.len());
        assert_eq!(Some(date(2000, 1, 1)), dates.get(0));
        assert_eq!(Some(date(2099, 12, 31)), dates.get(dates.len() - 1));
        assert_eq!(None, dates.get(dates.len()));
        assert_eq!(dates.len(), dates.iter().count());
    }

    #[test]
    fn case_02_cursor_round_trip_everywhere() {
        let dates = ValidDates::default();
        for cursor in 0..dates.len() {
            assert_eq!(Some(cursor), dates.cursor_from_date(dates.date_from_cursor(cursor)));
        }
    }

    #[test]
    fn case_03_out_of_range_dates() {
        let dates = ValidDates::default();
        assert_eq!(None, dates.cursor_from_date(date(1999, 12, 31)));
        assert_eq!(None, dates.cursor_from_date(date(2100, 1, 1)));
        assert_eq!(None, dates.cursor_from_date(date(1970, 6, 15)));
        assert_eq!(Some(0), dates.cursor_from_date(date(2000, 1, 1)));
    }

    #[test]
    fn case_04_out_of_range_cursor_is_today() {
        let dates = ValidDates::default();
        assert_eq!(today(), dates.date_from_cursor(dates.len()));
        assert_eq!(today(), dates.date_from_cursor(usize::MAX));
    }

    #[test]
    fn case_05_format_and_parse() {
        let dates = ValidDates::default();
        assert_eq!("2000-01-01", dates.format_cursor(0));
        assert_eq!("2000-03-01", dates.format_cursor(60));
        assert_eq!(Some(60), dates.parse_cursor("2000-03-01"));
        assert_eq!(Some(60), dates.parse_cursor(" 2000-03-01 "));
        assert_eq!(Some(60), dates.parse_cursor("2000-03-01T23:30:00Z"));
        // 2000-03-02 in UTC
        assert_eq!(Some(61), dates.parse_cursor("2000-03-01T23:30:00-02:00"));
        assert_eq!(None, dates.parse_cursor("2000-02-30"));
        assert_eq!(None, dates.parse_cursor("yesterday"));
        assert_eq!(None, dates.parse_cursor("2100-01-01"));
    }

    #[test]
    fn case_06_cursor_stays_in_range() {
        let dates = ValidDates::new(date(2000, 1, 1), date(2000, 1, 3));
        let mut cursor = DateCursor::new(&dates, 10);
        assert_eq!(2, cursor.index());
        assert!(cursor.is_at_end());
        assert!(!cursor.advance());
        assert!(cursor.set(0));
        assert!(!cursor.set(0));
        assert!(cursor.advance());
        assert_eq!(1, cursor.index());
        assert!(cursor.set(99));
        assert_eq!(2, cursor.index());
    }

    #[test]
    fn case_07_starting_today() {
        let dates = ValidDates::default();
        let cursor = DateCursor::starting_today(&dates);
        match dates.cursor_from_date(today()) {
            Some(index) => assert_eq!(index, cursor.index()),
            None => assert_eq!(0, cursor.index()),
        }
    }
}
