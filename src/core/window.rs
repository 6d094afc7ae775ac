use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::America::New_York;

/// Trailing range of filing days, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    /// `days` back from `today` (so `days = 3` spans four calendar dates).
    ///
    /// Saturates at the earliest representable date.
    pub fn trailing(days: u32, today: NaiveDate) -> Self {
        Self {
            start: today
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    /// Every calendar day in the window, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Today's date on EDGAR's clock (US Eastern).
pub fn edgar_today() -> NaiveDate {
    Utc::now().with_timezone(&New_York).date_naive()
}

/// Calendar quarter (1..=4), as used by the daily-index directory layout.
pub fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Lenient parse of the date formats upstreams use for filing dates.
///
/// Accepts `YYYY-MM-DD`, `YYYYMMDD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps.
pub fn parse_filing_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y%m%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}
