//! Calendar helpers for birth dates.
//!
//! The sheet backend serializes date cells as UTC instants
//! (`1990-05-11T18:30:00.000Z` is 12 May 1990 in India), while the entry form
//! produces plain `YYYY-MM-DD` dates. [`Calendar`] resolves both to a calendar
//! date in one fixed display offset.

use chrono::{Datelike, DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};

const PLAIN_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Date parsing and formatting bound to a display offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::local()
    }
}

impl Calendar {
    /// Calendar in the given offset.
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Calendar in the machine's current local offset.
    pub fn local() -> Self {
        Self::new(Local::now().offset().fix())
    }

    /// Calendar in UTC.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Parse an offset such as `+05:30`, `-0400`, or `Z`.
    pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return Some(Utc.fix());
        }
        let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
            (1, rest)
        } else if let Some(rest) = raw.strip_prefix('-') {
            (-1, rest)
        } else {
            return None;
        };
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
            return None;
        }
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 => rest.split_at(2),
            None => (rest, "0"),
        };
        if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.len() > 2 {
            return None;
        }
        let hours: i32 = hours.parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
    }

    /// The display offset.
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Today's date in the display offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Current wall-clock time in the display offset.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    /// Resolve a stored or typed date to a calendar date. Empty or
    /// unrecognised input yields `None`.
    pub fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(instant.with_timezone(&self.offset).date_naive());
        }
        PLAIN_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NAIVE_DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .map(|dt| dt.date())
            })
    }

    /// Birth year as text, the form the year filter compares against.
    pub fn year_of(&self, raw: &str) -> Option<String> {
        self.parse_date(raw).map(|d| d.year().to_string())
    }

    /// `DD/MM/YYYY` display form, or `None` when the input does not parse.
    pub fn display_date(&self, raw: &str) -> Option<String> {
        self.parse_date(raw).map(|d| d.format("%d/%m/%Y").to_string())
    }
}
