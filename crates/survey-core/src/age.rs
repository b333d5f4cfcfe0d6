//! Calendar-aware age calculation.

use chrono::{Datelike, NaiveDate};

use crate::dates::Calendar;

/// Whole years between `birth` and `today`.
///
/// The year difference is reduced by one when today's (month, day) falls
/// before the birthday's. A birth date after `today` yields `None`.
pub fn age_on_date(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Age for a raw date string as typed or stored. Empty or unparsable input
/// yields `None`, never zero.
pub fn age_on(raw: &str, today: NaiveDate, calendar: &Calendar) -> Option<u32> {
    calendar
        .parse_date(raw)
        .and_then(|birth| age_on_date(birth, today))
}

impl Calendar {
    /// Age as of today in this calendar's offset.
    pub fn age_today(&self, raw: &str) -> Option<u32> {
        age_on(raw, self.today(), self)
    }
}
