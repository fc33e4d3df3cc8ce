//! Date utility functions for business day calculations
//!
//! Business days skip Saturdays, Sundays and holidays.
//! Every function here is total: bad input gives `None`, never a panic.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc, Weekday};

use crate::holidays::HolidayCalendar;

/// Parse a date string from a campaign record.
/// Accepts "YYYY-MM-DD", RFC 3339 datetimes and naive "YYYY-MM-DDTHH:MM:SS".
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Parse a completion timestamp. Date-only values are taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn is_weekend(date: &NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Check if a date is a listed holiday
pub fn is_holiday(date: &NaiveDate, calendar: &HolidayCalendar) -> bool {
    calendar.contains(date)
}

/// Check if a date is a business day based on the calendar
pub fn is_business_day(date: &NaiveDate, calendar: &HolidayCalendar) -> bool {
    !is_weekend(date) && !is_holiday(date, calendar)
}

/// Step back `days` business days from `date`.
///
/// Weekends and holidays are passed through without counting. With `days > 0`
/// the result is always a business day; `days == 0` returns `date` unchanged.
pub fn subtract_business_days(date: NaiveDate, days: u32, calendar: &HolidayCalendar) -> NaiveDate {
    let mut current = date;
    let mut remaining = days;

    while remaining > 0 {
        current = match current.pred_opt() {
            Some(d) => d,
            // Bottom of chrono's range
            None => break,
        };
        if is_business_day(&current, calendar) {
            remaining -= 1;
        }
    }

    current
}

/// Plain calendar-day subtraction. `None` if the result leaves chrono's range.
pub fn subtract_calendar_days(date: NaiveDate, days: u32) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(days)))
}

/// Signed calendar days by which `actual` follows `target`.
/// Positive = late, negative = early, zero = on time.
pub fn get_lag_days(target: NaiveDate, actual: NaiveDate) -> i64 {
    actual.signed_duration_since(target).num_days()
}
