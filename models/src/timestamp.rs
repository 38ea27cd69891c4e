// models/src/timestamp.rs
//! Wire formats for dates and times. Callers send ISO dates (`YYYY-MM-DD`) and
//! wall-clock times (`HH:MM`); listings display `DD/MM/YYYY`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::{SchedulingError, SchedulingResult};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
pub const HOUR_MINUTE_FORMAT: &str = "%H:%M";

pub fn parse_iso_date(raw: &str) -> SchedulingResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT)
        .map_err(|_| SchedulingError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Accepts `HH:MM` and, for callers that echo a stored value back, `HH:MM:SS`.
pub fn parse_hour_minute(raw: &str) -> SchedulingResult<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, HOUR_MINUTE_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| SchedulingError::Validation(format!("invalid time '{}', expected HH:MM", raw)))
}

pub fn format_hour_minute(at: &NaiveDateTime) -> String {
    at.format(HOUR_MINUTE_FORMAT).to_string()
}

pub fn format_display_date(date: &NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Day-of-week bucket with Sunday at 0, matching Postgres `EXTRACT(DOW ...)`.
pub fn weekday_index(date: &NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let date = parse_iso_date("2025-06-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert!(parse_iso_date("10/06/2025").is_err());
    }

    #[test]
    fn parses_hour_minute_with_optional_seconds() {
        let expected = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_hour_minute("14:30").unwrap(), expected);
        assert_eq!(parse_hour_minute("14:30:00").unwrap(), expected);
        assert!(parse_hour_minute("25:00").is_err());
        assert!(parse_hour_minute("").is_err());
    }

    #[test]
    fn formats_for_display() {
        let at = NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(format_hour_minute(&at), "09:05");
        assert_eq!(format_display_date(&at.date()), "10/06/2025");
    }

    #[test]
    fn sunday_is_bucket_zero() {
        // 2025-06-08 was a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        assert_eq!(weekday_index(&sunday), 0);
        assert_eq!(weekday_index(&sunday.succ_opt().unwrap()), 1);
    }
}
