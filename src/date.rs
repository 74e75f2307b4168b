//! Calendar arithmetic on plain dates.
//!
//! Everything here works on [`NaiveDate`], i.e. wall-clock year/month/day with
//! no time zone attached, so a task dated `2024-06-10` stays on that day no
//! matter where the program runs.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta};

use crate::error::DateError;

/// Language used for weekday labels and date titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "zh" | "cn" | "chinese" => Ok(Locale::Zh),
            other => Err(format!("unknown locale '{}', expected en or zh", other)),
        }
    }
}

/// Weekday labels indexed by day-of-week, 0 = Sunday.
pub const EN_WEEKDAY: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Weekday labels indexed by day-of-week, 0 = Sunday.
pub const CN_WEEKDAY: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];

/// Formats a date as `YYYY-MM-DD` with zero-padded month and day.
///
/// Years are padded to four digits; years before 1 BCE get a leading `-`.
pub fn to_iso_date(date: NaiveDate) -> String {
    let year = date.year();
    let sign = if year < 0 { "-" } else { "" };
    format!("{}{:04}-{:02}-{:02}", sign, year.unsigned_abs(), date.month(), date.day())
}

/// Parses a `YYYY-MM-DD` string into a date.
///
/// Exactly three numeric components are required and they must name a real
/// day. Unpadded components such as `2024-6-1` are accepted, and a leading
/// `-` marks a negative year.
pub fn parse_iso_date(iso: &str) -> Result<NaiveDate, DateError> {
    let trimmed = iso.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let parts: Vec<&str> = body.split('-').collect();
    let [y, m, d] = parts.as_slice() else {
        return Err(DateError::Malformed(iso.to_string()));
    };
    let malformed = || DateError::Malformed(iso.to_string());
    if !y.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let magnitude: i32 = y.parse().map_err(|_| malformed())?;
    let year = if negative { -magnitude } else { magnitude };
    let month: u32 = m.parse().map_err(|_| malformed())?;
    let day: u32 = d.parse().map_err(|_| malformed())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateError::OutOfRange(iso.to_string()))
}

/// Parses a 24-hour `HH:mm` time.
pub fn parse_clock_time(s: &str) -> Result<NaiveTime, DateError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| DateError::MalformedTime(s.to_string()))
}

/// Formats a time as `HH:mm`.
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Returns `date` shifted by `days` calendar days (negative moves backwards).
///
/// Results beyond the representable range saturate at `NaiveDate::MIN`/`MAX`.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Returns the first day of the week containing `date`.
///
/// With `monday_first`, a Sunday belongs to the week that began six days
/// earlier.
pub fn start_of_week(date: NaiveDate, monday_first: bool) -> NaiveDate {
    let day = i64::from(date.weekday().num_days_from_sunday());
    let shift = if monday_first {
        if day == 0 { -6 } else { 1 - day }
    } else {
        -day
    };
    add_days(date, shift)
}

/// The seven consecutive dates starting at `week_start`.
pub fn week_dates(week_start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| add_days(week_start, i as i64))
}

/// Short weekday label for `date`.
pub fn weekday_label(date: NaiveDate, locale: Locale) -> &'static str {
    let idx = date.weekday().num_days_from_sunday() as usize;
    match locale {
        Locale::En => EN_WEEKDAY[idx],
        Locale::Zh => CN_WEEKDAY[idx],
    }
}

/// Day-view header, e.g. `Sun, 1 Feb 2026` or `2026年2月1日 · 周日`.
pub fn format_date_title(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::En => format!("{}, {}", weekday_label(date, locale), date.format("%-d %b %Y")),
        Locale::Zh => format!(
            "{}年{}月{}日 · {}",
            date.year(),
            date.month(),
            date.day(),
            weekday_label(date, locale)
        ),
    }
}

/// Week-view header spanning `week_start` to six days later.
pub fn format_week_range(week_start: NaiveDate, locale: Locale) -> String {
    let end = add_days(week_start, 6);
    match locale {
        Locale::En => format!("{} - {}", week_start.format("%-d %b %Y"), end.format("%-d %b")),
        Locale::Zh => format!(
            "{}年{}月{}日 - {}月{}日",
            week_start.year(),
            week_start.month(),
            week_start.day(),
            end.month(),
            end.day()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_dates() -> impl Iterator<Item = NaiveDate> {
        let start = ymd(2023, 12, 1);
        (0..800).map(move |i| add_days(start, i))
    }

    #[test]
    fn iso_round_trip_preserves_components() {
        for d in sample_dates() {
            let back = parse_iso_date(&to_iso_date(d)).unwrap();
            assert_eq!((back.year(), back.month(), back.day()), (d.year(), d.month(), d.day()));
        }
    }

    #[test]
    fn iso_formatting_is_zero_padded() {
        assert_eq!(to_iso_date(ymd(2024, 6, 1)), "2024-06-01");
        assert_eq!(to_iso_date(ymd(2024, 12, 31)), "2024-12-31");
        assert_eq!(to_iso_date(ymd(33, 1, 5)), "0033-01-05");
        assert_eq!(to_iso_date(ymd(-1, 3, 4)), "-0001-03-04");
    }

    #[test]
    fn iso_round_trip_covers_extreme_years() {
        for d in [ymd(-1, 3, 4), ymd(0, 2, 29), ymd(7, 12, 31), NaiveDate::MIN, NaiveDate::MAX] {
            assert_eq!(parse_iso_date(&to_iso_date(d)).unwrap(), d);
        }
        assert_eq!(parse_iso_date("-1-03-04").unwrap(), ymd(-1, 3, 4));
        assert!(matches!(parse_iso_date("--1-03-04"), Err(DateError::Malformed(_))));
        assert!(matches!(parse_iso_date("+2024-01-01"), Err(DateError::Malformed(_))));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(matches!(parse_iso_date("2024-06"), Err(DateError::Malformed(_))));
        assert!(matches!(parse_iso_date("2024-xx-01"), Err(DateError::Malformed(_))));
        assert!(matches!(parse_iso_date(""), Err(DateError::Malformed(_))));
        assert!(matches!(parse_iso_date("2024-02-30"), Err(DateError::OutOfRange(_))));
        assert_eq!(parse_iso_date("2024-6-1").unwrap(), ymd(2024, 6, 1));
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days(ymd(2024, 1, 31), 1), ymd(2024, 2, 1));
        assert_eq!(add_days(ymd(2024, 3, 1), -1), ymd(2024, 2, 29));
        assert_eq!(add_days(ymd(2023, 12, 31), 1), ymd(2024, 1, 1));
        assert_eq!(add_days(ymd(2024, 1, 1), -1), ymd(2023, 12, 31));
    }

    #[test]
    fn add_days_is_reversible() {
        for d in sample_dates().step_by(7) {
            for n in [-400, -31, -1, 0, 1, 45, 366] {
                assert_eq!(add_days(add_days(d, n), -n), d);
            }
        }
    }

    #[test]
    fn add_days_saturates() {
        assert_eq!(add_days(ymd(2024, 1, 1), i64::MAX), NaiveDate::MAX);
        assert_eq!(add_days(ymd(2024, 1, 1), i64::MIN), NaiveDate::MIN);
    }

    #[test]
    fn monday_week_start_contains_date() {
        for d in sample_dates() {
            let start = start_of_week(d, true);
            assert_eq!(start.weekday(), Weekday::Mon);
            assert!(start <= d && d <= add_days(start, 6));
        }
    }

    #[test]
    fn sunday_maps_to_previous_monday() {
        // 2024-06-16 is a Sunday.
        assert_eq!(start_of_week(ymd(2024, 6, 16), true), ymd(2024, 6, 10));
        assert_eq!(start_of_week(ymd(2024, 6, 16), false), ymd(2024, 6, 16));
        assert_eq!(start_of_week(ymd(2024, 6, 12), false), ymd(2024, 6, 9));
    }

    #[test]
    fn titles_in_both_locales() {
        let d = ymd(2026, 2, 1);
        assert_eq!(format_date_title(d, Locale::Zh), "2026年2月1日 · 周日");
        assert_eq!(format_date_title(d, Locale::En), "Sun, 1 Feb 2026");
        assert_eq!(format_week_range(ymd(2026, 1, 26), Locale::Zh), "2026年1月26日 - 2月1日");
    }

    #[test]
    fn week_dates_are_consecutive() {
        let days = week_dates(ymd(2024, 12, 30));
        assert_eq!(days[0], ymd(2024, 12, 30));
        assert_eq!(days[6], ymd(2025, 1, 5));
    }
}
