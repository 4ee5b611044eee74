//! Lot number formatting.
//!
//! A lot number is the year code (`year - 2000`, three digits) followed by
//! the day of the year (three digits), then optionally `E` and the embossing
//! day on two digits: packaging on 2025-11-25 embossed on day 24 gives
//! `025329E24`. Only the years 2000 to 2999 have a year code.

use chrono::{Datelike, NaiveDate};

/// Builds the lot number for a packaging date, or `None` when the year has
/// no three-digit year code.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use weightcheck::inspection::lot_number;
///
/// let date = NaiveDate::from_ymd_opt(2025, 11, 25).unwrap();
/// assert_eq!(lot_number(date, Some(24)).as_deref(), Some("025329E24"));
/// assert_eq!(lot_number(date, None).as_deref(), Some("025329"));
/// ```
pub fn lot_number(packaging_date: NaiveDate, embossing_day: Option<u8>) -> Option<String> {
    let year_code = year_code(packaging_date)?;
    let base = format!("{year_code:03}{:03}", packaging_date.ordinal());
    Some(match embossing_day {
        Some(day) if day > 0 => format!("{base}E{day:02}"),
        _ => base,
    })
}

/// `year - 2000` for the years 2000..=2999.
pub(crate) fn year_code(date: NaiveDate) -> Option<i32> {
    let code = date.year() - 2000;
    (0..1000).contains(&code).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_first_day_of_year() {
        assert_eq!(lot_number(date(2026, 1, 1), Some(3)).as_deref(), Some("026001E03"));
    }

    #[test]
    fn test_leap_year_last_day() {
        assert_eq!(lot_number(date(2024, 12, 31), None).as_deref(), Some("024366"));
    }

    #[test]
    fn test_zero_embossing_day_is_omitted() {
        assert_eq!(lot_number(date(2025, 2, 10), Some(0)).as_deref(), Some("025041"));
    }

    #[test]
    fn test_years_without_code() {
        assert_eq!(lot_number(date(1995, 6, 1), Some(5)), None);
        assert_eq!(lot_number(date(3000, 1, 1), None), None);
        assert_eq!(lot_number(date(2000, 1, 1), None).as_deref(), Some("000001"));
        assert_eq!(lot_number(date(2999, 12, 31), None).as_deref(), Some("999365"));
    }
}
