//! Age calculation
//!
//! WHO growth standards index the age tables by completed months: the
//! calendar month difference, decremented when the day of month has not yet
//! been reached. This is not calendar rounding.

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::GrowthError;

/// Today's calendar date (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a date in ISO form (`2023-06-10`) or the register's day-first form
/// (`10-06-2023`).
pub fn parse_date(text: &str) -> Result<NaiveDate, GrowthError> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d-%m-%Y"))
        .map_err(|_| GrowthError::DateParseError(format!("unrecognized date: {text}")))
}

/// Age in completed months at a given observation date.
///
/// Negative differences (observation before birth) floor to 0.
pub fn age_in_months_at(birth_date: NaiveDate, as_of: NaiveDate) -> u32 {
    let mut months = (as_of.year() - birth_date.year()) * 12
        + (as_of.month() as i32 - birth_date.month() as i32);

    if (as_of.day() as i32) < (birth_date.day() as i32) {
        months -= 1;
    }

    months.max(0) as u32
}

/// Age in completed months as of today
pub fn age_in_months(birth_date: NaiveDate) -> u32 {
    age_in_months_at(birth_date, today())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_decrements_before_day_of_month() {
        // 2023-01-15 to 2023-06-10: five calendar months, but the 15th has
        // not been reached, so four completed months.
        assert_eq!(age_in_months_at(date(2023, 1, 15), date(2023, 6, 10)), 4);
        assert_eq!(age_in_months_at(date(2023, 1, 15), date(2023, 6, 15)), 5);
        assert_eq!(age_in_months_at(date(2023, 1, 15), date(2023, 6, 16)), 5);
    }

    #[test]
    fn test_same_day_is_zero() {
        assert_eq!(age_in_months_at(date(2024, 5, 20), date(2024, 5, 20)), 0);
    }

    #[test]
    fn test_floors_at_zero() {
        // Observation before birth never goes negative.
        assert_eq!(age_in_months_at(date(2024, 5, 20), date(2024, 5, 1)), 0);
        assert_eq!(age_in_months_at(date(2024, 5, 20), date(2023, 12, 1)), 0);
    }

    #[test]
    fn test_year_boundary() {
        assert_eq!(age_in_months_at(date(2022, 11, 30), date(2023, 2, 28)), 2);
        assert_eq!(age_in_months_at(date(2022, 11, 30), date(2023, 3, 30)), 4);
    }

    #[test]
    fn test_five_year_span() {
        assert_eq!(age_in_months_at(date(2019, 3, 10), date(2024, 3, 10)), 60);
        assert_eq!(age_in_months_at(date(2019, 3, 10), date(2024, 3, 9)), 59);
    }

    #[test]
    fn test_parse_date_both_forms() {
        assert_eq!(parse_date("2023-06-10").unwrap(), date(2023, 6, 10));
        assert_eq!(parse_date("10-06-2023").unwrap(), date(2023, 6, 10));
        assert_eq!(parse_date(" 15-01-2023 ").unwrap(), date(2023, 1, 15));
        assert!(matches!(
            parse_date("June 10, 2023"),
            Err(GrowthError::DateParseError(_))
        ));
    }

    #[test]
    fn test_monotonic_over_days() {
        // For a fixed birth date, age never decreases as the observation
        // date advances day by day.
        let birth = date(2023, 1, 31);
        let mut previous = 0;
        let mut day = birth;
        for _ in 0..400 {
            day = day.succ_opt().unwrap();
            let age = age_in_months_at(birth, day);
            assert!(age >= previous, "age regressed at {day}");
            previous = age;
        }
    }
}
