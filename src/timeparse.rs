//! Free-text date and time parsing for task deadlines.
//!
//! Input typed into the task-creation modals is matched against an
//! explicit, ordered list of alternatives; the first hit wins and a
//! catch-all error ends the chain. The order matters for ambiguous
//! numeric dates: day-first formats are tried before month-first, so
//! `05/04/2024` reads as the 5th of April.
//!
//! Accepted date inputs, in match order:
//!
//! 1. Numeric formats (`20-10-2024`, `20/10/24`, `20.10.2024`, and the
//!    month-first equivalents)
//! 2. Month names (`October 20`, `October 20, 2024`)
//! 3. Named offsets (`today`, `tomorrow`, `next week`, `next month`,
//!    `next year`)
//! 4. Relative offsets (`3d`, `3 days`, `2w`, `1mo`, `1y`)
//!
//! Accepted time inputs: `10:00 AM`, `10:00PM`, `22:00`, `22:00:30`.

use chrono::{Days, NaiveDate, NaiveTime};
use thiserror::Error;

/// Free-text input matched none of the accepted alternatives.
#[derive(Debug, Error, PartialEq)]
pub enum TimeParseError {
    #[error("unrecognized date: {0}")]
    Date(String),
    #[error("unrecognized time: {0}")]
    Time(String),
}

/// Numeric date formats, day-first before month-first. Two-digit years
/// come before four-digit ones because `%Y` also accepts short years and
/// would otherwise read `21` as the year 21.
const DATE_FORMATS: &[&str] = &[
    "%d-%m-%y", "%d/%m/%y", "%d.%m.%y", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y",
    "%m-%d-%y", "%m/%d/%y", "%m.%d.%y", "%m-%d-%Y", "%m/%d/%Y", "%m.%d.%Y",
];

const TIME_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M:%S", "%H:%M"];

/// Days attributed to each relative unit alias.
const UNITS: &[(u64, &[&str])] = &[
    (1, &["d", "day", "days"]),
    (7, &["w", "wk", "wks", "week", "weeks"]),
    (30, &["mo", "mos", "month", "months"]),
    (365, &["y", "yr", "yrs", "year", "years"]),
];

/// Parses a date, resolving relative inputs against `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, TimeParseError> {
    let trimmed = input.trim().to_ascii_lowercase();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&trimmed, format) {
            return Ok(date);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&trimmed, "%B %d, %Y") {
        return Ok(date);
    }
    // A bare "October 20" gets the current year attached.
    if let Ok(date) =
        NaiveDate::parse_from_str(&format!("{trimmed} {}", today.format("%Y")), "%B %d %Y")
    {
        return Ok(date);
    }

    if let Some(date) = parse_named_offset(&trimmed, today) {
        return Ok(date);
    }
    if let Some(date) = parse_relative_offset(&trimmed, today) {
        return Ok(date);
    }

    Err(TimeParseError::Date(input.trim().to_string()))
}

/// Parses a time of day.
pub fn parse_time(input: &str) -> Result<NaiveTime, TimeParseError> {
    // %p wants AM/PM; accept lowercase input too.
    let trimmed = input.trim().to_ascii_uppercase();

    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&trimmed, format) {
            return Ok(time);
        }
    }

    Err(TimeParseError::Time(input.trim().to_string()))
}

fn parse_named_offset(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let days = match input {
        "today" => 0,
        "tomorrow" => 1,
        "next week" => 7,
        "next month" => 30,
        "next year" => 365,
        _ => return None,
    };
    today.checked_add_days(Days::new(days))
}

/// Matches `<count><unit>` and `<count> <unit>` against the unit table.
fn parse_relative_offset(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let digits_end = input.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let count: u64 = input[..digits_end].parse().ok()?;
    let unit = input[digits_end..].trim();

    let days_per_unit = UNITS
        .iter()
        .find(|(_, aliases)| aliases.contains(&unit))
        .map(|(days, _)| *days)?;
    today.checked_add_days(Days::new(count * days_per_unit))
}
