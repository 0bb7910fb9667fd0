//! Date normalization for Russian waybills.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

/// Years below this are shifted forward by 2000.
///
/// This is a heuristic carried over from the documents this parser was tuned
/// on, not a calendar rule: it compares the full parsed year, so a genuine
/// `01.01.1949` becomes `01.01.3949`.
pub const YEAR_PIVOT: i32 = 1950;

/// Accepted layouts, tried in order: `%d.%m.%Y`, `%d/%m/%Y`, `%d-%m-%Y`,
/// `%d.%m.%y`, `%d/%m/%y`, `%d-%m-%y`.
struct DateFormat {
    pattern: Regex,
    two_digit_year: bool,
}

lazy_static! {
    static ref DATE_FORMATS: Vec<DateFormat> = {
        let mut formats = Vec::new();
        for (year, two_digit_year) in [(r"([0-9]{4})", false), (r"([0-9]{2})", true)] {
            for sep in [r"\.", "/", "-"] {
                formats.push(DateFormat {
                    pattern: Regex::new(&format!(
                        r"^([0-9]{{1,2}}){sep}([0-9]{{1,2}}){sep}{year}$"
                    ))
                    .unwrap(),
                    two_digit_year,
                });
            }
        }
        formats
    };
}

/// Normalize a date string to `DD.MM.YYYY`.
///
/// Everything except digits and `.`, `/`, `-` is stripped before matching.
/// Unrecognized input is returned unchanged.
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | '-'))
        .collect();

    for format in DATE_FORMATS.iter() {
        if let Some(date) = parse_with(format, &cleaned) {
            return Some(date.format("%d.%m.%Y").to_string());
        }
    }

    warn!("Could not parse date: {:?}", raw);
    Some(raw.to_string())
}

fn parse_with(format: &DateFormat, cleaned: &str) -> Option<NaiveDate> {
    let caps = format.pattern.captures(cleaned)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;

    if format.two_digit_year {
        year += if year <= 68 { 2000 } else { 1900 };
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if date.year() < YEAR_PIVOT {
        date.with_year(date.year() + 2000)
    } else {
        Some(date)
    }
}
