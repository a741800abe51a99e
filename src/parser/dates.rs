//! Date synthesis from article headings.
//!
//! Headings announce dates as `<day> <Month> [<year>]`, e.g. "5 December" or
//! "12 March 2026". The matched pieces are stored verbatim as
//! `{year}-{Month}-{day}`: the month keeps its name and the day is not
//! zero-padded. [`crate::calendar`] knows how to read that layout back.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::TBA;

/// Display label for events without an announced date.
pub const PENDING_LABEL: &str = "To be announced";

/// Full English month names, January first.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(\d{{1,2}})\s+({})\s*(\d{{4}})?",
        MONTHS.join("|")
    ))
    .expect("valid date regex")
});

/// Month number (1-12) for a full English month name, ignoring case.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|month| month.eq_ignore_ascii_case(name))
        .map(|index| index as u32 + 1)
}

/// The `date` / `date_display` pair stored on an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedDate {
    pub date: String,
    pub display: String,
}

impl SynthesizedDate {
    fn pending() -> Self {
        Self {
            date: TBA.to_string(),
            display: PENDING_LABEL.to_string(),
        }
    }
}

/// Find the first `<day> <Month> [<year>]` in `heading`.
///
/// A missing year is filled with `current_year`. Without a match the result
/// is the [`TBA`] sentinel with [`PENDING_LABEL`].
pub fn synthesize_date(heading: &str, current_year: i32) -> SynthesizedDate {
    let Some(caps) = DATE_RE.captures(heading) else {
        return SynthesizedDate::pending();
    };

    let day = &caps[1];
    let month = &caps[2];
    let year = caps
        .get(3)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| current_year.to_string());

    let date = format!("{year}-{month}-{day}");
    SynthesizedDate {
        display: date.clone(),
        date,
    }
}
