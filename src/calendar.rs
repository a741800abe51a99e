//! iCalendar (RFC 5545) export of catalog events.
//!
//! Two entry points share one component layout:
//!
//! - [`encode_single`]: one `VEVENT` with a display alarm one day before the
//!   start. Fails explicitly when the event has no usable date.
//! - [`encode_batch`]: one `VEVENT` per dated event, no alarms. Undated or
//!   unparseable events are left out silently; only an empty result fails.
//!
//! Every event is placed in [`REFERENCE_TZ`], whatever its `location` says,
//! and lasts [`EVENT_DURATION_HOURS`].
//!
//! # Accepted date layouts
//!
//! | Layout | Example |
//! |--------|---------|
//! | ISO date | `2025-12-05` |
//! | ISO date and time | `2025-12-05T10:30:00`, `2025-12-05 10:30` |
//! | Synthesized by the scraper | `2025-December-5` |

use chrono::{Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use icalendar::{Alarm, Calendar, CalendarDateTime, Component, Event as IcalEvent, EventLike, Property};
use tracing::{debug, info, instrument, warn};

use crate::error::EncodeError;
use crate::models::{Event, TBA};
use crate::parser::dates::month_number;

pub const REFERENCE_TZ: Tz = chrono_tz::Europe::London;
pub const EVENT_DURATION_HOURS: i64 = 2;
pub const REMINDER_DAYS_BEFORE: i64 = 1;
pub const REMINDER_TEXT: &str = "Free LEGO event tomorrow!";
pub const CALENDAR_NAME: &str = "LEGO Events UK";
pub const PRODUCT_ID: &str = "-//LEGO Events UK//EN";
pub const UID_NAMESPACE: &str = "legoeventsuk";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Read a stored event date as a local date and time.
///
/// Date-only values start at midnight. Returns `None` for the `TBA`
/// sentinel and for anything outside the accepted layouts.
pub fn parse_event_date(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    if date.is_empty() || date == TBA {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, fmt) {
            return Some(dt);
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0);
    }
    parse_named_month(date)
}

/// `YYYY-<MonthName>-D`, the layout written by [`crate::parser::dates`].
fn parse_named_month(date: &str) -> Option<NaiveDateTime> {
    let mut parts = date.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = month_number(parts.next()?)?;
    let day = parts.next()?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

fn localize(event: &Event) -> Result<chrono::DateTime<Tz>, EncodeError> {
    if event.is_tba() || event.date.trim().is_empty() {
        return Err(EncodeError::MissingDate {
            id: event.id.clone(),
        });
    }
    let naive = parse_event_date(&event.date).ok_or_else(|| EncodeError::UnparseableDate {
        id: event.id.clone(),
        date: event.date.clone(),
    })?;

    match REFERENCE_TZ.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        // Repeated hour at the end of summer time: take standard time.
        LocalResult::Ambiguous(_, standard) => Ok(standard),
        LocalResult::None => Err(EncodeError::NonexistentLocalTime {
            id: event.id.clone(),
            date: event.date.clone(),
            tz: REFERENCE_TZ.name().to_string(),
        }),
    }
}

fn zoned(dt: chrono::DateTime<Tz>) -> CalendarDateTime {
    CalendarDateTime::WithTimezone {
        date_time: dt.naive_local(),
        tzid: REFERENCE_TZ.name().to_string(),
    }
}

/// Build the `VEVENT` shared by both export paths.
fn component(event: &Event) -> Result<IcalEvent, EncodeError> {
    let start = localize(event)?;
    let end = start + Duration::hours(EVENT_DURATION_HOURS);

    Ok(IcalEvent::new()
        .uid(&format!("{}@{UID_NAMESPACE}", event.id))
        .summary(&event.title)
        .description(&format!("{}\n\nStore: {}", event.description, event.store))
        .location(&event.location)
        .starts(zoned(start))
        .ends(zoned(end))
        .done())
}

fn new_calendar() -> Calendar {
    let mut calendar = Calendar::empty();
    calendar
        .append_property(Property::new("VERSION", "2.0"))
        .append_property(Property::new("PRODID", PRODUCT_ID))
        .append_property(Property::new("CALSCALE", "GREGORIAN"))
        .name(CALENDAR_NAME);
    calendar
}

/// Encode one event, with a reminder one day ahead.
#[instrument(level = "info", skip_all, fields(id = %event.id))]
pub fn encode_single(event: &Event) -> Result<String, EncodeError> {
    let mut vevent = component(event).inspect_err(|e| warn!(error = %e, "Cannot encode event"))?;
    vevent.alarm(Alarm::display(
        REMINDER_TEXT,
        -Duration::days(REMINDER_DAYS_BEFORE),
    ));

    let mut calendar = new_calendar();
    calendar.push(vevent.done());
    debug!("Encoded single event");
    Ok(calendar.done().to_string())
}

/// Encode every dated event into one document.
#[instrument(level = "info", skip_all)]
pub fn encode_batch<'a, I>(events: I) -> Result<String, EncodeError>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut calendar = new_calendar();
    let mut count = 0usize;
    let mut skipped = 0usize;

    for event in events {
        match component(event) {
            Ok(vevent) => {
                calendar.push(vevent);
                count += 1;
            }
            Err(e) => {
                debug!(id = %event.id, reason = %e, "Leaving event out of batch export");
                skipped += 1;
            }
        }
    }

    if count == 0 {
        warn!(skipped, "No dated events to export");
        return Err(EncodeError::NoDatedEvents);
    }
    info!(count, skipped, "Encoded batch export");
    Ok(calendar.done().to_string())
}
