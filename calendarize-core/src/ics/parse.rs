//! Feed parsing using the icalendar crate's parser.

use std::borrow::Cow;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use super::text::unescape;
use crate::error::{CalResult, CalendarizeError};
use crate::event::RawEventRecord;

/// Result of parsing one feed.
#[derive(Debug, Default, Clone)]
pub struct ParsedFeed {
    /// Number of VEVENTs in the document, usable or not
    pub found: usize,
    /// Usable events in document order
    pub records: Vec<RawEventRecord>,
    /// Events dropped because of their dates
    pub skipped: Vec<SkippedEvent>,
}

/// A VEVENT that could not be turned into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    pub uid: String,
    pub summary: String,
    pub reason: String,
}

impl SkippedEvent {
    pub fn warning(&self) -> String {
        format!(
            "Could not convert the date in the right format of \"{}\" (UID {}): {}",
            self.summary, self.uid, self.reason
        )
    }
}

/// Read and parse a cached feed file.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD instead of
/// rejecting the whole feed.
pub fn parse_file(path: &Path) -> CalResult<ParsedFeed> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = content {
        log::warn!("{} is not valid UTF-8, invalid bytes were replaced", path.display());
    }
    parse_feed(&content)
}

/// Parse ICS content into event records.
///
/// A document that cannot be read as iCalendar at all is an error. Single
/// events with missing or unparseable DTSTART/DTEND are skipped.
pub fn parse_feed(content: &str) -> CalResult<ParsedFeed> {
    let unfolded = unfold(content);

    let head = unfolded.trim_start_matches('\u{feff}').trim_start();
    if !head
        .get(..15)
        .is_some_and(|begin| begin.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
    {
        return Err(CalendarizeError::MalformedFeed(
            "document does not start with BEGIN:VCALENDAR".to_string(),
        ));
    }

    let calendar =
        read_calendar(head).map_err(|e| CalendarizeError::MalformedFeed(e.to_string()))?;

    let mut parsed = ParsedFeed::default();

    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        parsed.found += 1;
        match parse_vevent(vevent) {
            Ok(record) => parsed.records.push(record),
            Err(skipped) => parsed.skipped.push(skipped),
        }
    }

    Ok(parsed)
}

fn parse_vevent(vevent: &Component) -> Result<RawEventRecord, SkippedEvent> {
    let text = |name: &str| {
        vevent
            .find_prop(name)
            .map(|p| unescape(p.val.as_ref()))
            .unwrap_or_default()
    };

    let uid = text("UID");
    let title = text("SUMMARY");
    let description = text("DESCRIPTION");
    let location = text("LOCATION");

    let skip = |reason: String| SkippedEvent {
        uid: uid.clone(),
        summary: title.clone(),
        reason,
    };

    let (start, all_day) = event_time(vevent, "DTSTART").map_err(&skip)?;
    let (end, _) = event_time(vevent, "DTEND").map_err(&skip)?;

    Ok(RawEventRecord {
        uid,
        start,
        end,
        all_day,
        title,
        description,
        location,
    })
}

/// Read a date property as a UTC timestamp plus whether it was a DATE value.
fn event_time(vevent: &Component, name: &str) -> Result<(DateTime<Utc>, bool), String> {
    let prop = vevent
        .find_prop(name)
        .ok_or_else(|| format!("missing {}", name))?;

    let value = DatePerhapsTime::try_from(prop)
        .map_err(|_| format!("unparseable {} '{}'", name, prop.val.as_ref()))?;

    to_utc(value).ok_or_else(|| format!("unresolvable {} '{}'", name, prop.val.as_ref()))
}

/// Dates become midnight UTC, floating times are read as UTC and zoned
/// times go through the IANA database.
fn to_utc(value: DatePerhapsTime) -> Option<(DateTime<Utc>, bool)> {
    match value {
        DatePerhapsTime::Date(d) => Some((d.and_hms_opt(0, 0, 0)?.and_utc(), true)),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => Some((dt, false)),
            CalendarDateTime::Floating(naive) => Some((naive.and_utc(), false)),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                let tz: Tz = tzid.parse().ok()?;
                let local = tz.from_local_datetime(&date_time).earliest()?;
                Some((local.with_timezone(&Utc), false))
            }
        },
    }
}
