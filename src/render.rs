//! Colored terminal rendering for calendarize-core types.

use calendarize_core::message::{Message, Severity};
use calendarize_core::{OccurrenceIndex, PersistedEvent};
use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Message {
    fn render(&self) -> String {
        let title = format!("[{}]", self.title);
        match self.severity {
            Severity::Info => format!("{} {}", title.dimmed(), self.body),
            Severity::Warning => format!("{} {}", title.yellow(), self.body.yellow()),
            Severity::Error => format!("{} {}", title.red(), self.body.red()),
        }
    }
}

impl Render for PersistedEvent {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("{} {}", format!("#{}", self.uid).dimmed(), self.to_string().bold()),
            format!("   {} {}", "when:".dimmed(), format_span(self.start, self.end, self.all_day)),
        ];

        if let Some(import_id) = &self.import_id {
            lines.push(format!("   {} {}", "uid:".dimmed(), import_id));
        }
        lines.push(format!("   {} {}", "pid:".dimmed(), self.pid));
        if !self.location.is_empty() {
            lines.push(format!("   {} {}", "location:".dimmed(), self.location));
        }
        if !self.description.is_empty() {
            lines.push(format!("   {} {}", "description:".dimmed(), self.description));
        }
        if self.hidden {
            lines.push(format!("   {}", "hidden".yellow()));
        }

        lines.join("\n")
    }
}

impl Render for OccurrenceIndex {
    fn render(&self) -> String {
        format!(
            "{} {}",
            format!("#{}", self.uid).dimmed(),
            format_span(self.start, self.end, self.all_day)
        )
    }
}

/// Format a start/end pair in local time (e.g. "2024-01-01 10:00 - 11:00")
pub fn format_span(start: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> String {
    if all_day {
        // All-day dates are stored as UTC midnights; converting them would shift the day
        let first = start.date_naive();
        let last = end.date_naive().pred_opt().unwrap_or(first).max(first);
        return if first == last {
            format!("{} all-day", first)
        } else {
            format!("{} - {} all-day", first, last)
        };
    }

    let start = start.with_timezone(&Local);
    let end = end.with_timezone(&Local);
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"))
    } else {
        format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%Y-%m-%d %H:%M"))
    }
}
