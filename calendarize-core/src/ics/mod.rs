//! Reading iCalendar feeds.
//!
//! Only the parts of RFC 5545 needed to import events are handled here:
//! top-level VEVENTs with their UID, texts and start/end times.

mod parse;
mod text;

pub use parse::{ParsedFeed, SkippedEvent, parse_feed, parse_file};
pub use text::unescape;
