//! Import orchestration: validate, fetch, parse, then notify every handler
//! once per parsed event.
//!
//! The importer writes nothing itself. Persistence is one handler among
//! others (see `crate::persist`).

use crate::error::{CalResult, CalendarizeError};
use crate::event::RawEventRecord;
use crate::feed::{FeedFetcher, validate_url};
use crate::ics;
use crate::message::{Message, Messages};

/// Notification sent to handlers for each imported event.
pub struct ImportSignal<'a> {
    pub event: &'a RawEventRecord,
    /// Container the event is imported into
    pub pid: u64,
    /// Set once a handler reported it handled the event. Later handlers are
    /// still called and decide themselves whether to skip.
    pub handled: bool,
    /// Messages of the running import; handlers may add their own
    pub messages: &'a mut Messages,
}

pub trait ImportHandler {
    /// Returns true when the event was handled (e.g. persisted).
    fn handle(&mut self, signal: &mut ImportSignal<'_>) -> bool;
}

struct FnHandler<F>(F);

impl<F> ImportHandler for FnHandler<F>
where
    F: FnMut(&mut ImportSignal<'_>) -> bool,
{
    fn handle(&mut self, signal: &mut ImportSignal<'_>) -> bool {
        (self.0)(signal)
    }
}

/// Outcome of one import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub messages: Vec<Message>,
    /// VEVENTs in the feed
    pub found: usize,
    /// Events with usable dates
    pub prepared: usize,
    /// Notifications sent, one per prepared event
    pub dispatched: usize,
    /// Notifications at least one handler handled
    pub handled: usize,
    /// Set when the run aborted
    pub failure: Option<CalendarizeError>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

pub struct Importer<'h> {
    fetcher: FeedFetcher,
    handlers: Vec<Box<dyn ImportHandler + 'h>>,
}

impl<'h> Importer<'h> {
    pub fn new(fetcher: FeedFetcher) -> Self {
        Importer {
            fetcher,
            handlers: Vec::new(),
        }
    }

    /// Handlers are called in registration order.
    pub fn register(&mut self, handler: impl ImportHandler + 'h) {
        self.handlers.push(Box::new(handler));
    }

    pub fn register_fn<F>(&mut self, handler: F)
    where
        F: FnMut(&mut ImportSignal<'_>) -> bool + 'h,
    {
        self.register(FnHandler(handler));
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Import the feed at `ics_calendar_uri` into container `pid`.
    ///
    /// Never fails outright: problems end up as messages in the report, and
    /// an aborted run also carries the error in `failure`. Invalid input is
    /// rejected before anything is downloaded.
    pub async fn import(&mut self, ics_calendar_uri: Option<&str>, pid: Option<&str>) -> ImportReport {
        let mut messages = Messages::new();
        let mut report = ImportReport::default();

        if let Err(e) = self.run(ics_calendar_uri, pid, &mut messages, &mut report).await {
            let title = match e {
                CalendarizeError::InvalidInput(_) => "Error",
                CalendarizeError::FetchFailed(_) => "Fetch",
                _ => "Import",
            };
            messages.error(title, e.to_string());
            report.failure = Some(e);
        }

        report.messages = messages.into_vec();
        report
    }

    async fn run(
        &mut self,
        ics_calendar_uri: Option<&str>,
        pid: Option<&str>,
        messages: &mut Messages,
        report: &mut ImportReport,
    ) -> CalResult<()> {
        let uri = ics_calendar_uri
            .filter(|uri| validate_url(uri).is_ok())
            .ok_or_else(|| {
                CalendarizeError::InvalidInput(
                    "You have to enter a valid URL to the iCalendar ICS".to_string(),
                )
            })?;
        let pid = validate_pid(pid)?;

        messages.info("Calendar", format!("Start to checkout the calendar: {}", uri));
        let feed = self.fetcher.fetch(uri).await?;
        log::debug!("Feed {} cached at {}", feed.url, feed.cache_path.display());

        let parsed = ics::parse_file(&feed.cache_path)?;
        report.found = parsed.found;
        messages.info(
            "Items",
            format!("Found {} events in the given calendar", parsed.found),
        );

        for skipped in &parsed.skipped {
            messages.warning("Warning", skipped.warning());
        }

        report.prepared = parsed.records.len();
        messages.info(
            "Items",
            format!("Found {} events in {}", parsed.records.len(), uri),
        );

        if self.handlers.is_empty() {
            log::warn!("No import handler registered, nothing will be stored");
        }

        messages.info(
            "Signal",
            format!("Send the import signal for each of the {} events", parsed.records.len()),
        );

        for record in &parsed.records {
            let mut signal = ImportSignal {
                event: record,
                pid,
                handled: false,
                messages: &mut *messages,
            };

            for handler in self.handlers.iter_mut() {
                if handler.handle(&mut signal) {
                    signal.handled = true;
                }
            }

            report.dispatched += 1;
            if signal.handled {
                report.handled += 1;
            }
        }

        Ok(())
    }
}

/// A container id must be a non-negative integer.
pub fn validate_pid(pid: Option<&str>) -> CalResult<u64> {
    pid.and_then(|p| p.trim().parse::<u64>().ok()).ok_or_else(|| {
        CalendarizeError::InvalidInput(
            "You have to enter a valid PID for the new created elements".to_string(),
        )
    })
}
