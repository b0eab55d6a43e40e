use anyhow::Result;
use calendarize_core::feed::FeedFetcher;
use calendarize_core::import::Importer;
use calendarize_core::persist::PersistHandler;
use calendarize_core::settings::Settings;
use owo_colors::OwoColorize;

use super::open_store;
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(settings: &Settings, ics_calendar_uri: Option<&str>, pid: Option<&str>) -> Result<()> {
    let fetcher = FeedFetcher::from_settings(settings)?;
    let mut store = open_store(settings)?;

    let spinner = create_spinner(format!(
        "Importing {}",
        ics_calendar_uri.unwrap_or("calendar")
    ));
    let report = {
        let mut importer = Importer::new(fetcher);
        importer.register(PersistHandler::new(&mut store));
        importer.import(ics_calendar_uri, pid).await
    };
    spinner.finish_and_clear();

    for message in &report.messages {
        println!("{}", message.render());
    }

    // Failures are already reported as messages above
    if report.is_success() {
        println!(
            "\nImported {} of {} events into {}",
            report.handled,
            report.found,
            store.path().display()
        );
    } else {
        println!("\n{}", "Import aborted".red());
    }

    Ok(())
}
