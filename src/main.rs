//! # Free LEGO Events CLI
//!
//! Command-line front end over the [`free_lego_events`] pipeline.
//!
//! ## Usage
//!
//! ```sh
//! free_lego_events scrape
//! free_lego_events list
//! free_lego_events export auto_1 -o lego_event_auto_1.ics
//! free_lego_events export-all -o all_lego_events.ics
//! free_lego_events subscribe 12345 london manchester
//! ```
//!
//! Run `scrape` from cron (or any scheduler) to poll the source periodically.

use std::error::Error;
use std::path::Path;

use clap::Parser;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use free_lego_events::config::AppConfig;
use free_lego_events::fetcher::HttpFetcher;
use free_lego_events::models::{Catalog, Subscribers};
use free_lego_events::notify::{self, LogDeliver};
use free_lego_events::pipeline;
use free_lego_events::store::{JsonFileStore, SnapshotStore};
use free_lego_events::utils::upcase;

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(path) = args.events_file {
        config.catalog_path = path;
    }
    if let Some(path) = args.users_file {
        config.subscribers_path = path;
    }

    let catalog_store: JsonFileStore<Catalog> = JsonFileStore::new(&config.catalog_path);
    let subscriber_store: JsonFileStore<Subscribers> = JsonFileStore::new(&config.subscribers_path);

    match args.command {
        Command::Scrape => scrape(&config, &catalog_store, &subscriber_store).await?,
        Command::List { limit } => list(&catalog_store.load()?, limit),
        Command::Export { id, output } => {
            let catalog = catalog_store.load()?;
            let ics = pipeline::export_event(&catalog, &id).inspect_err(|e| {
                error!(%id, error = %e, "Could not build calendar file");
            })?;
            write_output(&ics, output.as_deref())?;
        }
        Command::ExportAll { output } => {
            let catalog = catalog_store.load()?;
            let ics = pipeline::export_all(&catalog)?;
            write_output(&ics, output.as_deref())?;
        }
        Command::Subscribe {
            recipient,
            locations,
        } => {
            let mut subscribers = subscriber_store.load()?;
            let subscriber = subscribers.entry(recipient.clone()).or_default();
            for location in &locations {
                subscriber.subscribe_to(location);
            }
            subscriber_store.save(&subscribers)?;
            let tags: Vec<String> = locations.iter().map(|l| upcase(l)).collect();
            println!("Subscribed {recipient} to {}", tags.join(", "));
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn scrape(
    config: &AppConfig,
    catalog_store: &JsonFileStore<Catalog>,
    subscriber_store: &JsonFileStore<Subscribers>,
) -> Result<(), Box<dyn Error>> {
    let fetcher = HttpFetcher::from_config(config);
    let added = pipeline::run_cycle(&fetcher, catalog_store, config.block_limit).await?;

    if added.is_empty() {
        println!("No new events found.");
        return Ok(());
    }

    let subscribers = subscriber_store.load()?;
    let report = notify::broadcast(&LogDeliver, &subscribers, &added, config.notify_delay()).await;
    info!(delivered = report.delivered, failed = report.failed, "Announced new events");

    let total = catalog_store.load()?.len();
    println!("Found {} new event(s); {total} in the catalog.", added.len());
    Ok(())
}

fn list(catalog: &Catalog, limit: usize) {
    if catalog.is_empty() {
        println!("No events yet. Run `scrape` to look for some.");
        return;
    }

    for event in pipeline::upcoming(catalog, limit) {
        println!("{}", event.title);
        println!("  Location: {}", event.location);
        println!("  Date:     {}", event.date_display);
        println!("  Store:    {}", event.store);
        if !event.url.is_empty() {
            println!("  Link:     {}", event.url);
        }
        println!("  Export:   export {}", event.id);
        println!("{}", "-".repeat(30));
    }
}

fn write_output(ics: &str, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, ics)?;
            info!(path = %path.display(), bytes = ics.len(), "Wrote calendar file");
        }
        None => print!("{ics}"),
    }
    Ok(())
}
