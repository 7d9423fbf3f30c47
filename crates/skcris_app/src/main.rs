mod cli;
mod config;
mod logging;

use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use scrape_logging::{scrape_info, scrape_warn};
use skcris_core::RequestBuilder;
use skcris_engine::{
    write_dataset, CrawlEvent, CrawlSettings, Crawler, EngineEvent, EngineHandle, FetchSettings,
    ReqwestTransport,
};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log.into(), cli.log_level.into());

    let input = config::load_input(&cli)?;
    let builder = Arc::new(RequestBuilder::new(input.base_url.as_str())?);
    let start_urls = input.resolve_start_urls(&builder)?;
    let transport = Arc::new(ReqwestTransport::new(FetchSettings::default())?);
    let crawler = Crawler::new(transport, builder, CrawlSettings::from_input(&input));
    let handle = EngineHandle::new(crawler)?;

    scrape_info!("Starting crawl from {} URLs", start_urls.len());
    handle.crawl(start_urls);
    let report = loop {
        match handle.recv() {
            Some(EngineEvent::Progress(event)) => log_progress(&event),
            Some(EngineEvent::CrawlCompleted(result)) => break result?,
            None => bail!("crawl engine stopped before reporting"),
        }
    };

    for failure in &report.failures {
        scrape_warn!(
            "Failed {} after {} attempts: {}",
            failure.url,
            failure.attempts,
            failure.message
        );
    }
    if input.listing_count_only {
        return Ok(());
    }

    let name = config::dataset_name(&cli, &input);
    let path = write_dataset(&cli.output_dir, &name, &report.records)?;
    scrape_info!(
        "Done: {} records in {}, {} failed",
        report.records.len(),
        path.display(),
        report.failures.len()
    );
    Ok(())
}

fn log_progress(event: &CrawlEvent) {
    match event {
        CrawlEvent::ListingStarted { resource_type, url } => {
            scrape_info!("Listing {} from {}", resource_type, url)
        }
        CrawlEvent::EntriesQueued {
            resource_type,
            page,
            added,
            total_queued,
        } => scrape_info!(
            "{} page {}: {} new entries, {} queued",
            resource_type,
            page,
            added,
            total_queued
        ),
        CrawlEvent::ListingFinished {
            resource_type,
            summary,
        } => {
            scrape_info!(
                "Listing {} done: {} results, {} pages, {} entries",
                resource_type,
                summary.count,
                summary.pages_fetched,
                summary.entries_emitted
            );
            if summary.truncated {
                scrape_warn!("Some {} entries were hidden by the listing ceiling", resource_type);
            }
        }
        CrawlEvent::RecordScraped { url, .. } => scrape_info!("Scraped {}", url),
        CrawlEvent::RequestFailed { url, message, .. } => {
            scrape_warn!("Request failed for {}: {}", url, message)
        }
    }
}
