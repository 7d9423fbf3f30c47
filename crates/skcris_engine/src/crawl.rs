//! Crawl orchestration: listing traversals feed a de-duplicated detail queue,
//! detail records are scraped with bounded concurrency.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use scrape_logging::{scrape_error, scrape_info, scrape_warn, session_tag};
use skcris_core::{declared_relations, RequestBuilder, ResourceType, Route, ScrapeInput};

use crate::extract::{DetailTableExtractor, RecordExtractor};
use crate::linked::LinkedResourceAggregator;
use crate::listing::{
    EntrySink, ListingContext, ListingControl, ListingDriver, ListingOptions, ListingSummary,
};
use crate::record::DetailRecord;
use crate::session::{FetchOptions, SessionClient};
use crate::transport::Transport;
use crate::ScrapeError;

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub listing: ListingOptions,
    pub include_linked: bool,
    pub linked_per_page: u32,
    /// Stop queueing detail URLs once this many were queued.
    pub max_entries: Option<usize>,
    pub max_retries: u32,
    pub max_concurrency: usize,
    pub retry_delay: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_input(&ScrapeInput::default())
    }
}

impl CrawlSettings {
    pub fn from_input(input: &ScrapeInput) -> Self {
        Self {
            listing: ListingOptions {
                per_page: input.listing_items_per_page,
                count_only: input.listing_count_only,
                region: input.listing_filter_region,
                letter: input.pinned_letter(),
                ..ListingOptions::default()
            },
            include_linked: input.entry_include_linked_resources,
            linked_per_page: input.linked_items_per_page,
            max_entries: input.output_max_entries,
            max_retries: input.max_request_retries,
            max_concurrency: input.max_concurrency.max(1),
            retry_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    ListingStarted {
        resource_type: ResourceType,
        url: String,
    },
    EntriesQueued {
        resource_type: ResourceType,
        page: u32,
        added: usize,
        total_queued: usize,
    },
    ListingFinished {
        resource_type: ResourceType,
        summary: ListingSummary,
    },
    RecordScraped {
        url: String,
        guid: Option<String>,
    },
    RequestFailed {
        url: String,
        attempts: u32,
        message: String,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CrawlEvent);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrawlFailure {
    pub url: String,
    pub attempts: u32,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct CrawlReport {
    pub records: Vec<DetailRecord>,
    pub listings: Vec<ListingSummary>,
    pub failures: Vec<CrawlFailure>,
    /// Start URLs no route matched.
    pub skipped: Vec<String>,
}

#[derive(Debug, Default)]
struct DetailQueue {
    seen: HashSet<String>,
    items: Vec<(ResourceType, String)>,
}

impl DetailQueue {
    fn push(&mut self, resource_type: ResourceType, url: String) -> bool {
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.items.push((resource_type, url));
        true
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

struct QueueingSink<'a> {
    queue: &'a mut DetailQueue,
    max_entries: Option<usize>,
    progress: &'a dyn ProgressSink,
}

#[async_trait::async_trait]
impl EntrySink for QueueingSink<'_> {
    async fn on_entries(
        &mut self,
        context: &ListingContext,
        urls: Vec<String>,
    ) -> Result<ListingControl, ScrapeError> {
        let added = urls
            .into_iter()
            .filter(|url| self.queue.push(context.resource_type, url.clone()))
            .count();
        self.progress.emit(CrawlEvent::EntriesQueued {
            resource_type: context.resource_type,
            page: context.page,
            added,
            total_queued: self.queue.len(),
        });
        match self.max_entries {
            Some(max) if self.queue.len() >= max => {
                scrape_info!("Reached the maximum of {} entries, stopping the listing", max);
                Ok(ListingControl::Abort)
            }
            _ => Ok(ListingControl::Continue),
        }
    }
}

struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Logs the failure and waits when another attempt is allowed.
    async fn should_retry(&self, attempt: u32, url: &str, err: &ScrapeError) -> bool {
        if !err.is_retryable() || attempt > self.max_retries {
            return false;
        }
        scrape_warn!(
            "Attempt {} of {} failed for {}: {}",
            attempt,
            self.max_retries + 1,
            url,
            err
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        true
    }
}

pub struct Crawler {
    transport: Arc<dyn Transport>,
    builder: Arc<RequestBuilder>,
    extractor: Arc<dyn RecordExtractor>,
    settings: CrawlSettings,
}

impl Crawler {
    pub fn new(
        transport: Arc<dyn Transport>,
        builder: Arc<RequestBuilder>,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            transport,
            builder,
            extractor: Arc::new(DetailTableExtractor),
            settings,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn RecordExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub async fn run(
        &self,
        start_urls: &[String],
        progress: &dyn ProgressSink,
    ) -> Result<CrawlReport, ScrapeError> {
        let mut report = CrawlReport::default();
        let mut queue = DetailQueue::default();

        for url in start_urls {
            match Route::classify(url) {
                Some(Route::Listing(resource_type)) => {
                    self.crawl_listing(resource_type, url, &mut queue, &mut report, progress)
                        .await;
                }
                Some(Route::Detail(resource_type)) => {
                    queue.push(resource_type, url.clone());
                }
                None => {
                    scrape_warn!("No route handles {}, skipping it", url);
                    report.skipped.push(url.clone());
                }
            }
        }

        if let Some(max) = self.settings.max_entries {
            queue.items.truncate(max);
        }
        if self.settings.listing.count_only {
            return Ok(report);
        }

        scrape_info!(
            "Scraping {} detail pages with concurrency {}",
            queue.len(),
            self.settings.max_concurrency
        );
        let outcomes: Vec<(String, u32, Result<DetailRecord, ScrapeError>)> =
            stream::iter(queue.items)
                .map(|(resource_type, url)| async move {
                    let (attempts, result) = self.scrape_detail_with_retries(resource_type, &url).await;
                    (url, attempts, result)
                })
                .buffered(self.settings.max_concurrency.max(1))
                .collect()
                .await;

        for (url, attempts, result) in outcomes {
            match result {
                Ok(record) => {
                    progress.emit(CrawlEvent::RecordScraped {
                        url,
                        guid: record.guid.clone(),
                    });
                    report.records.push(record);
                }
                Err(err) => {
                    scrape_error!("Giving up on {} after {} attempts: {}", url, attempts, err);
                    let failure = CrawlFailure {
                        url,
                        attempts,
                        message: err.to_string(),
                    };
                    progress.emit(CrawlEvent::RequestFailed {
                        url: failure.url.clone(),
                        attempts,
                        message: failure.message.clone(),
                    });
                    report.failures.push(failure);
                }
            }
        }
        Ok(report)
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.settings.max_retries,
            delay: self.settings.retry_delay,
        }
    }

    async fn crawl_listing(
        &self,
        resource_type: ResourceType,
        url: &str,
        queue: &mut DetailQueue,
        report: &mut CrawlReport,
        progress: &dyn ProgressSink,
    ) {
        progress.emit(CrawlEvent::ListingStarted {
            resource_type,
            url: url.to_string(),
        });
        let policy = self.retry_policy();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.run_listing(resource_type, url, queue, progress).await {
                Ok(summary) => {
                    progress.emit(CrawlEvent::ListingFinished {
                        resource_type,
                        summary: summary.clone(),
                    });
                    report.listings.push(summary);
                    return;
                }
                Err(err) => err,
            };
            if policy.should_retry(attempt, url, &err).await {
                continue;
            }
            scrape_error!("Listing {} failed after {} attempts: {}", url, attempt, err);
            progress.emit(CrawlEvent::RequestFailed {
                url: url.to_string(),
                attempts: attempt,
                message: err.to_string(),
            });
            report.failures.push(CrawlFailure {
                url: url.to_string(),
                attempts: attempt,
                message: err.to_string(),
            });
            return;
        }
    }

    /// Opens a session from the listing page, then walks the listing.
    async fn run_listing(
        &self,
        resource_type: ResourceType,
        url: &str,
        queue: &mut DetailQueue,
        progress: &dyn ProgressSink,
    ) -> Result<ListingSummary, ScrapeError> {
        let session = self.session(resource_type);
        let request = self.builder.page_request(url, None);
        session.fetch(&request, FetchOptions::save_cookie()).await?;
        scrape_info!(
            "Listing {} opened session {}",
            resource_type,
            session_tag(session.cookie().as_deref())
        );

        let mut sink = QueueingSink {
            queue,
            max_entries: self.settings.max_entries,
            progress,
        };
        let mut driver = ListingDriver::new(&session, self.settings.listing.clone());
        driver.run(&mut sink).await
    }

    async fn scrape_detail_with_retries(
        &self,
        resource_type: ResourceType,
        url: &str,
    ) -> (u32, Result<DetailRecord, ScrapeError>) {
        let policy = self.retry_policy();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.scrape_detail(resource_type, url).await {
                Ok(record) => return (attempt, Ok(record)),
                Err(err) => err,
            };
            if !policy.should_retry(attempt, url, &err).await {
                return (attempt, Err(err));
            }
        }
    }

    /// Every detail record gets its own session, seeded by the detail page.
    pub async fn scrape_detail(
        &self,
        resource_type: ResourceType,
        url: &str,
    ) -> Result<DetailRecord, ScrapeError> {
        let session = self.session(resource_type);
        let (_, page) = session.fetch_page(url, FetchOptions::save_cookie()).await?;
        let mut record = self.extractor.extract(resource_type, url, &page.html);

        if self.settings.include_linked {
            let linked = LinkedResourceAggregator::new(&session)
                .with_per_page(self.settings.linked_per_page)
                .fetch_all(declared_relations(resource_type))
                .await?;
            record.linked = Some(linked);
        }
        Ok(record)
    }

    fn session(&self, resource_type: ResourceType) -> SessionClient {
        SessionClient::new(
            self.transport.clone(),
            self.builder.clone(),
            resource_type,
            None,
        )
    }
}
