use std::time::Duration;

use scrape_logging::{scrape_debug, scrape_info, scrape_warn, session_tag};
use serde::Deserialize;
use skcris_core::{
    filter_order, has_non_alpha_entry, next_step, FilterKind, ListingPhase, PageDecision,
    PageObservation, Region, RequestKind, ResourceType, DEFAULT_LISTING_PER_PAGE,
    LISTING_RESULT_LIMIT,
};

use crate::filters::{LetterFilter, ListingFilter, RegionFilter};
use crate::session::{FetchOptions, SessionClient};
use crate::ScrapeError;

#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub per_page: u32,
    /// Log the result count and stop without reading any page.
    pub count_only: bool,
    pub region: Option<Region>,
    pub letter: Option<char>,
    /// Pause between two page fetches.
    pub page_delay: Duration,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_LISTING_PER_PAGE,
            count_only: false,
            region: None,
            letter: None,
            page_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingContext {
    pub resource_type: ResourceType,
    pub page: u32,
    pub per_page: u32,
    /// Result count under the currently applied filters.
    pub count: u64,
}

impl ListingContext {
    fn page_id(&self) -> String {
        let pages = self.count.div_ceil(u64::from(self.per_page.max(1)));
        format!(
            "page {} / {} - {} entries per page",
            self.page, pages, self.per_page
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingControl {
    Continue,
    Abort,
}

/// Receives each page's detail URLs. Answering `Abort` stops the traversal
/// before the next page is fetched.
#[async_trait::async_trait]
pub trait EntrySink: Send {
    async fn on_entries(
        &mut self,
        context: &ListingContext,
        urls: Vec<String>,
    ) -> Result<ListingControl, ScrapeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultEntry {
    pub guid: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub name_sk: Option<String>,
    #[serde(default, rename = "type")]
    pub entry_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsPage {
    #[serde(default, rename = "str")]
    entries: Vec<ResultEntry>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSummary {
    /// Unfiltered result count.
    pub count: u64,
    pub pages_fetched: u32,
    pub entries_emitted: usize,
    pub aborted: bool,
    /// Some filter state still matched more rows than the server pages through.
    pub truncated: bool,
}

/// Walks one listing through its filter chain and hands detail URLs to a sink.
///
/// Filters engage as a stack: a filter joins when it is pinned or when the
/// rows matching the filters above it exceed [`LISTING_RESULT_LIMIT`]. When
/// the deepest filter runs out of options it is reset and dropped, and the
/// filter above it moves on.
pub struct ListingDriver<'a> {
    session: &'a SessionClient,
    options: ListingOptions,
    filters: Vec<Box<dyn ListingFilter>>,
}

impl<'a> ListingDriver<'a> {
    pub fn new(session: &'a SessionClient, options: ListingOptions) -> Self {
        let filters = filter_order(options.region.is_some(), options.letter.is_some())
            .into_iter()
            .map(|kind| -> Box<dyn ListingFilter> {
                match kind {
                    FilterKind::Region => Box::new(RegionFilter::pinned(options.region)),
                    FilterKind::Letter => Box::new(LetterFilter::pinned(options.letter)),
                }
            })
            .collect();
        Self::with_filters(session, options, filters)
    }

    pub fn with_filters(
        session: &'a SessionClient,
        options: ListingOptions,
        filters: Vec<Box<dyn ListingFilter>>,
    ) -> Self {
        Self {
            session,
            options,
            filters,
        }
    }

    pub async fn run(&mut self, sink: &mut dyn EntrySink) -> Result<ListingSummary, ScrapeError> {
        if self.options.per_page == 0 {
            return Err(ScrapeError::Config(
                "listing page size must be greater than zero".into(),
            ));
        }
        let session = self.session;
        let mut ctx = ListingContext {
            resource_type: session.resource_type(),
            page: 1,
            per_page: self.options.per_page,
            count: 0,
        };
        let mut summary = ListingSummary::default();

        ctx.count = self.fetch_count().await?;
        summary.count = ctx.count;
        scrape_info!(
            "Current results count: {} (max: {}) for {}",
            ctx.count,
            LISTING_RESULT_LIMIT,
            ctx.resource_type
        );
        if self.options.count_only {
            scrape_info!("Count only: {} {} entries match", ctx.count, ctx.resource_type);
            return Ok(summary);
        }

        scrape_info!("Disabling all filters, so we can extract entries that start with non-alphabetic characters. Filters will be enabled once all such entries are processed.");
        for filter in &mut self.filters {
            filter.set_disabled(true);
        }
        let mut phase = ListingPhase::DrainingUnfiltered;
        let mut engaged: Vec<usize> = Vec::new();

        loop {
            scrape_debug!(
                "Fetching {} (session {})",
                ctx.page_id(),
                session_tag(session.cookie().as_deref())
            );
            let entries = self.fetch_entries(&ctx).await?;
            summary.pages_fetched += 1;

            let observation = PageObservation {
                entries: entries.len(),
                per_page: ctx.per_page,
                has_non_alpha: has_non_alpha_entry(
                    entries.iter().filter_map(|entry| entry.name_sk.as_deref()),
                ),
            };
            let (next_phase, decision) = next_step(phase, observation);
            phase = next_phase;

            let urls: Vec<String> = entries
                .iter()
                .map(|entry| session.builder().detail_url(ctx.resource_type, &entry.guid))
                .collect();
            if !urls.is_empty() {
                summary.entries_emitted += urls.len();
                if sink.on_entries(&ctx, urls).await? == ListingControl::Abort {
                    scrape_info!("Listing aborted after {}", ctx.page_id());
                    summary.aborted = true;
                    break;
                }
            }

            match decision {
                PageDecision::NextPage => ctx.page += 1,
                PageDecision::EnableFilters { last_page } => {
                    scrape_info!("All entries that start with non-alphabetic characters were processed. Enabling filters now.");
                    for filter in &mut self.filters {
                        filter.set_disabled(false);
                    }
                    if self.engage_from(0, &mut engaged, &mut ctx).await? {
                        scrape_info!("Navigating to the first page of pagination after the filters were enabled");
                        ctx.page = 1;
                        self.warn_if_truncated(&ctx, &mut summary);
                    } else if last_page {
                        break;
                    } else {
                        ctx.page += 1;
                    }
                }
                PageDecision::FilterStateDone => {
                    if !self.advance(&mut engaged, &mut ctx).await? {
                        scrape_info!("No more filter states to go through, listing done");
                        break;
                    }
                    self.warn_if_truncated(&ctx, &mut summary);
                }
            }

            if !self.options.page_delay.is_zero() {
                tokio::time::sleep(self.options.page_delay).await;
            }
        }

        Ok(summary)
    }

    /// Engages every enabled filter from `start` on that is pinned or needed
    /// to get under the ceiling. Returns whether any filter joined the stack.
    async fn engage_from(
        &mut self,
        start: usize,
        engaged: &mut Vec<usize>,
        ctx: &mut ListingContext,
    ) -> Result<bool, ScrapeError> {
        let session = self.session;
        let mut engaged_any = false;
        for idx in start..self.filters.len() {
            let filter = &mut self.filters[idx];
            if filter.is_disabled() {
                continue;
            }
            if !filter.is_pinned() && ctx.count <= LISTING_RESULT_LIMIT {
                scrape_debug!("{} not needed ({} results)", filter.kind(), ctx.count);
                continue;
            }
            if !filter.has_state(session).await? {
                scrape_warn!("{} has no options to select, skipping it", filter.kind());
                continue;
            }
            filter.init_state();
            filter.load_state(session).await?;
            scrape_info!(
                "Applied {} = {}",
                filter.kind(),
                filter.current_label().unwrap_or_default()
            );
            engaged.push(idx);
            engaged_any = true;
            ctx.count = self.fetch_count().await?;
            scrape_info!("Current results count: {} (max: {})", ctx.count, LISTING_RESULT_LIMIT);
        }
        Ok(engaged_any)
    }

    /// Moves the filter stack to its next state from a clean session.
    /// Returns `false` once every engaged filter is exhausted.
    async fn advance(
        &mut self,
        engaged: &mut Vec<usize>,
        ctx: &mut ListingContext,
    ) -> Result<bool, ScrapeError> {
        let session = self.session;
        while let Some(&idx) = engaged.last() {
            let filter = &mut self.filters[idx];
            if !filter.has_next_state() {
                scrape_debug!("{} exhausted", filter.kind());
                filter.reset_state();
                engaged.pop();
                continue;
            }
            filter.next_state()?;
            scrape_info!(
                "Switching {} to {}",
                filter.kind(),
                filter.current_label().unwrap_or_default()
            );

            self.reset_filters(ctx).await?;
            for &applied in engaged.iter() {
                self.filters[applied].load_state(session).await?;
            }
            ctx.count = self.fetch_count().await?;
            self.engage_from(idx + 1, engaged, ctx).await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Hits the search form's reset action, which also hands out a new session.
    async fn reset_filters(&self, ctx: &mut ListingContext) -> Result<(), ScrapeError> {
        let request = self.session.anonymous_request(RequestKind::Reset)?;
        self.session
            .fetch(&request, FetchOptions::save_cookie())
            .await?;
        scrape_debug!(
            "Filters reset, new session {}",
            session_tag(self.session.cookie().as_deref())
        );
        ctx.page = 1;
        ctx.count = 0;
        Ok(())
    }

    fn warn_if_truncated(&self, ctx: &ListingContext, summary: &mut ListingSummary) {
        if ctx.count > LISTING_RESULT_LIMIT {
            scrape_warn!(
                "Results matching the filters go over the maximum of {}. {} results will be hidden.",
                LISTING_RESULT_LIMIT,
                ctx.count - LISTING_RESULT_LIMIT
            );
            summary.truncated = true;
        }
    }

    async fn fetch_count(&self) -> Result<u64, ScrapeError> {
        let request = self.session.request(RequestKind::Count)?;
        let response: CountResponse = self
            .session
            .fetch_json(&request, FetchOptions::default())
            .await?;
        Ok(response.count)
    }

    async fn fetch_entries(&self, ctx: &ListingContext) -> Result<Vec<ResultEntry>, ScrapeError> {
        let request = self.session.request(RequestKind::PageResults {
            page: ctx.page,
            per_page: ctx.per_page,
        })?;
        let page: ResultsPage = self
            .session
            .fetch_json(&request, FetchOptions::default())
            .await?;
        Ok(page.entries)
    }
}
