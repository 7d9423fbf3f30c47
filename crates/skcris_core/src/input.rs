use serde::{Deserialize, Serialize};

use crate::filter::ALPHABET;
use crate::request::{RequestBuilder, RequestError, DEFAULT_BASE_URL};
use crate::resource::{DatasetType, Region};

pub const DEFAULT_LISTING_PER_PAGE: u32 = 500;
pub const DEFAULT_LINKED_PER_PAGE: u32 = 500;
const DEFAULT_MAX_REQUEST_RETRIES: u32 = 10;
const DEFAULT_MAX_CONCURRENCY: usize = 5;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("missing instruction for scraping - either start_urls or dataset_type must be specified")]
    MissingInstruction,
    #[error("ambiguous instruction for scraping - only one of start_urls or dataset_type may be specified")]
    AmbiguousInstruction,
    #[error("listing_filter_first_letter must be a single letter a-z, got {0:?}")]
    InvalidLetter(String),
    #[error("{field} must be greater than zero")]
    InvalidPerPage { field: &'static str },
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Scrape instruction, loaded from a RON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeInput {
    pub dataset_type: Option<DatasetType>,
    pub start_urls: Option<Vec<String>>,
    pub entry_include_linked_resources: bool,
    pub listing_filter_first_letter: Option<String>,
    pub listing_filter_region: Option<Region>,
    /// Listing traversal stops scheduling pages once this many entries were queued.
    pub output_max_entries: Option<usize>,
    pub listing_items_per_page: u32,
    pub listing_count_only: bool,
    pub linked_items_per_page: u32,
    pub max_request_retries: u32,
    pub max_concurrency: usize,
    pub base_url: String,
}

impl Default for ScrapeInput {
    fn default() -> Self {
        Self {
            dataset_type: None,
            start_urls: None,
            entry_include_linked_resources: false,
            listing_filter_first_letter: None,
            listing_filter_region: None,
            output_max_entries: None,
            listing_items_per_page: DEFAULT_LISTING_PER_PAGE,
            listing_count_only: false,
            linked_items_per_page: DEFAULT_LINKED_PER_PAGE,
            max_request_retries: DEFAULT_MAX_REQUEST_RETRIES,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ScrapeInput {
    pub fn validate(&self) -> Result<(), InputError> {
        match (&self.start_urls, self.dataset_type) {
            (None, None) => return Err(InputError::MissingInstruction),
            (Some(_), Some(_)) => return Err(InputError::AmbiguousInstruction),
            _ => {}
        }
        if let Some(letter) = &self.listing_filter_first_letter {
            self.pinned_letter()
                .ok_or_else(|| InputError::InvalidLetter(letter.clone()))?;
        }
        if self.listing_items_per_page == 0 {
            return Err(InputError::InvalidPerPage {
                field: "listing_items_per_page",
            });
        }
        if self.linked_items_per_page == 0 {
            return Err(InputError::InvalidPerPage {
                field: "linked_items_per_page",
            });
        }
        RequestBuilder::new(self.base_url.as_str())?;
        Ok(())
    }

    /// The pinned first letter, lowercased, when it is one of `a..=z`.
    pub fn pinned_letter(&self) -> Option<char> {
        let letter = self.listing_filter_first_letter.as_deref()?;
        let mut chars = letter.chars();
        let first = chars.next()?.to_ascii_lowercase();
        (chars.next().is_none() && ALPHABET.contains(&first)).then_some(first)
    }

    /// URLs the crawl starts from: the explicit list, or the dataset's listing page.
    pub fn resolve_start_urls(&self, builder: &RequestBuilder) -> Result<Vec<String>, InputError> {
        self.validate()?;
        match (&self.start_urls, self.dataset_type) {
            (Some(urls), _) => Ok(urls.clone()),
            (None, Some(dataset)) => Ok(vec![builder.listing_url(dataset)]),
            (None, None) => Err(InputError::MissingInstruction),
        }
    }
}
