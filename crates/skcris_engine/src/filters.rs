//! Server-side listing filters used to keep each result set under the
//! pagination ceiling.
use scrape_logging::scrape_debug;
use serde::Deserialize;
use skcris_core::{FilterCursor, FilterExhausted, FilterKind, Region, RequestKind, ALPHABET};

use crate::session::{FetchOptions, SessionClient};
use crate::ScrapeError;

pub type OptionPredicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// One narrowing strategy in the driver's filter chain.
///
/// `init_state`, `next_state` and `reset_state` only move the cursor;
/// `load_state` is the network call that applies the selected option to the
/// session and must follow every cursor change.
#[async_trait::async_trait]
pub trait ListingFilter: Send + Sync {
    fn kind(&self) -> FilterKind;

    /// Whether the user restricted this filter to chosen options.
    fn is_pinned(&self) -> bool;

    fn is_disabled(&self) -> bool;

    fn set_disabled(&mut self, disabled: bool);

    /// True when the option list (loaded on first use) is non-empty.
    async fn has_state(&mut self, session: &SessionClient) -> Result<bool, ScrapeError>;

    fn init_state(&mut self) -> bool;

    async fn load_state(&mut self, session: &SessionClient) -> Result<(), ScrapeError>;

    fn has_next_state(&self) -> bool;

    fn next_state(&mut self) -> Result<(), FilterExhausted>;

    fn reset_state(&mut self);

    /// Human readable name of the selected option.
    fn current_label(&self) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RegionOptionsResponse {
    #[serde(default)]
    arr: Vec<RegionOption>,
}

pub struct RegionFilter {
    cursor: FilterCursor,
    options: Option<Vec<RegionOption>>,
    predicate: Option<OptionPredicate<RegionOption>>,
    disabled: bool,
}

impl RegionFilter {
    pub fn new(predicate: Option<OptionPredicate<RegionOption>>) -> Self {
        Self {
            cursor: FilterCursor::new(FilterKind::Region),
            options: None,
            predicate,
            disabled: false,
        }
    }

    /// Restricts the options to the region the server lists under `region`'s name.
    pub fn pinned(region: Option<Region>) -> Self {
        let predicate = region.map(|region| -> OptionPredicate<RegionOption> {
            let name = region.display_name();
            Box::new(move |option: &RegionOption| option.name == name)
        });
        Self::new(predicate)
    }

    async fn options(&mut self, session: &SessionClient) -> Result<&[RegionOption], ScrapeError> {
        if self.options.is_none() {
            let request = session.anonymous_request(RequestKind::RegionOptions)?;
            let response: RegionOptionsResponse =
                session.fetch_json(&request, FetchOptions::default()).await?;
            scrape_debug!("RegionFilter options before filtering: {:?}", response.arr);
            let options: Vec<RegionOption> = match &self.predicate {
                Some(keep) => response.arr.into_iter().filter(|o| keep(o)).collect(),
                None => response.arr,
            };
            scrape_debug!("RegionFilter options after filtering: {:?}", options);
            self.options = Some(options);
        }
        Ok(self.options.as_deref().unwrap_or_default())
    }

    fn loaded_len(&self) -> usize {
        self.options.as_ref().map_or(0, Vec::len)
    }

    fn current(&self) -> Option<&RegionOption> {
        let options = self.options.as_ref()?;
        options.get(self.cursor.position()?)
    }
}

#[async_trait::async_trait]
impl ListingFilter for RegionFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Region
    }

    fn is_pinned(&self) -> bool {
        self.predicate.is_some()
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    async fn has_state(&mut self, session: &SessionClient) -> Result<bool, ScrapeError> {
        Ok(!self.options(session).await?.is_empty())
    }

    fn init_state(&mut self) -> bool {
        self.cursor.init()
    }

    async fn load_state(&mut self, session: &SessionClient) -> Result<(), ScrapeError> {
        self.options(session).await?;
        let Some(option) = self.current() else {
            return Err(ScrapeError::Config(
                "RegionFilter loaded without a selected option".into(),
            ));
        };
        let request = session.request(RequestKind::RegionSelect {
            region_id: option.id,
        })?;
        session.fetch(&request, FetchOptions::save_cookie()).await?;
        Ok(())
    }

    fn has_next_state(&self) -> bool {
        self.cursor.has_next(self.loaded_len())
    }

    fn next_state(&mut self) -> Result<(), FilterExhausted> {
        let len = self.loaded_len();
        self.cursor.advance(len).map(|_| ())
    }

    fn reset_state(&mut self) {
        self.cursor.reset();
    }

    fn current_label(&self) -> Option<String> {
        self.current().map(|option| option.name.clone())
    }
}

pub struct LetterFilter {
    cursor: FilterCursor,
    letters: Vec<char>,
    pinned: bool,
    disabled: bool,
}

impl LetterFilter {
    pub fn new(predicate: Option<OptionPredicate<char>>) -> Self {
        let pinned = predicate.is_some();
        let letters: Vec<char> = match predicate {
            Some(keep) => ALPHABET.into_iter().filter(|c| keep(c)).collect(),
            None => ALPHABET.to_vec(),
        };
        scrape_debug!("LetterFilter options: {:?}", letters);
        Self {
            cursor: FilterCursor::new(FilterKind::Letter),
            letters,
            pinned,
            disabled: false,
        }
    }

    pub fn pinned(letter: Option<char>) -> Self {
        let predicate = letter.map(|letter| -> OptionPredicate<char> {
            let letter = letter.to_ascii_lowercase();
            Box::new(move |option: &char| *option == letter)
        });
        Self::new(predicate)
    }

    fn current(&self) -> Option<char> {
        self.letters.get(self.cursor.position()?).copied()
    }
}

#[async_trait::async_trait]
impl ListingFilter for LetterFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Letter
    }

    fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    async fn has_state(&mut self, _session: &SessionClient) -> Result<bool, ScrapeError> {
        Ok(!self.letters.is_empty())
    }

    fn init_state(&mut self) -> bool {
        self.cursor.init()
    }

    async fn load_state(&mut self, session: &SessionClient) -> Result<(), ScrapeError> {
        let Some(letter) = self.current() else {
            return Err(ScrapeError::Config(
                "LetterFilter loaded without a selected option".into(),
            ));
        };
        let letter = letter.to_string();
        let request = session.request(RequestKind::LetterSelect { letter: &letter })?;
        session.fetch(&request, FetchOptions::save_cookie()).await?;
        Ok(())
    }

    fn has_next_state(&self) -> bool {
        self.cursor.has_next(self.letters.len())
    }

    fn next_state(&mut self) -> Result<(), FilterExhausted> {
        self.cursor.advance(self.letters.len()).map(|_| ())
    }

    fn reset_state(&mut self) {
        self.cursor.reset();
    }

    fn current_label(&self) -> Option<String> {
        self.current().map(String::from)
    }
}
