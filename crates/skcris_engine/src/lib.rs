//! SKCRIS engine: session-aware fetching, listing traversal and detail scraping.
mod crawl;
mod decode;
mod engine;
mod extract;
mod filters;
mod linked;
mod listing;
mod persist;
mod record;
mod session;
mod transport;
mod types;

pub use crawl::{CrawlEvent, CrawlFailure, CrawlReport, CrawlSettings, Crawler, ProgressSink};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use engine::{ChannelProgressSink, EngineEvent, EngineHandle};
pub use extract::{guid_from_url, table_rows, DetailTableExtractor, RecordExtractor, TableRow};
pub use filters::{LetterFilter, ListingFilter, OptionPredicate, RegionFilter, RegionOption};
pub use linked::{LinkedPageResponse, LinkedResourceAggregator};
pub use listing::{
    EntrySink, ListingContext, ListingControl, ListingDriver, ListingOptions, ListingSummary,
    ResultEntry,
};
pub use persist::{ensure_output_dir, write_dataset, AtomicFileWriter, PersistError};
pub use record::{
    AddressStub, CitationStub, DetailFields, DetailRecord, DocumentStub, LegacyDate, LinkedEntry,
    LinkedResourceSet, LinkedStub, OrganisationDetail, ProjectDetail, ResearcherDetail, Role,
};
pub use session::{session_cookie_from, FetchOptions, SessionClient, SessionCookie};
pub use transport::{FetchSettings, ReqwestTransport, Transport, TransportResponse};
pub use types::{FailureKind, FetchError, ScrapeError};
