//! SKCRIS core: pure request building, listing decisions and field reconciliation.
mod fields;
mod filter;
mod input;
mod listing;
mod relation;
mod request;
mod resource;

pub use fields::{
    lowercase, parse_award_amount, parse_certificate, split_duration, split_emails,
    split_field_of_science, split_keywords, Certificate, FieldOfScience,
};
pub use filter::{
    filter_order, has_non_alpha_entry, starts_with_non_alpha, FilterCursor, FilterExhausted,
    FilterKind, ALPHABET, LISTING_RESULT_LIMIT,
};
pub use input::{InputError, ScrapeInput, DEFAULT_LINKED_PER_PAGE, DEFAULT_LISTING_PER_PAGE};
pub use listing::{next_step, ListingPhase, PageDecision, PageObservation};
pub use relation::{
    declared_relations, relation_spec, EntityLink, InfraKind, OutputKind, RelationSpec,
    StubShape, ADDRESS_RELATION,
};
pub use request::{
    ApiRequest, RequestBuilder, RequestError, RequestKind, DEFAULT_BASE_URL, SESSION_COOKIE_KEY,
};
pub use resource::{DatasetType, Region, ResourceType, Route};
