use std::fmt;

use skcris_core::{FilterExhausted, InputError, RequestError};

use crate::decode::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Everything that can stop a listing traversal or a detail record.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Exhausted(#[from] FilterExhausted),
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("unexpected payload from {origin}: {message}")]
    Payload { origin: String, message: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ScrapeError {
    /// Network and payload failures may succeed on a later attempt;
    /// configuration problems never do.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Fetch { .. } | ScrapeError::Payload { .. } | ScrapeError::Decode(_)
        )
    }
}
