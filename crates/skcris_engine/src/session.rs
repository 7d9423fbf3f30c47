use std::sync::{Arc, Mutex, PoisonError};

use scrape_logging::{scrape_debug, scrape_trace, session_tag};
use serde::de::DeserializeOwned;
use skcris_core::{ApiRequest, RequestBuilder, RequestKind, ResourceType, SESSION_COOKIE_KEY};

use crate::decode::{decode_html, DecodedHtml};
use crate::transport::{Transport, TransportResponse};
use crate::ScrapeError;

/// Single-slot holder of the legacy `JSESSIONID=<token>` pair.
#[derive(Debug, Default)]
pub struct SessionCookie {
    slot: Mutex<Option<String>>,
}

impl SessionCookie {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            slot: Mutex::new(initial),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, value: Option<String>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

/// Picks the session pair out of `Set-Cookie` values, dropping the attributes.
pub fn session_cookie_from(set_cookies: &[String]) -> Option<String> {
    let prefix = format!("{SESSION_COOKIE_KEY}=");
    set_cookies
        .iter()
        .map(|value| value.trim_start())
        .find(|value| value.starts_with(&prefix))
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.trim().to_string())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Replace the session cookie when the response carries a new one.
    pub save_cookie: bool,
}

impl FetchOptions {
    pub fn save_cookie() -> Self {
        Self { save_cookie: true }
    }
}

/// Fetch adapter for one logical session (a listing traversal or one detail record).
///
/// A cookie-saving fetch must complete before any request that depends on the
/// new session is built; callers sequence this by awaiting.
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    builder: Arc<RequestBuilder>,
    resource_type: ResourceType,
    cookie: SessionCookie,
}

impl SessionClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        builder: Arc<RequestBuilder>,
        resource_type: ResourceType,
        cookie: Option<String>,
    ) -> Self {
        Self {
            transport,
            builder,
            resource_type,
            cookie: SessionCookie::new(cookie),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn cookie(&self) -> Option<String> {
        self.cookie.get()
    }

    pub fn set_cookie(&self, cookie: Option<String>) {
        self.cookie.set(cookie);
    }

    /// Builds `kind` against the current session cookie.
    pub fn request(&self, kind: RequestKind<'_>) -> Result<ApiRequest, ScrapeError> {
        let cookie = self.cookie.get();
        Ok(self
            .builder
            .build(kind, self.resource_type, cookie.as_deref())?)
    }

    /// Builds `kind` without a session, for endpoints that hand out a fresh one.
    pub fn anonymous_request(&self, kind: RequestKind<'_>) -> Result<ApiRequest, ScrapeError> {
        Ok(self.builder.build(kind, self.resource_type, None)?)
    }

    pub async fn fetch(
        &self,
        request: &ApiRequest,
        options: FetchOptions,
    ) -> Result<TransportResponse, ScrapeError> {
        scrape_trace!(
            "GET {} (session {})",
            request.url,
            session_tag(request.header("Cookie").filter(|c| !c.is_empty()))
        );
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| ScrapeError::Fetch {
                url: request.url.clone(),
                source,
            })?;

        if options.save_cookie {
            if let Some(cookie) = session_cookie_from(&response.set_cookies) {
                scrape_debug!("Setting session to {}", session_tag(Some(cookie.as_str())));
                self.cookie.set(Some(cookie));
            }
        }
        Ok(response)
    }

    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        options: FetchOptions,
    ) -> Result<T, ScrapeError> {
        let response = self.fetch(request, options).await?;
        serde_json::from_slice(&response.body).map_err(|err| ScrapeError::Payload {
            origin: request.url.clone(),
            message: err.to_string(),
        })
    }

    /// Fetches an HTML page (listing or detail) and decodes it.
    pub async fn fetch_page(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<(TransportResponse, DecodedHtml), ScrapeError> {
        let cookie = self.cookie.get();
        let request = self.builder.page_request(url, cookie.as_deref());
        let response = self.fetch(&request, options).await?;
        let decoded = decode_html(&response.body, response.content_type.as_deref())?;
        Ok((response, decoded))
    }
}
