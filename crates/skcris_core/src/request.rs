use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::relation::{EntityLink, InfraKind};
use crate::resource::{DatasetType, ResourceType};

pub const DEFAULT_BASE_URL: &str = "https://www.skcris.sk/portal";
/// Name of the legacy session cookie that carries filter context.
pub const SESSION_COOKIE_KEY: &str = "JSESSIONID";

const APP_SUFFIX: &str = "_WAR_cvtiappweb";
const REGION_COMPONENT_ID: &str = "fazetSelectTreeSearch";
const VIEW_COLUMN_PARAMS: &str = "p_p_mode=view&p_p_col_id=column-3&p_p_col_pos=2&p_p_col_count=3";

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json, text/javascript, */*; q=0.01"),
    (
        "Accept-Language",
        "en-US,en;q=0.9,sk;q=0.8,cs;q=0.7,de;q=0.6,ko;q=0.5",
    ),
    ("Cache-Control", "no-cache"),
    ("Connection", "keep-alive"),
    ("Pragma", "no-cache"),
    (
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Endpoint family understood by [`RequestBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind<'a> {
    Count,
    RegionOptions,
    RegionSelect { region_id: i64 },
    LetterSelect { letter: &'a str },
    Reset,
    PageResults { page: u32, per_page: u32 },
    LinkedPage {
        relation_id: &'a str,
        page: u32,
        per_page: u32,
    },
    AddressPage,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("cannot make letter select request - no char selected")]
    MissingLetter,
    #[error("cannot make letter select request - {0:?} is not a letter")]
    InvalidLetter(String),
    #[error("cannot make linked resource request - empty relation id")]
    MissingRelation,
}

/// Builds every request the registry portal understands.
///
/// All methods are pure: identical inputs give identical URLs and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    base_url: String,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RequestError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| RequestError::InvalidBaseUrl {
            url: base_url.clone(),
            message: err.to_string(),
        })?;
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build(
        &self,
        kind: RequestKind<'_>,
        resource_type: ResourceType,
        cookie: Option<&str>,
    ) -> Result<ApiRequest, RequestError> {
        let component = resource_type.component_id();
        let url = match kind {
            RequestKind::Count => self.resource_url(resource_type, component, "readSearchCount", &[])?,
            RequestKind::RegionOptions => {
                self.resource_url(resource_type, REGION_COMPONENT_ID, "selectKrajAjax", &[])?
            }
            RequestKind::RegionSelect { region_id } => self.resource_url(
                resource_type,
                REGION_COMPONENT_ID,
                "selectOkresAjax",
                &[("id", region_id.to_string())],
            )?,
            RequestKind::LetterSelect { letter } => {
                let normalized = normalize_letter(letter)?;
                self.resource_url(
                    resource_type,
                    component,
                    "selectNamestartAjax",
                    &[("ch", normalized.to_string())],
                )?
            }
            RequestKind::Reset => {
                let reset = resource_type.reset_component_id();
                format!(
                    "{base}/register-{path}?p_p_id={reset}{APP_SUFFIX}&p_p_lifecycle=1&p_p_state=normal&_{reset}{APP_SUFFIX}_javax.portlet.action=reseta",
                    base = self.base_url,
                    path = resource_type.path_id(),
                )
            }
            RequestKind::PageResults { page, per_page } => self.resource_url(
                resource_type,
                component,
                "readSearchResult",
                &[("page", page.to_string()), ("perPage", per_page.to_string())],
            )?,
            RequestKind::LinkedPage {
                relation_id,
                page,
                per_page,
            } => {
                if relation_id.trim().is_empty() {
                    return Err(RequestError::MissingRelation);
                }
                self.resource_url(
                    resource_type,
                    component,
                    relation_id,
                    &[("page", page.to_string()), ("perPage", per_page.to_string())],
                )?
            }
            RequestKind::AddressPage => format!(
                "{base}/register-{path}?p_p_id={component}{APP_SUFFIX}&p_p_lifecycle=2&p_p_state=normal&p_p_mode=view&p_p_resource_id=goorgaddresses&p_p_cacheability=cacheLevelPage&p_p_col_id=column-3&p_p_col_pos=2&p_p_col_count=3&_{component}{APP_SUFFIX}_implicitModel=true&page=1&perPage=1",
                base = self.base_url,
                path = resource_type.path_id(),
            ),
        };
        Ok(self.page_request(&url, cookie))
    }

    /// Request for an arbitrary portal page (listing or detail HTML).
    pub fn page_request(&self, url: &str, cookie: Option<&str>) -> ApiRequest {
        ApiRequest {
            url: url.to_string(),
            headers: default_headers(cookie),
        }
    }

    /// URL of the HTML detail page for a listing entry.
    pub fn detail_url(&self, resource_type: ResourceType, guid: &str) -> String {
        let component = resource_type.component_id();
        let guid: String = byte_serialize(guid.as_bytes()).collect();
        format!(
            "{base}/register-{path}?p_p_id={component}{APP_SUFFIX}&p_p_lifecycle=1&p_p_state=normal&_{component}{APP_SUFFIX}_javax.portlet.action={action}&guid={guid}",
            base = self.base_url,
            path = resource_type.path_id(),
            action = resource_type.detail_action(),
        )
    }

    pub fn listing_url(&self, dataset: DatasetType) -> String {
        format!(
            "{base}/web/guest/register-{path}",
            base = self.base_url,
            path = dataset.resource_type().path_id()
        )
    }

    /// Canonical URL for an entity referenced from a linked-resource list.
    pub fn entity_url(&self, link: EntityLink, owner: ResourceType, id: i64) -> Option<String> {
        let base = &self.base_url;
        let url = match link {
            EntityLink::Organisation => format!(
                "{base}/register-organizations?p_p_id=organisationSearchResult{APP_SUFFIX}&p_p_lifecycle=1&p_p_state=normal&{VIEW_COLUMN_PARAMS}&_organisationSearchResult{APP_SUFFIX}_javax.portlet.action=organizationgodetail&id={id}"
            ),
            EntityLink::Researcher => format!(
                "{base}/register-researchers?p_p_id=researcherSearchResult{APP_SUFFIX}&p_p_lifecycle=1&p_p_state=normal&{VIEW_COLUMN_PARAMS}&_researcherSearchResult{APP_SUFFIX}_action=goresdetail&id={id}"
            ),
            EntityLink::Project => format!(
                "{base}/register-projects?p_p_id=projectSearchResult{APP_SUFFIX}&p_p_lifecycle=1&p_p_state=normal&{VIEW_COLUMN_PARAMS}&_projectSearchResult{APP_SUFFIX}_javax.portlet.action=projectgodetail&id={id}"
            ),
            EntityLink::Output(kind) => {
                let component = owner.component_id();
                format!(
                    "{base}/register-{path}?p_p_id={component}{APP_SUFFIX}&p_p_lifecycle=1&p_p_state=normal&{VIEW_COLUMN_PARAMS}&_{component}{APP_SUFFIX}_action=linkedvysledky&type={kind}&id={id}",
                    path = owner.path_id(),
                    kind = kind.as_str(),
                )
            }
            EntityLink::Infra(kind) => {
                let action = match owner {
                    ResourceType::Organisation => "orglinkedinfrastr",
                    ResourceType::Project => "projlinkedinfrastr",
                    ResourceType::Researcher => return None,
                };
                let component = owner.component_id();
                format!(
                    "{base}/register-{path}?p_p_id={component}{APP_SUFFIX}&p_p_lifecycle=1&p_p_state=normal&{VIEW_COLUMN_PARAMS}&_{component}{APP_SUFFIX}_action={action}&type={kind}&id={id}",
                    path = owner.path_id(),
                    kind = infra_code(kind),
                )
            }
            EntityLink::Document => format!(
                "{base}/register-projects?p_p_id=projectSearchResult{APP_SUFFIX}&p_p_lifecycle=2&p_p_state=normal&p_p_mode=view&p_p_resource_id=downloadDocument&p_p_cacheability=cacheLevelPage&p_p_col_id=column-3&p_p_col_pos=2&p_p_col_count=3&_projectSearchResult{APP_SUFFIX}_action=downloadDocument&_projectSearchResult{APP_SUFFIX}_implicitModel=true&documentId={id}"
            ),
            EntityLink::None => return None,
        };
        Some(url)
    }

    fn resource_url(
        &self,
        resource_type: ResourceType,
        component: &str,
        resource_id: &str,
        params: &[(&str, String)],
    ) -> Result<String, RequestError> {
        let raw = format!(
            "{base}/register-{path}?p_p_id={component}{APP_SUFFIX}&p_p_lifecycle=2&p_p_resource_id={resource_id}",
            base = self.base_url,
            path = resource_type.path_id(),
        );
        let mut url = Url::parse(&raw).map_err(|err| RequestError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: err.to_string(),
        })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }
}

fn default_headers(cookie: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers: Vec<(&'static str, String)> = DEFAULT_HEADERS
        .iter()
        .map(|(key, value)| (*key, (*value).to_string()))
        .collect();
    headers.push(("Cookie", cookie.unwrap_or_default().to_string()));
    headers
}

fn normalize_letter(letter: &str) -> Result<char, RequestError> {
    let first = letter
        .trim()
        .chars()
        .next()
        .ok_or(RequestError::MissingLetter)?;
    let lowered = first.to_lowercase().next().unwrap_or(first);
    if !lowered.is_alphabetic() {
        return Err(RequestError::InvalidLetter(letter.to_string()));
    }
    Ok(lowered)
}

fn infra_code(kind: InfraKind) -> &'static str {
    match kind {
        InfraKind::Service => "serv",
        InfraKind::Facility => "facil",
        InfraKind::Equipment => "equip",
    }
}
