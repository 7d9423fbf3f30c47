use futures_util::future::try_join_all;
use scrape_logging::{scrape_debug, scrape_info, session_tag};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use skcris_core::{relation_spec, RelationSpec, RequestKind, StubShape, DEFAULT_LINKED_PER_PAGE};

use crate::record::{CitationStub, DocumentStub, LinkedEntry, LinkedResourceSet, LinkedStub};
use crate::session::{FetchOptions, SessionClient};
use crate::ScrapeError;

#[derive(Debug, Clone, Deserialize)]
pub struct LinkedPageResponse {
    /// `null` or missing ends pagination after the current page.
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub res: Vec<Value>,
}

/// Fetches every linked-resource relation of one detail record.
///
/// Relations run concurrently; pages within a relation are strictly
/// sequential. One failing relation fails the whole set.
pub struct LinkedResourceAggregator<'a> {
    session: &'a SessionClient,
    per_page: u32,
}

impl<'a> LinkedResourceAggregator<'a> {
    pub fn new(session: &'a SessionClient) -> Self {
        Self {
            session,
            per_page: DEFAULT_LINKED_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub async fn fetch_all(&self, relation_ids: &[&str]) -> Result<LinkedResourceSet, ScrapeError> {
        let resource_type = self.session.resource_type();
        let specs = relation_ids
            .iter()
            .map(|id| {
                relation_spec(resource_type, id).ok_or_else(|| {
                    ScrapeError::Config(format!(
                        "cannot find mapped key for relation {id} of resource type {resource_type}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let session_id = session_tag(self.session.cookie().as_deref());
        scrape_info!(
            "Fetching {} linked resource relations for {} (session {})",
            specs.len(),
            resource_type,
            session_id
        );
        let lists = try_join_all(specs.iter().map(|spec| self.fetch_relation(*spec))).await?;

        let mut set = LinkedResourceSet::default();
        for (spec, entries) in specs.iter().zip(lists) {
            set.insert(spec.key, entries);
        }
        scrape_debug!(
            "Done fetching linked resources for {} (session {})",
            resource_type,
            session_id
        );
        Ok(set)
    }

    async fn fetch_relation(&self, spec: RelationSpec) -> Result<Vec<LinkedEntry>, ScrapeError> {
        let raw = if spec.paginated() {
            self.fetch_pages(spec.id).await?
        } else {
            self.fetch_single_shot().await?
        };
        raw.into_iter()
            .map(|value| self.map_entry(spec, value))
            .collect()
    }

    async fn fetch_pages(&self, relation_id: &str) -> Result<Vec<Value>, ScrapeError> {
        let mut items = Vec::new();
        let mut page = 1;
        let mut total: Option<usize> = None;
        loop {
            scrape_debug!(
                "Fetching {} page {} (total {})",
                relation_id,
                page,
                total.map_or_else(|| "unknown".to_string(), |t| t.to_string())
            );
            let request = self.session.request(RequestKind::LinkedPage {
                relation_id,
                page,
                per_page: self.per_page,
            })?;
            let data: LinkedPageResponse = self
                .session
                .fetch_json(&request, FetchOptions::default())
                .await?;
            let count = data.count.unwrap_or(0);
            total = Some(count);
            let fetched = data.res.len();
            items.extend(data.res);
            if items.len() >= count || fetched == 0 {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    /// The address endpoint returns a bare array; its length doubles as the count.
    async fn fetch_single_shot(&self) -> Result<Vec<Value>, ScrapeError> {
        let request = self.session.request(RequestKind::AddressPage)?;
        self.session
            .fetch_json(&request, FetchOptions::default())
            .await
    }

    fn map_entry(&self, spec: RelationSpec, value: Value) -> Result<LinkedEntry, ScrapeError> {
        let owner = self.session.resource_type();
        let builder = self.session.builder();
        let entry = match spec.shape {
            StubShape::Address => LinkedEntry::Address(decode(spec, value)?),
            StubShape::Reference => {
                let mut stub: LinkedStub = decode(spec, value)?;
                stub.url = builder.entity_url(spec.link, owner, stub.id);
                LinkedEntry::Reference(stub)
            }
            StubShape::Citation => {
                let mut stub: CitationStub = decode(spec, value)?;
                stub.url = builder.entity_url(spec.link, owner, stub.id);
                LinkedEntry::Citation(stub)
            }
            StubShape::Document => {
                let mut stub: DocumentStub = decode(spec, value)?;
                stub.url = builder.entity_url(spec.link, owner, stub.id);
                LinkedEntry::Document(stub)
            }
        };
        Ok(entry)
    }
}

fn decode<T: DeserializeOwned>(spec: RelationSpec, value: Value) -> Result<T, ScrapeError> {
    serde_json::from_value(value).map_err(|err| ScrapeError::Payload {
        origin: format!("relation {}", spec.id),
        message: err.to_string(),
    })
}
