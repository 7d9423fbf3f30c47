mod support;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use skcris_core::{declared_relations, ApiRequest, RequestBuilder, ResourceType};
use skcris_engine::{
    FailureKind, FetchError, LinkedEntry, LinkedResourceAggregator, ScrapeError, SessionClient,
    Transport, TransportResponse,
};
use support::json_response;
use tokio::sync::Barrier;
use url::Url;

/// Serves linked-resource pages. The first request of every relation waits
/// on a barrier sized to the relation count, so the set only completes when
/// all relations are in flight together.
struct LinkedPortal {
    barrier: Option<Barrier>,
    seen: Mutex<Vec<(String, u32)>>,
    failing: Option<&'static str>,
}

impl LinkedPortal {
    fn new(relations: usize) -> Self {
        Self {
            barrier: Some(Barrier::new(relations)),
            seen: Mutex::new(Vec::new()),
            failing: None,
        }
    }

    fn pages_of(&self, relation: &str) -> Vec<u32> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == relation)
            .map(|(_, page)| *page)
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for LinkedPortal {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, FetchError> {
        assert_eq!(request.header("Cookie"), Some("JSESSIONID=detail"));
        let url = Url::parse(&request.url).unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let relation = params["p_p_resource_id"].clone();
        let page: u32 = params["page"].parse().unwrap();
        self.seen.lock().unwrap().push((relation.clone(), page));

        if page == 1 {
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
        }
        if self.failing == Some(relation.as_str()) {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(500),
                message: "server error".into(),
            });
        }

        let body = match (relation.as_str(), page) {
            ("goorgaddresses", _) => json!([{ "country": "SK", "adrLine2": "", "cityTown": "Bratislava" }]),
            ("goorgprojectlist", 1) => json!({ "count": 3, "res": [
                { "id": 11, "name": "P1", "roles": [{ "role": "coordinator" }] },
                { "id": 12, "name": "P2" },
            ]}),
            ("goorgprojectlist", 2) => json!({ "count": 3, "res": [{ "id": 13, "name": "P3" }] }),
            // claims more than it ever returns
            ("goorgpatentlist", 1) => json!({ "count": 5, "res": [{ "id": 21, "name": "Patent" }] }),
            ("goorginnovationlist", 1) => json!({ "count": null, "res": [{ "id": 31, "name": "Inovácia" }] }),
            _ => json!({ "count": 0, "res": [] }),
        };
        Ok(json_response(body, None))
    }
}

fn session(transport: Arc<LinkedPortal>) -> SessionClient {
    SessionClient::new(
        transport,
        Arc::new(RequestBuilder::default()),
        ResourceType::Organisation,
        Some("JSESSIONID=detail".into()),
    )
}

#[tokio::test]
async fn relations_are_fetched_concurrently_and_counted() {
    scrape_logging::initialize_for_tests();
    let relations = declared_relations(ResourceType::Organisation);
    let portal = Arc::new(LinkedPortal::new(relations.len()));
    let session = session(portal.clone());

    let set = tokio::time::timeout(
        Duration::from_secs(5),
        LinkedResourceAggregator::new(&session)
            .with_per_page(2)
            .fetch_all(relations),
    )
    .await
    .expect("relations did not run concurrently")
    .expect("linked resources");

    assert_eq!(set.len(), relations.len());
    assert_eq!(set.keys().next(), Some("addresses"));
    assert_eq!(set.count("projects"), Some(3));
    assert_eq!(set.count("childOrgs"), Some(0));
    assert_eq!(portal.pages_of("goorgprojectlist"), vec![1, 2]);

    // an empty page ends pagination even when the count says otherwise
    assert_eq!(set.count("patentOutputs"), Some(1));
    assert_eq!(portal.pages_of("goorgpatentlist"), vec![1, 2]);

    let value = serde_json::to_value(&set).unwrap();
    assert_eq!(value["projectsCount"], json!(3));
    assert_eq!(value["addressesCount"], json!(1));
    assert_eq!(value["addresses"][0]["adrLine2"], json!(null));
    assert_eq!(value["projects"][0]["roles"], json!([{ "role": "coordinator" }]));
}

#[tokio::test]
async fn linked_entries_carry_canonical_urls() {
    let portal = Arc::new(LinkedPortal {
        barrier: None,
        seen: Mutex::new(Vec::new()),
        failing: None,
    });
    let session = session(portal);

    let set = LinkedResourceAggregator::new(&session)
        .fetch_all(&["goorgprojectlist", "goorgpatentlist", "goorgaddresses"])
        .await
        .expect("linked resources");

    let project = &set.get("projects").unwrap()[0];
    assert_eq!(
        project.url(),
        Some("https://www.skcris.sk/portal/register-projects?p_p_id=projectSearchResult_WAR_cvtiappweb&p_p_lifecycle=1&p_p_state=normal&p_p_mode=view&p_p_col_id=column-3&p_p_col_pos=2&p_p_col_count=3&_projectSearchResult_WAR_cvtiappweb_javax.portlet.action=projectgodetail&id=11")
    );
    let patent = &set.get("patentOutputs").unwrap()[0];
    assert!(patent
        .url()
        .unwrap()
        .ends_with("_organisationSearchResult_WAR_cvtiappweb_action=linkedvysledky&type=patent&id=21"));
    assert!(matches!(set.get("addresses").unwrap()[0], LinkedEntry::Address(_)));
}

#[tokio::test]
async fn one_failing_relation_fails_the_set() {
    let portal = Arc::new(LinkedPortal {
        barrier: None,
        seen: Mutex::new(Vec::new()),
        failing: Some("goorgproductlist"),
    });
    let session = session(portal);

    let err = LinkedResourceAggregator::new(&session)
        .fetch_all(declared_relations(ResourceType::Organisation))
        .await
        .unwrap_err();

    match err {
        ScrapeError::Fetch { url, source } => {
            assert!(url.contains("goorgproductlist"));
            assert_eq!(source.kind, FailureKind::HttpStatus(500));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn unmapped_relation_is_rejected_before_any_request() {
    let portal = Arc::new(LinkedPortal::new(1));
    let session = session(portal.clone());

    let err = LinkedResourceAggregator::new(&session)
        .fetch_all(&["goorgprojectlist", "goresprojectlist"])
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Config(_)));
    assert!(portal.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn null_count_ends_pagination_after_the_page() {
    let portal = Arc::new(LinkedPortal {
        barrier: None,
        seen: Mutex::new(Vec::new()),
        failing: None,
    });
    let session = session(portal.clone());

    let set = LinkedResourceAggregator::new(&session)
        .with_per_page(1)
        .fetch_all(&["goorginnovationlist"])
        .await
        .expect("linked resources");

    assert_eq!(set.count("innovationOutputs"), Some(1));
    assert_eq!(portal.pages_of("goorginnovationlist"), vec![1]);
}
