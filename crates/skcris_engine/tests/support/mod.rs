//! In-memory stand-in for the registry portal.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{json, Value};
use skcris_core::ApiRequest;
use skcris_engine::{FailureKind, FetchError, Transport, TransportResponse};
use url::Url;

pub const REGION_OPTIONS: [(i64, &str); 2] = [(1, "Bratislavský kraj"), (2, "Trnavský kraj")];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalState {
    pub region: Option<i64>,
    pub letter: Option<String>,
    pub resets: usize,
}

/// One request as the portal saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub label: String,
    pub cookie: String,
}

type CountFn = Box<dyn Fn(&PortalState) -> u64 + Send + Sync>;
type PageFn = Box<dyn Fn(&PortalState, u32, u32) -> Vec<String> + Send + Sync>;

pub struct FakePortal {
    state: Mutex<PortalState>,
    sent: Mutex<Vec<Sent>>,
    count: CountFn,
    page: PageFn,
}

impl FakePortal {
    pub fn new(
        count: impl Fn(&PortalState) -> u64 + Send + Sync + 'static,
        page: impl Fn(&PortalState, u32, u32) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Mutex::new(PortalState::default()),
            sent: Mutex::new(Vec::new()),
            count: Box::new(count),
            page: Box::new(page),
        }
    }

    /// Labels of every request so far, e.g. `count`, `page=1`, `region=2`.
    pub fn labels(&self) -> Vec<String> {
        self.sent().into_iter().map(|sent| sent.label).collect()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn respond(&self, request: &ApiRequest) -> (String, Result<TransportResponse, FetchError>) {
        let url = Url::parse(&request.url).unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let param = |name: &str| params.get(name).cloned().unwrap_or_default();
        let mut state = self.state.lock().unwrap();

        if request.url.contains("javax.portlet.action=reseta") {
            state.region = None;
            state.letter = None;
            state.resets += 1;
            let cookie = format!("JSESSIONID=reset{}", state.resets);
            return ("reset".into(), Ok(html("<html></html>", Some(&cookie))));
        }
        if request.url.contains("godetail") {
            let guid = param("guid");
            let body = format!(
                r#"<html><body><table class="detail">
                <tr><th colspan="2">Detail</th></tr>
                <tr><td>Názov</td><td>{guid}</td></tr>
                <tr><td>Súvisiace</td><td>-</td></tr>
                </table></body></html>"#
            );
            return (format!("detail={guid}"), Ok(html(&body, Some("JSESSIONID=detail"))));
        }

        match param("p_p_resource_id").as_str() {
            "" => ("listing".into(), Ok(html("<html></html>", Some("JSESSIONID=listing")))),
            "readSearchCount" => {
                let count = (self.count)(&state);
                ("count".into(), Ok(json_response(json!({ "count": count }), None)))
            }
            "selectKrajAjax" => {
                let arr: Vec<Value> = REGION_OPTIONS
                    .iter()
                    .map(|(id, name)| json!({ "id": id, "name": name }))
                    .collect();
                ("regions".into(), Ok(json_response(json!({ "arr": arr }), None)))
            }
            "selectOkresAjax" => {
                let id: i64 = param("id").parse().unwrap();
                state.region = Some(id);
                let cookie = format!("JSESSIONID=region{id}");
                (format!("region={id}"), Ok(json_response(json!({}), Some(&cookie))))
            }
            "selectNamestartAjax" => {
                let letter = param("ch");
                state.letter = Some(letter.clone());
                (format!("letter={letter}"), Ok(json_response(json!({}), None)))
            }
            "readSearchResult" => {
                let page: u32 = param("page").parse().unwrap();
                let per_page: u32 = param("perPage").parse().unwrap();
                let entries: Vec<Value> = (self.page)(&state, page, per_page)
                    .into_iter()
                    .map(|name| json!({ "guid": guid_for(&name), "name_sk": name }))
                    .collect();
                (format!("page={page}"), Ok(json_response(json!({ "str": entries }), None)))
            }
            other => (
                format!("unknown={other}"),
                Err(FetchError {
                    kind: FailureKind::HttpStatus(404),
                    message: "not found".into(),
                }),
            ),
        }
    }
}

#[async_trait::async_trait]
impl Transport for FakePortal {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, FetchError> {
        let (label, result) = self.respond(request);
        self.sent.lock().unwrap().push(Sent {
            label,
            cookie: request.header("Cookie").unwrap_or_default().to_string(),
        });
        result
    }
}

pub fn guid_for(name: &str) -> String {
    format!("cf_{}", name.replace(' ', "_"))
}

pub fn json_response(body: Value, cookie: Option<&str>) -> TransportResponse {
    response(body.to_string().into_bytes(), "application/json", cookie)
}

pub fn html(body: &str, cookie: Option<&str>) -> TransportResponse {
    response(body.as_bytes().to_vec(), "text/html; charset=utf-8", cookie)
}

fn response(body: Vec<u8>, content_type: &str, cookie: Option<&str>) -> TransportResponse {
    TransportResponse {
        url: String::new(),
        status: 200,
        content_type: Some(content_type.to_string()),
        set_cookies: cookie
            .map(|c| vec![format!("{c}; Path=/portal; HttpOnly")])
            .unwrap_or_default(),
        body,
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}
