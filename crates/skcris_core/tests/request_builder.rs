use pretty_assertions::assert_eq;
use skcris_core::{
    DatasetType, EntityLink, InfraKind, OutputKind, RequestBuilder, RequestError, RequestKind,
    ResourceType,
};

const BASE: &str = "https://www.skcris.sk/portal";

fn builder() -> RequestBuilder {
    RequestBuilder::default()
}

fn url_of(kind: RequestKind<'_>, rt: ResourceType) -> String {
    builder().build(kind, rt, None).expect("request").url
}

#[test]
fn count_request_targets_read_search_count() {
    assert_eq!(
        url_of(RequestKind::Count, ResourceType::Researcher),
        format!("{BASE}/register-researchers?p_p_id=researcherSearchResult_WAR_cvtiappweb&p_p_lifecycle=2&p_p_resource_id=readSearchCount")
    );
}

#[test]
fn region_requests_use_the_facet_component() {
    assert_eq!(
        url_of(RequestKind::RegionOptions, ResourceType::Organisation),
        format!("{BASE}/register-organizations?p_p_id=fazetSelectTreeSearch_WAR_cvtiappweb&p_p_lifecycle=2&p_p_resource_id=selectKrajAjax")
    );
    assert_eq!(
        url_of(RequestKind::RegionSelect { region_id: 7 }, ResourceType::Organisation),
        format!("{BASE}/register-organizations?p_p_id=fazetSelectTreeSearch_WAR_cvtiappweb&p_p_lifecycle=2&p_p_resource_id=selectOkresAjax&id=7")
    );
}

#[test]
fn letter_select_lowercases_the_letter() {
    assert_eq!(
        url_of(RequestKind::LetterSelect { letter: "K" }, ResourceType::Project),
        format!("{BASE}/register-projects?p_p_id=projectSearchResult_WAR_cvtiappweb&p_p_lifecycle=2&p_p_resource_id=selectNamestartAjax&ch=k")
    );
}

#[test]
fn empty_letter_fails_before_any_request_exists() {
    let err = builder()
        .build(RequestKind::LetterSelect { letter: "" }, ResourceType::Project, None)
        .unwrap_err();
    assert_eq!(err, RequestError::MissingLetter);

    let err = builder()
        .build(RequestKind::LetterSelect { letter: "7" }, ResourceType::Project, None)
        .unwrap_err();
    assert_eq!(err, RequestError::InvalidLetter("7".to_string()));
}

#[test]
fn reset_uses_the_search_form_component() {
    assert_eq!(
        url_of(RequestKind::Reset, ResourceType::Researcher),
        format!("{BASE}/register-researchers?p_p_id=verticalResearcherSearch_WAR_cvtiappweb&p_p_lifecycle=1&p_p_state=normal&_verticalResearcherSearch_WAR_cvtiappweb_javax.portlet.action=reseta")
    );
}

#[test]
fn paged_requests_carry_page_and_per_page() {
    assert_eq!(
        url_of(
            RequestKind::PageResults {
                page: 3,
                per_page: 500
            },
            ResourceType::Organisation
        ),
        format!("{BASE}/register-organizations?p_p_id=organisationSearchResult_WAR_cvtiappweb&p_p_lifecycle=2&p_p_resource_id=readSearchResult&page=3&perPage=500")
    );
    assert_eq!(
        url_of(
            RequestKind::LinkedPage {
                relation_id: "goresprojectlist",
                page: 1,
                per_page: 10
            },
            ResourceType::Researcher
        ),
        format!("{BASE}/register-researchers?p_p_id=researcherSearchResult_WAR_cvtiappweb&p_p_lifecycle=2&p_p_resource_id=goresprojectlist&page=1&perPage=10")
    );
}

#[test]
fn address_page_is_single_shot() {
    assert_eq!(
        url_of(RequestKind::AddressPage, ResourceType::Organisation),
        format!("{BASE}/register-organizations?p_p_id=organisationSearchResult_WAR_cvtiappweb&p_p_lifecycle=2&p_p_state=normal&p_p_mode=view&p_p_resource_id=goorgaddresses&p_p_cacheability=cacheLevelPage&p_p_col_id=column-3&p_p_col_pos=2&p_p_col_count=3&_organisationSearchResult_WAR_cvtiappweb_implicitModel=true&page=1&perPage=1")
    );
}

#[test]
fn detail_urls_use_the_type_specific_action() {
    let b = builder();
    assert_eq!(
        b.detail_url(ResourceType::Researcher, "cfPers_17002"),
        format!("{BASE}/register-researchers?p_p_id=researcherSearchResult_WAR_cvtiappweb&p_p_lifecycle=1&p_p_state=normal&_researcherSearchResult_WAR_cvtiappweb_javax.portlet.action=godetail&guid=cfPers_17002")
    );
    assert!(b
        .detail_url(ResourceType::Project, "cfProj_20239")
        .contains("javax.portlet.action=projectgodetail&guid=cfProj_20239"));
}

#[test]
fn listing_urls_follow_the_dataset() {
    assert_eq!(
        builder().listing_url(DatasetType::Organisations),
        format!("{BASE}/web/guest/register-organizations")
    );
}

#[test]
fn entity_urls_cover_every_link_target() {
    let b = builder();
    assert!(b
        .entity_url(EntityLink::Project, ResourceType::Organisation, 12)
        .unwrap()
        .ends_with("javax.portlet.action=projectgodetail&id=12"));
    assert!(b
        .entity_url(
            EntityLink::Output(OutputKind::Citation),
            ResourceType::Researcher,
            5
        )
        .unwrap()
        .ends_with("_researcherSearchResult_WAR_cvtiappweb_action=linkedvysledky&type=citation&id=5"));
    assert!(b
        .entity_url(
            EntityLink::Infra(InfraKind::Facility),
            ResourceType::Project,
            270
        )
        .unwrap()
        .ends_with("_action=projlinkedinfrastr&type=facil&id=270"));
    assert!(b
        .entity_url(EntityLink::Document, ResourceType::Project, 3407035)
        .unwrap()
        .ends_with("documentId=3407035"));
    assert_eq!(
        b.entity_url(EntityLink::None, ResourceType::Organisation, 1),
        None
    );
}

#[test]
fn cookie_is_the_only_varying_header() {
    let b = builder();
    let anonymous = b.build(RequestKind::Count, ResourceType::Project, None).unwrap();
    let session = b
        .build(RequestKind::Count, ResourceType::Project, Some("JSESSIONID=abc"))
        .unwrap();

    assert_eq!(anonymous.header("Cookie"), Some(""));
    assert_eq!(session.header("cookie"), Some("JSESSIONID=abc"));
    assert_eq!(
        anonymous.header("Accept"),
        Some("application/json, text/javascript, */*; q=0.01")
    );
    assert_eq!(anonymous.url, session.url);
    assert_eq!(anonymous.headers.len(), session.headers.len());
}

#[test]
fn building_twice_gives_identical_requests() {
    let b = builder();
    for rt in ResourceType::ALL {
        let kinds = [
            RequestKind::Count,
            RequestKind::RegionOptions,
            RequestKind::RegionSelect { region_id: 3 },
            RequestKind::LetterSelect { letter: "a" },
            RequestKind::Reset,
            RequestKind::PageResults {
                page: 2,
                per_page: 50,
            },
            RequestKind::AddressPage,
        ];
        for kind in kinds {
            let first = b.build(kind, rt, Some("JSESSIONID=x")).unwrap();
            let second = b.build(kind, rt, Some("JSESSIONID=x")).unwrap();
            assert_eq!(first, second);
        }
    }
}

#[test]
fn custom_base_url_drops_trailing_slash() {
    let b = RequestBuilder::new("http://127.0.0.1:8080/portal/").unwrap();
    assert_eq!(b.base_url(), "http://127.0.0.1:8080/portal");
    assert!(RequestBuilder::new("not a url").is_err());
}
