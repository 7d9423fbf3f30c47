mod support;

use std::sync::Arc;
use std::time::Duration;

use skcris_core::{RequestBuilder, ResourceType};
use skcris_engine::{CrawlEvent, CrawlSettings, Crawler, EngineEvent, EngineHandle};
use support::{FakePortal, PortalState};

#[test]
fn engine_thread_reports_progress_then_completion() {
    let portal = Arc::new(FakePortal::new(|_: &PortalState| 0, |_: &PortalState, _, _| Vec::new()));
    let builder = Arc::new(RequestBuilder::default());
    let urls = vec![
        builder.detail_url(ResourceType::Researcher, "cfPers_1"),
        builder.detail_url(ResourceType::Researcher, "cfPers_2"),
    ];
    let settings = CrawlSettings {
        retry_delay: Duration::ZERO,
        ..CrawlSettings::default()
    };
    let handle = EngineHandle::new(Crawler::new(portal, builder, settings)).expect("engine");

    handle.crawl(urls);

    let mut scraped = 0;
    let report = loop {
        match handle.recv().expect("engine alive") {
            EngineEvent::Progress(CrawlEvent::RecordScraped { .. }) => scraped += 1,
            EngineEvent::Progress(_) => {}
            EngineEvent::CrawlCompleted(result) => break result.expect("crawl"),
        }
    };
    assert_eq!(scraped, 2);
    assert_eq!(report.records.len(), 2);
    assert!(handle.try_recv().is_none());
}
