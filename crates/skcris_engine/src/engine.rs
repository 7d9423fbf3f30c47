use std::sync::{mpsc, Arc};
use std::thread;

use crate::crawl::{CrawlEvent, CrawlReport, Crawler, ProgressSink};
use crate::ScrapeError;

enum EngineCommand {
    Crawl { start_urls: Vec<String> },
}

#[derive(Debug)]
pub enum EngineEvent {
    Progress(CrawlEvent),
    CrawlCompleted(Result<CrawlReport, ScrapeError>),
}

/// Runs crawls on a background thread that owns a tokio runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(crawler: Crawler) -> Result<Self, ScrapeError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| ScrapeError::Config(format!("cannot start tokio runtime: {err}")))?;
        let crawler = Arc::new(crawler);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                runtime.block_on(handle_command(crawler.as_ref(), command, event_tx.clone()));
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn crawl(&self, start_urls: Vec<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Crawl { start_urls });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(EngineEvent::Progress(event));
    }
}

async fn handle_command(
    crawler: &Crawler,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Crawl { start_urls } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = crawler.run(&start_urls, &sink).await;
            let _ = event_tx.send(EngineEvent::CrawlCompleted(result));
        }
    }
}
