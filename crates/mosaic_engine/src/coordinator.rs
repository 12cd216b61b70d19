//! Fan-out/fan-in over list pages and their detail links.
//!
//! List pages are fetched one after another in the control path so the last
//! page is known before work is spawned. Every page then gets its own task,
//! which spawns one download task per detail link. Downloads share a
//! semaphore that caps how many run at once, and a cancellation token that a
//! fatal error (or Ctrl-C) trips. Outcomes come back over a channel and are
//! tallied into the [`RunSummary`].

use std::io;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use mosaic_core::{page_offsets, GrabConfig, ListPageRef, RunSummary};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::download::{DownloadError, DownloadOutcome, ImageDownloader};
use crate::links::{extract_detail_links, extract_last_page_offset};
use crate::persist::PersistError;
use crate::{EngineEvent, FetchError, FetchedPage, Fetcher};

/// Receives progress events as the run advances.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum GrabError {
    #[error("error on fetching list page at offset {offset}: {source}")]
    ListPage {
        offset: u32,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    OutputDir(#[from] PersistError),
    #[error("could not build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("could not start async runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("run cancelled")]
    Cancelled,
}

pub struct Coordinator {
    config: GrabConfig,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl Coordinator {
    pub fn new(config: GrabConfig, fetcher: Arc<dyn Fetcher>, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            config,
            fetcher,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Token shared with every spawned task; cancelling it stops the run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self) -> Result<RunSummary, GrabError> {
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let ctx = PageContext {
            downloader: Arc::new(ImageDownloader::new(
                self.fetcher.clone(),
                self.config.output_dir(),
            )),
            semaphore: Arc::new(Semaphore::new(self.config.concurrency())),
            cancel: self.cancel.clone(),
            sink: self.sink.clone(),
            outcome_tx,
        };
        let mut pages = JoinSet::new();

        let first = self.fetch_list_page(&self.config.list_page(0)).await?;
        let last_offset = extract_last_page_offset(&first);
        engine_info!(
            "profile {} ends at offset {} (page size {})",
            self.config.username(),
            last_offset,
            self.config.page_size()
        );
        pages.spawn(run_page(ctx.clone(), first));

        for offset in page_offsets(last_offset, self.config.page_size()).skip(1) {
            let page = match self.fetch_list_page(&self.config.list_page(offset)).await {
                Ok(page) => page,
                Err(err) => {
                    engine_error!("{err}; cancelling in-flight downloads");
                    self.cancel.cancel();
                    drain(&mut pages).await;
                    return Err(err);
                }
            };
            pages.spawn(run_page(ctx.clone(), page));
        }
        // Only the tasks keep senders alive from here on.
        drop(ctx);

        let mut summary = RunSummary::new();
        while let Some(joined) = pages.join_next().await {
            match joined {
                Ok(links_found) => summary.record_page(links_found),
                Err(err) => engine_error!("page task failed: {err}"),
            }
        }
        while let Some(outcome) = outcome_rx.recv().await {
            summary.record_download(outcome.succeeded());
        }

        if self.cancel.is_cancelled() {
            return Err(GrabError::Cancelled);
        }
        engine_info!("run finished: {summary}");
        Ok(summary)
    }

    async fn fetch_list_page(&self, page: &ListPageRef) -> Result<FetchedPage, GrabError> {
        self.sink.emit(EngineEvent::PageVisited {
            offset: page.offset,
            url: page.url.to_string(),
        });
        tokio::select! {
            _ = self.cancel.cancelled() => Err(GrabError::Cancelled),
            result = self.fetcher.fetch_page(page.url.as_str()) => {
                result.map_err(|source| GrabError::ListPage {
                    offset: page.offset,
                    source,
                })
            }
        }
    }
}

#[derive(Clone)]
struct PageContext {
    downloader: Arc<ImageDownloader>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    sink: Arc<dyn ProgressSink>,
    outcome_tx: UnboundedSender<DownloadOutcome>,
}

impl PageContext {
    async fn download(&self, link: String) {
        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(DownloadError::Cancelled),
            result = self.download_with_permit(&link) => result,
        };

        match &result {
            Ok(path) => self.sink.emit(EngineEvent::ImageSaved {
                link: link.clone(),
                path: path.clone(),
            }),
            Err(err) => {
                engine_warn!("skipping {link}: {err}");
                self.sink.emit(EngineEvent::ImageFailed {
                    link: link.clone(),
                    reason: err.to_string(),
                });
            }
        }
        // The receiver outlives every task unless the run already bailed out.
        let _ = self.outcome_tx.send(DownloadOutcome { link, result });
    }

    async fn download_with_permit(&self, link: &str) -> Result<std::path::PathBuf, DownloadError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DownloadError::Cancelled)?;
        self.downloader.download(link).await
    }
}

/// Spawns one download per detail link and waits for all of them.
async fn run_page(ctx: PageContext, page: FetchedPage) -> usize {
    let links = extract_detail_links(&page);
    engine_debug!("{} detail links on {}", links.len(), page.url);
    let links_found = links.len();

    let mut downloads = JoinSet::new();
    for link in links {
        let ctx = ctx.clone();
        downloads.spawn(async move { ctx.download(link).await });
    }
    while let Some(joined) = downloads.join_next().await {
        if let Err(err) = joined {
            engine_error!("download task failed: {err}");
        }
    }
    links_found
}

async fn drain(pages: &mut JoinSet<usize>) {
    while pages.join_next().await.is_some() {}
}
