use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use mosaic_core::{GrabConfig, RunSummary};

use crate::coordinator::{Coordinator, GrabError, ProgressSink};
use crate::fetch::{FetchSettings, ReqwestFetcher};
use crate::persist::ensure_output_dir;

/// Owns the async runtime and drives one run to completion from sync code.
pub struct Engine {
    config: GrabConfig,
    settings: FetchSettings,
}

impl Engine {
    pub fn new(config: GrabConfig, settings: FetchSettings) -> Self {
        Self { config, settings }
    }

    pub fn config(&self) -> &GrabConfig {
        &self.config
    }

    /// Creates the output directory, then crawls and downloads. Blocks until
    /// every spawned task has finished. Ctrl-C cancels the run.
    pub fn run(&self, sink: Arc<dyn ProgressSink>) -> Result<RunSummary, GrabError> {
        ensure_output_dir(self.config.output_dir())?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(GrabError::Runtime)?;
        engine_debug!(
            "starting run for {} with {} concurrent downloads",
            self.config.username(),
            self.config.concurrency()
        );

        runtime.block_on(async {
            let fetcher = ReqwestFetcher::new(self.settings.clone()).map_err(GrabError::HttpClient)?;
            let coordinator = Coordinator::new(self.config.clone(), Arc::new(fetcher), sink);

            let cancel = coordinator.cancellation_token();
            let interrupt = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    engine_warn!("interrupted, cancelling downloads");
                    cancel.cancel();
                }
            });

            let result = coordinator.run().await;
            interrupt.abort();
            result
        })
    }
}
