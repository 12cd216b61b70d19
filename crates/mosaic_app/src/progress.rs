use engine_logging::engine_debug;
use mosaic_engine::{EngineEvent, ProgressSink};

/// Prints one line per visited list page to stdout.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::PageVisited { url, .. } => println!("Processing {url}"),
            EngineEvent::ImageSaved { link, path } => {
                engine_debug!("{} -> {}", link, path.display());
            }
            // Already logged by the engine; per-image failures stay quiet here.
            EngineEvent::ImageFailed { .. } => {}
        }
    }
}
