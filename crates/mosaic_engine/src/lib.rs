//! Mosaic engine: fetching, extraction, downloads, fan-out and archiving.
mod archive;
mod coordinator;
mod decode;
mod download;
mod engine;
mod fetch;
mod filename;
mod links;
mod persist;
mod types;

pub use archive::{create_archive, remove_output_dir, ArchiveError, ArchiveSummary, CleanupError};
pub use coordinator::{Coordinator, GrabError, NullProgressSink, ProgressSink};
pub use decode::{decode_html, DecodedHtml};
pub use download::{DownloadError, DownloadOutcome, ImageDownloader};
pub use engine::Engine;
pub use fetch::{BodyStream, FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{unique_image_filename, unique_image_path, IMAGE_EXTENSION, IMAGE_PREFIX};
pub use links::{extract_detail_links, extract_image_url, extract_last_page_offset};
pub use persist::{ensure_output_dir, PersistError};
pub use types::{EngineEvent, FailureKind, FetchError, FetchedPage};
