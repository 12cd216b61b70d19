use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::filename::unique_image_path;
use crate::links::extract_image_url;
use crate::{FetchError, Fetcher};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("could not fetch detail page: {0}")]
    PageFetch(#[source] FetchError),
    #[error("no full-size image on {page_url}")]
    ImageMissing { page_url: String },
    #[error("could not create image file {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not get image {url}: {source}")]
    ImageGet {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("could not save file {}: {message}", path.display())]
    Copy { path: PathBuf, message: String },
    #[error("download cancelled")]
    Cancelled,
}

/// What happened to one detail link.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub link: String,
    pub result: Result<PathBuf, DownloadError>,
}

impl DownloadOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Follows a detail link to its full-resolution image and streams it to disk.
///
/// A failed transfer can leave a partial file behind; nothing cleans it up.
pub struct ImageDownloader {
    fetcher: Arc<dyn Fetcher>,
    output_dir: PathBuf,
}

impl ImageDownloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn download(&self, link: &str) -> Result<PathBuf, DownloadError> {
        let page = self
            .fetcher
            .fetch_page(link)
            .await
            .map_err(DownloadError::PageFetch)?;

        let image_url = extract_image_url(&page).ok_or_else(|| DownloadError::ImageMissing {
            page_url: link.to_string(),
        })?;

        let path = unique_image_path(&self.output_dir);
        let mut file = File::create(&path)
            .await
            .map_err(|source| DownloadError::CreateFile {
                path: path.clone(),
                source,
            })?;

        let mut body = self
            .fetcher
            .open_stream(&image_url)
            .await
            .map_err(|source| DownloadError::ImageGet {
                url: image_url.clone(),
                source,
            })?;

        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| copy_error(&path, err))?;
            file.write_all(&chunk)
                .await
                .map_err(|err| copy_error(&path, err))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|err| copy_error(&path, err))?;

        engine_debug!("saved {} ({} bytes) from {}", path.display(), written, image_url);
        Ok(path)
    }
}

fn copy_error(path: &Path, err: impl fmt::Display) -> DownloadError {
    DownloadError::Copy {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
