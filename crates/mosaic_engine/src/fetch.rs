use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use engine_logging::engine_warn;
use futures_util::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::decode::decode_html;
use crate::{FailureKind, FetchError, FetchedPage};

/// Image body chunks, streamed straight from the response.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, FetchError>> + Send>>;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Whole-request deadline; `None` lets slow transfers run to completion.
    pub request_timeout: Option<Duration>,
    pub redirect_limit: usize,
    /// Cap for list and detail pages. Image bodies are not capped.
    pub max_page_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            redirect_limit: 5,
            max_page_bytes: 5 * 1024 * 1024,
            user_agent: concat!("mosaic-grab/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a page and decode it into a document.
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// GET a resource and hand back its body as a chunk stream.
    async fn open_stream(&self, url: &str) -> Result<BodyStream, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, settings })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::new(url, FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|err| map_reqwest_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                url,
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }

    fn too_large(&self, url: &str, actual: u64) -> FetchError {
        FetchError::new(
            url,
            FailureKind::TooLarge {
                max_bytes: self.settings.max_page_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.get(url).await?;

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_page_bytes {
                return Err(self.too_large(url, content_len));
            }
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(url, err))?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_page_bytes {
                return Err(self.too_large(url, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let decoded = decode_html(&bytes, content_type.as_deref());
        if decoded.had_replacements {
            engine_warn!("{url}: invalid {} bytes replaced", decoded.encoding_label);
        }

        Ok(FetchedPage {
            url: final_url,
            html: decoded.html,
            encoding_label: decoded.encoding_label,
        })
    }

    async fn open_stream(&self, url: &str) -> Result<BodyStream, FetchError> {
        let response = self.get(url).await?;
        let owned_url = url.to_string();
        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|err| map_reqwest_error(&owned_url, err)));
        Ok(Box::pin(stream))
    }
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(url, FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(url, FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(url, FailureKind::Network, err.to_string())
}
