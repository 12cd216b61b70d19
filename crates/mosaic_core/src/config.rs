use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::pagination::{list_page_url, ListPageRef, PAGE_SIZE};

pub const DEFAULT_BASE_URL: &str = "http://www.fotolog.com";
pub const DEFAULT_OUTPUT_DIR: &str = "images";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const MAX_CONCURRENCY: usize = 64;

const ARCHIVE_EXTENSION: &str = "zip";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a username is required")]
    MissingUsername,
    #[error("concurrency must be between 1 and {max}, got {value}")]
    InvalidConcurrency { value: usize, max: usize },
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error("output directory {} has no name to derive an archive from", .0.display())]
    NoArchiveName(PathBuf),
}

/// Immutable settings for one run, built once at startup and handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabConfig {
    username: String,
    base_url: Url,
    page_size: u32,
    output_dir: PathBuf,
    concurrency: usize,
    zip: bool,
}

impl GrabConfig {
    pub fn new(username: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        Ok(Self {
            username,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            page_size: PAGE_SIZE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            zip: false,
        })
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, ConfigError> {
        if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: concurrency,
                max: MAX_CONCURRENCY,
            });
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_zip(mut self, zip: bool) -> Self {
        self.zip = zip;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn zip(&self) -> bool {
        self.zip
    }

    /// Archive written next to the output directory: `images` becomes `images.zip`.
    ///
    /// The last component must be a real name. `.`, `..` or a root have no
    /// sibling to write to, and a guess there would land inside the directory
    /// that cleanup later empties.
    pub fn archive_path(&self) -> Result<PathBuf, ConfigError> {
        let mut components: Vec<Component<'_>> = self.output_dir.components().collect();
        let Some(Component::Normal(name)) = components.pop() else {
            return Err(ConfigError::NoArchiveName(self.output_dir.clone()));
        };
        let mut file_name = name.to_os_string();
        file_name.push(".");
        file_name.push(ARCHIVE_EXTENSION);
        let parent: PathBuf = components.into_iter().collect();
        Ok(parent.join(file_name))
    }

    /// Checks settings that only conflict in combination.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zip {
            self.archive_path()?;
        }
        Ok(())
    }

    pub fn list_page(&self, offset: u32) -> ListPageRef {
        ListPageRef {
            offset,
            url: list_page_url(&self.base_url, &self.username, offset),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_path_sits_next_to_output_dir() {
        let config = GrabConfig::new("alice")
            .unwrap()
            .with_output_dir("out/images");
        assert_eq!(config.archive_path(), Ok(PathBuf::from("out/images.zip")));
    }

    #[test]
    fn archive_path_ignores_trailing_separator_and_dot() {
        let config = GrabConfig::new("alice").unwrap().with_output_dir("out/images/.");
        assert_eq!(config.archive_path(), Ok(PathBuf::from("out/images.zip")));
        let config = GrabConfig::new("alice").unwrap().with_output_dir("images/");
        assert_eq!(config.archive_path(), Ok(PathBuf::from("images.zip")));
    }

    #[test]
    fn nameless_output_dirs_have_no_archive() {
        for dir in [".", "..", "out/..", "/"] {
            let config = GrabConfig::new("alice").unwrap().with_output_dir(dir);
            assert_eq!(
                config.archive_path(),
                Err(ConfigError::NoArchiveName(PathBuf::from(dir)))
            );
        }
    }

    #[test]
    fn base_url_requires_http_scheme() {
        let err = GrabConfig::new("alice")
            .unwrap()
            .with_base_url("ftp://example.com")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}
