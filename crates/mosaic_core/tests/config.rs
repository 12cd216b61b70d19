use std::path::{Path, PathBuf};

use mosaic_core::{
    ConfigError, GrabConfig, RunSummary, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, MAX_CONCURRENCY,
    PAGE_SIZE,
};
use pretty_assertions::assert_eq;

#[test]
fn defaults_match_the_cli_contract() {
    let config = GrabConfig::new("alice").unwrap();

    assert_eq!(config.username(), "alice");
    assert_eq!(config.base_url().as_str(), "http://www.fotolog.com/");
    assert_eq!(config.page_size(), PAGE_SIZE);
    assert_eq!(config.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
    assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
    assert!(!config.zip());
    assert_eq!(config.archive_path(), Ok(PathBuf::from("images.zip")));
}

#[test]
fn blank_username_is_rejected() {
    assert_eq!(GrabConfig::new("").unwrap_err(), ConfigError::MissingUsername);
    assert_eq!(GrabConfig::new("   ").unwrap_err(), ConfigError::MissingUsername);
}

#[test]
fn username_is_trimmed() {
    assert_eq!(GrabConfig::new("  dave \n").unwrap().username(), "dave");
}

#[test]
fn concurrency_is_bounded() {
    let config = GrabConfig::new("alice").unwrap();
    assert_eq!(
        config.clone().with_concurrency(0).unwrap_err(),
        ConfigError::InvalidConcurrency {
            value: 0,
            max: MAX_CONCURRENCY
        }
    );
    assert!(config.clone().with_concurrency(MAX_CONCURRENCY + 1).is_err());
    assert_eq!(config.with_concurrency(4).unwrap().concurrency(), 4);
}

#[test]
fn zero_page_size_is_rejected() {
    let err = GrabConfig::new("alice")
        .unwrap()
        .with_page_size(0)
        .unwrap_err();
    assert_eq!(err, ConfigError::InvalidPageSize);
}

#[test]
fn zip_into_current_or_parent_dir_is_rejected() {
    for dir in [".", ".."] {
        let config = GrabConfig::new("alice")
            .unwrap()
            .with_output_dir(dir)
            .with_zip(true);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NoArchiveName(PathBuf::from(dir)))
        );
    }
}

#[test]
fn nameless_output_dir_is_fine_without_zip() {
    let config = GrabConfig::new("alice").unwrap().with_output_dir(".");
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn summary_tracks_every_outcome() {
    let mut summary = RunSummary::new();
    summary.record_page(3);
    summary.record_page(1);
    summary.record_download(true);
    summary.record_download(true);
    summary.record_download(false);
    assert!(!summary.is_complete());
    summary.record_download(true);

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.links_found, 4);
    assert_eq!(summary.images_saved, 3);
    assert_eq!(summary.images_failed, 1);
    assert!(summary.is_complete());
    assert_eq!(
        summary.to_string(),
        "visited 2 pages, saved 3 images, 1 failed"
    );
}
