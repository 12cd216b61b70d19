use std::fs;
use std::sync::Arc;

use mosaic_engine::{DownloadError, FailureKind, FetchSettings, ImageDownloader, ReqwestFetcher};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader(dir: &TempDir) -> ImageDownloader {
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).expect("client builds");
    ImageDownloader::new(Arc::new(fetcher), dir.path())
}

async fn mount_detail_page(server: &MockServer, detail_path: &str, image_src: &str) {
    let html = format!(
        r#"<html><body><a class="wall_img_container_big" href="{detail_path}"><img src="{image_src}"></a></body></html>"#
    );
    Mock::given(method("GET"))
        .and(path(detail_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

fn files_in(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn downloads_full_size_image_to_unique_file() {
    let server = MockServer::start().await;
    let image = b"\xff\xd8\xff\xe0 fake jpeg".to_vec();
    mount_detail_page(&server, "/alice/101/", "/img/101.jpg").await;
    Mock::given(method("GET"))
        .and(path("/img/101.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(image.clone(), "image/jpeg"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let saved = downloader(&dir)
        .download(&format!("{}/alice/101/", server.uri()))
        .await
        .expect("download ok");

    assert_eq!(saved.parent(), Some(dir.path()));
    let name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("image-"));
    assert!(name.ends_with(".jpg"));
    assert_eq!(fs::read(&saved).unwrap(), image);
}

#[tokio::test]
async fn same_link_twice_yields_two_files() {
    let server = MockServer::start().await;
    mount_detail_page(&server, "/alice/5/", "/img/5.jpg").await;
    Mock::given(method("GET"))
        .and(path("/img/5.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"five".to_vec(), "image/jpeg"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let downloader = downloader(&dir);
    let link = format!("{}/alice/5/", server.uri());
    let first = downloader.download(&link).await.unwrap();
    let second = downloader.download(&link).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(files_in(&dir).len(), 2);
}

#[tokio::test]
async fn detail_page_failure_is_reported_as_page_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alice/404/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader(&dir)
        .download(&format!("{}/alice/404/", server.uri()))
        .await
        .unwrap_err();

    match err {
        DownloadError::PageFetch(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(404)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(files_in(&dir).is_empty());
}

#[tokio::test]
async fn missing_image_element_creates_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alice/7/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<p>photo removed</p>", "text/html"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader(&dir)
        .download(&format!("{}/alice/7/", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::ImageMissing { .. }));
    assert!(files_in(&dir).is_empty());
}

#[tokio::test]
async fn image_get_failure_is_reported_distinctly() {
    let server = MockServer::start().await;
    mount_detail_page(&server, "/alice/8/", "/img/8.jpg").await;
    Mock::given(method("GET"))
        .and(path("/img/8.jpg"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader(&dir)
        .download(&format!("{}/alice/8/", server.uri()))
        .await
        .unwrap_err();

    match err {
        DownloadError::ImageGet { url, source } => {
            assert!(url.ends_with("/img/8.jpg"));
            assert_eq!(source.kind, FailureKind::HttpStatus(503));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unwritable_output_dir_is_a_create_file_error() {
    let server = MockServer::start().await;
    mount_detail_page(&server, "/alice/9/", "/img/9.jpg").await;

    let dir = TempDir::new().unwrap();
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let downloader = ImageDownloader::new(Arc::new(fetcher), dir.path().join("missing"));
    let err = downloader
        .download(&format!("{}/alice/9/", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::CreateFile { .. }));
}
