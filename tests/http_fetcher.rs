//! The reqwest fetcher against a local HTTP server.

mod common;

use common::media_server;
use dyloader::downloader::{HttpFetcher, MediaFetcher};
use dyloader::utils::config::HttpSettings;
use dyloader::utils::DyloaderError;
use tempfile::TempDir;

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn body_spanning_many_chunks_is_written_whole() {
    let body = payload(8192 * 3 + 17);
    let server = media_server::start("200 OK", body.clone());
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("clip.mp3");

    let fetcher = HttpFetcher::new(&HttpSettings::default()).unwrap();
    let written = fetcher.fetch(&server.url, &dest).await.unwrap();

    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn spoofed_headers_are_sent() {
    let server = media_server::start("200 OK", b"abc".to_vec());
    let dir = TempDir::new().unwrap();
    let settings = HttpSettings::default();

    let fetcher = HttpFetcher::new(&settings).unwrap();
    fetcher.fetch(&server.url, &dir.path().join("a.mp3")).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let head = requests[0].to_ascii_lowercase();
    assert!(head.contains(&format!("referer: {}", settings.referer.to_ascii_lowercase())));
    assert!(head.contains(&format!("user-agent: {}", settings.user_agent.to_ascii_lowercase())));
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = media_server::start("404 Not Found", b"gone".to_vec());
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("missing.mp3");

    let fetcher = HttpFetcher::new(&HttpSettings::default()).unwrap();
    let err = fetcher.fetch(&server.url, &dest).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DyloaderError>(),
        Some(DyloaderError::HttpStatus(404))
    ));
    // Nothing is created for a rejected response
    assert!(!dest.exists());
}

#[tokio::test]
async fn unwritable_destination_is_io_error() {
    let server = media_server::start("200 OK", b"abc".to_vec());
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("no-such-dir").join("a.mp3");

    let fetcher = HttpFetcher::new(&HttpSettings::default()).unwrap();
    let err = fetcher.fetch(&server.url, &dest).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DyloaderError>(),
        Some(DyloaderError::Io(_))
    ));
}

#[tokio::test]
async fn small_chunk_size_still_writes_everything() {
    let body = payload(1000);
    let server = media_server::start("200 OK", body.clone());
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("small.mp3");
    let settings = HttpSettings {
        chunk_size: 7,
        ..HttpSettings::default()
    };

    let fetcher = HttpFetcher::new(&settings).unwrap();
    fetcher.fetch(&server.url, &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}
