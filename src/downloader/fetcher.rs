//! Streaming media download

use crate::utils::config::HttpSettings;
use crate::utils::error::DyloaderError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, info};

/// Moves the bytes behind a media URL into a local file
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Stream `url` into a newly created file at `destination`.
    ///
    /// Returns the number of bytes written. A failed fetch may leave a
    /// partial file behind; callers must not use it.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64>;
}

/// reqwest-backed fetcher sending spoofed browser headers
pub struct HttpFetcher {
    client: Client,
    chunk_size: usize,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let referer = HeaderValue::from_str(&settings.referer)
            .map_err(|_| DyloaderError::Config(format!("invalid referer: {}", settings.referer)))?;
        headers.insert(REFERER, referer);

        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers);
        if settings.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        }
        let client = builder.build().map_err(DyloaderError::Network)?;

        Ok(Self {
            client,
            chunk_size: settings.chunk_size.max(1),
        })
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DyloaderError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DyloaderError::HttpStatus(status.as_u16()).into());
        }

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream);

        let mut file = File::create(destination)
            .await
            .map_err(DyloaderError::Io)?;
        let mut buf = vec![0u8; self.chunk_size];
        let mut written = 0u64;

        loop {
            let n = fill_chunk(&mut reader, &mut buf)
                .await
                .context("Response stream interrupted")?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await.map_err(DyloaderError::Io)?;
            written += n as u64;
        }

        // Ensure file is flushed
        file.flush().await.map_err(DyloaderError::Io)?;

        info!("Downloaded {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

/// Read until `buf` is full or the stream ends; returns the bytes read
async fn fill_chunk<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
