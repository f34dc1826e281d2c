//! Fetch capability: the trait the worker pool drives and its HTTP
//! implementation.
//!
//! The pool never talks to the network itself; it hands every claimed job to
//! a [`Fetcher`]. Tests substitute instrumented implementations, production
//! uses [`HttpFetcher`].

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;
use url::Url;

use super::error::FetchError;
use crate::config::FetchOptions;

/// Capability to fetch one remote artifact into a directory.
///
/// # Object Safety
///
/// This trait uses `async_trait` to enable dynamic dispatch (`dyn Fetcher`),
/// which native async traits in Rust 2024 do not support.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and writes the body to `dest_dir/file_name`.
    ///
    /// A failed attempt must not leave a complete-looking file behind: the
    /// implementation either produces the full artifact or cleans up.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the URL is invalid, the request fails
    /// (network error, timeout), the server returns an error status, or
    /// writing to disk fails.
    async fn fetch(&self, dest_dir: &Path, file_name: &str, url: &str) -> Result<(), FetchError>;
}

/// HTTP fetcher with a fixed referer, timeout, and optional proxy.
///
/// Designed to be created once per run and shared by all workers, taking
/// advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] if the referer is not a valid header
    /// value, the proxy URL is malformed, or the client cannot be built.
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let client = build_client(options)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[tracing::instrument(level = "debug", skip(self, dest_dir), fields(url = %url))]
    async fn fetch(&self, dest_dir: &Path, file_name: &str, url: &str) -> Result<(), FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let file_path = dest_dir.join(file_name);

        // Stream response body to file, with cleanup on error
        let stream_result = stream_to_file(&file_path, response, url).await;
        if stream_result.is_err() {
            debug!(path = %file_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&file_path).await;
        }
        stream_result
    }
}

/// Streams the response body to `file_path`.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file_path: &Path,
    response: reqwest::Response,
    url: &str,
) -> Result<(), FetchError> {
    let file = File::create(file_path)
        .await
        .map_err(|e| FetchError::io(file_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(file_path, e))?;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(file_path, e))?;

    Ok(())
}

fn build_client(options: &FetchOptions) -> Result<Client, FetchError> {
    let referer = HeaderValue::from_str(&options.referer)
        .map_err(|_| FetchError::config(format!("invalid referer header: {}", options.referer)))?;
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, referer);

    let mut builder = Client::builder()
        .default_headers(headers)
        .timeout(options.timeout)
        .gzip(true);

    if let Some(proxy_url) = &options.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| FetchError::config(format!("invalid proxy URL {proxy_url}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| FetchError::config(format!("failed to build HTTP client: {e}")))
}
