//! Error types for the download module.
//!
//! Failures are split into two severities: [`FetchError`] covers a single
//! fetch attempt and is absorbed by the retry loop, while [`BatchError`]
//! covers filesystem and scheduling failures that abort the whole batch.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a single fetch attempt.
///
/// These never terminate a batch on their own; the retry loop counts them
/// against the per-job attempt budget.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing the artifact (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The fetcher could not be constructed from the given options.
    #[error("invalid fetch configuration: {reason}")]
    Config {
        /// What was wrong with the options.
        reason: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// Errors that abort a whole batch run.
///
/// Per-job fetch failures never surface here; a job whose retry budget is
/// spent is dropped silently and the batch continues.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The requested worker count is outside the supported range.
    #[error("invalid worker count: {value} (must be between {min} and {max})")]
    InvalidWorkers {
        /// The rejected worker count.
        value: usize,
        /// Smallest accepted count.
        min: usize,
        /// Largest accepted count.
        max: usize,
    },

    /// Failed to clear or create the staging directory before downloading.
    #[error("failed to prepare staging directory {path}: {source}")]
    StagingSetup {
        /// The staging directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove the staging directory after a completed batch.
    #[error("failed to remove staging directory {path}: {source}")]
    StagingTeardown {
        /// The staging directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a completed artifact from staging to its final path.
    #[error("failed to place {file_name} into {target}: {source}")]
    Place {
        /// File name of the artifact that could not be moved.
        file_name: String,
        /// The final directory the move targeted.
        target: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A worker task panicked or was aborted before finishing.
    #[error("download worker failed: {message}")]
    Worker {
        /// Join error description from the runtime.
        message: String,
    },
}

impl BatchError {
    /// Creates an invalid worker count error.
    pub fn invalid_workers(value: usize, min: usize, max: usize) -> Self {
        Self::InvalidWorkers { value, min, max }
    }

    /// Creates a staging setup error.
    pub fn staging_setup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StagingSetup {
            path: path.into(),
            source,
        }
    }

    /// Creates a staging teardown error.
    pub fn staging_teardown(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StagingTeardown {
            path: path.into(),
            source,
        }
    }

    /// Creates a placement error.
    pub fn place(
        file_name: impl Into<String>,
        target: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Place {
            file_name: file_name.into(),
            target: target.into(),
            source,
        }
    }

    /// Creates a worker failure error from a join error.
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or `From<std::io::Error>`
// because our error variants require context (url, path) that the source errors
// don't provide. The helper constructor methods (network(), io(), etc.) are the
// correct pattern here as they allow callers to provide necessary context.
