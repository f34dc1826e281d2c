//! Explicit run configuration.
//!
//! All tunables are plain values threaded through constructors; nothing here
//! is read from globals or the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::download::DEFAULT_WORKERS;
use crate::download::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REFERER, DEFAULT_TIMEOUT_SECS};

/// Options applied to every fetch attempt.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Referer header sent with every artifact request.
    pub referer: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Optional proxy URL (e.g. `http://127.0.0.1:8080`).
    pub proxy: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            referer: DEFAULT_REFERER.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy: None,
        }
    }
}

/// Configuration for one download run.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Base directory all author and bookmark directories live under.
    pub base_dir: PathBuf,
    /// Number of concurrent download workers.
    pub workers: usize,
    /// Fetch attempts per job before it is abandoned.
    pub max_attempts: u32,
    /// Rename an author's directory on disk when their display name changed.
    pub auto_rename: bool,
    /// Options applied to every fetch attempt.
    pub fetch: FetchOptions,
}

impl DownloadConfig {
    /// Creates a configuration with default tunables rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            workers: DEFAULT_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            auto_rename: true,
            fetch: FetchOptions::default(),
        }
    }
}
