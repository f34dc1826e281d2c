//! Bounded retry loop around the fetch capability.
//!
//! Every failure counts uniformly against a fixed per-job attempt budget.
//! There is no backoff: a failed attempt is retried immediately, and a job
//! whose budget is spent is abandoned without failing the batch.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::error::FetchError;
use super::fetcher::Fetcher;
use super::job::DownloadJob;

/// Outcome of driving one job through the retry loop.
///
/// Both variants carry the number of attempts spent so the caller can track
/// retry counts.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The artifact was written to the staging directory.
    Completed {
        /// Attempts spent, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed; the job produced no file.
    Abandoned {
        /// Attempts spent, equal to the configured budget.
        attempts: u32,
        /// The error from the final attempt.
        last_error: FetchError,
    },
}

/// Drives a [`Fetcher`] with a fixed attempt budget per job.
#[derive(Clone)]
pub struct RetryingFetcher {
    fetcher: Arc<dyn Fetcher>,
    max_attempts: u32,
}

impl RetryingFetcher {
    /// Creates a retrying wrapper around `fetcher`.
    ///
    /// A `max_attempts` of zero is treated as one: every job gets at least
    /// one attempt.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, max_attempts: u32) -> Self {
        Self {
            fetcher,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns the configured attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetches one job into `staging_dir`, retrying until success or until
    /// the attempt budget is spent.
    ///
    /// Failures are absorbed here; the outcome reports them, it never
    /// propagates them.
    pub async fn fetch(&self, job: &DownloadJob, staging_dir: &Path) -> FetchOutcome {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(id = job.id, attempt, "attempting download");

            match self
                .fetcher
                .fetch(staging_dir, &job.file_name, &job.url)
                .await
            {
                Ok(()) => return FetchOutcome::Completed { attempts: attempt },
                Err(error) => {
                    if attempt >= self.max_attempts {
                        return FetchOutcome::Abandoned {
                            attempts: attempt,
                            last_error: error,
                        };
                    }
                    warn!(
                        id = job.id,
                        title = %job.title,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "fetch attempt failed, retrying"
                    );
                }
            }
        }
    }
}
