//! Worker pool executing a job list with a shared claim cursor.
//!
//! A fixed number of workers is spawned up front; each repeatedly claims the
//! next unclaimed job index from a shared atomic cursor, drives the job
//! through the retry loop, and promotes completed artifacts out of staging.
//! The batch ends when every worker has observed cursor exhaustion.
//!
//! # Concurrency Model
//!
//! - Each worker runs in its own Tokio task
//! - The cursor is an `AtomicUsize`; a claim is one `fetch_add(1)`, so every
//!   job index is handed to exactly one worker
//! - Workers never cancel each other: a filesystem failure stops only the
//!   worker that hit it, the rest drain the remaining jobs
//! - Completion is detected by joining all worker handles
//!
//! # Failure Behavior
//!
//! Per-job fetch failures are absorbed by the retry budget and at worst
//! abandon the one job. Staging and placement errors are batch-fatal: the
//! first one is returned after all workers have stopped, and the staging
//! directory is left in place for the next run to clear.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info, instrument, warn};

use super::error::BatchError;
use super::fetcher::Fetcher;
use super::job::DownloadJob;
use super::retry::{FetchOutcome, RetryingFetcher};
use super::staging::TempStaging;

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 64;

/// Default worker count if not specified.
pub const DEFAULT_WORKERS: usize = 5;

/// Statistics from one batch run.
///
/// Tracks completed, abandoned, and retried jobs during a `run()` invocation.
/// Uses atomic counters for thread-safe updates from concurrent workers.
#[derive(Debug, Default)]
pub struct BatchStats {
    completed: AtomicUsize,
    abandoned: AtomicUsize,
    retried: AtomicUsize,
}

impl BatchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of artifacts placed in the final directory.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of jobs dropped after a spent retry budget.
    #[must_use]
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Returns the total number of jobs processed (completed + abandoned).
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.abandoned()
    }

    /// Returns the number of retry attempts made across all jobs.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    /// Increments the completed counter.
    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Increments the abandoned counter.
    fn increment_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::SeqCst);
    }

    /// Adds the retries spent on one job (attempts beyond the first).
    fn add_retried(&self, attempts: u32) {
        let retries = usize::try_from(attempts.saturating_sub(1)).unwrap_or(0);
        if retries > 0 {
            self.retried.fetch_add(retries, Ordering::SeqCst);
        }
    }
}

/// Fixed-size worker pool for one batch of downloads.
///
/// The pool owns the fetch capability and the retry budget; the job list and
/// directories are supplied per run, so one pool can execute several batches
/// back to back.
pub struct WorkerPool {
    workers: usize,
    retry: RetryingFetcher,
}

impl WorkerPool {
    /// Creates a pool with `workers` concurrent workers.
    ///
    /// # Arguments
    ///
    /// * `workers` - Number of concurrent workers (1-64)
    /// * `fetcher` - Fetch capability shared by all workers
    /// * `max_attempts` - Fetch attempts per job before it is abandoned
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidWorkers`] if the value is outside the
    /// valid range (1-64).
    pub fn new(
        workers: usize,
        fetcher: Arc<dyn Fetcher>,
        max_attempts: u32,
    ) -> Result<Self, BatchError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
            return Err(BatchError::invalid_workers(workers, MIN_WORKERS, MAX_WORKERS));
        }

        debug!(workers, max_attempts, "creating worker pool");

        Ok(Self {
            workers,
            retry: RetryingFetcher::new(fetcher, max_attempts),
        })
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Executes one batch: downloads every job into `staging_dir`, placing
    /// completed artifacts in `target_dir`.
    ///
    /// This method:
    /// 1. Removes any stale staging directory from a previous run
    /// 2. Returns immediately when the job list is empty
    /// 3. Creates the staging directory and spawns the workers
    /// 4. Joins every worker, then removes the staging directory
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] for staging and placement failures. On error
    /// the staging directory is left in place; the next run clears it.
    ///
    /// Note: Individual fetch failures do NOT cause this method to error.
    /// Jobs with a spent retry budget are counted in the stats and dropped.
    #[instrument(skip(self, jobs), fields(jobs = jobs.len(), workers = self.workers))]
    pub async fn run(
        &self,
        jobs: Vec<DownloadJob>,
        target_dir: &Path,
        staging_dir: &Path,
    ) -> Result<BatchStats, BatchError> {
        let staging = Arc::new(TempStaging::new(staging_dir, target_dir));
        staging.clear_stale().await?;

        if jobs.is_empty() {
            debug!("job list empty, nothing to download");
            return Ok(BatchStats::new());
        }

        staging.ensure().await?;

        let jobs: Arc<[DownloadJob]> = Arc::from(jobs);
        let cursor = Arc::new(AtomicUsize::new(0));
        let stats = Arc::new(BatchStats::new());

        info!(total = jobs.len(), "starting batch");

        let mut handles = Vec::with_capacity(self.workers);
        for worker in 0..self.workers {
            let jobs = Arc::clone(&jobs);
            let cursor = Arc::clone(&cursor);
            let stats = Arc::clone(&stats);
            let staging = Arc::clone(&staging);
            let retry = self.retry.clone();

            handles.push(tokio::spawn(async move {
                run_worker(worker, &jobs, &cursor, &retry, &staging, &stats).await
            }));
        }

        // Wait for every worker; an error stops only the worker that hit it,
        // the others keep draining, so the first error is reported after all
        // have stopped.
        let mut first_error: Option<BatchError> = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    } else {
                        warn!(error = %error, "additional worker error");
                    }
                }
                Err(join_error) => {
                    warn!(error = %join_error, "download worker panicked");
                    if first_error.is_none() {
                        first_error = Some(BatchError::worker(join_error.to_string()));
                    }
                }
            }
        }

        if let Some(error) = first_error {
            // Staging is left behind for inspection; the next run clears it.
            return Err(error);
        }

        staging.remove().await?;

        let completed = stats.completed();
        let abandoned = stats.abandoned();
        let retried = stats.retried();
        info!(
            completed,
            abandoned,
            retried,
            total = completed + abandoned,
            "batch complete"
        );

        // We need to return the stats, but we have an Arc.
        // Since all workers are done, we should have sole ownership.
        // If not (which would be a bug), create new stats from the atomic values.
        match Arc::try_unwrap(stats) {
            Ok(stats) => Ok(stats),
            Err(arc_stats) => {
                let new_stats = BatchStats::new();
                new_stats
                    .completed
                    .store(arc_stats.completed(), Ordering::SeqCst);
                new_stats
                    .abandoned
                    .store(arc_stats.abandoned(), Ordering::SeqCst);
                new_stats
                    .retried
                    .store(arc_stats.retried(), Ordering::SeqCst);
                Ok(new_stats)
            }
        }
    }
}

/// Claims the next unclaimed job index, or `None` when the list is spent.
///
/// One atomic read-and-increment per claim; indices past the end only ever
/// signal exhaustion.
fn claim(cursor: &AtomicUsize, len: usize) -> Option<usize> {
    let index = cursor.fetch_add(1, Ordering::SeqCst);
    (index < len).then_some(index)
}

/// Worker loop: claim, fetch with retry, promote, repeat until exhaustion.
async fn run_worker(
    worker: usize,
    jobs: &[DownloadJob],
    cursor: &AtomicUsize,
    retry: &RetryingFetcher,
    staging: &TempStaging,
    stats: &BatchStats,
) -> Result<(), BatchError> {
    loop {
        let Some(index) = claim(cursor, jobs.len()) else {
            debug!(worker, "job list exhausted, worker stopping");
            return Ok(());
        };

        let job = &jobs[index];
        info!(
            worker,
            item = index + 1,
            total = jobs.len(),
            id = job.id,
            title = %job.title,
            "downloading"
        );

        match retry.fetch(job, staging.dir()).await {
            FetchOutcome::Completed { attempts } => {
                staging.promote(&job.file_name).await?;
                stats.add_retried(attempts);
                stats.increment_completed();
            }
            FetchOutcome::Abandoned {
                attempts,
                last_error,
            } => {
                warn!(
                    worker,
                    id = job.id,
                    title = %job.title,
                    attempts,
                    error = %last_error,
                    "download failed after all attempts, dropping job"
                );
                stats.add_retried(attempts);
                stats.increment_abandoned();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::super::error::FetchError;
    use super::*;

    /// Fetcher that never touches the network or the filesystem.
    struct NoopFetcher;

    #[async_trait]
    impl Fetcher for NoopFetcher {
        async fn fetch(
            &self,
            _dest_dir: &Path,
            _file_name: &str,
            _url: &str,
        ) -> Result<(), FetchError> {
            Ok(())
        }
    }

    fn noop_fetcher() -> Arc<dyn Fetcher> {
        Arc::new(NoopFetcher)
    }

    #[test]
    fn test_pool_new_valid_workers() {
        let pool = WorkerPool::new(1, noop_fetcher(), 10).unwrap();
        assert_eq!(pool.workers(), 1);

        let pool = WorkerPool::new(5, noop_fetcher(), 10).unwrap();
        assert_eq!(pool.workers(), 5);

        let pool = WorkerPool::new(64, noop_fetcher(), 10).unwrap();
        assert_eq!(pool.workers(), 64);
    }

    #[test]
    fn test_pool_new_rejects_zero_workers() {
        let result = WorkerPool::new(0, noop_fetcher(), 10);
        assert!(matches!(
            result,
            Err(BatchError::InvalidWorkers { value: 0, .. })
        ));
    }

    #[test]
    fn test_pool_new_rejects_oversized_worker_count() {
        let result = WorkerPool::new(65, noop_fetcher(), 10);
        assert!(matches!(
            result,
            Err(BatchError::InvalidWorkers { value: 65, .. })
        ));
    }

    #[test]
    fn test_batch_stats_default() {
        let stats = BatchStats::default();
        assert_eq!(stats.completed(), 0);
        assert_eq!(stats.abandoned(), 0);
        assert_eq!(stats.retried(), 0);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_batch_stats_increment() {
        let stats = BatchStats::new();

        stats.increment_completed();
        stats.increment_completed();
        stats.increment_abandoned();
        stats.add_retried(4);

        assert_eq!(stats.completed(), 2);
        assert_eq!(stats.abandoned(), 1);
        assert_eq!(stats.retried(), 3);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_batch_stats_single_attempt_adds_no_retries() {
        let stats = BatchStats::new();
        stats.add_retried(1);
        stats.add_retried(0);
        assert_eq!(stats.retried(), 0);
    }

    #[test]
    fn test_batch_stats_thread_safe() {
        use std::thread;

        let stats = Arc::new(BatchStats::new());
        let mut handles = Vec::new();

        // Spawn multiple threads incrementing counters
        for _ in 0..10 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.increment_completed();
                    stats.increment_abandoned();
                    stats.add_retried(2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // 10 threads * 100 increments each
        assert_eq!(stats.completed(), 1000);
        assert_eq!(stats.abandoned(), 1000);
        assert_eq!(stats.retried(), 1000);
        assert_eq!(stats.total(), 2000);
    }

    #[test]
    fn test_claim_hands_out_each_index_once() {
        use std::thread;

        let cursor = Arc::new(AtomicUsize::new(0));
        let len = 1000;
        let mut handles = Vec::new();

        for _ in 0..8 {
            let cursor = Arc::clone(&cursor);
            handles.push(thread::spawn(move || {
                let mut claimed = Vec::new();
                while let Some(index) = claim(&cursor, len) {
                    claimed.push(index);
                }
                claimed
            }));
        }

        let mut all: Vec<usize> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();

        // Exactly the multiset {0, .., len-1}: no duplicates, no omissions
        assert_eq!(all, (0..len).collect::<Vec<_>>());
    }

    #[test]
    fn test_claim_exhausted_cursor_returns_none() {
        let cursor = AtomicUsize::new(0);
        assert_eq!(claim(&cursor, 0), None);
        assert_eq!(claim(&cursor, 0), None);
    }

    #[test]
    fn test_default_workers_constant() {
        assert_eq!(DEFAULT_WORKERS, 5);
    }
}
