//! Integration tests for the worker pool.
//!
//! These tests drive WorkerPool with instrumented fetchers against real
//! temp directories, covering claim distribution, retry accounting, staging
//! lifecycle, and placement.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use illustfetch_core::download::constants::STAGING_DIR_NAME;
use illustfetch_core::{BatchError, DownloadJob, FetchError, Fetcher, WorkerPool};
use tempfile::TempDir;

// ==================== Test Fetchers ====================

/// Fetcher that records every requested file name and writes the job's URL
/// as the file body.
#[derive(Default)]
struct RecordingFetcher {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, dest_dir: &Path, file_name: &str, url: &str) -> Result<(), FetchError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.push(file_name.to_string());
        }
        let path = dest_dir.join(file_name);
        tokio::fs::write(&path, url.as_bytes())
            .await
            .map_err(|e| FetchError::io(path, e))
    }
}

/// Fetcher that fails a fixed number of times per file before succeeding.
struct FlakyFetcher {
    failures_before_success: u32,
    attempts: Mutex<HashMap<String, u32>>,
}

impl FlakyFetcher {
    fn new(failures_before_success: u32) -> Self {
        Self {
            failures_before_success,
            attempts: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Fetcher for FlakyFetcher {
    async fn fetch(&self, dest_dir: &Path, file_name: &str, url: &str) -> Result<(), FetchError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(file_name.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if attempt <= self.failures_before_success {
            return Err(FetchError::status(url, 503));
        }
        let path = dest_dir.join(file_name);
        tokio::fs::write(&path, b"recovered")
            .await
            .map_err(|e| FetchError::io(path, e))
    }
}

/// Fetcher that always fails one specific file and succeeds on the rest.
struct SelectiveFetcher {
    fail_file: String,
}

#[async_trait]
impl Fetcher for SelectiveFetcher {
    async fn fetch(&self, dest_dir: &Path, file_name: &str, url: &str) -> Result<(), FetchError> {
        if file_name == self.fail_file {
            return Err(FetchError::status(url, 500));
        }
        let path = dest_dir.join(file_name);
        tokio::fs::write(&path, b"content")
            .await
            .map_err(|e| FetchError::io(path, e))
    }
}

// ==================== Helper Functions ====================

fn job(id: u64) -> DownloadJob {
    DownloadJob::new(
        id,
        format!("work {id}"),
        format!("{id}_p0.jpg"),
        format!("http://gallery.invalid/{id}_p0.jpg"),
    )
}

fn jobs(count: u64) -> Vec<DownloadJob> {
    (0..count).map(job).collect()
}

// ==================== Placement Tests ====================

#[tokio::test]
async fn test_pool_places_all_files_and_removes_staging()
-> Result<(), Box<dyn std::error::Error>> {
    let target = TempDir::new()?;
    let staging = target.path().join(STAGING_DIR_NAME);

    let fetcher = Arc::new(RecordingFetcher::default());
    let pool = WorkerPool::new(3, Arc::clone(&fetcher) as Arc<dyn Fetcher>, 10)?;

    let stats = pool.run(jobs(5), target.path(), &staging).await?;

    assert_eq!(stats.completed(), 5);
    assert_eq!(stats.abandoned(), 0);
    assert_eq!(stats.retried(), 0);
    for id in 0..5 {
        let path = target.path().join(format!("{id}_p0.jpg"));
        let body = tokio::fs::read_to_string(&path).await?;
        assert_eq!(body, format!("http://gallery.invalid/{id}_p0.jpg"));
    }
    assert!(
        !staging.exists(),
        "staging should be removed after a clean batch"
    );
    Ok(())
}

#[tokio::test]
async fn test_pool_claims_each_job_exactly_once() -> Result<(), Box<dyn std::error::Error>> {
    let target = TempDir::new()?;
    let staging = target.path().join(STAGING_DIR_NAME);

    let fetcher = Arc::new(RecordingFetcher::default());
    let pool = WorkerPool::new(4, Arc::clone(&fetcher) as Arc<dyn Fetcher>, 10)?;

    let stats = pool.run(jobs(20), target.path(), &staging).await?;

    assert_eq!(stats.completed(), 20);

    // Every job fetched once, none twice, regardless of which worker won it
    let mut calls = fetcher.calls.lock().unwrap().clone();
    calls.sort();
    let mut expected: Vec<String> = (0..20).map(|id| format!("{id}_p0.jpg")).collect();
    expected.sort();
    assert_eq!(calls, expected);
    Ok(())
}

// ==================== Retry Tests ====================

#[tokio::test]
async fn test_pool_retries_until_success_within_budget() -> Result<(), Box<dyn std::error::Error>> {
    let target = TempDir::new()?;
    let staging = target.path().join(STAGING_DIR_NAME);

    // 9 failures then success fits exactly in a 10-attempt budget
    let fetcher = Arc::new(FlakyFetcher::new(9));
    let pool = WorkerPool::new(2, Arc::clone(&fetcher) as Arc<dyn Fetcher>, 10)?;

    let stats = pool.run(jobs(1), target.path(), &staging).await?;

    assert_eq!(stats.completed(), 1);
    assert_eq!(stats.abandoned(), 0);
    assert_eq!(stats.retried(), 9);
    assert!(target.path().join("0_p0.jpg").exists());
    Ok(())
}

#[tokio::test]
async fn test_pool_abandons_job_without_failing_batch() -> Result<(), Box<dyn std::error::Error>> {
    let target = TempDir::new()?;
    let staging = target.path().join(STAGING_DIR_NAME);

    let fetcher = Arc::new(SelectiveFetcher {
        fail_file: "1_p0.jpg".to_string(),
    });
    let pool = WorkerPool::new(2, fetcher as Arc<dyn Fetcher>, 2)?;

    let stats = pool.run(jobs(3), target.path(), &staging).await?;

    assert_eq!(stats.completed(), 2);
    assert_eq!(stats.abandoned(), 1);
    assert_eq!(stats.retried(), 1); // 2 attempts on the bad job
    assert_eq!(stats.total(), 3);

    assert!(target.path().join("0_p0.jpg").exists());
    assert!(
        !target.path().join("1_p0.jpg").exists(),
        "abandoned job must not appear in the target directory"
    );
    assert!(target.path().join("2_p0.jpg").exists());
    assert!(!staging.exists());
    Ok(())
}

// ==================== Staging Lifecycle Tests ====================

#[tokio::test]
async fn test_pool_empty_list_short_circuits_and_clears_stale()
-> Result<(), Box<dyn std::error::Error>> {
    let target = TempDir::new()?;
    let staging = target.path().join(STAGING_DIR_NAME);
    tokio::fs::create_dir_all(&staging).await?;
    tokio::fs::write(staging.join("leftover.jpg"), b"stale").await?;

    let fetcher = Arc::new(RecordingFetcher::default());
    let pool = WorkerPool::new(3, Arc::clone(&fetcher) as Arc<dyn Fetcher>, 10)?;

    let stats = pool.run(Vec::new(), target.path(), &staging).await?;

    assert_eq!(stats.total(), 0);
    assert!(
        !staging.exists(),
        "stale staging should be cleared even when there is nothing to download"
    );
    assert!(fetcher.calls.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pool_clears_stale_staging_before_downloading()
-> Result<(), Box<dyn std::error::Error>> {
    let target = TempDir::new()?;
    let staging = target.path().join(STAGING_DIR_NAME);
    tokio::fs::create_dir_all(&staging).await?;
    tokio::fs::write(staging.join("stale.jpg"), b"from a previous run").await?;

    let fetcher = Arc::new(RecordingFetcher::default());
    let pool = WorkerPool::new(2, Arc::clone(&fetcher) as Arc<dyn Fetcher>, 10)?;

    let stats = pool.run(jobs(2), target.path(), &staging).await?;

    assert_eq!(stats.completed(), 2);
    assert!(!staging.exists());
    assert!(
        !target.path().join("stale.jpg").exists(),
        "stale staged files must never be promoted"
    );
    Ok(())
}

#[tokio::test]
async fn test_pool_placement_failure_fails_batch_and_leaves_staging()
-> Result<(), Box<dyn std::error::Error>> {
    let target = TempDir::new()?;
    let staging = target.path().join(STAGING_DIR_NAME);

    // A directory squatting on the final path makes the rename fail
    tokio::fs::create_dir_all(target.path().join("0_p0.jpg")).await?;

    let fetcher = Arc::new(RecordingFetcher::default());
    let pool = WorkerPool::new(1, Arc::clone(&fetcher) as Arc<dyn Fetcher>, 10)?;

    let result = pool.run(jobs(1), target.path(), &staging).await;

    let err = result.expect_err("placement onto a directory should fail the batch");
    assert!(
        matches!(err, BatchError::Place { .. }),
        "expected placement error, got: {err}"
    );
    assert!(
        staging.is_dir(),
        "staging is kept for inspection when the batch fails"
    );
    Ok(())
}
