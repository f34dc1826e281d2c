//! Concurrent download scheduler: worker pool, bounded retry, staging.
//!
//! This module takes a prepared list of download jobs and drains it with a
//! fixed-size worker pool. Completed artifacts are staged in a scratch
//! directory and moved to their final location with an atomic rename, so a
//! partially written file is never visible next to finished ones.
//!
//! # Features
//!
//! - Fixed worker count with an atomic claim cursor (each job fetched once)
//! - Per-job retry budget; exhausted jobs are dropped without failing the batch
//! - Streaming downloads (memory-efficient for large images)
//! - Crash-safe staging: stale scratch space is cleared on the next run
//!
//! # Example
//!
//! ```no_run
//! use illustfetch_core::config::FetchOptions;
//! use illustfetch_core::download::{DownloadJob, HttpFetcher, WorkerPool};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpFetcher::new(&FetchOptions::default())?);
//! let pool = WorkerPool::new(5, fetcher, 10)?;
//! let jobs = vec![DownloadJob::new(
//!     101,
//!     "morning doodle",
//!     "101_p0.jpg",
//!     "https://img.example.net/101_p0.jpg",
//! )];
//! let stats = pool
//!     .run(jobs, Path::new("./art"), Path::new("./art/temp"))
//!     .await?;
//! println!("Completed: {}, Abandoned: {}", stats.completed(), stats.abandoned());
//! # Ok(())
//! # }
//! ```

pub mod constants;
mod error;
mod fetcher;
mod job;
mod pool;
mod retry;
mod staging;

pub use error::{BatchError, FetchError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use job::DownloadJob;
pub use pool::{BatchStats, DEFAULT_WORKERS, WorkerPool};
pub use retry::{FetchOutcome, RetryingFetcher};
pub use staging::TempStaging;

// Note: no module-local Result aliases here. Use `Result<T, FetchError>` /
// `Result<T, BatchError>` explicitly in function signatures.
