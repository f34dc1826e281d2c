//! Illustration Batch Downloader Library
//!
//! This library provides the core functionality for the illustfetch tool,
//! which batch-downloads the works of followed authors and bookmark
//! collections into per-collection directories, skipping works already
//! on disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Explicit run configuration
//! - [`dirs`] - Target-directory naming and resolution
//! - [`download`] - Concurrent download pool with retry and staged placement
//! - [`plan`] - Selection of missing works from a collection listing
//! - [`source`] - Gallery listing sources (trait + JSON catalog backend)
//!
//! Future modules will include:
//! - `api` - live gallery API source (the JSON catalog is currently the
//!   only backend)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dirs;
pub mod download;
pub mod plan;
pub mod source;

// Re-export commonly used types
pub use config::{DownloadConfig, FetchOptions};
pub use dirs::DirError;
pub use download::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REFERER, DEFAULT_TIMEOUT_SECS};
pub use download::{
    BatchError, BatchStats, DEFAULT_WORKERS, DownloadJob, FetchError, FetchOutcome, Fetcher,
    HttpFetcher, RetryingFetcher, TempStaging, WorkerPool,
};
pub use source::{
    AuthorProfile, BookmarkVisibility, GallerySource, IllustPage, ManifestSource, SourceError,
};
