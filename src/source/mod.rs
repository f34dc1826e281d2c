//! Remote catalog abstraction: author profiles, paged listings, bookmarks.
//!
//! This module defines what the planner needs to know about the remote
//! service without tying it to one transport. Listings come back newest
//! first and in pages, exactly as the service serves them.
//!
//! # Architecture
//!
//! - [`GallerySource`] - Async trait the planner queries
//! - [`AuthorProfile`] - An author plus the newest-first preview of their works
//! - [`IllustPage`] - One page of a listing with a continuation flag
//! - [`ManifestSource`] - Implementation backed by a JSON catalog export
//!
//! # Example
//!
//! ```no_run
//! use illustfetch_core::source::{GallerySource, ManifestSource};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ManifestSource::load(Path::new("catalog.json")).await?;
//! let profile = source.author_profile(42).await?;
//! println!("{} has {} preview works", profile.name, profile.preview.len());
//! # Ok(())
//! # }
//! ```

mod manifest;

pub use manifest::ManifestSource;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::download::DownloadJob;

/// Which bookmark collection to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkVisibility {
    /// The publicly visible collection.
    Public,
    /// The collection only the account owner sees.
    Private,
}

impl BookmarkVisibility {
    /// Returns the display string used in directory names and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

impl std::fmt::Display for BookmarkVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An author's identity and the newest-first preview of their works.
///
/// The preview is the short sample the service serves with the profile; the
/// full listing is paged separately via
/// [`GallerySource::author_illusts`].
#[derive(Debug, Clone)]
pub struct AuthorProfile {
    /// Identifier of the author on the remote service.
    pub id: u64,
    /// Current display name, as the service reports it.
    pub name: String,
    /// Newest works first, at most one page worth.
    pub preview: Vec<DownloadJob>,
}

/// One page of a newest-first listing.
#[derive(Debug, Clone)]
pub struct IllustPage {
    /// The works on this page, newest first.
    pub illusts: Vec<DownloadJob>,
    /// Whether another page follows this one.
    pub has_next: bool,
}

/// Errors from catalog lookups.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The catalog has no author with the requested id.
    #[error("unknown author id {0}")]
    UnknownAuthor(u64),

    /// Reading the catalog failed.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// The catalog path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog contents could not be parsed.
    #[error("malformed catalog {path}: {source}")]
    Malformed {
        /// The catalog path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed-catalog error.
    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }
}

/// Listing service for authors and bookmark collections.
///
/// Pages are zero-indexed. Implementations must return works newest first,
/// both in previews and in pages; the planner depends on that order.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `&dyn GallerySource`. Rust 2024 native async traits are not object-safe.
#[async_trait]
pub trait GallerySource: Send + Sync {
    /// Looks up an author's profile and preview.
    async fn author_profile(&self, author_id: u64) -> Result<AuthorProfile, SourceError>;

    /// Returns one page of an author's full listing.
    ///
    /// A page past the end is empty with `has_next` false, not an error.
    async fn author_illusts(&self, author_id: u64, page: usize)
    -> Result<IllustPage, SourceError>;

    /// Returns one page of the bookmark collection.
    async fn bookmarks(
        &self,
        visibility: BookmarkVisibility,
        page: usize,
    ) -> Result<IllustPage, SourceError>;
}
