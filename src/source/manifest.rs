//! JSON catalog file backing the gallery source.
//!
//! The catalog is an export of the remote service's listings: every author
//! with their works newest first, plus the two bookmark collections. Loading
//! happens once; lookups after that are in-memory slicing.
//!
//! # Format
//!
//! ```json
//! {
//!   "authors": [
//!     {
//!       "id": 42,
//!       "name": "neko@skeb open",
//!       "illusts": [
//!         { "id": 101, "title": "t", "file": "101_p0.jpg", "url": "https://..." }
//!       ]
//!     }
//!   ],
//!   "bookmarks": {
//!     "public": [],
//!     "private": []
//!   }
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{AuthorProfile, BookmarkVisibility, GallerySource, IllustPage, SourceError};
use crate::download::DownloadJob;

/// Works served per listing page.
const PAGE_LEN: usize = 30;

/// Newest works included in an author profile's preview.
const PREVIEW_LEN: usize = 10;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    authors: Vec<ManifestAuthor>,
    #[serde(default)]
    bookmarks: ManifestBookmarks,
}

#[derive(Debug, Deserialize)]
struct ManifestAuthor {
    id: u64,
    name: String,
    /// Newest first, as the remote feed returns them.
    #[serde(default)]
    illusts: Vec<DownloadJob>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestBookmarks {
    #[serde(default)]
    public: Vec<DownloadJob>,
    #[serde(default)]
    private: Vec<DownloadJob>,
}

/// Catalog read once from a JSON export on disk.
#[derive(Debug)]
pub struct ManifestSource {
    manifest: Manifest,
}

impl ManifestSource {
    /// Loads and parses the catalog at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read and
    /// [`SourceError::Malformed`] if it is not a valid catalog.
    pub async fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::io(path, e))?;
        let manifest: Manifest =
            serde_json::from_str(&raw).map_err(|e| SourceError::malformed(path, e))?;
        debug!(
            path = %path.display(),
            authors = manifest.authors.len(),
            public_bookmarks = manifest.bookmarks.public.len(),
            private_bookmarks = manifest.bookmarks.private.len(),
            "catalog loaded"
        );
        Ok(Self { manifest })
    }

    fn author(&self, author_id: u64) -> Result<&ManifestAuthor, SourceError> {
        self.manifest
            .authors
            .iter()
            .find(|author| author.id == author_id)
            .ok_or(SourceError::UnknownAuthor(author_id))
    }
}

/// Slices one zero-indexed page out of a full newest-first listing.
fn page_of(items: &[DownloadJob], page: usize) -> IllustPage {
    let start = page.saturating_mul(PAGE_LEN);
    if start >= items.len() {
        return IllustPage {
            illusts: Vec::new(),
            has_next: false,
        };
    }
    let end = (start + PAGE_LEN).min(items.len());
    IllustPage {
        illusts: items[start..end].to_vec(),
        has_next: end < items.len(),
    }
}

#[async_trait]
impl GallerySource for ManifestSource {
    async fn author_profile(&self, author_id: u64) -> Result<AuthorProfile, SourceError> {
        let author = self.author(author_id)?;
        Ok(AuthorProfile {
            id: author.id,
            name: author.name.clone(),
            preview: author.illusts.iter().take(PREVIEW_LEN).cloned().collect(),
        })
    }

    async fn author_illusts(
        &self,
        author_id: u64,
        page: usize,
    ) -> Result<IllustPage, SourceError> {
        let author = self.author(author_id)?;
        Ok(page_of(&author.illusts, page))
    }

    async fn bookmarks(
        &self,
        visibility: BookmarkVisibility,
        page: usize,
    ) -> Result<IllustPage, SourceError> {
        let items = match visibility {
            BookmarkVisibility::Public => &self.manifest.bookmarks.public,
            BookmarkVisibility::Private => &self.manifest.bookmarks.private,
        };
        Ok(page_of(items, page))
    }
}
