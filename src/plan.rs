//! Job selection: compares the catalog against files already on disk.
//!
//! The remote feed is newest first, so presence of a work near the top of
//! the feed says everything below it was fetched by an earlier run. Author
//! batches exploit that with a preview short-circuit; bookmark batches
//! always walk the paged listing because collection order does not track
//! upload order.
//!
//! Selected jobs come back oldest first, so an interrupted batch leaves a
//! contiguous prefix of older works and the next preview check still holds.

use std::path::Path;

use tracing::debug;

use crate::download::DownloadJob;
use crate::source::{AuthorProfile, BookmarkVisibility, GallerySource, SourceError};

/// Selects the missing works of one author.
///
/// If any preview work is already on disk, only the missing preview works
/// are selected. Otherwise the full paged listing is walked, stopping once
/// a page contributes nothing new or pages run out.
///
/// # Errors
///
/// Returns [`SourceError`] if paging the listing fails.
pub async fn author_jobs(
    source: &dyn GallerySource,
    profile: &AuthorProfile,
    target_dir: &Path,
) -> Result<Vec<DownloadJob>, SourceError> {
    let mut jobs = Vec::new();
    let mut existing = 0usize;
    for item in &profile.preview {
        if file_exists(target_dir, &item.file_name).await {
            existing += 1;
        } else {
            jobs.push(item.clone());
        }
    }

    // A local hit in the preview means everything older is local too: the
    // missing newest works are the whole plan.
    if existing > 0 {
        jobs.reverse();
        debug!(
            author = profile.id,
            existing,
            new = jobs.len(),
            "preview short-circuit"
        );
        return Ok(jobs);
    }

    // Nothing from the preview is local: walk the paged listing.
    jobs.clear();
    let mut page = 0usize;
    loop {
        let listing = source.author_illusts(profile.id, page).await?;
        let mut new_this_page = 0usize;
        for item in listing.illusts {
            if !file_exists(target_dir, &item.file_name).await {
                jobs.push(item);
                new_this_page += 1;
            }
        }
        if !listing.has_next || new_this_page == 0 {
            break;
        }
        page += 1;
    }

    jobs.reverse();
    debug!(author = profile.id, pages = page + 1, new = jobs.len(), "full listing scanned");
    Ok(jobs)
}

/// Selects the missing works of one bookmark collection.
///
/// There is no preview short-circuit here: bookmarks are ordered by when
/// they were bookmarked, so the listing is always paged through, stopping
/// once a page contributes nothing new or pages run out.
///
/// # Errors
///
/// Returns [`SourceError`] if paging the collection fails.
pub async fn bookmark_jobs(
    source: &dyn GallerySource,
    visibility: BookmarkVisibility,
    target_dir: &Path,
) -> Result<Vec<DownloadJob>, SourceError> {
    let mut jobs = Vec::new();
    let mut page = 0usize;
    loop {
        let listing = source.bookmarks(visibility, page).await?;
        let mut new_this_page = 0usize;
        for item in listing.illusts {
            if !file_exists(target_dir, &item.file_name).await {
                jobs.push(item);
                new_this_page += 1;
            }
        }
        if !listing.has_next || new_this_page == 0 {
            break;
        }
        page += 1;
    }

    jobs.reverse();
    debug!(%visibility, pages = page + 1, new = jobs.len(), "bookmark listing scanned");
    Ok(jobs)
}

/// An unreadable or missing file counts as not downloaded.
async fn file_exists(dir: &Path, file_name: &str) -> bool {
    tokio::fs::try_exists(dir.join(file_name))
        .await
        .unwrap_or(false)
}
