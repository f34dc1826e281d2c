//! Target-directory naming and resolution for authors and bookmarks.
//!
//! An author's directory is named `(id)name` so the id survives any display
//! name change. Resolution scans the base directory for an existing `(id)`
//! prefix first; only when none exists (or auto-rename is on and the name
//! moved on) does the current display name matter.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::source::BookmarkVisibility;

/// Errors while resolving or renaming target directories.
#[derive(Debug, Error)]
pub enum DirError {
    /// Failed to create the base directory.
    #[error("failed to create base directory {path}: {source}")]
    CreateBase {
        /// The base directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to list the base directory.
    #[error("failed to list base directory {path}: {source}")]
    ListBase {
        /// The base directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to rename an author's directory.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        /// The current directory path.
        from: PathBuf,
        /// The intended directory path.
        to: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DirError {
    fn create_base(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateBase {
            path: path.into(),
            source,
        }
    }

    fn list_base(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ListBase {
            path: path.into(),
            source,
        }
    }

    fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Rename {
            from: from.into(),
            to: to.into(),
            source,
        }
    }
}

/// Cleans an author display name for use in a directory name.
///
/// Display names often carry a circle or status suffix after `@` or `＠`;
/// everything from the first such marker on is dropped, unless the marker
/// is the very first character. Characters unsafe in directory names and
/// control characters are removed, then trailing spaces are trimmed.
#[must_use]
pub fn clean_author_name(name: &str) -> String {
    let base = match name.char_indices().find(|&(_, c)| c == '@' || c == '＠') {
        Some((i, _)) if i > 0 => &name[..i],
        _ => name,
    };

    let cleaned: String = base
        .chars()
        .filter(|&c| {
            !matches!(
                c,
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' | '&' | '$'
            ) && !c.is_control()
        })
        .collect();

    cleaned.trim_end_matches(' ').to_string()
}

/// Directory name for one author: `(id)` followed by the cleaned name.
#[must_use]
pub fn author_dir_name(id: u64, name: &str) -> String {
    format!("({id}){}", clean_author_name(name))
}

/// Directory name for one bookmark collection.
#[must_use]
pub fn bookmark_dir_name(visibility: BookmarkVisibility) -> String {
    format!("[bookmark] {visibility}")
}

/// Resolves the on-disk directory for an author under `base`.
///
/// Scans `base` for an entry starting with `(id)`. When one exists under an
/// outdated name and `auto_rename` is set, the directory is renamed on disk
/// to match the current display name. The returned path is not created here.
///
/// # Errors
///
/// Returns [`DirError`] if the base directory cannot be created or listed,
/// or if the rename fails.
pub async fn resolve_author_dir(
    base: &Path,
    id: u64,
    name: &str,
    auto_rename: bool,
) -> Result<PathBuf, DirError> {
    tokio::fs::create_dir_all(base)
        .await
        .map_err(|e| DirError::create_base(base, e))?;

    let marker = format!("({id})");
    let mut existing: Option<String> = None;
    let mut entries = tokio::fs::read_dir(base)
        .await
        .map_err(|e| DirError::list_base(base, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DirError::list_base(base, e))?
    {
        let entry_name = entry.file_name().to_string_lossy().into_owned();
        if entry_name.starts_with(&marker) {
            existing = Some(entry_name);
            break;
        }
    }

    let fresh = author_dir_name(id, name);
    let resolved = match existing {
        None => fresh,
        Some(current) if auto_rename && current != fresh => {
            tokio::fs::rename(base.join(&current), base.join(&fresh))
                .await
                .map_err(|e| DirError::rename(base.join(&current), base.join(&fresh), e))?;
            info!(from = %current, to = %fresh, "author directory renamed");
            fresh
        }
        Some(current) => {
            debug!(dir = %current, "using existing author directory");
            current
        }
    };

    Ok(base.join(resolved))
}
