//! Download job type shared by the planner and the worker pool.

use serde::Deserialize;

/// One remote artifact to download and the file name it lands under.
///
/// Jobs are immutable once the list is built; workers only ever read them.
/// The `file` key matches the catalog export format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadJob {
    /// Identifier of the work on the remote service.
    pub id: u64,
    /// Display title, used in progress logs only.
    pub title: String,
    /// Target file name, unique within one batch's target directory.
    #[serde(rename = "file")]
    pub file_name: String,
    /// Direct URL of the artifact.
    pub url: String,
}

impl DownloadJob {
    /// Creates a new download job.
    #[must_use]
    pub fn new(
        id: u64,
        title: impl Into<String>,
        file_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            file_name: file_name.into(),
            url: url.into(),
        }
    }
}
