//! Staging-directory lifecycle and atomic placement into the final directory.
//!
//! In-flight downloads are only ever visible inside the staging directory;
//! the final directory sees a complete artifact or nothing. Staging lives
//! inside the target directory so the placement rename never crosses a
//! filesystem boundary.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::BatchError;

/// Scratch space for in-flight downloads of one batch.
#[derive(Debug)]
pub struct TempStaging {
    dir: PathBuf,
    target: PathBuf,
}

impl TempStaging {
    /// Creates a staging handle for `dir`, promoting into `target`.
    ///
    /// No filesystem operation happens here; see [`clear_stale`](Self::clear_stale)
    /// and [`ensure`](Self::ensure).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            target: target.into(),
        }
    }

    /// Returns the staging directory path.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Removes leftovers from a previous interrupted or failed run.
    ///
    /// A missing staging directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::StagingSetup`] if removal fails.
    pub async fn clear_stale(&self) -> Result<(), BatchError> {
        remove_dir_if_present(&self.dir)
            .await
            .map_err(|e| BatchError::staging_setup(&self.dir, e))?;
        debug!(path = %self.dir.display(), "stale staging cleared");
        Ok(())
    }

    /// Creates the staging directory (and the target directory above it).
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::StagingSetup`] if creation fails.
    pub async fn ensure(&self) -> Result<(), BatchError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BatchError::staging_setup(&self.dir, e))
    }

    /// Moves a completed artifact to its final path via an atomic rename.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Place`] if the rename fails. The artifact stays
    /// in staging in that case.
    pub async fn promote(&self, file_name: &str) -> Result<(), BatchError> {
        let from = self.dir.join(file_name);
        let to = self.target.join(file_name);
        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| BatchError::place(file_name, &self.target, e))?;
        debug!(file = file_name, target = %self.target.display(), "artifact placed");
        Ok(())
    }

    /// Removes the staging directory after a fully completed batch.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::StagingTeardown`] if removal fails.
    pub async fn remove(&self) -> Result<(), BatchError> {
        remove_dir_if_present(&self.dir)
            .await
            .map_err(|e| BatchError::staging_teardown(&self.dir, e))
    }
}

async fn remove_dir_if_present(dir: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn staging_in(target: &TempDir) -> TempStaging {
        TempStaging::new(target.path().join("temp"), target.path())
    }

    #[tokio::test]
    async fn test_clear_stale_removes_leftover_files() {
        let target = TempDir::new().unwrap();
        let staging = staging_in(&target);
        tokio::fs::create_dir_all(staging.dir()).await.unwrap();
        tokio::fs::write(staging.dir().join("stale.jpg"), b"old")
            .await
            .unwrap();

        staging.clear_stale().await.unwrap();

        assert!(!staging.dir().exists());
    }

    #[tokio::test]
    async fn test_clear_stale_ok_when_absent() {
        let target = TempDir::new().unwrap();
        let staging = staging_in(&target);

        let result = staging.clear_stale().await;

        assert!(result.is_ok(), "Expected Ok, got: {result:?}");
    }

    #[tokio::test]
    async fn test_ensure_creates_staging_and_target() {
        let base = TempDir::new().unwrap();
        let target = base.path().join("(42)neko");
        let staging = TempStaging::new(target.join("temp"), &target);

        staging.ensure().await.unwrap();

        assert!(target.is_dir());
        assert!(staging.dir().is_dir());
    }

    #[tokio::test]
    async fn test_promote_moves_file_out_of_staging() {
        let target = TempDir::new().unwrap();
        let staging = staging_in(&target);
        staging.ensure().await.unwrap();
        tokio::fs::write(staging.dir().join("101_p0.jpg"), b"artifact")
            .await
            .unwrap();

        staging.promote("101_p0.jpg").await.unwrap();

        let final_path = target.path().join("101_p0.jpg");
        assert!(final_path.exists());
        assert!(!staging.dir().join("101_p0.jpg").exists());
        assert_eq!(tokio::fs::read(&final_path).await.unwrap(), b"artifact");
    }

    #[tokio::test]
    async fn test_promote_missing_source_is_place_error() {
        let target = TempDir::new().unwrap();
        let staging = staging_in(&target);
        staging.ensure().await.unwrap();

        let result = staging.promote("never_fetched.jpg").await;

        assert!(matches!(result, Err(BatchError::Place { .. })));
    }

    #[tokio::test]
    async fn test_remove_deletes_staging_dir() {
        let target = TempDir::new().unwrap();
        let staging = staging_in(&target);
        staging.ensure().await.unwrap();

        staging.remove().await.unwrap();

        assert!(!staging.dir().exists());
        assert!(target.path().exists());
    }
}
