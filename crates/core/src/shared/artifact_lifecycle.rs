use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::constants::{ARTIFACT_PREFIX, ARTIFACT_SUFFIX};
use super::error::TranscribeError;

/// Owns every temporary file created during one run and deletes them on release.
///
/// `release_all` is idempotent. `Drop` calls it too, so an early return or an
/// unwinding panic still cleans up.
pub struct ArtifactLifecycle {
    temp_dir: PathBuf,
    tracked: Vec<PathBuf>,
}

impl ArtifactLifecycle {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            tracked: Vec::new(),
        }
    }

    /// Register an existing or soon-to-exist path for deletion.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.tracked.push(path.into());
    }

    /// Create a fresh empty temp file and track it.
    pub fn create_artifact(&mut self, label: &str) -> Result<PathBuf, TranscribeError> {
        let prefix = format!("{ARTIFACT_PREFIX}{label}-");
        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(ARTIFACT_SUFFIX)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| TranscribeError::io(&self.temp_dir, e))?;
        let path = temp
            .into_temp_path()
            .keep()
            .map_err(|e| TranscribeError::io(&self.temp_dir, e.error))?;
        self.track(path.clone());
        Ok(path)
    }

    pub fn tracked(&self) -> &[PathBuf] {
        &self.tracked
    }

    /// Delete every tracked path that still exists. Failures are logged, not returned.
    pub fn release_all(&mut self) {
        for path in self.tracked.drain(..) {
            remove_quietly(&path);
        }
    }
}

impl Drop for ArtifactLifecycle {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed temporary file {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove temporary file {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_create_artifact_tracks_new_file() {
        let tmp = TempDir::new().unwrap();
        let mut lifecycle = ArtifactLifecycle::new(tmp.path());
        let path = lifecycle.create_artifact("extract").unwrap();

        assert!(path.exists());
        assert!(path.starts_with(tmp.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("transcribe-extract-"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(lifecycle.tracked(), &[path]);
    }

    #[test]
    fn test_release_all_deletes_tracked_files() {
        let tmp = TempDir::new().unwrap();
        let mut lifecycle = ArtifactLifecycle::new(tmp.path());
        lifecycle.create_artifact("a").unwrap();
        lifecycle.create_artifact("b").unwrap();
        assert_eq!(entries(tmp.path()), 2);

        lifecycle.release_all();
        assert_eq!(entries(tmp.path()), 0);
        assert!(lifecycle.tracked().is_empty());
    }

    #[test]
    fn test_release_all_twice_is_noop() {
        let tmp = TempDir::new().unwrap();
        let keep = tmp.path().join("unrelated.txt");
        fs::write(&keep, b"keep me").unwrap();

        let mut lifecycle = ArtifactLifecycle::new(tmp.path());
        lifecycle.create_artifact("a").unwrap();
        lifecycle.release_all();
        lifecycle.release_all();

        assert_eq!(entries(tmp.path()), 1);
        assert!(keep.exists());
    }

    #[test]
    fn test_already_deleted_file_does_not_block_others() {
        let tmp = TempDir::new().unwrap();
        let mut lifecycle = ArtifactLifecycle::new(tmp.path());
        let first = lifecycle.create_artifact("a").unwrap();
        let second = lifecycle.create_artifact("b").unwrap();
        fs::remove_file(&first).unwrap();
        lifecycle.track(tmp.path().join("never-created.mp3"));

        lifecycle.release_all();
        assert!(!second.exists());
    }

    #[test]
    fn test_drop_releases_artifacts() {
        let tmp = TempDir::new().unwrap();
        let path = {
            let mut lifecycle = ArtifactLifecycle::new(tmp.path());
            lifecycle.create_artifact("scoped").unwrap()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_create_artifact_in_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let mut lifecycle = ArtifactLifecycle::new(tmp.path().join("missing"));
        let result = lifecycle.create_artifact("a");
        assert!(matches!(result, Err(TranscribeError::Io { .. })));
        assert!(lifecycle.tracked().is_empty());
    }
}
