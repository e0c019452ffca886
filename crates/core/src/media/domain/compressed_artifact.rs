use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::error::TranscribeError;

/// A temporary encoded audio file. Deleted by `ArtifactLifecycle`, never here.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressedArtifact {
    pub path: PathBuf,
    pub byte_size: u64,
    pub bitrate_kbps: u32,
}

impl CompressedArtifact {
    /// Describe an artifact that has just been written to `path`.
    pub fn from_encoded(path: &Path, bitrate_kbps: u32) -> Result<Self, TranscribeError> {
        let byte_size = fs::metadata(path)
            .map_err(|e| TranscribeError::io(path, e))?
            .len();
        Ok(Self {
            path: path.to_path_buf(),
            byte_size,
            bitrate_kbps,
        })
    }
}
