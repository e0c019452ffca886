use std::path::{Path, PathBuf};

use super::constants::VIDEO_EXTENSIONS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Classifies by extension alone; anything not a known video container is audio.
    pub fn from_path(path: &Path) -> Self {
        let is_video = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if is_video {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }
}

/// An input file as found on disk. Never modified or deleted by the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub byte_size: u64,
    pub kind: MediaKind,
}

impl SourceFile {
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Video always needs extraction; audio only when it is over the ceiling.
    pub fn needs_preprocessing(&self, size_limit_bytes: u64) -> bool {
        self.is_video() || self.byte_size > size_limit_bytes
    }
}
