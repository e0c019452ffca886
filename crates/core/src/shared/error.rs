use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned across the codec and transcription service ports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("no audio track found in {}", .0.display())]
    NoAudioTrack(PathBuf),
    #[error("audio in {} has no usable duration ({duration}s)", .path.display())]
    DegenerateMedia { path: PathBuf, duration: f64 },
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("chunk {index} is {size} bytes, above the {limit} byte request limit")]
    PayloadTooLarge { index: usize, size: u64, limit: u64 },
    #[error("transcription failed for chunk {index}: {source}")]
    TranscriptionService {
        index: usize,
        #[source]
        source: BoxError,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TranscribeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
