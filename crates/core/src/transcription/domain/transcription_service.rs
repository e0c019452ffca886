use std::fs;
use std::path::PathBuf;

use crate::shared::error::BoxError;

/// One audio file to be transcribed, tagged with its position in the merge.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPayload {
    pub index: usize,
    pub path: PathBuf,
    pub byte_size: u64,
}

impl AudioPayload {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("chunk{}.mp3", self.index))
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, BoxError> {
        Ok(fs::read(&self.path)?)
    }
}

/// Domain interface for the remote speech-to-text service.
///
/// Implementations are shared across worker threads, so any client state
/// must be safe for concurrent use.
pub trait TranscriptionService: Send + Sync {
    fn submit(&self, payload: &AudioPayload) -> Result<String, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_path() {
        let payload = AudioPayload {
            index: 2,
            path: PathBuf::from("/tmp/transcribe-chunk002-abc.mp3"),
            byte_size: 10,
        };
        assert_eq!(payload.file_name(), "transcribe-chunk002-abc.mp3");
    }

    #[test]
    fn test_file_name_fallback() {
        let payload = AudioPayload {
            index: 4,
            path: PathBuf::from("/"),
            byte_size: 0,
        };
        assert_eq!(payload.file_name(), "chunk4.mp3");
    }

    #[test]
    fn test_read_bytes_missing_file_fails() {
        let payload = AudioPayload {
            index: 0,
            path: PathBuf::from("/nonexistent/chunk.mp3"),
            byte_size: 0,
        };
        assert!(payload.read_bytes().is_err());
    }
}
