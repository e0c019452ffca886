use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::media_codec::{AudioTrack, MediaCodec};
use crate::shared::error::TranscribeError;
use crate::shared::source_file::{MediaKind, SourceFile};

#[derive(Clone, Debug, PartialEq)]
pub struct ProbedMedia {
    pub source: SourceFile,
    pub duration_seconds: f64,
}

/// Inspects input files: kind, size and (when asked) audio duration.
pub struct MediaProbe<'a> {
    codec: &'a dyn MediaCodec,
}

impl<'a> MediaProbe<'a> {
    pub fn new(codec: &'a dyn MediaCodec) -> Self {
        Self { codec }
    }

    /// Existence, size and kind, without opening a decoder.
    pub fn inspect(&self, path: &Path) -> Result<SourceFile, TranscribeError> {
        let metadata = match fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(TranscribeError::NotFound(path.to_path_buf())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TranscribeError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(TranscribeError::io(path, e)),
        };

        Ok(SourceFile {
            path: path.to_path_buf(),
            byte_size: metadata.len(),
            kind: MediaKind::from_path(path),
        })
    }

    /// Like `inspect`, plus the duration of the best audio stream.
    pub fn probe(&self, path: &Path) -> Result<ProbedMedia, TranscribeError> {
        let source = self.inspect(path)?;
        let duration_seconds = self.open_track(path)?.duration_seconds();

        log::debug!(
            "Probed {}: {:?}, {} bytes, {duration_seconds:.2}s",
            path.display(),
            source.kind,
            source.byte_size
        );

        Ok(ProbedMedia {
            source,
            duration_seconds,
        })
    }

    /// Open the best audio stream; the caller owns (and drops) the track.
    pub fn open_track(&self, path: &Path) -> Result<Box<dyn AudioTrack>, TranscribeError> {
        self.codec
            .open_audio(path)
            .map_err(|e| TranscribeError::Encode {
                path: path.to_path_buf(),
                source: e,
            })?
            .ok_or_else(|| TranscribeError::NoAudioTrack(path.to_path_buf()))
    }
}
