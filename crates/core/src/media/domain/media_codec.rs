use std::path::Path;

use crate::shared::error::BoxError;

/// A half-open span of a track, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// An opened audio stream that can be re-encoded, in whole or in part.
///
/// Dropping the track releases everything it holds. Each call to `encode`
/// acquires its own decode and encode contexts and releases them before
/// returning, so consecutive encodes never overlap.
pub trait AudioTrack {
    fn duration_seconds(&self) -> f64;

    /// Encode `range` (or the whole track when `None`) as constant-bitrate
    /// MP3 into `dest`, overwriting it.
    fn encode(
        &self,
        range: Option<TimeRange>,
        bitrate_kbps: u32,
        dest: &Path,
    ) -> Result<(), BoxError>;
}

/// Domain interface for the external decode/encode capability.
pub trait MediaCodec: Send + Sync {
    /// Open the best audio stream of a media file.
    /// Returns `None` if the container has no audio stream.
    fn open_audio(&self, path: &Path) -> Result<Option<Box<dyn AudioTrack>>, BoxError>;
}
