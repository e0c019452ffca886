use super::compressed_artifact::CompressedArtifact;
use super::media_codec::MediaCodec;
use super::media_probe::MediaProbe;
use crate::shared::artifact_lifecycle::ArtifactLifecycle;
use crate::shared::error::TranscribeError;
use crate::shared::source_file::SourceFile;

/// Re-encodes the audio of a video or oversized audio file into one
/// constant-bitrate MP3 artifact.
pub struct AudioExtractor<'a> {
    codec: &'a dyn MediaCodec,
    bitrate_kbps: u32,
}

impl<'a> AudioExtractor<'a> {
    pub fn new(codec: &'a dyn MediaCodec, bitrate_kbps: u32) -> Self {
        Self {
            codec,
            bitrate_kbps,
        }
    }

    pub fn extract(
        &self,
        source: &SourceFile,
        artifacts: &mut ArtifactLifecycle,
    ) -> Result<CompressedArtifact, TranscribeError> {
        let track = MediaProbe::new(self.codec).open_track(&source.path)?;

        // Tracked before encoding so a failed encode is still cleaned up.
        let dest = artifacts.create_artifact("extract")?;
        log::info!(
            "Extracting audio from {} at {} kbps",
            source.path.display(),
            self.bitrate_kbps
        );
        track
            .encode(None, self.bitrate_kbps, &dest)
            .map_err(|e| TranscribeError::Encode {
                path: dest.clone(),
                source: e,
            })?;
        drop(track);

        let artifact = CompressedArtifact::from_encoded(&dest, self.bitrate_kbps)?;
        log::info!(
            "Compressed {} bytes to {} bytes",
            source.byte_size,
            artifact.byte_size
        );
        Ok(artifact)
    }
}
