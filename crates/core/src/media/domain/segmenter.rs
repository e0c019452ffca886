use super::compressed_artifact::CompressedArtifact;
use super::media_codec::AudioTrack;
use crate::chunking::chunk_planner::ChunkPlan;
use crate::shared::artifact_lifecycle::ArtifactLifecycle;
use crate::shared::error::TranscribeError;

/// Cuts an open track into one artifact per plan span, in plan order.
pub struct Segmenter {
    bitrate_kbps: u32,
}

impl Segmenter {
    pub fn new(bitrate_kbps: u32) -> Self {
        Self { bitrate_kbps }
    }

    pub fn segment(
        &self,
        track: &dyn AudioTrack,
        plan: &ChunkPlan,
        artifacts: &mut ArtifactLifecycle,
    ) -> Result<Vec<CompressedArtifact>, TranscribeError> {
        let mut segments = Vec::with_capacity(plan.len());

        for span in &plan.spans {
            let dest = artifacts.create_artifact(&format!("chunk{:03}", span.index))?;
            log::debug!(
                "Encoding chunk {} [{:.2}s, {:.2}s]",
                span.index,
                span.start_seconds,
                span.end_seconds
            );
            track
                .encode(Some(span.range()), self.bitrate_kbps, &dest)
                .map_err(|e| TranscribeError::Encode {
                    path: dest.clone(),
                    source: e,
                })?;
            segments.push(CompressedArtifact::from_encoded(&dest, self.bitrate_kbps)?);
        }

        log::info!("Split audio into {} chunks", segments.len());
        Ok(segments)
    }
}
