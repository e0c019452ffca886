use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::chunking::chunk_planner::ChunkPlanner;
use crate::media::domain::audio_extractor::AudioExtractor;
use crate::media::domain::media_codec::MediaCodec;
use crate::media::domain::media_probe::MediaProbe;
use crate::media::domain::segmenter::Segmenter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::artifact_lifecycle::ArtifactLifecycle;
use crate::shared::config::TranscribeConfig;
use crate::shared::error::TranscribeError;
use crate::shared::source_file::SourceFile;
use crate::transcription::domain::transcription_service::TranscriptionService;
use crate::transcription::transcription_dispatcher::TranscriptionDispatcher;

/// Merged text plus the per-chunk texts it was joined from.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub chunks: Vec<String>,
}

/// Transcribes one audio or video file end to end.
///
/// `probe → [extract] → [plan → segment] → dispatch → merge`. Every
/// temporary artifact belongs to a per-run `ArtifactLifecycle` that is
/// released before `run` returns, whatever the outcome.
pub struct TranscribeFileUseCase {
    codec: Box<dyn MediaCodec>,
    service: Box<dyn TranscriptionService>,
    config: TranscribeConfig,
}

impl TranscribeFileUseCase {
    pub fn new(
        codec: Box<dyn MediaCodec>,
        service: Box<dyn TranscriptionService>,
        config: TranscribeConfig,
    ) -> Self {
        Self {
            codec,
            service,
            config,
        }
    }

    pub fn run(
        &self,
        input: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Transcription, TranscribeError> {
        // 1. Configuration, before any file access
        self.config.validate()?;

        // 2. Probe
        let started = Instant::now();
        let source = MediaProbe::new(self.codec.as_ref()).inspect(input)?;
        logger.timing("probe", elapsed_ms(started));
        logger.metric("source_bytes", source.byte_size as f64);

        // 3-5. Preprocess and transcribe inside the artifact scope
        let mut artifacts = ArtifactLifecycle::new(&self.config.temp_dir);
        let result = self
            .prepare(&source, &mut artifacts, logger)
            .and_then(|files| self.dispatch(&files, logger));
        artifacts.release_all();
        let chunks = result?;

        // 6. Merge in chunk order
        let text = chunks.join(" ");
        logger.summary();
        Ok(Transcription { text, chunks })
    }

    /// Returns the files to upload, in chunk order.
    fn prepare(
        &self,
        source: &SourceFile,
        artifacts: &mut ArtifactLifecycle,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<PathBuf>, TranscribeError> {
        let limit = self.config.size_limit_bytes;
        if !source.needs_preprocessing(limit) {
            logger.info(&format!(
                "Sending {} as-is ({} bytes)",
                source.path.display(),
                source.byte_size
            ));
            return Ok(vec![source.path.clone()]);
        }

        let started = Instant::now();
        let extracted =
            AudioExtractor::new(self.codec.as_ref(), self.config.bitrate_kbps).extract(source, artifacts)?;
        logger.timing("extract", elapsed_ms(started));
        logger.metric("compressed_bytes", extracted.byte_size as f64);

        let planner = ChunkPlanner::new(limit, self.config.safety_margin);
        if !planner.needs_chunking(extracted.byte_size) {
            logger.info(&format!(
                "Compressed audio fits in one request ({} bytes)",
                extracted.byte_size
            ));
            return Ok(vec![extracted.path]);
        }

        let started = Instant::now();
        let track = MediaProbe::new(self.codec.as_ref()).open_track(&extracted.path)?;
        let plan = planner.plan(&extracted.path, extracted.byte_size, track.duration_seconds())?;
        logger.info(&format!(
            "Splitting {} bytes into {} chunks of {:.1}s",
            extracted.byte_size,
            plan.len(),
            plan.chunk_duration
        ));
        let segments =
            Segmenter::new(self.config.bitrate_kbps).segment(track.as_ref(), &plan, artifacts)?;
        drop(track);
        logger.timing("segment", elapsed_ms(started));
        logger.metric("chunks", segments.len() as f64);

        Ok(segments.into_iter().map(|s| s.path).collect())
    }

    fn dispatch(
        &self,
        files: &[PathBuf],
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<String>, TranscribeError> {
        let started = Instant::now();
        let texts = TranscriptionDispatcher::new(
            self.service.as_ref(),
            self.config.size_limit_bytes,
            self.config.max_workers,
        )
        .transcribe(files, logger)?;
        logger.timing("transcribe", elapsed_ms(started));
        Ok(texts)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
