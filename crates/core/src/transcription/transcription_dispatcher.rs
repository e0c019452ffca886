use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::error::{BoxError, TranscribeError};
use crate::transcription::domain::transcription_service::{AudioPayload, TranscriptionService};

type ChunkResult = (usize, Result<String, BoxError>, f64);

/// Sends audio files to the transcription service and returns their texts in
/// input order.
///
/// A single file is submitted on the calling thread. Several files go through
/// a fixed pool of `min(max_workers, n)` threads pulling index-tagged tasks
/// from a queue; each result is written into its own pre-sized slot, so
/// completion order never affects the merge.
pub struct TranscriptionDispatcher<'a> {
    service: &'a dyn TranscriptionService,
    size_limit_bytes: u64,
    max_workers: usize,
}

impl<'a> TranscriptionDispatcher<'a> {
    pub fn new(
        service: &'a dyn TranscriptionService,
        size_limit_bytes: u64,
        max_workers: usize,
    ) -> Self {
        Self {
            service,
            size_limit_bytes,
            max_workers: max_workers.max(1),
        }
    }

    pub fn transcribe(
        &self,
        files: &[PathBuf],
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<String>, TranscribeError> {
        let payloads = self.payloads(files)?;

        match payloads.as_slice() {
            [] => Ok(Vec::new()),
            [single] => {
                let started = Instant::now();
                let text = self.service.submit(single).map_err(|e| {
                    TranscribeError::TranscriptionService {
                        index: single.index,
                        source: e,
                    }
                })?;
                logger.timing("upload", elapsed_ms(started));
                logger.progress(1, 1);
                Ok(vec![text])
            }
            _ => self.transcribe_pooled(&payloads, logger),
        }
    }

    fn payloads(&self, files: &[PathBuf]) -> Result<Vec<AudioPayload>, TranscribeError> {
        files
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let byte_size = fs::metadata(path)
                    .map_err(|e| TranscribeError::io(path, e))?
                    .len();
                if byte_size > self.size_limit_bytes {
                    return Err(TranscribeError::PayloadTooLarge {
                        index,
                        size: byte_size,
                        limit: self.size_limit_bytes,
                    });
                }
                Ok(AudioPayload {
                    index,
                    path: path.clone(),
                    byte_size,
                })
            })
            .collect()
    }

    fn transcribe_pooled(
        &self,
        payloads: &[AudioPayload],
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<String>, TranscribeError> {
        let total = payloads.len();
        let workers = self.max_workers.min(total);
        log::info!("Transcribing {total} chunks with {workers} workers");

        let (task_tx, task_rx) = crossbeam_channel::unbounded::<&AudioPayload>();
        for payload in payloads {
            // The receiver is alive in this scope, so send cannot fail.
            let _ = task_tx.send(payload);
        }
        drop(task_tx);

        let (result_tx, result_rx) = crossbeam_channel::unbounded::<ChunkResult>();
        let failed = AtomicBool::new(false);
        let mut slots: Vec<Option<String>> = vec![None; total];
        let mut first_error: Option<TranscribeError> = None;

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let failed = &failed;
                let service = self.service;
                scope.spawn(move || {
                    for payload in task_rx {
                        if failed.load(Ordering::Relaxed) {
                            break;
                        }
                        let started = Instant::now();
                        let result = service.submit(payload);
                        if result.is_err() {
                            failed.store(true, Ordering::Relaxed);
                        }
                        if result_tx
                            .send((payload.index, result, elapsed_ms(started)))
                            .is_err()
                        {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            let mut completed = 0;
            for (index, result, ms) in result_rx {
                match result {
                    Ok(text) => {
                        slots[index] = Some(text);
                        completed += 1;
                        logger.timing("upload", ms);
                        logger.progress(completed, total);
                    }
                    Err(e) => {
                        log::warn!("Chunk {index} failed: {e}");
                        if first_error.is_none() {
                            first_error = Some(TranscribeError::TranscriptionService {
                                index,
                                source: e,
                            });
                        }
                    }
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| TranscribeError::TranscriptionService {
                    index,
                    source: "worker exited without a result".into(),
                })
            })
            .collect()
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
