use std::path::Path;

use crate::media::domain::media_codec::TimeRange;
use crate::shared::error::TranscribeError;

/// One time-bounded segment of a chunk plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkSpan {
    pub index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl ChunkSpan {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_seconds,
            end: self.end_seconds,
        }
    }
}

/// Contiguous, index-ordered segments covering `[0, duration]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkPlan {
    pub spans: Vec<ChunkSpan>,
    pub chunk_duration: f64,
}

impl ChunkPlan {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Splits an oversized artifact into equal-duration chunks that each fit
/// within `size_limit × safety_margin`.
#[derive(Clone, Copy, Debug)]
pub struct ChunkPlanner {
    size_limit_bytes: u64,
    safety_margin: f64,
}

impl ChunkPlanner {
    pub fn new(size_limit_bytes: u64, safety_margin: f64) -> Self {
        Self {
            size_limit_bytes,
            safety_margin,
        }
    }

    pub fn needs_chunking(&self, byte_size: u64) -> bool {
        byte_size > self.size_limit_bytes
    }

    /// Number of chunks for an artifact of `byte_size` bytes; at least 1.
    pub fn chunk_count(&self, byte_size: u64) -> Result<usize, TranscribeError> {
        let effective_limit = self.size_limit_bytes as f64 * self.safety_margin;
        if !(effective_limit > 0.0) {
            return Err(TranscribeError::Configuration(format!(
                "effective chunk size must be positive (limit {} bytes, margin {})",
                self.size_limit_bytes, self.safety_margin
            )));
        }
        let count = (byte_size as f64 / effective_limit).ceil() as usize;
        Ok(count.max(1))
    }

    /// `path` only labels a `DegenerateMedia` error.
    pub fn plan(
        &self,
        path: &Path,
        byte_size: u64,
        duration_seconds: f64,
    ) -> Result<ChunkPlan, TranscribeError> {
        if !(duration_seconds.is_finite() && duration_seconds > 0.0) {
            return Err(TranscribeError::DegenerateMedia {
                path: path.to_path_buf(),
                duration: duration_seconds,
            });
        }

        let count = self.chunk_count(byte_size)?;
        let chunk_duration = duration_seconds / count as f64;
        let spans = (0..count)
            .map(|index| {
                let start_seconds = index as f64 * chunk_duration;
                let end_seconds = if index + 1 == count {
                    duration_seconds
                } else {
                    ((index + 1) as f64 * chunk_duration).min(duration_seconds)
                };
                ChunkSpan {
                    index,
                    start_seconds,
                    end_seconds,
                }
            })
            .collect();

        Ok(ChunkPlan {
            spans,
            chunk_duration,
        })
    }
}
