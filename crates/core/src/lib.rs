//! Transcription of audio and video files through a remote speech-to-text
//! service with a per-request size ceiling.
//!
//! Oversized inputs are re-encoded, split into equal-duration chunks that fit
//! the ceiling, transcribed in parallel and merged back in order.

pub mod chunking;
pub mod media;
pub mod pipeline;
pub mod shared;
pub mod transcription;

#[cfg(test)]
pub(crate) mod test_support;
