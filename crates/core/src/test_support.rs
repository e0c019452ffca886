//! Stub codec and transcription service shared by the unit tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::media::domain::media_codec::{AudioTrack, MediaCodec, TimeRange};
use crate::shared::error::BoxError;
use crate::transcription::domain::transcription_service::{AudioPayload, TranscriptionService};

pub const MB: u64 = 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct EncodeCall {
    pub source: PathBuf,
    pub range: Option<TimeRange>,
    pub dest: PathBuf,
    pub bitrate_kbps: u32,
}

/// Codec that "encodes" by sizing the destination file (sparse): the whole
/// track compresses to `total_bytes`, ranges get their share by duration.
pub struct StubCodec {
    duration: f64,
    has_audio: bool,
    total_bytes: u64,
    fail_encode_at: Option<usize>,
    encodes: Arc<Mutex<Vec<EncodeCall>>>,
}

impl StubCodec {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            has_audio: true,
            total_bytes: MB,
            fail_encode_at: None,
            encodes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn without_audio(mut self) -> Self {
        self.has_audio = false;
        self
    }

    pub fn compressing_to(mut self, total_bytes: u64) -> Self {
        self.total_bytes = total_bytes;
        self
    }

    pub fn failing_encode_at(mut self, call: usize) -> Self {
        self.fail_encode_at = Some(call);
        self
    }

    pub fn encodes(&self) -> Vec<EncodeCall> {
        self.encodes.lock().unwrap().clone()
    }
}

impl MediaCodec for StubCodec {
    fn open_audio(&self, path: &Path) -> Result<Option<Box<dyn AudioTrack>>, BoxError> {
        if !path.exists() {
            return Err(format!("cannot open {}", path.display()).into());
        }
        if !self.has_audio {
            return Ok(None);
        }
        Ok(Some(Box::new(StubTrack {
            source: path.to_path_buf(),
            duration: self.duration,
            total_bytes: self.total_bytes,
            fail_encode_at: self.fail_encode_at,
            encodes: self.encodes.clone(),
        })))
    }
}

struct StubTrack {
    source: PathBuf,
    duration: f64,
    total_bytes: u64,
    fail_encode_at: Option<usize>,
    encodes: Arc<Mutex<Vec<EncodeCall>>>,
}

impl AudioTrack for StubTrack {
    fn duration_seconds(&self) -> f64 {
        self.duration
    }

    fn encode(
        &self,
        range: Option<TimeRange>,
        bitrate_kbps: u32,
        dest: &Path,
    ) -> Result<(), BoxError> {
        let mut encodes = self.encodes.lock().unwrap();
        if self.fail_encode_at == Some(encodes.len()) {
            return Err("encoder exploded".into());
        }
        let bytes = match range {
            None => self.total_bytes,
            Some(r) => (self.total_bytes as f64 * r.duration() / self.duration).round() as u64,
        };
        fs::File::create(dest)?.set_len(bytes)?;
        encodes.push(EncodeCall {
            source: self.source.clone(),
            range,
            dest: dest.to_path_buf(),
            bitrate_kbps,
        });
        Ok(())
    }
}

/// Service answering from a fixed list of texts, one per payload index.
pub struct StubService {
    texts: Vec<String>,
    delays: HashMap<usize, Duration>,
    fail_index: Option<usize>,
    calls: Arc<Mutex<Vec<AudioPayload>>>,
}

impl StubService {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            delays: HashMap::new(),
            fail_index: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Later indices answer sooner, so completion order is reversed.
    pub fn completing_in_reverse(mut self, step: Duration) -> Self {
        let n = self.texts.len();
        for i in 0..n {
            self.delays.insert(i, step * (n - i) as u32);
        }
        self
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_index = Some(index);
        self
    }

    pub fn calls(&self) -> Vec<AudioPayload> {
        self.calls.lock().unwrap().clone()
    }
}

impl TranscriptionService for StubService {
    fn submit(&self, payload: &AudioPayload) -> Result<String, BoxError> {
        self.calls.lock().unwrap().push(payload.clone());
        if let Some(delay) = self.delays.get(&payload.index) {
            std::thread::sleep(*delay);
        }
        if self.fail_index == Some(payload.index) {
            return Err("503 service unavailable".into());
        }
        self.texts
            .get(payload.index)
            .cloned()
            .ok_or_else(|| format!("no text for chunk {}", payload.index).into())
    }
}

/// Write a sparse file of the given size.
pub fn sized_file(path: &Path, bytes: u64) {
    fs::File::create(path).unwrap().set_len(bytes).unwrap();
}
