use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for transcription pipeline events.
///
/// The use case reports stage timings, sizes and chunk progress here instead
/// of printing them, so callers choose how (or whether) they are shown.
pub trait PipelineLogger: Send {
    /// `current` of `total` chunks have been transcribed.
    fn progress(&mut self, current: usize, total: usize);

    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Point-in-time value such as a byte size or chunk count.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Called once after a successful run.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregate of every timing reported for one stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageStats {
    pub count: usize,
    pub total_ms: f64,
    pub max_ms: f64,
}

impl StageStats {
    fn record(&mut self, duration_ms: f64) {
        self.count += 1;
        self.total_ms += duration_ms;
        self.max_ms = self.max_ms.max(duration_ms);
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

/// Forwards events to the `log` crate and prints a stage table when the run
/// finishes.
///
/// Progress is logged every `progress_every` chunks, plus the last one.
pub struct LogPipelineLogger {
    progress_every: usize,
    stages: BTreeMap<String, StageStats>,
    metrics: BTreeMap<String, Vec<f64>>,
    started: Instant,
    chunks_done: usize,
    chunks_total: usize,
    messages: Vec<String>,
}

impl LogPipelineLogger {
    pub fn new(progress_every: usize) -> Self {
        Self {
            progress_every: progress_every.max(1),
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
            chunks_done: 0,
            chunks_total: 0,
            messages: Vec::new(),
        }
    }

    pub fn stage(&self, name: &str) -> Option<&StageStats> {
        self.stages.get(name)
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(Vec::as_slice)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Stage table for the end of the run; `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let mut out = format!(
            "Transcription summary ({}/{} chunks, {:.1}s total):",
            self.chunks_done,
            self.chunks_total,
            self.started.elapsed().as_secs_f64()
        );
        for (name, stats) in &self.stages {
            out.push_str(&format!(
                "\n  {name:<10} x{:<3} mean {:>8.1}ms  max {:>8.1}ms  total {:>8.0}ms",
                stats.count,
                stats.mean_ms(),
                stats.max_ms,
                stats.total_ms
            ));
        }
        for (name, values) in &self.metrics {
            if let Some(last) = values.last() {
                out.push_str(&format!("\n  {name} = {last:.0}"));
            }
        }
        Some(out)
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.chunks_done = current;
        self.chunks_total = total;
        if current == total || current % self.progress_every == 0 {
            log::info!("Transcribed {current}/{total} chunks");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        log::debug!("{stage} took {duration_ms:.1}ms");
        self.stages
            .entry(stage.to_owned())
            .or_default()
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_owned()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
        self.messages.push(message.to_owned());
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
