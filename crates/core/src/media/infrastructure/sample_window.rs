use crate::media::domain::media_codec::TimeRange;

/// Selects the samples of a decoded stream that fall inside a time range.
///
/// Decoded audio arrives in blocks of arbitrary length; the window keeps a
/// running sample position and returns the part of each block to keep.
/// The position starts at 0 unless `anchor` places it at a decoded timestamp
/// (after seeking into the stream).
pub(crate) struct SampleWindow {
    sample_rate: u32,
    start: u64,
    end: Option<u64>,
    position: u64,
}

impl SampleWindow {
    pub(crate) fn new(range: Option<TimeRange>, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            start: range.map_or(0, |r| to_sample(r.start, sample_rate)),
            end: range.map(|r| to_sample(r.end, sample_rate)),
            position: 0,
        }
    }

    /// Set the stream time of the next block's first sample.
    pub(crate) fn anchor(&mut self, seconds: f64) {
        self.position = to_sample(seconds, self.sample_rate);
    }

    pub(crate) fn take<'a>(&mut self, block: &'a [f32]) -> &'a [f32] {
        let block_start = self.position;
        let block_end = block_start + block.len() as u64;
        self.position = block_end;

        let from = self.start.clamp(block_start, block_end);
        let to = self
            .end
            .map_or(block_end, |end| end.min(block_end))
            .max(from);
        &block[(from - block_start) as usize..(to - block_start) as usize]
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.end.is_some_and(|end| self.position >= end)
    }
}

fn to_sample(seconds: f64, sample_rate: u32) -> u64 {
    if seconds.is_finite() {
        (seconds.max(0.0) * sample_rate as f64).round() as u64
    } else {
        0
    }
}
