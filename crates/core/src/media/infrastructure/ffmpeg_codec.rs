use std::path::{Path, PathBuf};

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;
use ffmpeg_next::util::frame::audio::Audio as AudioFrame;
use ffmpeg_next::ChannelLayout;

use super::sample_window::SampleWindow;
use crate::media::domain::media_codec::{AudioTrack, MediaCodec, TimeRange};
use crate::shared::constants::ARTIFACT_SAMPLE_RATE;
use crate::shared::error::BoxError;

const AV_TIME_BASE: f64 = 1_000_000.0;
const NO_TIMESTAMP: i64 = i64::MIN;
const FALLBACK_FRAME_SIZE: usize = 1152;
const RESAMPLE_HEADROOM: u64 = 256;

/// Decoded ahead of a range start after seeking; seeks land on packet
/// boundaries, not samples.
const SEEK_PREROLL_SECONDS: f64 = 1.0;

/// Decodes any container ffmpeg understands and re-encodes its best audio
/// stream as mono constant-bitrate MP3 (libmp3lame).
pub struct FfmpegCodec;

impl MediaCodec for FfmpegCodec {
    fn open_audio(&self, path: &Path) -> Result<Option<Box<dyn AudioTrack>>, BoxError> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;
        let stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };

        let stream_index = stream.index();
        let stream_seconds = stream.duration() as f64 * f64::from(stream.time_base());
        let duration = if stream.duration() > 0 && stream_seconds > 0.0 {
            stream_seconds
        } else if ictx.duration() > 0 {
            ictx.duration() as f64 / AV_TIME_BASE
        } else {
            0.0
        };

        Ok(Some(Box::new(FfmpegAudioTrack {
            path: path.to_path_buf(),
            stream_index,
            duration,
        })))
    }
}

/// An audio stream located by `FfmpegCodec::open_audio`.
///
/// Holds no decoder state between encodes: every `encode` opens its own
/// input and output contexts and drops them before returning.
pub struct FfmpegAudioTrack {
    path: PathBuf,
    stream_index: usize,
    duration: f64,
}

impl AudioTrack for FfmpegAudioTrack {
    fn duration_seconds(&self) -> f64 {
        self.duration
    }

    fn encode(
        &self,
        range: Option<TimeRange>,
        bitrate_kbps: u32,
        dest: &Path,
    ) -> Result<(), BoxError> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(&self.path)?;
        let (mut decoder, timeline) = {
            let stream = ictx
                .stream(self.stream_index)
                .ok_or("audio stream not found on reopen")?;
            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
            let timeline = StreamTimeline::new(stream.time_base(), stream.start_time());
            (codec_ctx.decoder().audio()?, timeline)
        };

        let sought = match range {
            Some(r) if r.start > SEEK_PREROLL_SECONDS => {
                seek_before(&mut ictx, r.start - SEEK_PREROLL_SECONDS)
            }
            _ => false,
        };

        let mut resampler = MonoResampler::new(&decoder)?;
        let mut sink = Mp3Sink::create(dest, bitrate_kbps)?;
        let mut window = SampleWindow::new(range, ARTIFACT_SAMPLE_RATE);
        let mut anchored = false;
        let mut decoded = AudioFrame::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != self.stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                if !anchored {
                    anchored = true;
                    match decoded.timestamp().or(decoded.pts()) {
                        Some(ts) => window.anchor(timeline.seconds(ts)),
                        None if sought => {
                            return Err("decoded audio has no timestamp after seeking".into())
                        }
                        None => {}
                    }
                }
                let resampled = resampler.convert(&mut decoded)?;
                sink.push(window.take(mono_samples(&resampled)))?;
            }

            if window.is_finished() {
                break;
            }
        }

        if !window.is_finished() {
            decoder.send_eof()?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                let resampled = resampler.convert(&mut decoded)?;
                sink.push(window.take(mono_samples(&resampled)))?;
            }
            while let Some(tail) = resampler.drain()? {
                sink.push(window.take(mono_samples(&tail)))?;
            }
        }

        sink.finish()
    }
}

/// Position the demuxer on a packet at or before `seconds`. A failed seek
/// leaves the input where it was, which is still correct, only slower.
fn seek_before(ictx: &mut ffmpeg_next::format::context::Input, seconds: f64) -> bool {
    let ts = (seconds * AV_TIME_BASE) as i64;
    match ictx.seek(ts, ..ts) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Seek to {seconds:.2}s failed, decoding from the start: {e}");
            false
        }
    }
}

/// Maps stream timestamps to seconds from the start of the stream.
struct StreamTimeline {
    time_base: f64,
    origin: i64,
}

impl StreamTimeline {
    fn new(time_base: ffmpeg_next::Rational, start_time: i64) -> Self {
        Self {
            time_base: f64::from(time_base),
            origin: if start_time == NO_TIMESTAMP { 0 } else { start_time },
        }
    }

    fn seconds(&self, ts: i64) -> f64 {
        ts.saturating_sub(self.origin) as f64 * self.time_base
    }
}

/// Converts decoded frames to mono f32 planar at the artifact rate.
///
/// Every call gets a fresh output frame sized for the input plus whatever
/// swresample is still holding, so no converted audio is left behind.
struct MonoResampler {
    context: ffmpeg_next::software::resampling::Context,
    source_layout: ChannelLayout,
}

impl MonoResampler {
    fn new(decoder: &ffmpeg_next::decoder::Audio) -> Result<Self, BoxError> {
        let source_layout = if decoder.channel_layout().is_empty() {
            ChannelLayout::default(decoder.channels() as i32)
        } else {
            decoder.channel_layout()
        };
        let context = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            source_layout,
            decoder.rate(),
            Sample::F32(SampleType::Planar),
            ChannelLayout::MONO,
            ARTIFACT_SAMPLE_RATE,
        )?;
        Ok(Self {
            context,
            source_layout,
        })
    }

    fn convert(&mut self, decoded: &mut AudioFrame) -> Result<AudioFrame, BoxError> {
        if decoded.channel_layout().is_empty() {
            decoded.set_channel_layout(self.source_layout);
        }
        let capacity = self.capacity_for(decoded.samples());
        let mut out = AudioFrame::new(Sample::F32(SampleType::Planar), capacity, ChannelLayout::MONO);
        self.context.run(decoded, &mut out)?;
        Ok(out)
    }

    /// Next block of buffered output at end of stream, `None` once empty.
    fn drain(&mut self) -> Result<Option<AudioFrame>, BoxError> {
        let pending = self.pending_output();
        if pending == 0 {
            return Ok(None);
        }
        let capacity = (pending + RESAMPLE_HEADROOM) as usize;
        let mut out = AudioFrame::new(Sample::F32(SampleType::Planar), capacity, ChannelLayout::MONO);
        self.context.flush(&mut out)?;
        Ok((out.samples() > 0).then_some(out))
    }

    fn capacity_for(&self, input_samples: usize) -> usize {
        let in_rate = u64::from(self.context.input().rate.max(1));
        let converted = (input_samples as u64 * u64::from(ARTIFACT_SAMPLE_RATE)).div_ceil(in_rate);
        (converted + self.pending_output() + RESAMPLE_HEADROOM) as usize
    }

    fn pending_output(&self) -> u64 {
        self.context
            .delay()
            .map_or(0, |delay| delay.output.max(0) as u64)
    }
}

fn mono_samples(frame: &AudioFrame) -> &[f32] {
    if frame.samples() == 0 {
        return &[];
    }
    frame.plane::<f32>(0)
}

/// MP3 output file fed with mono f32 samples in arbitrary block sizes.
struct Mp3Sink {
    octx: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::audio::Encoder,
    stream_index: usize,
    encoder_time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
    frame_size: usize,
    pending: Vec<f32>,
    pts: i64,
}

impl Mp3Sink {
    fn create(dest: &Path, bitrate_kbps: u32) -> Result<Self, BoxError> {
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MP3)
            .ok_or("MP3 encoder not found")?;
        let mut octx = ffmpeg_next::format::output_as(dest, "mp3")?;

        let mut ost = octx.add_stream(Some(codec))?;
        let stream_index = ost.index();

        let mut encoder = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .audio()?;
        encoder.set_rate(ARTIFACT_SAMPLE_RATE as i32);
        encoder.set_channel_layout(ChannelLayout::MONO);
        encoder.set_format(Sample::F32(SampleType::Planar));
        encoder.set_bit_rate(bitrate_kbps as usize * 1000);
        encoder.set_time_base((1, ARTIFACT_SAMPLE_RATE as i32));

        let encoder = encoder.open_as(codec)?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let stream_time_base = octx
            .stream(stream_index)
            .ok_or("output stream missing after header")?
            .time_base();
        let encoder_time_base = encoder.time_base();
        let frame_size = match encoder.frame_size() as usize {
            0 => FALLBACK_FRAME_SIZE,
            n => n,
        };

        Ok(Self {
            octx,
            encoder,
            stream_index,
            encoder_time_base,
            stream_time_base,
            frame_size,
            pending: Vec::with_capacity(frame_size * 2),
            pts: 0,
        })
    }

    fn push(&mut self, samples: &[f32]) -> Result<(), BoxError> {
        self.pending.extend_from_slice(samples);
        while self.pending.len() >= self.frame_size {
            let block: Vec<f32> = self.pending.drain(..self.frame_size).collect();
            self.send(&block)?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<(), BoxError> {
        if !self.pending.is_empty() {
            let block = std::mem::take(&mut self.pending);
            self.send(&block)?;
        }
        self.encoder.send_eof()?;
        self.drain_packets()?;
        self.octx.write_trailer()?;
        Ok(())
    }

    fn send(&mut self, block: &[f32]) -> Result<(), BoxError> {
        let mut frame = AudioFrame::new(
            Sample::F32(SampleType::Planar),
            block.len(),
            ChannelLayout::MONO,
        );
        frame.set_rate(ARTIFACT_SAMPLE_RATE);
        frame.set_pts(Some(self.pts));
        frame.plane_mut::<f32>(0)[..block.len()].copy_from_slice(block);

        self.encoder.send_frame(&frame)?;
        self.drain_packets()?;
        self.pts += block.len() as i64;
        Ok(())
    }

    fn drain_packets(&mut self) -> Result<(), BoxError> {
        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.stream_index);
            encoded.rescale_ts(self.encoder_time_base, self.stream_time_base);
            encoded.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }
}
