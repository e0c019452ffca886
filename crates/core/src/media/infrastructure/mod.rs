pub mod ffmpeg_codec;
mod sample_window;
