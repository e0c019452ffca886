pub mod audio_extractor;
pub mod compressed_artifact;
pub mod media_codec;
pub mod media_probe;
pub mod segmenter;
