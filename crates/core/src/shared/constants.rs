/// Request payload ceiling of the transcription service (25 MiB).
pub const DEFAULT_SIZE_LIMIT_BYTES: u64 = 25 * 1024 * 1024;

/// Fraction of the ceiling each chunk targets, absorbing re-encode variance.
pub const DEFAULT_SAFETY_MARGIN: f64 = 0.95;

/// Constant bitrate for extracted and segmented artifacts.
pub const DEFAULT_BITRATE_KBPS: u32 = 128;

pub const ARTIFACT_SAMPLE_RATE: u32 = 44_100;
pub const ARTIFACT_PREFIX: &str = "transcribe-";
pub const ARTIFACT_SUFFIX: &str = ".mp3";

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "whisper-1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_INPUT_FILENAME: &str = "audio.mp3";

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "webm", "flv", "mpeg", "mpg", "wmv",
];
