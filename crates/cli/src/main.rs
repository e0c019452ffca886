use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use transcribe_core::media::infrastructure::ffmpeg_codec::FfmpegCodec;
use transcribe_core::pipeline::pipeline_logger::LogPipelineLogger;
use transcribe_core::pipeline::transcribe_file_use_case::TranscribeFileUseCase;
use transcribe_core::shared::config::{available_workers, TranscribeConfig};
use transcribe_core::shared::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BITRATE_KBPS, DEFAULT_INPUT_FILENAME, DEFAULT_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SAFETY_MARGIN,
};
use transcribe_core::transcription::infrastructure::openai_transcription_service::OpenAiTranscriptionService;

const SEPARATOR: &str = "--------------------";

/// Transcribe audio and video files with a remote speech-to-text service.
#[derive(Parser)]
#[command(name = "transcribe")]
struct Cli {
    /// Audio or video file to transcribe.
    #[arg(default_value = DEFAULT_INPUT_FILENAME)]
    input: PathBuf,

    /// Write the transcript to this file instead of stdout.
    output: Option<PathBuf>,

    /// API key for the transcription service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    base_url: String,

    /// Transcription model name.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Request size ceiling in MiB.
    #[arg(long, default_value = "25")]
    max_upload_mb: u64,

    /// Fraction of the ceiling each chunk targets (0.0-1.0].
    #[arg(long, default_value_t = DEFAULT_SAFETY_MARGIN)]
    safety_margin: f64,

    /// MP3 bitrate for extracted audio, in kbps.
    #[arg(long, default_value_t = DEFAULT_BITRATE_KBPS)]
    bitrate: u32,

    /// Parallel uploads (defaults to the number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout: u64,

    /// Directory for temporary audio files.
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    config.validate()?;

    let service = OpenAiTranscriptionService::new(&config)?;
    let use_case = TranscribeFileUseCase::new(Box::new(FfmpegCodec), Box::new(service), config);

    log::info!("Transcribing {}", cli.input.display());
    let mut logger = LogPipelineLogger::default();
    let transcription = use_case.run(&cli.input, &mut logger)?;

    match cli.output {
        Some(ref path) => write_transcript(path, &transcription.text)?,
        None => {
            println!("{SEPARATOR}");
            println!("{}", transcription.text);
            println!("{SEPARATOR}");
        }
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<TranscribeConfig, Box<dyn std::error::Error>> {
    if cli.max_upload_mb == 0 {
        return Err("--max-upload-mb must be greater than zero".into());
    }
    if cli.jobs == Some(0) {
        return Err("--jobs must be at least 1".into());
    }
    if cli.timeout == 0 {
        return Err("--timeout must be greater than zero".into());
    }

    let size_limit_bytes = cli
        .max_upload_mb
        .checked_mul(1024 * 1024)
        .ok_or("--max-upload-mb is too large")?;

    let mut config = TranscribeConfig::new(cli.api_key.clone().unwrap_or_default());
    config.base_url = cli.base_url.clone();
    config.model = cli.model.clone();
    config.size_limit_bytes = size_limit_bytes;
    config.safety_margin = cli.safety_margin;
    config.bitrate_kbps = cli.bitrate;
    config.max_workers = cli.jobs.unwrap_or_else(available_workers);
    config.request_timeout = Duration::from_secs(cli.timeout);
    if let Some(ref dir) = cli.temp_dir {
        config.temp_dir = dir.clone();
    }
    Ok(config)
}

fn write_transcript(path: &Path, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, text).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    log::info!("Transcript written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["transcribe"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_input_filename() {
        let cli = parse(&["--api-key", "sk-test"]);
        assert_eq!(cli.input, PathBuf::from("audio.mp3"));
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_positional_input_and_output() {
        let cli = parse(&["--api-key", "sk-test", "talk.mp4", "talk.txt"]);
        assert_eq!(cli.input, PathBuf::from("talk.mp4"));
        assert_eq!(cli.output, Some(PathBuf::from("talk.txt")));
    }

    #[test]
    fn test_build_config_applies_flags() {
        let cli = parse(&[
            "--api-key",
            "sk-test",
            "--max-upload-mb",
            "10",
            "--jobs",
            "3",
            "--bitrate",
            "96",
            "--model",
            "whisper-large",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.size_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.bitrate_kbps, 96);
        assert_eq!(config.model, "whisper-large");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let cli = parse(&["--api-key", "sk-test", "--jobs", "0"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_huge_upload_limit_rejected_instead_of_wrapping() {
        let max = u64::MAX.to_string();
        let cli = parse(&["--api-key", "sk-test", "--max-upload-mb", &max]);
        let err = build_config(&cli).err().unwrap();
        assert!(err.to_string().contains("--max-upload-mb"));
    }

    #[test]
    fn test_largest_representable_upload_limit_accepted() {
        let mb = (u64::MAX / (1024 * 1024)).to_string();
        let cli = parse(&["--api-key", "sk-test", "--max-upload-mb", &mb]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.size_limit_bytes, (u64::MAX / (1024 * 1024)) * 1024 * 1024);
    }

    #[test]
    fn test_write_transcript() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        write_transcript(&path, "hello  world").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello  world");
    }

    #[test]
    fn test_write_transcript_to_missing_dir_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("out.txt");
        assert!(write_transcript(&path, "text").is_err());
    }
}
