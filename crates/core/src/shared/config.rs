use std::path::PathBuf;
use std::time::Duration;

use super::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BITRATE_KBPS, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SAFETY_MARGIN, DEFAULT_SIZE_LIMIT_BYTES,
};
use super::error::TranscribeError;

/// Settings for one transcription run.
///
/// Built once by the caller and passed into the pipeline; the core never
/// reads credentials from the environment itself.
#[derive(Clone, Debug)]
pub struct TranscribeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub size_limit_bytes: u64,
    pub safety_margin: f64,
    pub bitrate_kbps: u32,
    pub max_workers: usize,
    pub request_timeout: Duration,
    pub temp_dir: PathBuf,
}

impl TranscribeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            size_limit_bytes: DEFAULT_SIZE_LIMIT_BYTES,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            max_workers: available_workers(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Checked before any file is touched.
    pub fn validate(&self) -> Result<(), TranscribeError> {
        if self.api_key.trim().is_empty() {
            return Err(TranscribeError::Configuration(
                "an API key is required (set OPENAI_API_KEY or pass --api-key)".to_string(),
            ));
        }
        if self.size_limit_bytes == 0 {
            return Err(TranscribeError::Configuration(
                "size limit must be greater than zero".to_string(),
            ));
        }
        if !(self.safety_margin > 0.0 && self.safety_margin <= 1.0) {
            return Err(TranscribeError::Configuration(format!(
                "safety margin must be in (0.0, 1.0], got {}",
                self.safety_margin
            )));
        }
        if self.bitrate_kbps == 0 {
            return Err(TranscribeError::Configuration(
                "bitrate must be greater than zero".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(TranscribeError::Configuration(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Worker pool size matching the host's available parallelism.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranscribeConfig::new("sk-test");
        assert_eq!(config.size_limit_bytes, 25 * 1024 * 1024);
        assert_eq!(config.bitrate_kbps, 128);
        assert_eq!(config.model, "whisper-1");
        assert!(config.max_workers >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = TranscribeConfig::new("   ");
        assert!(matches!(
            config.validate(),
            Err(TranscribeError::Configuration(_))
        ));
    }

    #[test]
    fn test_margin_out_of_range_rejected() {
        let mut config = TranscribeConfig::new("sk-test");
        config.safety_margin = 1.5;
        assert!(config.validate().is_err());
        config.safety_margin = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = TranscribeConfig::new("sk-test");
        config.max_workers = 0;
        assert!(config.validate().is_err());
    }
}
