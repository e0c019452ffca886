use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::shared::config::TranscribeConfig;
use crate::shared::error::BoxError;
use crate::transcription::domain::transcription_service::{AudioPayload, TranscriptionService};

#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected response body: {0}")]
    Body(#[source] serde_json::Error),
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcription via an OpenAI-compatible `/audio/transcriptions` endpoint.
///
/// The blocking client is built once and shared by all worker threads.
pub struct OpenAiTranscriptionService {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiTranscriptionService {
    pub fn new(config: &TranscribeConfig) -> Result<Self, OpenAiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(OpenAiError::Client)?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: endpoint(&config.base_url),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TranscriptionService for OpenAiTranscriptionService {
    fn submit(&self, payload: &AudioPayload) -> Result<String, BoxError> {
        let file_name = payload.file_name();
        let part = Part::bytes(payload.read_bytes()?)
            .file_name(file_name.clone())
            .mime_str(mime_for(&payload.path))?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", part);

        log::debug!(
            "Uploading chunk {} ({file_name}, {} bytes) to {}",
            payload.index,
            payload.byte_size,
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| OpenAiError::Request {
                url: self.endpoint.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| OpenAiError::Request {
            url: self.endpoint.clone(),
            source: e,
        })?;
        if !status.is_success() {
            return Err(OpenAiError::Status { status, body }.into());
        }

        let text = parse_transcription(&body)?;
        log::debug!("Chunk {} transcribed ({} chars)", payload.index, text.len());
        Ok(text)
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}/audio/transcriptions", base_url.trim_end_matches('/'))
}

fn parse_transcription(body: &str) -> Result<String, OpenAiError> {
    serde_json::from_str::<TranscriptionResponse>(body)
        .map(|r| r.text)
        .map_err(OpenAiError::Body)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" | "mpga" | "mpeg" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" | "mp4" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}
