pub mod transcription_service;
