pub mod openai_transcription_service;
