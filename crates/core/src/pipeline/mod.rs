pub mod pipeline_logger;
pub mod transcribe_file_use_case;
