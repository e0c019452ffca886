pub mod artifact_lifecycle;
pub mod config;
pub mod constants;
pub mod error;
pub mod source_file;
