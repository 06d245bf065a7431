//! Error types for bildtext.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not extract {} from model response", .missing.join(", "))]
    ExtractionFailed { missing: Vec<String>, raw: String },

    #[error("No text to synthesize")]
    EmptyText,

    #[error("Speech synthesis failed for chunk {chunk}: {message}")]
    Synthesis { chunk: usize, message: String },

    #[error("Unsupported image format{}", .name.as_ref().map(|n| format!(": {}", n)).unwrap_or_default())]
    UnsupportedImage { name: Option<String> },

    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error(
        "API key not found for {service}. Set {env_var} environment variable or add to config."
    )]
    MissingApiKey { service: String, env_var: String },

    #[error(transparent)]
    Llm(#[from] llm_client::LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
