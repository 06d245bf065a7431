//! bildtext configuration management.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::text::DEFAULT_MAX_CHUNK_SIZE;
use crate::tts::elevenlabs::API_KEY_ENV;
use crate::tts::{DEFAULT_MODEL_ID, DEFAULT_VOICE_ID, TtsOptions};

/// Pause between uncached vision requests, in seconds.
const DEFAULT_REQUEST_DELAY_SECS: u64 = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BildtextConfig {
    /// LLM preset for image requests. None uses the llm.toml default.
    #[serde(default)]
    pub model_preset: Option<String>,

    /// Seconds to wait between uncached vision requests
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,

    /// Book context inserted into accessibility prompts
    #[serde(default)]
    pub book_context: Option<String>,

    /// Maximum characters per speech synthesis request
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// ElevenLabs voice
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// ElevenLabs model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Voice stability (0.0-1.0)
    #[serde(default)]
    pub stability: Option<f32>,

    /// Voice similarity boost (0.0-1.0)
    #[serde(default)]
    pub similarity_boost: Option<f32>,

    /// ElevenLabs API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevenlabs_api_key: Option<String>,
}

fn default_request_delay_secs() -> u64 {
    DEFAULT_REQUEST_DELAY_SECS
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_tts_model() -> String {
    DEFAULT_MODEL_ID.to_string()
}

impl Default for BildtextConfig {
    fn default() -> Self {
        Self {
            model_preset: None,
            request_delay_secs: default_request_delay_secs(),
            book_context: None,
            max_chunk_size: default_max_chunk_size(),
            voice_id: default_voice_id(),
            tts_model: default_tts_model(),
            stability: None,
            similarity_boost: None,
            elevenlabs_api_key: None,
        }
    }
}

impl BildtextConfig {
    /// Get the config file path: ~/.config/cli-programs/bildtext.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "HOME not set",
                ))
            })?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("bildtext.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: BildtextConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    /// Synthesis options built from the voice settings.
    pub fn tts_options(&self) -> TtsOptions {
        let mut options = TtsOptions::new()
            .with_voice(&self.voice_id)
            .with_model(&self.tts_model);
        if let Some(stability) = self.stability {
            options = options.with_stability(stability);
        }
        if let Some(similarity_boost) = self.similarity_boost {
            options = options.with_similarity_boost(similarity_boost);
        }
        options
    }

    /// ElevenLabs API key from config or environment variable
    pub fn elevenlabs_api_key(&self) -> Result<String> {
        if let Some(key) = &self.elevenlabs_api_key {
            return Ok(key.clone());
        }

        std::env::var(API_KEY_ENV).map_err(|_| Error::MissingApiKey {
            service: "ElevenLabs".to_string(),
            env_var: API_KEY_ENV.to_string(),
        })
    }
}
