//! Speech synthesis backend trait and types.

pub mod elevenlabs;
#[cfg(test)]
mod mock;
pub mod narrate;

pub use elevenlabs::ElevenLabsBackend;
pub use narrate::{Narration, NarrationProgress, Narrator};

use anyhow::Result;
use async_trait::async_trait;
use log::warn;

/// Default ElevenLabs voice ("Rachel").
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4NF8gDrvPhhE";

/// Default multilingual synthesis model.
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Options for a synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct TtsOptions {
    /// Voice to speak with
    pub voice_id: String,
    /// Synthesis model
    pub model_id: String,
    /// Voice stability (0.0-1.0). None uses the voice's stored setting.
    pub stability: Option<f32>,
    /// Similarity boost (0.0-1.0). None uses the voice's stored setting.
    pub similarity_boost: Option<f32>,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            stability: None,
            similarity_boost: None,
        }
    }
}

impl TtsOptions {
    /// Create new TTS options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the voice.
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    /// Set the synthesis model.
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the stability.
    pub fn with_stability(mut self, stability: f32) -> Self {
        self.stability = Some(stability.clamp(0.0, 1.0));
        self
    }

    /// Set the similarity boost.
    pub fn with_similarity_boost(mut self, similarity_boost: f32) -> Self {
        self.similarity_boost = Some(similarity_boost.clamp(0.0, 1.0));
        self
    }
}

/// Speech synthesis backend - all TTS services implement this.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize text, returning encoded audio bytes.
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<u8>>;

    /// Synthesize, trying up to `max_attempts` times.
    async fn synthesize_with_retry(
        &self,
        text: &str,
        options: &TtsOptions,
        max_attempts: u32,
    ) -> Result<Vec<u8>> {
        let mut last_error = None;

        for attempt in 0..max_attempts.max(1) {
            match self.synthesize(text, options).await {
                Ok(audio) => return Ok(audio),
                Err(e) => {
                    warn!(
                        "Synthesis failed (attempt {}/{}): {:#}",
                        attempt + 1,
                        max_attempts.max(1),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("All retry attempts failed")))
    }

    /// Service name for display.
    fn name(&self) -> &'static str;
}
