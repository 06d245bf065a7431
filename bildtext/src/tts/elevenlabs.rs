//! ElevenLabs text-to-speech backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{SpeechSynthesizer, TtsOptions};

const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
const OUTPUT_FORMAT: &str = "mp3_44100_128";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Synthesizes speech through the ElevenLabs REST API.
pub struct ElevenLabsBackend {
    api_key: String,
    base_url: String,
    client: Client,
}

impl ElevenLabsBackend {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ELEVENLABS_API_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!(
            "{}/text-to-speech/{}?output_format={}",
            self.base_url, voice_id, OUTPUT_FORMAT
        )
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<VoiceSettings>,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    stability: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity_boost: Option<f32>,
}

fn build_request<'a>(text: &'a str, options: &'a TtsOptions) -> SpeechRequest<'a> {
    let voice_settings = if options.stability.is_some() || options.similarity_boost.is_some() {
        Some(VoiceSettings {
            stability: options.stability,
            similarity_boost: options.similarity_boost,
        })
    } else {
        None
    };

    SpeechRequest {
        text,
        model_id: &options.model_id,
        voice_settings,
    }
}

/// Pull a readable message out of an error body.
///
/// The API answers with `{"detail": {"message": ...}}` or `{"detail": "..."}`.
fn error_message(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(serde_json::Value::String(s)) => s,
        Some(detail) => detail
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| detail.to_string()),
        None => body.to_string(),
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsBackend {
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.endpoint(&options.voice_id))
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .timeout(REQUEST_TIMEOUT)
            .json(&build_request(text, options))
            .send()
            .await
            .context("ElevenLabs request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "ElevenLabs API error (HTTP {}): {}",
                status.as_u16(),
                error_message(&body)
            );
        }

        let audio = response
            .bytes()
            .await
            .context("Failed to read audio from ElevenLabs")?;
        if audio.is_empty() {
            anyhow::bail!("ElevenLabs returned no audio data");
        }

        Ok(audio.to_vec())
    }

    fn name(&self) -> &'static str {
        "ElevenLabs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let backend = ElevenLabsBackend::with_base_url("key".into(), "http://localhost:9000/v1/");
        assert_eq!(
            backend.endpoint("voice"),
            "http://localhost:9000/v1/text-to-speech/voice?output_format=mp3_44100_128"
        );
    }

    #[test]
    fn test_request_without_voice_settings() {
        let options = TtsOptions::default();
        let json = serde_json::to_value(build_request("Hallo Welt.", &options)).unwrap();
        assert_eq!(json["text"], "Hallo Welt.");
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
        assert!(json.get("voice_settings").is_none());
    }

    #[test]
    fn test_request_with_voice_settings() {
        let options = TtsOptions::new().with_stability(0.5);
        let json = serde_json::to_value(build_request("Hallo.", &options)).unwrap();
        assert_eq!(json["voice_settings"]["stability"], 0.5);
        assert!(json["voice_settings"].get("similarity_boost").is_none());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"detail": {"status": "quota_exceeded", "message": "Quota exceeded"}}"#),
            "Quota exceeded"
        );
        assert_eq!(error_message(r#"{"detail": "Not found"}"#), "Not found");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
