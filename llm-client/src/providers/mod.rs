//! LLM provider implementations

mod anthropic;
mod gemini;
pub mod mock;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use mock::MockProvider;

use std::str::FromStr;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

impl ProviderKind {
    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::Anthropic => "Anthropic",
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind: ProviderKind = preset.provider.parse()?;
    let api_key = get_api_key(provider_config, kind)?;
    let base_url = provider_config.and_then(|c| c.base_url.clone());

    match kind {
        ProviderKind::Gemini => Ok(Box::new(GeminiProvider::new(
            &preset.model,
            api_key,
            base_url,
        )?)),
        ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(
            &preset.model,
            api_key,
            base_url,
        )?)),
    }
}

/// Get API key from config or environment variable
fn get_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    // Check config first
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    std::env::var(kind.env_var()).map_err(|_| LlmError::MissingApiKey {
        provider: kind.display_name().to_string(),
        env_var: kind.env_var().to_string(),
    })
}

/// Map a non-success HTTP status to the matching error variant
pub(crate) fn status_error(status: u16, message: String, retry_after: Option<u64>) -> LlmError {
    match status {
        429 => LlmError::RateLimited { retry_after },
        503 => LlmError::ServerOverloaded { message },
        _ => LlmError::ApiError {
            message,
            status_code: Some(status),
        },
    }
}

/// Parse a `Retry-After` header given in seconds
pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("Google".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(
            "anthropic".parse::<ProviderKind>().unwrap(),
            ProviderKind::Anthropic
        );
        assert!("claude-cli".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_api_key_from_config() {
        let config = ProviderConfig {
            api_key: Some("from-config".to_string()),
            base_url: None,
        };
        let key = get_api_key(Some(&config), ProviderKind::Gemini).unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn test_get_provider_with_config_key() {
        let preset = ModelPreset {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
        };
        let config = ProviderConfig {
            api_key: Some("key".to_string()),
            base_url: None,
        };
        let provider = get_provider(&preset, Some(&config)).unwrap();
        assert_eq!(provider.name(), "Gemini API");
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(429, "slow down".into(), Some(30)),
            LlmError::RateLimited {
                retry_after: Some(30)
            }
        ));
        assert!(matches!(
            status_error(503, "busy".into(), None),
            LlmError::ServerOverloaded { .. }
        ));
        assert!(matches!(
            status_error(400, "bad".into(), None),
            LlmError::ApiError {
                status_code: Some(400),
                ..
            }
        ));
    }
}
