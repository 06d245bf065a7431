//! Vision-capable LLM client library for the bildtext workspace
//!
//! Provides a unified interface for multimodal LLM providers:
//! - Google Gemini (Generative Language API)
//! - Anthropic API (Messages API with image blocks)
//! - Mock provider for tests

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, PresetChoice, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{ImageInput, LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, ProviderKind, get_provider};
