//! Mock LLM provider for testing
//!
//! Returns canned text, can fail a set number of times first, and records
//! every request so tests can inspect prompts and attached images.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// A mock provider with scripted responses
pub struct MockProvider {
    /// Number of times to fail before succeeding (0 = always succeed)
    fail_count: usize,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure
    fail_with: Option<LlmError>,
    /// Response content to return on success
    success_response: String,
    /// Requests received, in call order
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    /// Create a provider that always answers with `response`
    pub fn always_succeeds(response: &str) -> Self {
        Self {
            fail_count: 0,
            call_count: AtomicUsize::new(0),
            fail_with: None,
            success_response: response.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: LlmError) -> Self {
        Self {
            fail_count: usize::MAX,
            fail_with: Some(error),
            ..Self::always_succeeds("")
        }
    }

    /// Create a provider that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: LlmError, response: &str) -> Self {
        Self {
            fail_count: n,
            fail_with: Some(error),
            ..Self::always_succeeds(response)
        }
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.requests
            .lock()
            .ok()
            .and_then(|requests| requests.last().cloned())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if call_num < self.fail_count {
            if let Some(err) = self.fail_with.as_ref() {
                return Err(clone_error(err));
            }
        }

        Ok(LlmResponse {
            content: self.success_response.clone(),
            model: "mock-model".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Clone an LlmError (needed because LlmError doesn't implement Clone)
fn clone_error(err: &LlmError) -> LlmError {
    match err {
        LlmError::MissingApiKey { provider, env_var } => LlmError::MissingApiKey {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        LlmError::RateLimited { retry_after } => LlmError::RateLimited {
            retry_after: *retry_after,
        },
        LlmError::ServerOverloaded { message } => LlmError::ServerOverloaded {
            message: message.clone(),
        },
        LlmError::ApiError {
            message,
            status_code,
        } => LlmError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        LlmError::EmptyResponse { reason } => LlmError::EmptyResponse {
            reason: reason.clone(),
        },
        LlmError::ConfigError(s) => LlmError::ConfigError(s.clone()),
        LlmError::InvalidPreset(s) => LlmError::InvalidPreset(s.clone()),
        // Io and Toml errors can't be cloned
        LlmError::Io(_) => LlmError::ConfigError("IO error (mock)".to_string()),
        LlmError::TomlParse(_) => LlmError::ConfigError("TOML parse error (mock)".to_string()),
        LlmError::TomlSerialize(_) => {
            LlmError::ConfigError("TOML serialize error (mock)".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ImageInput;

    #[tokio::test]
    async fn test_always_succeeds_records_request() {
        let provider = MockProvider::always_succeeds("ALT: x\nTITLE: y");
        let request =
            LlmRequest::new("tags").with_image(ImageInput::new(vec![0xFF, 0xD8], "image/jpeg"));

        let result = provider.complete(request).await.unwrap();
        assert_eq!(result.content, "ALT: x\nTITLE: y");
        assert_eq!(provider.call_count(), 1);

        let recorded = provider.last_request().unwrap();
        assert_eq!(recorded.prompt, "tags");
        assert_eq!(recorded.images[0].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_always_fails() {
        let provider = MockProvider::always_fails(LlmError::RateLimited { retry_after: None });

        for _ in 0..3 {
            let result = provider.complete(LlmRequest::new("test")).await;
            assert!(matches!(result, Err(LlmError::RateLimited { .. })));
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let provider = MockProvider::fails_then_succeeds(
            2,
            LlmError::ServerOverloaded {
                message: "overloaded".to_string(),
            },
            "success",
        );

        assert!(provider.complete(LlmRequest::new("a")).await.is_err());
        assert!(provider.complete(LlmRequest::new("b")).await.is_err());

        let result = provider.complete(LlmRequest::new("c")).await.unwrap();
        assert_eq!(result.content, "success");
        assert_eq!(provider.call_count(), 3);
    }
}
