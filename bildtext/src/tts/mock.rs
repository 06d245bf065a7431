//! Mock synthesizer for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use super::{SpeechSynthesizer, TtsOptions};

/// Returns `[text]` as audio and records every call.
pub struct MockSynthesizer {
    /// Zero-based call numbers that fail
    failing_calls: Vec<usize>,
    calls: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::failing_on(&[])
    }

    /// Fail the listed calls (zero-based), succeed otherwise.
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            failing_calls: calls.to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Texts received, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, _options: &TtsOptions) -> Result<Vec<u8>> {
        let call_num = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(text.to_string());
            calls.len() - 1
        };

        if self.failing_calls.contains(&call_num) {
            anyhow::bail!("mock failure on call {}", call_num);
        }

        Ok(format!("[{}]", text).into_bytes())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[async_trait]
impl SpeechSynthesizer for std::sync::Arc<MockSynthesizer> {
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<Vec<u8>> {
        self.as_ref().synthesize(text, options).await
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
