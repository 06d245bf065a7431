//! Image tagging and description through a vision model.

use llm_client::{Config, ImageInput, LlmProvider, LlmRequest, get_provider};
use log::{debug, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::{ContentCache, ContentKey};
use crate::error::Result;
use crate::prompts;
use crate::response::{self, LONG_DESCRIPTION, SHORT_DESCRIPTION, Schema};

/// Timeout for SEO tag requests.
const SEO_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for accessibility description requests.
const ACCESSIBILITY_TIMEOUT: Duration = Duration::from_secs(180);

/// SEO attributes for an `<img>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoTags {
    pub alt: String,
    pub title: String,
}

/// Short alternative text plus an extended description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessibilityDescription {
    pub short: String,
    pub long: String,
}

/// Sends images to a vision model and parses the answers.
///
/// Results are cached by image content and prompt, so re-submitting the same
/// image does not cost another request or another rate-limit pause.
pub struct ImageDescriber {
    provider: Box<dyn LlmProvider>,
    model: String,
    request_delay: Duration,
    requests_sent: AtomicUsize,
    seo_cache: ContentCache<SeoTags>,
    accessibility_cache: ContentCache<AccessibilityDescription>,
}

impl ImageDescriber {
    /// Create a describer around an existing provider.
    pub fn new(provider: Box<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            request_delay: Duration::ZERO,
            requests_sent: AtomicUsize::new(0),
            seo_cache: ContentCache::new(),
            accessibility_cache: ContentCache::new(),
        }
    }

    /// Create a describer from the LLM configuration.
    ///
    /// If `preset_name` is None, uses the default preset for bildtext.
    pub fn from_config(preset_name: Option<&str>) -> Result<Self> {
        let config = Config::load()?;

        let choice = config.choose_preset("bildtext", preset_name)?;
        if let Some(replaced) = &choice.replaced {
            warn!(
                "Default preset '{}' cannot be used for images, using '{}'",
                replaced, choice.name
            );
        }

        let preset = choice.preset;
        let provider = get_provider(&preset, config.get_provider_config(&preset.provider))?;

        debug!(
            "Using LLM provider: {} (model: {})",
            provider.name(),
            preset.model
        );

        Ok(Self::new(provider, preset.model))
    }

    /// Pause between uncached requests, to stay under provider rate limits.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Generate `alt` and `title` attributes for an image.
    pub async fn seo_tags(&self, image: &ImageInput) -> Result<SeoTags> {
        let key = self.cache_key("seo", image, prompts::SEO_PROMPT);
        if let Some(tags) = self.seo_cache.get(&key) {
            debug!("SEO tags served from cache ({})", &key.as_str()[..12]);
            return Ok(tags);
        }

        let raw = self
            .ask(prompts::SEO_PROMPT.to_string(), image, SEO_TIMEOUT)
            .await?;
        let mut fields = response::parse(&raw, &Schema::seo())
            .require_all(&raw)
            .inspect_err(|_| warn!("Could not extract SEO tags. Raw response: {}", raw))?;

        let tags = SeoTags {
            alt: fields.take(response::ALT),
            title: fields.take(response::TITLE),
        };
        self.seo_cache.insert(key, tags.clone());
        Ok(tags)
    }

    /// Generate a short and a long accessibility description for an image.
    pub async fn accessibility_description(
        &self,
        image: &ImageInput,
        book_context: Option<&str>,
    ) -> Result<AccessibilityDescription> {
        let prompt = prompts::accessibility_prompt(book_context);
        let key = self.cache_key("accessibility", image, &prompt);
        if let Some(description) = self.accessibility_cache.get(&key) {
            debug!("Description served from cache ({})", &key.as_str()[..12]);
            return Ok(description);
        }

        let raw = self.ask(prompt, image, ACCESSIBILITY_TIMEOUT).await?;
        let mut fields = response::parse(&raw, &Schema::accessibility())
            .require_all(&raw)
            .inspect_err(|_| warn!("Could not extract descriptions. Raw response: {}", raw))?;

        let description = AccessibilityDescription {
            short: fields.take(SHORT_DESCRIPTION),
            long: fields.take(LONG_DESCRIPTION),
        };
        self.accessibility_cache.insert(key, description.clone());
        Ok(description)
    }

    fn cache_key(&self, kind: &str, image: &ImageInput, prompt: &str) -> ContentKey {
        ContentKey::builder(kind)
            .bytes(&image.data)
            .param(&image.mime_type)
            .param(&self.model)
            .param(prompt)
            .finish()
    }

    async fn ask(&self, prompt: String, image: &ImageInput, timeout: Duration) -> Result<String> {
        if self.requests_sent.fetch_add(1, Ordering::SeqCst) > 0 && !self.request_delay.is_zero() {
            debug!("Waiting {:?} before next request", self.request_delay);
            tokio::time::sleep(self.request_delay).await;
        }

        let request = LlmRequest::new(prompt)
            .with_image(image.clone())
            .with_timeout(timeout);

        debug!("Sending request to {}", self.provider.name());
        let response = self.provider.complete(request).await.inspect_err(|e| {
            if e.is_transient() {
                warn!(
                    "{} is throttling requests; consider a longer request delay",
                    self.provider.name()
                );
            }
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                "Tokens: {} in, {} out",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use llm_client::{LlmError, MockProvider};
    use std::sync::Arc;

    /// Lets a test keep a handle on the mock after boxing it.
    struct Shared(Arc<MockProvider>);

    #[async_trait::async_trait]
    impl LlmProvider for Shared {
        async fn complete(&self, request: LlmRequest) -> llm_client::Result<llm_client::LlmResponse> {
            self.0.complete(request).await
        }

        fn name(&self) -> &'static str {
            self.0.name()
        }
    }

    fn describer(response: &str) -> (ImageDescriber, Arc<MockProvider>) {
        let mock = Arc::new(MockProvider::always_succeeds(response));
        let describer = ImageDescriber::new(Box::new(Shared(mock.clone())), "mock-model");
        (describer, mock)
    }

    fn png(seed: u8) -> ImageInput {
        ImageInput::new(vec![0x89, 0x50, 0x4E, 0x47, seed], "image/png")
    }

    #[tokio::test]
    async fn test_seo_tags() {
        let (describer, mock) = describer("ALT: Ein roter Apfel\nTITLE: Apfel auf Holztisch\n");

        let tags = describer.seo_tags(&png(1)).await.unwrap();
        assert_eq!(
            tags,
            SeoTags {
                alt: "Ein roter Apfel".to_string(),
                title: "Apfel auf Holztisch".to_string(),
            }
        );

        let request = mock.last_request().unwrap();
        assert_eq!(request.prompt, prompts::SEO_PROMPT);
        assert_eq!(request.images, vec![png(1)]);
        assert_eq!(request.timeout, Some(SEO_TIMEOUT));
    }

    #[tokio::test]
    async fn test_seo_tags_are_cached_by_content() {
        let (describer, mock) = describer("ALT: a\nTITLE: b");

        describer.seo_tags(&png(1)).await.unwrap();
        describer.seo_tags(&png(1)).await.unwrap();
        assert_eq!(mock.call_count(), 1);

        describer.seo_tags(&png(2)).await.unwrap();
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_incomplete_seo_response_fails() {
        let (describer, _) = describer("ALT: only alt");

        match describer.seo_tags(&png(1)).await {
            Err(Error::ExtractionFailed { missing, .. }) => assert_eq!(missing, vec!["TITLE"]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_extraction_is_not_cached() {
        let (describer, mock) = describer("no labels at all");

        assert!(describer.seo_tags(&png(1)).await.is_err());
        assert!(describer.seo_tags(&png(1)).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_accessibility_description() {
        let (describer, mock) = describer(
            "KURZBESCHREIBUNG (max. 140 Zeichen): Balkendiagramm der Ernte\n---\nLANGBESCHREIBUNG: Fünf Balken zeigen die Ernte von 2019 bis 2023.",
        );

        let description = describer
            .accessibility_description(&png(1), Some("Sachbuch über Landwirtschaft"))
            .await
            .unwrap();
        assert_eq!(description.short, "Balkendiagramm der Ernte");
        assert_eq!(
            description.long,
            "Fünf Balken zeigen die Ernte von 2019 bis 2023."
        );

        let request = mock.last_request().unwrap();
        assert!(request.prompt.contains("Sachbuch über Landwirtschaft"));
        assert_eq!(request.timeout, Some(ACCESSIBILITY_TIMEOUT));
    }

    #[tokio::test]
    async fn test_context_is_part_of_cache_key() {
        let (describer, mock) = describer("KURZ: a\n---\nLANG: b");

        describer
            .accessibility_description(&png(1), Some("Roman"))
            .await
            .unwrap();
        describer
            .accessibility_description(&png(1), Some("Kochbuch"))
            .await
            .unwrap();
        describer
            .accessibility_description(&png(1), Some("Roman"))
            .await
            .unwrap();
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_is_propagated() {
        let provider = MockProvider::always_fails(LlmError::RateLimited {
            retry_after: Some(60),
        });
        let describer = ImageDescriber::new(Box::new(provider), "mock-model");

        let result = describer.seo_tags(&png(1)).await;
        assert!(matches!(
            result,
            Err(Error::Llm(LlmError::RateLimited { .. }))
        ));
    }

    #[tokio::test]
    async fn test_image_is_retried_after_overload() {
        let mock = Arc::new(MockProvider::fails_then_succeeds(
            1,
            LlmError::ServerOverloaded {
                message: "model is overloaded".to_string(),
            },
            "ALT: Leuchtturm\nTITLE: Leuchtturm bei Nacht",
        ));
        let describer = ImageDescriber::new(Box::new(Shared(mock.clone())), "mock-model");

        assert!(matches!(
            describer.seo_tags(&png(1)).await,
            Err(Error::Llm(LlmError::ServerOverloaded { .. }))
        ));

        let tags = describer.seo_tags(&png(1)).await.unwrap();
        assert_eq!(tags.alt, "Leuchtturm");
        assert_eq!(mock.call_count(), 2);
    }
}
