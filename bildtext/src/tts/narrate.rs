//! Narration of whole documents: chunk, synthesize in order, concatenate.

use log::{debug, warn};

use super::{SpeechSynthesizer, TtsOptions};
use crate::error::{Error, Result};
use crate::text::chunk_document;

/// Default number of attempts per chunk.
const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Progress after each synthesized chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationProgress {
    pub completed: usize,
    pub total: usize,
}

/// Audio for a whole document.
#[derive(Debug, Clone)]
pub struct Narration {
    /// Encoded audio of all chunks, in document order
    pub audio: Vec<u8>,
    /// Number of chunks synthesized
    pub chunk_count: usize,
    /// Chunks longer than the size limit
    pub oversized_chunks: usize,
}

/// Turns documents into one audio stream, one synthesis call per chunk.
pub struct Narrator {
    synthesizer: Box<dyn SpeechSynthesizer>,
    options: TtsOptions,
    max_chunk_size: usize,
    max_attempts: u32,
}

impl Narrator {
    pub fn new(
        synthesizer: Box<dyn SpeechSynthesizer>,
        options: TtsOptions,
        max_chunk_size: usize,
    ) -> Self {
        Self {
            synthesizer,
            options,
            max_chunk_size,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set how often each chunk is attempted before giving up.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Synthesize `text` chunk by chunk and concatenate the audio.
    ///
    /// Chunks are sent sequentially in document order. The first chunk that
    /// still fails after `max_attempts` stops the narration; later chunks are
    /// not sent.
    pub async fn narrate(
        &self,
        text: &str,
        mut on_progress: impl FnMut(NarrationProgress),
    ) -> Result<Narration> {
        let chunks = chunk_document(text, self.max_chunk_size)?;
        if chunks.is_empty() {
            return Err(Error::EmptyText);
        }

        let total = chunks.len();
        let mut oversized_chunks = 0;
        let mut audio = Vec::new();

        for chunk in &chunks {
            if chunk.oversized {
                oversized_chunks += 1;
                warn!(
                    "Chunk {} has {} characters, over the limit of {}; the service may reject it",
                    chunk.index, chunk.char_len, self.max_chunk_size
                );
            }

            let bytes = self.synthesize_chunk(chunk.index, &chunk.text).await?;
            audio.extend_from_slice(&bytes);

            on_progress(NarrationProgress {
                completed: chunk.index + 1,
                total,
            });
        }

        Ok(Narration {
            audio,
            chunk_count: total,
            oversized_chunks,
        })
    }

    async fn synthesize_chunk(&self, index: usize, text: &str) -> Result<Vec<u8>> {
        debug!(
            "Synthesizing chunk {} ({} characters) with {}",
            index,
            text.chars().count(),
            self.synthesizer.name()
        );

        let bytes = self
            .synthesizer
            .synthesize_with_retry(text, &self.options, self.max_attempts)
            .await
            .map_err(|e| Error::Synthesis {
                chunk: index,
                message: format!("{:#}", e),
            })?;

        if bytes.is_empty() {
            return Err(Error::Synthesis {
                chunk: index,
                message: "no audio data returned".to_string(),
            });
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::mock::MockSynthesizer;
    use std::sync::Arc;

    fn narrator(mock: &Arc<MockSynthesizer>, max_chunk_size: usize) -> Narrator {
        Narrator::new(Box::new(mock.clone()), TtsOptions::default(), max_chunk_size)
            .with_max_attempts(1)
    }

    #[tokio::test]
    async fn test_chunks_are_synthesized_in_order() {
        let mock = Arc::new(MockSynthesizer::new());
        let narrator = narrator(&mock, 12);

        let narration = narrator
            .narrate("Erster Teil.\nZweiter Teil.\nDritter.", |_| {})
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec!["Erster Teil.", "Zweiter Teil.", "Dritter."]
        );
        assert_eq!(narration.audio, b"[Erster Teil.][Zweiter Teil.][Dritter.]");
        assert_eq!(narration.chunk_count, 3);
        assert_eq!(narration.oversized_chunks, 1);
    }

    #[tokio::test]
    async fn test_progress_is_reported_per_chunk() {
        let mock = Arc::new(MockSynthesizer::new());
        let narrator = narrator(&mock, 5);

        let mut progress = Vec::new();
        narrator
            .narrate("Eins.\nZwei.", |p| progress.push(p))
            .await
            .unwrap();

        assert_eq!(
            progress,
            vec![
                NarrationProgress {
                    completed: 1,
                    total: 2
                },
                NarrationProgress {
                    completed: 2,
                    total: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let mock = Arc::new(MockSynthesizer::new());
        let narrator = narrator(&mock, 100);

        let result = narrator.narrate("  \n ", |_| {}).await;
        assert!(matches!(result, Err(Error::EmptyText)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_rejected() {
        let mock = Arc::new(MockSynthesizer::new());
        let narrator = narrator(&mock, 0);

        let result = narrator.narrate("Text.", |_| {}).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_failure_names_the_chunk_and_stops() {
        // Second call fails; nothing after it is sent
        let mock = Arc::new(MockSynthesizer::failing_on(&[1]));
        let narrator = narrator(&mock, 5);

        let result = narrator.narrate("Eins.\nZwei.\nDrei.", |_| {}).await;
        match result {
            Err(Error::Synthesis { chunk, .. }) => assert_eq!(chunk, 1),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(mock.calls(), vec!["Eins.", "Zwei."]);
    }

    #[tokio::test]
    async fn test_failed_chunk_is_retried() {
        let mock = Arc::new(MockSynthesizer::failing_on(&[1]));
        let narrator = Narrator::new(Box::new(mock.clone()), TtsOptions::default(), 5);

        let narration = narrator.narrate("Eins.\nZwei.\nDrei.", |_| {}).await.unwrap();
        assert_eq!(narration.audio, b"[Eins.][Zwei.][Drei.]");
        assert_eq!(mock.calls(), vec!["Eins.", "Zwei.", "Zwei.", "Drei."]);
    }
}
