//! Text processing for speech synthesis: document extraction and chunking.

pub mod chunker;
pub mod extract;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, chunk_document, chunk_text};
pub use extract::read_document;

/// A chunk of text ready for speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of the chunk in the document
    pub index: usize,
    /// The text content
    pub text: String,
    /// Length of `text` in characters
    pub char_len: usize,
    /// Set when a single sentence could not be brought under the size limit
    pub oversized: bool,
}

impl TextChunk {
    /// Create a new text chunk, flagging it if it exceeds `max_chunk_size`.
    pub fn new(index: usize, text: String, max_chunk_size: usize) -> Self {
        let char_len = text.chars().count();
        Self {
            index,
            text,
            char_len,
            oversized: char_len > max_chunk_size,
        }
    }
}
