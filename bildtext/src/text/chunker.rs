//! Text chunking for speech synthesis.
//!
//! Speech APIs cap the number of characters per request, so documents are cut
//! into ordered chunks no longer than `max_chunk_size` characters. Paragraphs
//! are packed together while they fit; a paragraph that is too long on its own
//! is packed sentence by sentence instead. A single sentence longer than the
//! limit is emitted whole and flagged as oversized.

use super::TextChunk;
use crate::error::{Error, Result};

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2500;

/// Separator reinserted between packed paragraphs.
const PARAGRAPH_SEPARATOR: char = '\n';

/// Separator reinserted between packed sentences.
const SENTENCE_SEPARATOR: char = ' ';

/// Split text into chunks of at most `max_chunk_size` characters.
///
/// Returns an empty list for empty or whitespace-only text. Fails with
/// [`Error::InvalidArgument`] when `max_chunk_size` is zero.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Result<Vec<String>> {
    Ok(chunk_document(text, max_chunk_size)?
        .into_iter()
        .map(|chunk| chunk.text)
        .collect())
}

/// Split text into indexed chunks, flagging those that exceed the limit.
pub fn chunk_document(text: &str, max_chunk_size: usize) -> Result<Vec<TextChunk>> {
    if max_chunk_size == 0 {
        return Err(Error::InvalidArgument(
            "max_chunk_size must be greater than zero".to_string(),
        ));
    }

    Ok(pack_paragraphs(text, max_chunk_size)
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .enumerate()
        .map(|(index, text)| TextChunk::new(index, text, max_chunk_size))
        .collect())
}

/// Accumulates pieces into chunks under a size limit.
struct Accumulator {
    max: usize,
    current: String,
    current_len: usize,
    chunks: Vec<String>,
}

impl Accumulator {
    fn new(max: usize) -> Self {
        Self {
            max,
            current: String::new(),
            current_len: 0,
            chunks: Vec::new(),
        }
    }

    /// Append `piece`, flushing first if it would push the chunk over the limit.
    fn push(&mut self, piece: &str, separator: char) {
        let piece_len = piece.chars().count();

        if self.current.is_empty() {
            self.current.push_str(piece);
            self.current_len = piece_len;
        } else if self.current_len + 1 + piece_len <= self.max {
            self.current.push(separator);
            self.current.push_str(piece);
            self.current_len += 1 + piece_len;
        } else {
            self.flush();
            self.current.push_str(piece);
            self.current_len = piece_len;
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
        }
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

fn pack_paragraphs(text: &str, max: usize) -> Vec<String> {
    let mut acc = Accumulator::new(max);

    for paragraph in text.lines().map(str::trim).filter(|p| !p.is_empty()) {
        if paragraph.chars().count() > max {
            // Oversized paragraph: start a fresh chunk and pack its sentences
            acc.flush();
            for sentence in split_sentences(paragraph) {
                acc.push(sentence, SENTENCE_SEPARATOR);
            }
        } else {
            acc.push(paragraph, PARAGRAPH_SEPARATOR);
        }
    }

    acc.finish()
}

/// Split a paragraph into sentences.
///
/// A period ends a sentence only when it is followed by whitespace or the end
/// of the paragraph, so a token such as "3.14" is never cut. Each sentence
/// keeps its period.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '.' {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            let end = i + c.len_utf8();
            let sentence = paragraph[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let rest = paragraph[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}
