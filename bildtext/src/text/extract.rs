//! Plain-text extraction from uploaded documents.

use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Document formats text can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Docx,
}

impl DocumentKind {
    /// Determine the document kind from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" | "text" => Ok(Self::PlainText),
            "docx" => Ok(Self::Docx),
            _ => Err(Error::UnsupportedDocument(path.display().to_string())),
        }
    }
}

/// Read the full text of a document, one paragraph per line.
pub fn read_document(path: &Path) -> Result<String> {
    match DocumentKind::from_path(path)? {
        DocumentKind::PlainText => Ok(std::fs::read_to_string(path)?),
        DocumentKind::Docx => docx_text(&std::fs::read(path)?),
    }
}

fn paragraph_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*)?>(.*?)</w:p>").expect("valid regex")
    })
}

/// Text runs and the inline elements that stand for whitespace.
///
/// The self-closing `<w:t/>` alternative comes first so an empty run never
/// opens a match that runs on to the next `</w:t>`.
fn run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*)?>(?P<text>.*?)</w:t>|<w:(?P<space>tab|br|cr)(?:\s[^>]*)?/>",
        )
        .expect("valid regex")
    })
}

fn paragraph_text(body: &str) -> String {
    run_regex()
        .captures_iter(body)
        .map(|run| {
            if let Some(text) = run.name("text") {
                return unescape_xml(text.as_str());
            }
            match run.name("space").map(|m| m.as_str()) {
                Some("tab") => "\t".to_string(),
                Some(_) => "\n".to_string(),
                None => String::new(),
            }
        })
        .collect()
}

/// Extract paragraph text from the bytes of a `.docx` file.
///
/// Reads `word/document.xml` from the archive and joins paragraphs with `\n`.
/// Manual line breaks inside a paragraph become `\n` as well.
pub fn docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;

    let paragraphs: Vec<String> = paragraph_regex()
        .captures_iter(&xml)
        .map(|para| para.get(1).map(|body| paragraph_text(body.as_str())).unwrap_or_default())
        .collect();

    Ok(paragraphs.join("\n"))
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
