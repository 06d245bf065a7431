//! Extraction of named fields from semi-structured model output.
//!
//! Two response shapes are supported:
//! - flat `LABEL: value` lines ([`Schema::labels`]), used for SEO tags
//! - two sections split by a delimiter line, each with a `label: value`
//!   prefix ([`Schema::sections`]), used for accessibility descriptions
//!
//! Parsing never fails. Fields that cannot be found are reported as absent,
//! and [`ParsedFields::require_all`] turns an incomplete result into
//! [`Error::ExtractionFailed`].

mod labels;
mod sections;

use regex::Regex;

use crate::error::{Error, Result};

/// Field names used by the built-in SEO schema.
pub const ALT: &str = "ALT";
pub const TITLE: &str = "TITLE";

/// Field names used by the built-in accessibility schema.
pub const SHORT_DESCRIPTION: &str = "short";
pub const LONG_DESCRIPTION: &str = "long";

/// Delimiter between short and long description.
pub const SECTION_DELIMITER: &str = "---";

/// A label matched at the start of a line, case-insensitively, followed by `:`.
#[derive(Debug, Clone)]
pub struct LabelPattern {
    name: String,
    pattern: Regex,
}

impl LabelPattern {
    fn new(name: &str) -> Self {
        let pattern = Regex::new(&format!("(?i)^{}:", regex::escape(name)))
            .expect("escaped label is a valid pattern");
        Self {
            name: name.to_string(),
            pattern,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The shape a model response is expected to have.
#[derive(Debug, Clone)]
pub enum Schema {
    /// One `LABEL: value` line per field
    Labels(Vec<LabelPattern>),
    /// Two parts split at the first `delimiter`; the value follows the first `:`
    Sections {
        delimiter: String,
        first: String,
        second: String,
    },
}

impl Schema {
    /// Flat label lines with the given labels.
    pub fn labels(labels: &[&str]) -> Self {
        Self::Labels(labels.iter().map(|l| LabelPattern::new(l)).collect())
    }

    /// Two delimited sections named `first` and `second`.
    pub fn sections(delimiter: &str, first: &str, second: &str) -> Self {
        Self::Sections {
            delimiter: delimiter.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// `ALT:` / `TITLE:` lines.
    pub fn seo() -> Self {
        Self::labels(&[ALT, TITLE])
    }

    /// Short and long description separated by `---`.
    pub fn accessibility() -> Self {
        Self::sections(SECTION_DELIMITER, SHORT_DESCRIPTION, LONG_DESCRIPTION)
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Labels(labels) => labels.iter().map(LabelPattern::name).collect(),
            Self::Sections { first, second, .. } => vec![first.as_str(), second.as_str()],
        }
    }
}

/// Extract the schema's fields from `text`.
pub fn parse(text: &str, schema: &Schema) -> ParsedFields {
    let values = match schema {
        Schema::Labels(labels) => labels::parse_label_lines(text, labels),
        Schema::Sections { delimiter, .. } => sections::parse_sections(text, delimiter).to_vec(),
    };

    ParsedFields {
        fields: schema
            .field_names()
            .into_iter()
            .map(str::to_string)
            .zip(values)
            .collect(),
    }
}

/// Result of parsing: every schema field with its value, if found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    fields: Vec<(String, Option<String>)>,
}

impl ParsedFields {
    /// Value of a field, looked up case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }

    /// Fields that are absent or empty.
    pub fn missing(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Whether every field has a non-empty value.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Accept the result only if every field has a non-empty value.
    ///
    /// `raw` is the model output the fields came from, kept in the error.
    pub fn require_all(self, raw: &str) -> Result<RequiredFields> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(Error::ExtractionFailed {
                missing,
                raw: raw.to_string(),
            });
        }

        Ok(RequiredFields {
            fields: self
                .fields
                .into_iter()
                .map(|(name, value)| (name, value.unwrap_or_default()))
                .collect(),
        })
    }
}

/// A complete set of field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    fields: Vec<(String, String)>,
}

impl RequiredFields {
    /// Move a value out by field name (case-insensitive). Unknown names yield
    /// an empty string.
    pub fn take(&mut self, name: &str) -> String {
        self.fields
            .iter_mut()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| std::mem::take(value))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seo_response() {
        let fields = parse("ALT: foo\nTITLE: bar", &Schema::seo());
        assert_eq!(fields.get("ALT"), Some("foo"));
        assert_eq!(fields.get("TITLE"), Some("bar"));
        assert!(fields.is_complete());
    }

    #[test]
    fn test_accessibility_response() {
        let text = "KURZBESCHREIBUNG (max. 140 Zeichen): short text\n---\nLANGBESCHREIBUNG: long text";
        let fields = parse(text, &Schema::accessibility());
        assert_eq!(fields.get(SHORT_DESCRIPTION), Some("short text"));
        assert_eq!(fields.get(LONG_DESCRIPTION), Some("long text"));
    }

    #[test]
    fn test_unrecognized_text_yields_absent_fields() {
        let text = "I'm sorry, I can't help with that image.";

        let seo = parse(text, &Schema::seo());
        assert_eq!(seo.get("ALT"), None);
        assert_eq!(seo.get("TITLE"), None);
        assert_eq!(seo.missing(), vec!["ALT", "TITLE"]);

        let accessibility = parse(text, &Schema::accessibility());
        assert_eq!(accessibility.get(SHORT_DESCRIPTION), None);
        assert_eq!(accessibility.get(LONG_DESCRIPTION), None);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let fields = parse("ALT: foo", &Schema::seo());
        assert_eq!(fields.get("alt"), Some("foo"));
    }

    #[test]
    fn test_require_all_rejects_partial_result() {
        let raw = "ALT: only the alt text";
        let result = parse(raw, &Schema::seo()).require_all(raw);
        match result {
            Err(Error::ExtractionFailed { missing, raw: kept }) => {
                assert_eq!(missing, vec!["TITLE"]);
                assert_eq!(kept, raw);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_require_all_rejects_empty_value() {
        let raw = "ALT:\nTITLE: a title";
        let result = parse(raw, &Schema::seo()).require_all(raw);
        assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    }

    #[test]
    fn test_require_all_take() {
        let raw = "title: Sunset\nalt: Orange sky over the sea";
        let mut fields = parse(raw, &Schema::seo()).require_all(raw).unwrap();
        assert_eq!(fields.take(ALT), "Orange sky over the sea");
        assert_eq!(fields.take(TITLE), "Sunset");
        assert_eq!(fields.take("unknown"), "");
    }

    #[test]
    fn test_field_names_keep_schema_order() {
        assert_eq!(Schema::seo().field_names(), vec!["ALT", "TITLE"]);
        assert_eq!(
            Schema::accessibility().field_names(),
            vec![SHORT_DESCRIPTION, LONG_DESCRIPTION]
        );
    }

    #[test]
    fn test_custom_label_schema() {
        let schema = Schema::labels(&["CAPTION", "KEYWORDS"]);
        let fields = parse("Keywords: sea, sky\nCaption: A beach", &schema);
        assert_eq!(fields.get("CAPTION"), Some("A beach"));
        assert_eq!(fields.get("KEYWORDS"), Some("sea, sky"));
    }
}
