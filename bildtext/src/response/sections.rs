//! Two-part responses split by a delimiter line.

/// Split `text` at the first `delimiter` and take the value after the first
/// `:` in each part.
///
/// Without a delimiter only the first value can be present. A part that is
/// empty or has no `:` yields no value.
pub(super) fn parse_sections(text: &str, delimiter: &str) -> [Option<String>; 2] {
    let text = text.trim();
    let (first, second) = match text.split_once(delimiter) {
        Some((first, second)) => (first, Some(second)),
        None => (text, None),
    };

    [value_after_label(first), second.and_then(value_after_label)]
}

fn value_after_label(part: &str) -> Option<String> {
    part.split_once(':')
        .map(|(_, value)| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_two_sections() {
        let text = "KURZBESCHREIBUNG (max. 140 Zeichen): short text\n---\nLANGBESCHREIBUNG: long text";
        assert_eq!(
            parse_sections(text, "---"),
            [some("short text"), some("long text")]
        );
    }

    #[test]
    fn test_missing_delimiter() {
        let text = "KURZBESCHREIBUNG: only short";
        assert_eq!(parse_sections(text, "---"), [some("only short"), None]);
    }

    #[test]
    fn test_section_without_colon() {
        let text = "no label here\n---\nLANGBESCHREIBUNG: long";
        assert_eq!(parse_sections(text, "---"), [None, some("long")]);
    }

    #[test]
    fn test_splits_at_first_delimiter_only() {
        let text = "KURZ: a\n---\nLANG: b\n---\nmore: c";
        assert_eq!(
            parse_sections(text, "---"),
            [some("a"), some("b\n---\nmore: c")]
        );
    }

    #[test]
    fn test_first_colon_separates_label() {
        let text = "KURZ: Uhr zeigt 12:30\n---\nLANG: Ziffernblatt: weiß";
        assert_eq!(
            parse_sections(text, "---"),
            [some("Uhr zeigt 12:30"), some("Ziffernblatt: weiß")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_sections("", "---"), [None, None]);
        assert_eq!(parse_sections("---", "---"), [None, None]);
    }
}
