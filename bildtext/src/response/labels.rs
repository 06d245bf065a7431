//! Flat `LABEL: value` lines.

use super::LabelPattern;

/// Find each label's value in `text`, in label order.
///
/// A line matches when, after trimming, it starts with the label followed by
/// `:`. If a label appears on several lines the last one wins.
pub(super) fn parse_label_lines(text: &str, labels: &[LabelPattern]) -> Vec<Option<String>> {
    let mut values = vec![None; labels.len()];

    for line in text.lines().map(str::trim) {
        let matched = labels
            .iter()
            .enumerate()
            .find_map(|(i, label)| label.pattern.find(line).map(|m| (i, m.end())));

        if let Some((i, end)) = matched {
            values[i] = Some(line[end..].trim().to_string());
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(names: &[&str]) -> Vec<LabelPattern> {
        names.iter().map(|n| LabelPattern::new(n)).collect()
    }

    #[test]
    fn test_labels_in_any_order() {
        let values = parse_label_lines("TITLE: b\nALT: a", &patterns(&["ALT", "TITLE"]));
        assert_eq!(values, vec![Some("a".to_string()), Some("b".to_string())]);
    }

    #[test]
    fn test_case_and_whitespace_are_ignored() {
        let text = "   alt:   Ein Hund im Schnee  \n\tTitle:Winterspaziergang";
        let values = parse_label_lines(text, &patterns(&["ALT", "TITLE"]));
        assert_eq!(
            values,
            vec![
                Some("Ein Hund im Schnee".to_string()),
                Some("Winterspaziergang".to_string())
            ]
        );
    }

    #[test]
    fn test_last_match_wins() {
        let text = "ALT: first\nALT: second";
        let values = parse_label_lines(text, &patterns(&["ALT"]));
        assert_eq!(values, vec![Some("second".to_string())]);
    }

    #[test]
    fn test_value_may_contain_colons() {
        let text = "TITLE: Berlin: Brandenburger Tor um 12:00";
        let values = parse_label_lines(text, &patterns(&["TITLE"]));
        assert_eq!(
            values,
            vec![Some("Berlin: Brandenburger Tor um 12:00".to_string())]
        );
    }

    #[test]
    fn test_label_must_start_the_line() {
        let text = "The ALT: text is below\nALTERNATIVE: nope\nALT : spaced";
        let values = parse_label_lines(text, &patterns(&["ALT"]));
        assert_eq!(values, vec![None]);
    }

    #[test]
    fn test_empty_value_is_present_but_empty() {
        let values = parse_label_lines("ALT:", &patterns(&["ALT"]));
        assert_eq!(values, vec![Some(String::new())]);
    }

    #[test]
    fn test_markdown_decoration_is_not_a_label() {
        let values = parse_label_lines("**ALT:** text", &patterns(&["ALT"]));
        assert_eq!(values, vec![None]);
    }
}
