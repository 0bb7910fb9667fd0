//! Whitespace cleanup for OCR text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t]+").unwrap();
}

/// Normalize raw OCR text.
///
/// Non-breaking (U+00A0) and narrow no-break (U+202F) spaces become plain
/// spaces, runs of spaces/tabs collapse to one, and the result is trimmed.
/// Line breaks are preserved.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let replaced = text.replace(['\u{00a0}', '\u{202f}'], " ");
    HORIZONTAL_SPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Split text into individually normalized lines.
///
/// Blank lines are kept as empty strings so line indices stay stable.
pub fn normalized_lines(text: &str) -> Vec<String> {
    text.lines().map(normalize_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_spaces() {
        assert_eq!(normalize_text("  100\u{00a0}000,00\t\tруб.  "), "100 000,00 руб.");
        assert_eq!(normalize_text("1\u{202f}234"), "1 234");
    }

    #[test]
    fn test_normalize_keeps_newlines() {
        assert_eq!(
            normalize_text("\n   Поставщик:   ООО \"Альфа\"\n    ИНН: 1234567890\n"),
            "Поставщик: ООО \"Альфа\"\n ИНН: 1234567890"
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \t "), "");
    }

    #[test]
    fn test_normalized_lines() {
        let lines = normalized_lines("  a  b \n\n\tc");
        assert_eq!(lines, vec!["a b", "", "c"]);
    }
}
