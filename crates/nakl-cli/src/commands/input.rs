//! Text extraction from OCR output files.
//!
//! Plain text and Markdown are read as-is. JSON output is searched for a
//! top-level `markdown` string or a `pages` array; HTML has its tags
//! stripped. Anything else is passed through unchanged.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, error, warn};

/// File extensions the batch command picks up.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["txt", "text", "md", "json", "html"];

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Separator between pages of multi-page JSON output.
const PAGE_SEPARATOR: &str = "\n\n";

/// Read a file and return the text to feed the parser.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    debug!("Reading {} as {:?}", path.display(), extension);
    Ok(text_from_content(&content, &extension))
}

/// Whether the batch command should pick up this file.
pub fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

pub fn text_from_content(content: &str, extension: &str) -> String {
    match extension {
        "txt" | "text" | "md" => content.to_string(),
        "json" => text_from_json(content),
        "html" => HTML_TAG.replace_all(content, "").into_owned(),
        other => {
            warn!("Unknown input format {:?}, using raw content", other);
            content.to_string()
        }
    }
}

fn text_from_json(content: &str) -> String {
    let data: Value = match serde_json::from_str(content) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to parse JSON OCR output: {}", e);
            return content.to_string();
        }
    };

    if let Some(fields) = data.as_object() {
        if let Some(Value::String(markdown)) = fields.get("markdown") {
            return markdown.clone();
        }

        if let Some(Value::Array(pages)) = fields.get("pages") {
            return pages
                .iter()
                .filter_map(page_text)
                .collect::<Vec<_>>()
                .join(PAGE_SEPARATOR);
        }
    }

    data.to_string()
}

fn page_text(page: &Value) -> Option<String> {
    match page {
        Value::Object(fields) => ["markdown", "text"]
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .map(str::to_string),
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markdown_and_text_are_read_as_is() {
        let content = "# ТОРГ-12\n\n| ИНН | 1234567890 |";
        assert_eq!(text_from_content(content, "md"), content);
        assert_eq!(text_from_content(content, "txt"), content);
    }

    #[test]
    fn test_json_top_level_markdown() {
        let content = r#"{"markdown": "Накладная № 5", "pages": [{"text": "другое"}]}"#;
        assert_eq!(text_from_content(content, "json"), "Накладная № 5");
    }

    #[test]
    fn test_json_pages_joined() {
        let content = r#"{"pages": [
            {"markdown": "Страница 1"},
            {"markdown": "", "text": "Страница 2"},
            {"other": 1},
            "Страница 4"
        ]}"#;
        assert_eq!(
            text_from_content(content, "json"),
            "Страница 1\n\nСтраница 2\n\nСтраница 4"
        );
    }

    #[test]
    fn test_json_without_known_fields_is_serialized() {
        let content = r#"{"blocks": ["Итого: 10,00"]}"#;
        assert_eq!(text_from_content(content, "json"), r#"{"blocks":["Итого: 10,00"]}"#);

        let content = r#"["a", "b"]"#;
        assert_eq!(text_from_content(content, "json"), r#"["a","b"]"#);
    }

    #[test]
    fn test_invalid_json_returns_raw_content() {
        let content = "{not json: ИНН 1234567890";
        assert_eq!(text_from_content(content, "json"), content);
    }

    #[test]
    fn test_html_tags_stripped() {
        let content = "<html><body><p>Поставщик: <b>ООО \"Альфа\"</b></p></body></html>";
        assert_eq!(text_from_content(content, "html"), "Поставщик: ООО \"Альфа\"");
    }

    #[test]
    fn test_unknown_extension_returns_raw_content() {
        assert_eq!(text_from_content("<b>raw</b>", "xml"), "<b>raw</b>");
    }

    #[test]
    fn test_read_text_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.JSON");
        fs::write(&path, r#"{"markdown": "Счет-фактура № 1"}"#).unwrap();

        assert_eq!(read_text(&path).unwrap(), "Счет-фактура № 1");
        assert!(is_supported(&path));
        assert!(!is_supported(Path::new("scan.pdf")));
        assert!(read_text(&dir.path().join("missing.md")).is_err());
    }
}
