//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NaklError, Result};

/// Main configuration for the waybill parser.
///
/// The value is read-only once a parser has been built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum number of lines scanned by generic section extraction.
    pub max_lines_section: usize,

    /// Size of the per-party INN/KPP search window, in lines.
    pub party_window_lines: usize,

    /// Lines inspected after a party label when the name is not on the label line.
    pub name_lookahead_lines: usize,

    /// Advisory confidence threshold (0.0 - 1.0). Not enforced by the parser.
    pub confidence_threshold: f64,

    /// Attach debug information to every record.
    pub debug_mode: bool,

    /// Field pattern lists.
    pub patterns: PatternConfig,

    /// Party label lists.
    pub labels: LabelConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_lines_section: 8,
            party_window_lines: 8,
            name_lookahead_lines: 2,
            confidence_threshold: 0.7,
            debug_mode: false,
            patterns: PatternConfig::default(),
            labels: LabelConfig::default(),
        }
    }
}

/// Ordered regular-expression lists, one per semantic field.
///
/// Order is priority: the first pattern that matches wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Document number.
    pub number: Vec<String>,

    /// Document date.
    pub date: Vec<String>,

    /// Total including VAT.
    pub total_with_vat: Vec<String>,

    /// VAT amount (generic fallback).
    pub vat: Vec<String>,

    /// Total excluding VAT.
    pub total_without_vat: Vec<String>,

    /// Taxpayer ID (ИНН), first group is the digits.
    pub inn: String,

    /// Registration reason code (КПП), first group is the digits.
    pub kpp: String,

    /// Detects a line carrying a VAT amount.
    pub vat_line: String,

    /// Captures the VAT amount from a qualifying line.
    pub vat_line_amount: String,

    /// Lines matching any of these are never treated as VAT lines.
    pub vat_exclusions: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            number: strings(&[
                r"(?:Товарная\s+накладная|Накладная|ТН)[^\n]{0,50}?(?:№|N|No)\s*([A-Za-zА-Яа-я0-9/\-]+)",
                r"(?:№|N|No)\s*([A-Za-zА-Яа-я0-9/\-]+)\s*(?:от|дата)",
            ]),
            date: strings(&[
                r"(?:от|дата)\s*([0-3]?\d[.\-/][01]?\d[.\-/]\d{2,4})",
                r"Дата[:\s]+([0-3]?\d[.\-/][01]?\d[.\-/]\d{2,4})",
            ]),
            total_with_vat: strings(&[
                r"(?:Всего\s*к\s*оплате|Итого\s*с\s*НДС|Всего\s*с\s*НДС)\s*[:\-]?\s*([0-9][0-9\s.,]*)",
            ]),
            vat: strings(&[
                r"(?:НДС\s*(?:\d+%)?|Налог\s*на\s*добавленную\s*стоимость)\s*[:\-]?\s*([0-9][0-9\s.,]*)",
            ]),
            total_without_vat: strings(&[
                r"(?:Сумма\s*без\s*НДС|Итого\s*без\s*НДС|Итого\s*(?:без\s*НДС)?)\s*[:\-]?\s*([0-9][0-9\s.,]*)",
            ]),
            inn: r"ИНН[:\s]*([0-9]{10,12})".to_string(),
            kpp: r"КПП[:\s]*([0-9]{9})".to_string(),
            vat_line: r"НДС\s*\d+%?".to_string(),
            vat_line_amount: r"НДС\s*\d+%?\s*[:\-]?\s*([0-9][0-9\s.,]*)".to_string(),
            vat_exclusions: strings(&[r"без\s*НДС", r"к\s*оплате", r"итого", r"всего"]),
        }
    }
}

/// Label lists used to locate party blocks in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Supplier (seller) labels.
    pub supplier: Vec<String>,

    /// Buyer (payer) labels.
    pub buyer: Vec<String>,

    /// Shipper labels.
    pub shipper: Vec<String>,

    /// Consignee labels.
    pub consignee: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            supplier: strings(&["Поставщик", "Продавец", "Грузоотправитель"]),
            buyer: strings(&["Покупатель", "Плательщик", "Грузополучатель"]),
            shipper: strings(&["Грузоотправитель"]),
            consignee: strings(&["Грузополучатель"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl ParserConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check numeric settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_lines_section == 0 {
            return Err(NaklError::Config("max_lines_section must be positive".into()));
        }
        if self.party_window_lines == 0 {
            return Err(NaklError::Config("party_window_lines must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(NaklError::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}
