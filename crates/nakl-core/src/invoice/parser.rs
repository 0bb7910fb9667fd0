//! Waybill parser composing the rule-based extractors.

use std::panic::{self, AssertUnwindSafe};

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::error::{ExtractionError, Result};
use crate::models::config::ParserConfig;
use crate::models::record::*;

use super::rules::{
    amounts::AmountExtractor,
    classify::classify_document,
    confidence::{confidence_score, ScoreInput},
    dates::normalize_date,
    normalize::{normalize_text, normalized_lines},
    patterns::{LabelSet, PatternSet},
    sections::{self, party_name, party_window, TaxIdPatterns},
};
use super::WaybillExtractor;

/// Pattern families reported in debug output.
const PATTERN_FAMILIES: [&str; 7] = [
    "number",
    "date",
    "total_with_vat",
    "vat",
    "total_without_vat",
    "inn",
    "kpp",
];

/// Rule-based waybill parser.
///
/// Holds only compiled, read-only configuration, so one instance can serve
/// concurrent `parse` calls.
#[derive(Debug, Clone)]
pub struct WaybillParser {
    config: ParserConfig,
    number: PatternSet,
    date: PatternSet,
    amounts: AmountExtractor,
    tax_ids: TaxIdPatterns,
    supplier: LabelSet,
    buyer: LabelSet,
    shipper: LabelSet,
    consignee: LabelSet,
}

impl WaybillParser {
    /// Build a parser, compiling every configured pattern.
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;

        let patterns = &config.patterns;
        let labels = &config.labels;

        Ok(Self {
            number: PatternSet::compile("number", &patterns.number)?,
            date: PatternSet::compile("date", &patterns.date)?,
            amounts: AmountExtractor::from_config(patterns)?,
            tax_ids: TaxIdPatterns::from_config(patterns)?,
            supplier: LabelSet::compile("supplier", &labels.supplier)?,
            buyer: LabelSet::compile("buyer", &labels.buyer)?,
            shipper: LabelSet::compile("shipper", &labels.shipper)?,
            consignee: LabelSet::compile("consignee", &labels.consignee)?,
            config,
        })
    }

    /// Configuration the parser was built from.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Whether a record reaches the configured advisory threshold.
    pub fn is_confident(&self, record: &ExtractionRecord) -> bool {
        record.meets_threshold(self.config.confidence_threshold)
    }

    /// Text of the section introduced by `start_labels`, up to a
    /// `next_labels` line or `max_lines` lines (config default when `None`).
    pub fn extract_section(
        &self,
        text: &str,
        start_labels: &[String],
        next_labels: &[String],
        max_lines: Option<usize>,
    ) -> Result<String> {
        let start = LabelSet::compile("section_start", start_labels)?;
        let next = LabelSet::compile("section_next", next_labels)?;
        let max_lines = max_lines
            .filter(|&n| n > 0)
            .unwrap_or(self.config.max_lines_section);

        Ok(sections::extract_section(
            &normalized_lines(text),
            &start,
            &next,
            max_lines,
        ))
    }

    /// INN/KPP near the first line matching `near_labels`, or anywhere in the
    /// text when no such line exists.
    pub fn tax_ids_near(
        &self,
        text: &str,
        near_labels: &[String],
    ) -> Result<(Option<String>, Option<String>)> {
        let near = LabelSet::compile("near", near_labels)?;
        Ok(self
            .tax_ids
            .find_near(&normalized_lines(text), &near, self.config.party_window_lines))
    }

    fn extract_party(&self, lines: &[String], own: &LabelSet, other: &LabelSet) -> Party {
        let name = party_name(lines, own, self.config.name_lookahead_lines);

        let (inn, kpp) = party_window(lines, own, other, self.config.party_window_lines)
            .map(|window| {
                debug!("Party window lines {}..{}", window.start, window.end);
                self.tax_ids.find_in(lines, window)
            })
            .unwrap_or_default();

        Party { name, inn, kpp }
    }

    fn extract(&self, text: &str, hints: &[FieldHint]) -> ExtractionRecord {
        let normalized = normalize_text(text);
        let lines = normalized_lines(text);

        info!("Parsing waybill from {} characters of text", text.chars().count());

        let number = self.number.find_first(&normalized);
        let original_date = self.date.find_first(&normalized);
        let date = normalize_date(original_date.as_deref());
        debug!("Number {:?}, date {:?} (raw {:?})", number, date, original_date);

        let supplier = self.extract_party(&lines, &self.supplier, &self.buyer);
        let buyer = self.extract_party(&lines, &self.buyer, &self.supplier);
        debug!("Supplier {:?}, buyer {:?}", supplier, buyer);

        let shipper = party_name(&lines, &self.shipper, self.config.name_lookahead_lines);
        let consignee = party_name(&lines, &self.consignee, self.config.name_lookahead_lines);

        let extracted = self.amounts.extract(&normalized);
        let amounts = extracted.amounts;

        let confidence = confidence_score(ScoreInput {
            number: number.as_deref(),
            date: date.as_deref(),
            supplier: &supplier,
            buyer: &buyer,
            amounts: &amounts,
        });

        let debug_info = (self.config.debug_mode || !hints.is_empty()).then(|| DebugInfo {
            text_length: text.chars().count(),
            lines_count: text.lines().count(),
            first_100_chars: text.chars().take(100).collect(),
            extraction_patterns_used: PATTERN_FAMILIES.iter().map(|s| s.to_string()).collect(),
            warnings: extracted.warnings,
            field_hints: (!hints.is_empty()).then(|| HintSummary::from_hints(hints)),
        });

        info!("Parsing finished, confidence {:.2}", confidence);

        ExtractionRecord {
            document_type: classify_document(&normalized),
            number,
            date,
            original_date,
            supplier,
            buyer,
            shipper,
            consignee,
            amounts,
            confidence_score: confidence,
            extraction_timestamp: Local::now(),
            error: None,
            debug_info,
        }
    }
}

impl Default for WaybillParser {
    fn default() -> Self {
        // Built-in patterns are constants known to compile.
        Self::new(ParserConfig::default()).expect("default patterns compile")
    }
}

impl WaybillExtractor for WaybillParser {
    fn parse_with_hints(&self, text: &str, hints: &[FieldHint]) -> ExtractionRecord {
        if text.is_empty() {
            warn!("Empty input text");
            return ExtractionRecord::empty(ExtractionError::EmptyInput.to_string());
        }

        run_guarded(|| self.extract(text, hints))
    }
}

/// Run an extraction, turning a panic into an empty record with `error` set.
fn run_guarded<F: FnOnce() -> ExtractionRecord>(extract: F) -> ExtractionRecord {
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(record) => record,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let err = ExtractionError::Internal(message);
            error!("Waybill parsing failed: {}", err);
            ExtractionRecord::empty(format!("parse failure: {err}"))
        }
    }
}
