//! Extraction record returned by the waybill parser.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured result of one `parse` call.
///
/// Every key is always present when serialized; unknown values are `null`.
/// Only `error` and `debug_info` are omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Document category.
    pub document_type: DocumentType,

    /// Document number.
    pub number: Option<String>,

    /// Date in `DD.MM.YYYY` form, or the raw string if it could not be parsed.
    pub date: Option<String>,

    /// Date exactly as matched in the text.
    pub original_date: Option<String>,

    /// Supplier (seller).
    pub supplier: Party,

    /// Buyer (payer).
    pub buyer: Party,

    /// Shipper name.
    pub shipper: Option<String>,

    /// Consignee name.
    pub consignee: Option<String>,

    /// Monetary totals.
    pub amounts: AmountSet,

    /// Field coverage score in [0, 1].
    ///
    /// This is a weighted count of populated fields, not a statistical
    /// probability that the values are correct.
    pub confidence_score: f64,

    /// When the record was produced.
    pub extraction_timestamp: DateTime<Local>,

    /// Reason the record is empty, if extraction did not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Diagnostics, present in debug mode or when field hints were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl ExtractionRecord {
    /// All-null record tagged with a reason.
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            document_type: DocumentType::Unknown,
            number: None,
            date: None,
            original_date: None,
            supplier: Party::default(),
            buyer: Party::default(),
            shipper: None,
            consignee: None,
            amounts: AmountSet::default(),
            confidence_score: 0.0,
            extraction_timestamp: Local::now(),
            error: Some(reason.into()),
            debug_info: None,
        }
    }

    /// Whether the coverage score reaches the given advisory threshold.
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.error.is_none() && self.confidence_score >= threshold
    }
}

/// Document category, serialized as its Russian label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// Goods transfer invoice, form ТОРГ-12.
    #[serde(rename = "Товарная накладная (ТОРГ-12)")]
    Torg12,
    /// Any other waybill.
    #[serde(rename = "Накладная")]
    Waybill,
    /// Tax invoice.
    #[serde(rename = "Счет-фактура")]
    TaxInvoice,
    /// Act of completed work.
    #[serde(rename = "Акт")]
    Act,
    /// Text was parsed but no category keyword was found.
    #[serde(rename = "Неопределенный документ")]
    Undetermined,
    /// Extraction did not run (empty input or internal fault).
    #[serde(rename = "Неопределенный")]
    Unknown,
}

impl DocumentType {
    /// Russian label as it appears in serialized records.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Torg12 => "Товарная накладная (ТОРГ-12)",
            Self::Waybill => "Накладная",
            Self::TaxInvoice => "Счет-фактура",
            Self::Act => "Акт",
            Self::Undetermined => "Неопределенный документ",
            Self::Unknown => "Неопределенный",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A counterparty identified by a label block.
///
/// Digit validity of the IDs comes from the matching pattern; checksums are
/// not verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Name as written after the label.
    pub name: Option<String>,

    /// Taxpayer ID (ИНН), 10 or 12 digits.
    #[serde(rename = "INN")]
    pub inn: Option<String>,

    /// Registration reason code (КПП), 9 digits.
    #[serde(rename = "KPP")]
    pub kpp: Option<String>,
}

impl Party {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.inn.is_none() && self.kpp.is_none()
    }
}

/// The three related totals.
///
/// When all three are present they satisfy
/// `total_without_vat + vat == total_with_vat` unless the source text itself
/// was inconsistent (see [`crate::invoice::rules::amounts::reconcile`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmountSet {
    pub total_without_vat: Option<Decimal>,
    pub vat: Option<Decimal>,
    pub total_with_vat: Option<Decimal>,
    /// Raw matched substrings.
    #[serde(default)]
    pub original_strings: OriginalStrings,
}

/// Raw amount strings, kept for provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalStrings {
    pub total_without_vat: Option<String>,
    pub vat: Option<String>,
    pub total_with_vat: Option<String>,
}

/// Diagnostics attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    /// Input length in characters.
    pub text_length: usize,
    /// Number of input lines.
    pub lines_count: usize,
    /// First 100 characters of the input.
    pub first_100_chars: String,
    /// Pattern families consulted.
    pub extraction_patterns_used: Vec<String>,
    /// Extraction notes.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Summary of detector hints, if any were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_hints: Option<HintSummary>,
}

/// A field region reported by an external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldHint {
    /// Detector class, e.g. `recipient` or `order-date`.
    pub class_name: String,
    /// Detector score (0.0 - 1.0).
    pub confidence: f32,
    /// Text recognised inside the region, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Score above which a hint counts as high confidence.
pub const HIGH_CONFIDENCE_HINT: f32 = 0.8;

/// Aggregate view of the supplied field hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HintSummary {
    pub total_fields: usize,
    pub fields_by_type: BTreeMap<String, HintTypeStats>,
    /// Mean detector score over all hints; 0.0 when there are none.
    pub average_confidence: f32,
    pub high_confidence_fields: usize,
    pub detected_types: Vec<String>,
}

/// Per-class hint statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HintTypeStats {
    pub count: usize,
    pub avg_confidence: f32,
    pub max_confidence: f32,
}

impl HintSummary {
    /// Summarize detector hints.
    pub fn from_hints(hints: &[FieldHint]) -> Self {
        let mut fields_by_type: BTreeMap<String, HintTypeStats> = BTreeMap::new();
        let mut sums: BTreeMap<&str, f32> = BTreeMap::new();

        for hint in hints {
            let stats = fields_by_type.entry(hint.class_name.clone()).or_default();
            stats.count += 1;
            stats.max_confidence = stats.max_confidence.max(hint.confidence);
            *sums.entry(hint.class_name.as_str()).or_default() += hint.confidence;
        }

        for (class, stats) in fields_by_type.iter_mut() {
            let sum = sums.get(class.as_str()).copied().unwrap_or_default();
            stats.avg_confidence = sum / stats.count as f32;
        }

        let average_confidence = if hints.is_empty() {
            0.0
        } else {
            hints.iter().map(|h| h.confidence).sum::<f32>() / hints.len() as f32
        };

        Self {
            total_fields: hints.len(),
            average_confidence,
            high_confidence_fields: hints
                .iter()
                .filter(|h| h.confidence > HIGH_CONFIDENCE_HINT)
                .count(),
            detected_types: fields_by_type.keys().cloned().collect(),
            fields_by_type,
        }
    }
}
