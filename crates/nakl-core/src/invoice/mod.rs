//! Waybill field extraction module.

mod parser;
pub mod rules;

pub use parser::WaybillParser;

use crate::models::record::{ExtractionRecord, FieldHint};

/// Trait for waybill field extractors.
///
/// Implementations never fail: problems are reported through the record's
/// `error` field and missing values are `None`.
pub trait WaybillExtractor {
    /// Extract a record from plain text.
    fn parse(&self, text: &str) -> ExtractionRecord {
        self.parse_with_hints(text, &[])
    }

    /// Extract a record from plain text plus detector field hints.
    fn parse_with_hints(&self, text: &str, hints: &[FieldHint]) -> ExtractionRecord;
}
