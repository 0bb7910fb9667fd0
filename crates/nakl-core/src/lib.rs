//! Core library for Russian waybill field extraction.
//!
//! This crate provides:
//! - Text normalization for OCR output
//! - An ordered pattern library for document number, date, totals and tax IDs
//! - Label-driven party attribution (supplier, buyer, shipper, consignee)
//! - Amount parsing and reconciliation, date normalization
//! - Document classification and a field coverage score

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{ExtractionError, NaklError, Result};
pub use invoice::{WaybillExtractor, WaybillParser};
pub use models::config::{LabelConfig, ParserConfig, PatternConfig};
pub use models::record::{
    AmountSet, DebugInfo, DocumentType, ExtractionRecord, FieldHint, HintSummary, OriginalStrings,
    Party,
};
