//! Keyword-priority document classification.

use crate::models::record::DocumentType;

/// Keywords checked in priority order; the first hit decides the type.
const RULES: &[(&[&str], DocumentType)] = &[
    (&["товарная накладная", "торг-12"], DocumentType::Torg12),
    (&["накладная"], DocumentType::Waybill),
    (&["счет-фактура", "счёт-фактура"], DocumentType::TaxInvoice),
    (&["акт"], DocumentType::Act),
];

/// Determine the document type from normalized text.
pub fn classify_document(text: &str) -> DocumentType {
    let lower = text.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, doc_type)| *doc_type)
        .unwrap_or(DocumentType::Undetermined)
}
