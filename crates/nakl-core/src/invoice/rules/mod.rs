//! Rule-based field extractors for Russian waybills.

pub mod amounts;
pub mod classify;
pub mod confidence;
pub mod dates;
pub mod normalize;
pub mod patterns;
pub mod sections;

pub use amounts::{parse_money, reconcile, AmountExtractor, ExtractedAmounts};
pub use classify::classify_document;
pub use confidence::{confidence_score, ScoreInput};
pub use dates::normalize_date;
pub use normalize::{normalize_text, normalized_lines};
pub use patterns::{LabelSet, PatternSet};
pub use sections::{extract_section, party_name, party_window, TaxIdPatterns, Window};
