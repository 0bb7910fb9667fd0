//! Amount extraction and reconciliation for Russian waybills.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;
use tracing::{debug, warn};

use regex::Regex;

use super::patterns::{compile_line_pattern, PatternSet};
use crate::error::Result;
use crate::models::config::PatternConfig;
use crate::models::record::{AmountSet, OriginalStrings};

/// Allowed difference between `without + vat` and `with` before totals are
/// reported as inconsistent.
const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Extracts the three totals from normalized text.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    total_with_vat: PatternSet,
    vat: PatternSet,
    total_without_vat: PatternSet,
    vat_line: Regex,
    vat_line_amount: Regex,
    vat_exclusions: Vec<Regex>,
}

/// Amounts found in a document plus notes about them.
#[derive(Debug, Clone, Default)]
pub struct ExtractedAmounts {
    pub amounts: AmountSet,
    pub warnings: Vec<String>,
}

impl AmountExtractor {
    pub fn from_config(config: &PatternConfig) -> Result<Self> {
        Ok(Self {
            total_with_vat: PatternSet::compile("total_with_vat", &config.total_with_vat)?,
            vat: PatternSet::compile("vat", &config.vat)?,
            total_without_vat: PatternSet::compile("total_without_vat", &config.total_without_vat)?,
            vat_line: compile_line_pattern("vat_line", &config.vat_line)?,
            vat_line_amount: compile_line_pattern("vat_line_amount", &config.vat_line_amount)?,
            vat_exclusions: config
                .vat_exclusions
                .iter()
                .map(|p| compile_line_pattern("vat_exclusions", p))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Extract and reconcile totals.
    pub fn extract(&self, text: &str) -> ExtractedAmounts {
        let with_str = self.total_with_vat.find_first(text);
        let vat_str = self.extract_vat(text);
        let without_str = self.total_without_vat.find_first(text);

        debug!(
            "Matched amount strings: without VAT={:?}, VAT={:?}, with VAT={:?}",
            without_str, vat_str, with_str
        );

        let found = AmountSet {
            total_without_vat: parse_money(without_str.as_deref()),
            vat: parse_money(vat_str.as_deref()),
            total_with_vat: parse_money(with_str.as_deref()),
            original_strings: OriginalStrings {
                total_without_vat: without_str,
                vat: vat_str,
                total_with_vat: with_str,
            },
        };

        let (amounts, warning) = reconcile(found);
        ExtractedAmounts {
            amounts,
            warnings: warning.into_iter().collect(),
        }
    }

    /// Find the VAT amount string.
    ///
    /// A line naming `НДС` with a rate is preferred, skipping lines that
    /// describe a total; only then are the generic VAT patterns tried.
    pub fn extract_vat(&self, text: &str) -> Option<String> {
        let from_line = text
            .lines()
            .filter(|line| self.vat_line.is_match(line))
            .filter(|line| !self.vat_exclusions.iter().any(|re| re.is_match(line)))
            .find_map(|line| {
                self.vat_line_amount
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            });

        from_line.or_else(|| self.vat.find_first(text))
    }
}

/// Parse a Russian-formatted amount (e.g. "120 000,00").
///
/// Spaces and narrow no-break spaces are dropped, the comma becomes the
/// decimal point and every other non-digit is discarded. Returns `None` for
/// empty or unparseable input.
pub fn parse_money(raw: Option<&str>) -> Option<Decimal> {
    let raw = raw?;

    let cleaned: String = raw
        .replace([' ', '\u{202f}'], "")
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let parsed = if cleaned.chars().any(|c| c.is_ascii_digit()) {
        Decimal::from_str(&cleaned).ok().or_else(|| {
            cleaned
                .parse::<f64>()
                .ok()
                .and_then(Decimal::from_f64)
        })
    } else {
        None
    };

    if parsed.is_none() {
        warn!("Could not parse amount: {:?}", raw);
    }
    parsed
}

/// Fill in a single missing total from the other two.
///
/// One pass only: with exactly one value missing it is derived from
/// `without_vat + vat = with_vat` and rounded to 2 decimals; with two or more
/// missing nothing is inferred. When all three were found but disagree, they
/// are left as found and a warning is returned.
pub fn reconcile(mut amounts: AmountSet) -> (AmountSet, Option<String>) {
    let mut warning = None;

    match (amounts.total_without_vat, amounts.vat, amounts.total_with_vat) {
        (None, Some(vat), Some(with)) => {
            amounts.total_without_vat = Some((with - vat).round_dp(2));
        }
        (Some(without), Some(vat), None) => {
            amounts.total_with_vat = Some((without + vat).round_dp(2));
        }
        (Some(without), None, Some(with)) => {
            amounts.vat = Some((with - without).round_dp(2));
        }
        (Some(without), Some(vat), Some(with)) => {
            let diff = (without + vat - with).abs();
            if diff > TOLERANCE {
                let message = format!(
                    "Inconsistent totals: {} + {} != {} (difference {})",
                    without, vat, with, diff
                );
                warn!("{}", message);
                warning = Some(message);
            }
        }
        _ => {}
    }

    (amounts, warning)
}
