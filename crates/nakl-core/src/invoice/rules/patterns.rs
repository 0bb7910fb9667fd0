//! Pattern library: ordered regex sets and party label sets.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::error::{NaklError, Result};

/// ИНН or КПП as a standalone marker. Words that merely contain the letters
/// (`Инновации`, `Длинные`) do not count; digits may follow directly.
const ID_MARKER: &str = r"\b(?:ИНН|КПП)(?:[^\p{L}]|$)";

lazy_static! {
    // A line that carries an ID rather than a name
    pub static ref ID_LINE: Regex = Regex::new(
        &format!(r"(?i)(?:{ID_MARKER}|^\d+$)")
    ).unwrap();

    pub static ref DIGITS_ONLY: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();
}

/// Compile a single case-insensitive pattern for line-level matching.
pub fn compile_line_pattern(field: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| NaklError::Pattern {
            field: field.to_string(),
            source,
        })
}

/// Ordered list of candidate patterns for one semantic field.
///
/// The first pattern that matches wins; later ones are not tried.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile patterns with case-insensitive, multi-line and
    /// dot-matches-newline semantics.
    pub fn compile(field: &str, patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .multi_line(true)
                    .dot_matches_new_line(true)
                    .build()
                    .map_err(|source| NaklError::Pattern {
                        field: field.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Return the first non-empty capture group of the first matching pattern.
    ///
    /// Falls back to the whole match when the pattern has no group that
    /// participated in the match.
    pub fn find_first(&self, text: &str) -> Option<String> {
        for pattern in &self.patterns {
            if let Some(caps) = pattern.captures(text) {
                let value = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str().to_string());
                return value;
            }
        }
        None
    }
}

/// Labels that introduce one party's block.
#[derive(Debug, Clone)]
pub struct LabelSet {
    labels: Vec<Regex>,
    /// `label[:\s]*(name)` up to an ID marker or end of line, one per label.
    name_patterns: Vec<Regex>,
}

impl LabelSet {
    pub fn compile(field: &str, labels: &[String]) -> Result<Self> {
        let labels_re = labels
            .iter()
            .map(|l| compile_line_pattern(field, l))
            .collect::<Result<Vec<_>>>()?;

        let name_patterns = labels
            .iter()
            .map(|l| {
                compile_line_pattern(field, &format!(r"(?:{l})[:\s]*(.*?)\s*(?:{ID_MARKER}|$)"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            labels: labels_re,
            name_patterns,
        })
    }

    /// Whether any label occurs in the line.
    pub fn matches(&self, line: &str) -> bool {
        self.labels.iter().any(|re| re.is_match(line))
    }

    /// Name written on the label line itself, if any.
    ///
    /// Labels are tried in order; empty or all-digit captures are skipped.
    pub fn name_on_line(&self, line: &str) -> Option<String> {
        self.name_patterns.iter().find_map(|re| {
            let caps = re.captures(line)?;
            let name = caps.get(1)?.as_str().trim();
            if name.is_empty() || DIGITS_ONLY.is_match(name) {
                None
            } else {
                Some(name.to_string())
            }
        })
    }
}
