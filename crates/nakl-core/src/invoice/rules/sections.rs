//! Label-driven section and party window search over indexed lines.
//!
//! OCR text carries no field boundaries, so a party's data is attributed by
//! position: everything between its label and a bounded window after it.
//! All searches work on an immutable slice of lines using explicit indices.

use regex::Regex;

use super::normalize::normalize_text;
use super::patterns::{compile_line_pattern, LabelSet, ID_LINE};
use crate::error::Result;
use crate::models::config::PatternConfig;

/// Half-open line range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

/// Index of the first line that matches any label.
pub fn find_label_line<S: AsRef<str>>(lines: &[S], labels: &LabelSet) -> Option<usize> {
    lines.iter().position(|line| labels.matches(line.as_ref()))
}

/// Text of the section introduced by `start_labels`.
///
/// Collects up to `max_lines - 1` lines after the label line, stopping early
/// at a line matching `next_labels`. Lines are normalized and joined with
/// single spaces. Returns an empty string when the label is absent.
pub fn extract_section<S: AsRef<str>>(
    lines: &[S],
    start_labels: &LabelSet,
    next_labels: &LabelSet,
    max_lines: usize,
) -> String {
    let Some(start) = find_label_line(lines, start_labels) else {
        return String::new();
    };

    let limit = (start + max_lines).min(lines.len());
    let end = (start + 1..limit)
        .find(|&j| next_labels.matches(lines[j].as_ref()))
        .unwrap_or(limit);

    lines[start + 1..end.max(start + 1)]
        .iter()
        .map(|line| normalize_text(line.as_ref()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name of the party introduced by `labels`.
///
/// Only the first labelled line is considered. A name on the label line
/// itself wins; otherwise the first of the next `lookahead` lines that is
/// neither blank nor an ID line.
pub fn party_name<S: AsRef<str>>(lines: &[S], labels: &LabelSet, lookahead: usize) -> Option<String> {
    let idx = find_label_line(lines, labels)?;

    if let Some(name) = labels.name_on_line(lines[idx].as_ref()) {
        return Some(name);
    }

    lines
        .iter()
        .skip(idx + 1)
        .take(lookahead)
        .map(|line| line.as_ref().trim())
        .find(|line| !line.is_empty() && !ID_LINE.is_match(line))
        .map(str::to_string)
}

/// Search window for a party's IDs.
///
/// Starts at the party's label line and ends `window_len` lines later or at
/// the first later line labelled for another party (and not for this one),
/// whichever comes first.
pub fn party_window<S: AsRef<str>>(
    lines: &[S],
    own: &LabelSet,
    others: &LabelSet,
    window_len: usize,
) -> Option<Window> {
    let start = find_label_line(lines, own)?;
    let limit = (start + window_len).min(lines.len());

    let end = (start + 1..limit)
        .find(|&j| {
            let line = lines[j].as_ref();
            others.matches(line) && !own.matches(line)
        })
        .unwrap_or(limit);

    Some(Window { start, end })
}

/// INN/KPP patterns applied line by line.
#[derive(Debug, Clone)]
pub struct TaxIdPatterns {
    inn: Regex,
    kpp: Regex,
}

impl TaxIdPatterns {
    pub fn from_config(config: &PatternConfig) -> Result<Self> {
        Ok(Self {
            inn: compile_line_pattern("inn", &config.inn)?,
            kpp: compile_line_pattern("kpp", &config.kpp)?,
        })
    }

    /// First INN and first KPP inside the window, found independently.
    pub fn find_in<S: AsRef<str>>(&self, lines: &[S], window: Window) -> (Option<String>, Option<String>) {
        let mut inn = None;
        let mut kpp = None;

        let end = window.end.min(lines.len());
        for line in lines[window.start.min(end)..end].iter().map(|l| l.as_ref()) {
            if inn.is_none() {
                inn = first_group(&self.inn, line);
            }
            if kpp.is_none() {
                kpp = first_group(&self.kpp, line);
            }
            if inn.is_some() && kpp.is_some() {
                break;
            }
        }

        (inn, kpp)
    }

    /// IDs near the first line matching `near`, without another-party bound.
    ///
    /// Searches `window_len` lines from the label, or the whole text when the
    /// label is absent.
    pub fn find_near<S: AsRef<str>>(
        &self,
        lines: &[S],
        near: &LabelSet,
        window_len: usize,
    ) -> (Option<String>, Option<String>) {
        let window = match find_label_line(lines, near) {
            Some(start) => Window {
                start,
                end: (start + window_len).min(lines.len()),
            },
            None => Window {
                start: 0,
                end: lines.len(),
            },
        };
        self.find_in(lines, window)
    }
}

fn first_group(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
