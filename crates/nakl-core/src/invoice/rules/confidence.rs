//! Field coverage scoring.
//!
//! The score is the weighted share of populated fields. It says how much of
//! the expected record was found, not how likely the values are correct.

use rust_decimal::Decimal;

use crate::models::record::{AmountSet, Party};

/// Points for each populated field; the maximum is [`MAX_SCORE`].
pub mod weights {
    pub const NUMBER: f64 = 1.5;
    pub const DATE: f64 = 1.5;
    pub const PARTY_NAME: f64 = 1.0;
    pub const INN: f64 = 0.5;
    pub const KPP: f64 = 0.5;
    pub const TOTAL: f64 = 2.0;
    pub const VAT: f64 = 1.0;
}

pub const MAX_SCORE: f64 = 10.0;

/// Fields the score is computed from.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub number: Option<&'a str>,
    pub date: Option<&'a str>,
    pub supplier: &'a Party,
    pub buyer: &'a Party,
    pub amounts: &'a AmountSet,
}

/// Coverage score in [0, 1].
pub fn confidence_score(input: ScoreInput<'_>) -> f64 {
    let mut score = 0.0;

    if present(input.number) {
        score += weights::NUMBER;
    }
    if present(input.date) {
        score += weights::DATE;
    }

    for party in [input.supplier, input.buyer] {
        if present(party.name.as_deref()) {
            score += weights::PARTY_NAME;
        }
        if present(party.inn.as_deref()) {
            score += weights::INN;
        }
        if present(party.kpp.as_deref()) {
            score += weights::KPP;
        }
    }

    // Zero amounts count as missing
    if nonzero(input.amounts.total_with_vat) || nonzero(input.amounts.total_without_vat) {
        score += weights::TOTAL;
    }
    if nonzero(input.amounts.vat) {
        score += weights::VAT;
    }

    (score / MAX_SCORE).min(1.0)
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn nonzero(value: Option<Decimal>) -> bool {
    value.is_some_and(|v| !v.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(name: Option<&str>, inn: Option<&str>, kpp: Option<&str>) -> Party {
        Party {
            name: name.map(String::from),
            inn: inn.map(String::from),
            kpp: kpp.map(String::from),
        }
    }

    #[test]
    fn test_full_record_scores_one() {
        let supplier = party(Some("ООО"), Some("1234567890"), Some("123456789"));
        let buyer = party(Some("ЗАО"), Some("0987654321"), Some("987654321"));
        let amounts = AmountSet {
            total_with_vat: Some(Decimal::from(120)),
            vat: Some(Decimal::from(20)),
            ..AmountSet::default()
        };

        let score = confidence_score(ScoreInput {
            number: Some("ТН-1"),
            date: Some("15.01.2025"),
            supplier: &supplier,
            buyer: &buyer,
            amounts: &amounts,
        });
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_record() {
        let supplier = party(Some("ООО"), Some("1234567890"), None);
        let buyer = Party::default();
        let amounts = AmountSet {
            total_without_vat: Some(Decimal::from(100)),
            vat: Some(Decimal::ZERO),
            ..AmountSet::default()
        };

        let score = confidence_score(ScoreInput {
            number: None,
            date: Some("15.01.2025"),
            supplier: &supplier,
            buyer: &buyer,
            amounts: &amounts,
        });
        // date 1.5 + name 1.0 + INN 0.5 + total 2.0
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let empty = Party::default();
        let amounts = AmountSet::default();
        let score = confidence_score(ScoreInput {
            number: None,
            date: None,
            supplier: &empty,
            buyer: &empty,
            amounts: &amounts,
        });
        assert_eq!(score, 0.0);
    }
}
