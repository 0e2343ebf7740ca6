// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Quick-entry parsing of chat messages such as `+1000 нал` or `-500 card`.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{OperationType, PaymentType};

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("number pattern compiles"));

const SUBTRACT_WORDS: &[&str] = &["минус", "вычесть"];
const CARD_WORDS: &[&str] = &["безнал", "карт", "card"];
const CASH_WORDS: &[&str] = &["нал", "налич", "cash"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickEntry {
    pub amount: Decimal,
    pub operation: OperationType,
    /// `None` when the message names no payment type; callers must ask.
    pub payment_type: Option<PaymentType>,
}

/// Extracts the first number as the amount. A leading `-` or a subtract word
/// turns the entry into a subtraction. Returns `None` when no number is
/// present.
pub fn parse_entry(text: &str) -> Option<QuickEntry> {
    let text = text.trim();
    let lower = text.to_lowercase();
    let m = NUMBER.find(text)?;
    let amount = m.as_str().replace(',', ".").parse::<Decimal>().ok()?;

    let subtract = text.starts_with('-') || SUBTRACT_WORDS.iter().any(|w| lower.contains(w));
    let operation = if subtract {
        OperationType::Subtract
    } else {
        OperationType::Add
    };
    Some(QuickEntry {
        amount,
        operation,
        payment_type: payment_type_of(&lower),
    })
}

// "безнал" contains "нал", so card words are checked first.
fn payment_type_of(lower: &str) -> Option<PaymentType> {
    if CARD_WORDS.iter().any(|w| lower.contains(w)) {
        Some(PaymentType::Card)
    } else if CASH_WORDS.iter().any(|w| lower.contains(w)) {
        Some(PaymentType::Cash)
    } else {
        None
    }
}

/// Strict amount for step-by-step entry: one positive number, `,` or `.` as
/// the decimal separator.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let amount = text.trim().replace(',', ".").parse::<Decimal>().ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn signed_cash_entry() {
        let e = parse_entry("-200 нал").unwrap();
        assert_eq!(e.amount, dec("200"));
        assert_eq!(e.operation, OperationType::Subtract);
        assert_eq!(e.payment_type, Some(PaymentType::Cash));
    }

    #[test]
    fn beznal_is_card_not_cash() {
        let e = parse_entry("1500,50 безнал").unwrap();
        assert_eq!(e.amount, dec("1500.50"));
        assert_eq!(e.operation, OperationType::Add);
        assert_eq!(e.payment_type, Some(PaymentType::Card));
    }

    #[test]
    fn subtract_word_and_missing_payment() {
        let e = parse_entry("вычесть 300").unwrap();
        assert_eq!(e.operation, OperationType::Subtract);
        assert_eq!(e.payment_type, None);
        assert!(parse_entry("hello").is_none());
    }

    #[test]
    fn strict_amount_rejects_zero_and_text() {
        assert_eq!(parse_amount(" 500,5 "), Some(dec("500.5")));
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-3"), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
