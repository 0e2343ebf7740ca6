// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashdesk::models::{Balance, CategoryKind, NewTransaction, OperationType, PaymentType};
use cashdesk::{categories, db, ledger, LedgerError};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn entry(chat: i64, amount: Decimal, p: PaymentType, op: OperationType) -> NewTransaction {
    NewTransaction::new(chat, amount, p, op)
}

#[test]
fn add_then_subtract_cash() {
    let conn = setup();
    ledger::append(&conn, &entry(1, dec!(1000), PaymentType::Cash, OperationType::Add)).unwrap();
    ledger::append(&conn, &entry(1, dec!(300), PaymentType::Cash, OperationType::Subtract))
        .unwrap();

    let bal = ledger::balance(&conn, 1).unwrap();
    assert_eq!(bal, Balance { cash: dec!(700), card: dec!(0) });
    assert_eq!(bal.total().unwrap(), dec!(700));
}

#[test]
fn balance_matches_closed_form() {
    let conn = setup();
    let entries = [
        (1, dec!(120.50), PaymentType::Cash, OperationType::Add),
        (1, dec!(80), PaymentType::Card, OperationType::Add),
        (1, dec!(20.25), PaymentType::Cash, OperationType::Subtract),
        (2, dec!(999), PaymentType::Cash, OperationType::Add),
        (1, dec!(30), PaymentType::Card, OperationType::Subtract),
        (1, dec!(0.1), PaymentType::Cash, OperationType::Add),
        (1, dec!(0.2), PaymentType::Cash, OperationType::Add),
    ];
    for (chat, amount, p, op) in entries {
        ledger::append(&conn, &entry(chat, amount, p, op)).unwrap();
    }

    let expected = |chat: i64, pay: PaymentType| -> Decimal {
        entries
            .iter()
            .filter(|(c, _, p, _)| *c == chat && *p == pay)
            .map(|(_, a, _, op)| op.signed(*a))
            .sum()
    };
    let bal = ledger::balance(&conn, 1).unwrap();
    assert_eq!(bal.cash, expected(1, PaymentType::Cash));
    assert_eq!(bal.card, expected(1, PaymentType::Card));
    assert_eq!(bal.cash, dec!(100.55));
    assert_eq!(ledger::balance(&conn, 2).unwrap().cash, dec!(999));
}

#[test]
fn negative_amount_is_rejected_without_writing() {
    let conn = setup();
    ledger::append(&conn, &entry(1, dec!(50), PaymentType::Card, OperationType::Add)).unwrap();
    let before = ledger::balance(&conn, 1).unwrap();

    let err = ledger::append(&conn, &entry(1, dec!(-5), PaymentType::Card, OperationType::Add))
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(ledger::balance(&conn, 1).unwrap(), before);
    assert_eq!(ledger::recent(&conn, 1, 10).unwrap().len(), 1);
}

#[test]
fn negative_unit_fields_are_rejected_without_writing() {
    let conn = setup();
    let mut e = entry(1, dec!(10), PaymentType::Cash, OperationType::Subtract);
    e.cost = Some(dec!(-1000000000000000000000));
    assert!(ledger::append(&conn, &e).unwrap_err().is_validation());

    let mut e = entry(1, dec!(10), PaymentType::Cash, OperationType::Add);
    e.quantity = Some(dec!(-1));
    assert!(ledger::append(&conn, &e).unwrap_err().is_validation());

    let mut e = entry(1, dec!(10), PaymentType::Cash, OperationType::Add);
    e.quantity = Some(dec!(2));
    e.unit_price = Some(dec!(-5));
    assert!(ledger::append(&conn, &e).unwrap_err().is_validation());

    assert!(ledger::recent(&conn, 1, 10).unwrap().is_empty());
}

#[test]
fn balance_beyond_decimal_range_is_an_error() {
    let conn = setup();
    let huge = dec!(50000000000000000000000000000);
    for _ in 0..2 {
        ledger::append(&conn, &entry(1, huge, PaymentType::Cash, OperationType::Add)).unwrap();
    }
    let err = ledger::balance(&conn, 1).unwrap_err();
    assert!(matches!(err, LedgerError::Overflow(_)));
    // other chats are unaffected
    assert_eq!(ledger::balance(&conn, 2).unwrap(), Balance::default());

    ledger::clear(&conn, 1).unwrap();
    ledger::append(&conn, &entry(1, huge, PaymentType::Cash, OperationType::Add)).unwrap();
    ledger::append(&conn, &entry(1, huge, PaymentType::Card, OperationType::Add)).unwrap();
    let bal = ledger::balance(&conn, 1).unwrap();
    assert!(matches!(bal.total(), Err(LedgerError::Overflow(_))));
}

#[test]
fn unknown_enum_strings_are_validation_errors() {
    assert!("bitcoin".parse::<PaymentType>().unwrap_err().is_validation());
    assert!("multiply".parse::<OperationType>().unwrap_err().is_validation());
    assert_eq!(" Card ".parse::<PaymentType>().unwrap(), PaymentType::Card);
}

#[test]
fn balance_may_go_negative() {
    let conn = setup();
    ledger::append(&conn, &entry(1, dec!(10), PaymentType::Cash, OperationType::Add)).unwrap();
    ledger::append(&conn, &entry(1, dec!(25), PaymentType::Cash, OperationType::Subtract))
        .unwrap();
    assert_eq!(ledger::balance(&conn, 1).unwrap().cash, dec!(-15));
}

#[test]
fn zero_amount_is_accepted() {
    let conn = setup();
    let id = ledger::append(&conn, &entry(1, dec!(0), PaymentType::Cash, OperationType::Add));
    assert!(id.is_ok());
}

#[test]
fn recent_is_newest_first_and_bounded() {
    let conn = setup();
    let mut ids = Vec::new();
    for i in 1..=5 {
        ids.push(
            ledger::append(
                &conn,
                &entry(1, Decimal::from(i), PaymentType::Cash, OperationType::Add),
            )
            .unwrap(),
        );
    }
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let rows = ledger::recent(&conn, 1, 3).unwrap();
    let got: Vec<i64> = rows.iter().map(|t| t.id).collect();
    assert_eq!(got, vec![ids[4], ids[3], ids[2]]);

    // independent calls, no cursor
    assert_eq!(ledger::recent(&conn, 1, 3).unwrap(), rows);
    assert!(ledger::recent(&conn, 2, 3).unwrap().is_empty());
    assert!(ledger::recent(&conn, 1, 0).unwrap().is_empty());
}

#[test]
fn optional_fields_round_trip() {
    let conn = setup();
    let mut e = entry(9, dec!(500.50), PaymentType::Card, OperationType::Subtract);
    e.description = Some("stock".into());
    e.user_id = Some(77);
    e.username = Some("anna".into());
    e.category_id = Some(3);
    e.quantity = Some(dec!(2));
    e.unit_price = Some(dec!(250.25));
    e.cost = Some(dec!(400));
    let id = ledger::append(&conn, &e).unwrap();

    let t = ledger::get(&conn, 9, id).unwrap().unwrap();
    assert_eq!(t.amount, dec!(500.50));
    assert_eq!(t.signed_amount(), dec!(-500.50));
    assert_eq!(t.description.as_deref(), Some("stock"));
    assert_eq!(t.user_id, Some(77));
    assert_eq!(t.username.as_deref(), Some("anna"));
    assert_eq!(t.category_id, Some(3));
    assert_eq!(t.quantity, Some(dec!(2)));
    assert_eq!(t.unit_price, Some(dec!(250.25)));
    assert_eq!(t.cost, Some(dec!(400)));

    assert!(ledger::get(&conn, 10, id).unwrap().is_none());
}

#[test]
fn clear_keeps_categories_clear_all_removes_them() {
    let conn = setup();
    categories::create(&conn, 1, "Avito", CategoryKind::IncomeSource, None).unwrap();
    categories::create(&conn, 2, "Avito", CategoryKind::IncomeSource, None).unwrap();
    for chat in [1, 2] {
        ledger::append(&conn, &entry(chat, dec!(10), PaymentType::Cash, OperationType::Add))
            .unwrap();
    }

    assert_eq!(ledger::clear(&conn, 1).unwrap(), 1);
    assert_eq!(ledger::balance(&conn, 1).unwrap(), Balance::default());
    assert_eq!(categories::list(&conn, 1, None).unwrap().len(), 1);

    ledger::append(&conn, &entry(1, dec!(5), PaymentType::Card, OperationType::Add)).unwrap();
    assert_eq!(ledger::clear_all(&conn, 1).unwrap(), (1, 1));
    assert!(categories::list(&conn, 1, None).unwrap().is_empty());

    // other chat untouched
    assert_eq!(ledger::balance(&conn, 2).unwrap().cash, dec!(10));
    assert_eq!(categories::list(&conn, 2, None).unwrap().len(), 1);
}
