// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashdesk::models::{CategoryKind, NewTransaction, OperationType, PaymentType};
use cashdesk::{categories, db, ledger};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

#[test]
fn duplicate_create_returns_none() {
    let conn = setup();
    let first = categories::create(&conn, 1, "Avito", CategoryKind::IncomeSource, None).unwrap();
    assert!(first.is_some());
    let second = categories::create(&conn, 1, "Avito", CategoryKind::IncomeSource, None).unwrap();
    assert_eq!(second, None);

    let list = categories::list(&conn, 1, Some(CategoryKind::IncomeSource)).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Avito");
    assert_eq!(Some(list[0].id), first);
}

#[test]
fn same_name_allowed_across_kinds_and_chats() {
    let conn = setup();
    assert!(categories::create(&conn, 1, "Stock", CategoryKind::IncomeSource, None)
        .unwrap()
        .is_some());
    assert!(categories::create(&conn, 1, "Stock", CategoryKind::ExpenseCategory, None)
        .unwrap()
        .is_some());
    assert!(categories::create(&conn, 2, "Stock", CategoryKind::IncomeSource, None)
        .unwrap()
        .is_some());
    assert_eq!(categories::list(&conn, 1, None).unwrap().len(), 2);
}

#[test]
fn names_compare_case_insensitively() {
    let conn = setup();
    let id = categories::create(&conn, 1, "Авито", CategoryKind::IncomeSource, Some("board"))
        .unwrap()
        .unwrap();
    assert_eq!(
        categories::create(&conn, 1, " авито ", CategoryKind::IncomeSource, None).unwrap(),
        None
    );

    let found = categories::find_by_name(&conn, 1, "АВИТО", None).unwrap().unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.name, "Авито");
    assert_eq!(found.description.as_deref(), Some("board"));
    assert!(categories::find_by_name(&conn, 1, "авито", Some(CategoryKind::ExpenseCategory))
        .unwrap()
        .is_none());
    assert!(categories::find_by_name(&conn, 2, "авито", None).unwrap().is_none());
}

#[test]
fn find_without_kind_prefers_income_source() {
    let conn = setup();
    let exp = categories::create(&conn, 1, "Mixed", CategoryKind::ExpenseCategory, None)
        .unwrap()
        .unwrap();
    let inc = categories::create(&conn, 1, "Mixed", CategoryKind::IncomeSource, None)
        .unwrap()
        .unwrap();
    assert_eq!(categories::find_by_name(&conn, 1, "mixed", None).unwrap().unwrap().id, inc);
    assert_eq!(
        categories::find_by_name(&conn, 1, "mixed", Some(CategoryKind::ExpenseCategory))
            .unwrap()
            .unwrap()
            .id,
        exp
    );
}

#[test]
fn list_orders_by_name_or_type_then_name() {
    let conn = setup();
    categories::create(&conn, 1, "Zeta", CategoryKind::IncomeSource, None).unwrap();
    categories::create(&conn, 1, "alpha", CategoryKind::ExpenseCategory, None).unwrap();
    categories::create(&conn, 1, "Beta", CategoryKind::IncomeSource, None).unwrap();
    categories::create(&conn, 1, "rent", CategoryKind::ExpenseCategory, None).unwrap();

    let all: Vec<String> = categories::list(&conn, 1, None)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(all, ["Beta", "Zeta", "alpha", "rent"]);

    let incomes: Vec<String> = categories::list(&conn, 1, Some(CategoryKind::IncomeSource))
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(incomes, ["Beta", "Zeta"]);
}

#[test]
fn blank_name_is_a_validation_error() {
    let conn = setup();
    let err = categories::create(&conn, 1, "   ", CategoryKind::IncomeSource, None).unwrap_err();
    assert!(err.is_validation());
    assert!(categories::list(&conn, 1, None).unwrap().is_empty());
}

#[test]
fn delete_leaves_transactions_with_orphaned_reference() {
    let conn = setup();
    let cat = categories::create(&conn, 1, "Avito", CategoryKind::IncomeSource, None)
        .unwrap()
        .unwrap();
    let mut e = NewTransaction::new(1, dec!(500), PaymentType::Cash, OperationType::Add);
    e.category_id = Some(cat);
    let tx_id = ledger::append(&conn, &e).unwrap();

    // wrong chat cannot delete it
    assert!(!categories::delete(&conn, 2, cat).unwrap());
    assert!(categories::delete(&conn, 1, cat).unwrap());
    assert!(!categories::delete(&conn, 1, cat).unwrap());
    assert!(categories::get(&conn, 1, cat).unwrap().is_none());

    let recent = ledger::recent(&conn, 1, 10).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, tx_id);
    assert_eq!(recent[0].category_id, Some(cat));
}
