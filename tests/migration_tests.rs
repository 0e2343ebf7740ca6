// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashdesk::models::{CategoryKind, NewTransaction, OperationType, PaymentType};
use cashdesk::{categories, db, economics, ledger};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use tempfile::tempdir;

// Schema as written by the legacy bot before unit economics existed.
fn legacy_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            payment_type TEXT NOT NULL,
            operation_type TEXT NOT NULL,
            description TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            user_id INTEGER,
            username TEXT
        );
        CREATE TABLE categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(chat_id, name)
        );
        INSERT INTO transactions(chat_id, amount, payment_type, operation_type, username)
            VALUES (1, 1000.5, 'cash', 'add', 'ivan');
        INSERT INTO transactions(chat_id, amount, payment_type, operation_type)
            VALUES (1, 200, 'cash', 'subtract');
        INSERT INTO transactions(chat_id, amount, payment_type, operation_type)
            VALUES (1, 75.25, 'card', 'add');
        INSERT INTO categories(id, chat_id, name) VALUES (4, 1, 'Avito');
        INSERT INTO categories(id, chat_id, name) VALUES (5, 1, 'avito');
        INSERT INTO categories(id, chat_id, name, description) VALUES (6, 1, 'Shop', 'retail');
        "#,
    )
    .unwrap();
    conn
}

#[test]
fn fresh_database_applies_every_migration_once() {
    let mut conn = Connection::open_in_memory().unwrap();
    let applied = db::migrate(&mut conn).unwrap();
    let all: Vec<i64> = db::MIGRATIONS.iter().map(|m| m.version).collect();
    assert_eq!(applied, all);
    assert_eq!(db::applied_versions(&conn).unwrap(), all);

    assert!(db::migrate(&mut conn).unwrap().is_empty());
    assert_eq!(db::applied_versions(&conn).unwrap(), all);
}

#[test]
fn legacy_database_is_upgraded_in_place() {
    let mut conn = legacy_conn();
    db::migrate(&mut conn).unwrap();

    let bal = ledger::balance(&conn, 1).unwrap();
    assert_eq!(bal.cash, dec!(800.5));
    assert_eq!(bal.card, dec!(75.25));
    let oldest = ledger::recent(&conn, 1, 10).unwrap().pop().unwrap();
    assert_eq!(oldest.username.as_deref(), Some("ivan"));
    assert_eq!(oldest.category_id, None);

    // ids kept, case-duplicates collapsed to the oldest row, all income sources
    let cats = categories::list(&conn, 1, None).unwrap();
    let got: Vec<(i64, &str, CategoryKind)> = cats
        .iter()
        .map(|c| (c.id, c.name.as_str(), c.kind))
        .collect();
    assert_eq!(
        got,
        vec![
            (4, "Avito", CategoryKind::IncomeSource),
            (6, "Shop", CategoryKind::IncomeSource),
        ]
    );
    assert_eq!(cats[1].description.as_deref(), Some("retail"));

    // unit-economics columns usable after the upgrade
    let mut e = NewTransaction::new(1, dec!(500), PaymentType::Cash, OperationType::Add);
    e.category_id = Some(4);
    e.quantity = Some(dec!(5));
    e.unit_price = Some(dec!(100));
    ledger::append(&conn, &e).unwrap();
    let rows = economics::by_category(&conn, 1, Some(4), 30).unwrap();
    assert_eq!(rows[0].total_quantity, dec!(5));

    let expense = categories::create(&conn, 1, "Avito", CategoryKind::ExpenseCategory, None)
        .unwrap();
    assert!(expense.is_some());
}

#[test]
fn file_database_reopens_without_reapplying() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("cash.sqlite");
    {
        let conn = db::open_or_init(Some(&path)).unwrap();
        ledger::append(
            &conn,
            &NewTransaction::new(3, dec!(42), PaymentType::Card, OperationType::Add),
        )
        .unwrap();
    }
    let mut conn = db::open_or_init(Some(&path)).unwrap();
    assert!(db::migrate(&mut conn).unwrap().is_empty());
    assert_eq!(ledger::balance(&conn, 3).unwrap().card, dec!(42));
}
