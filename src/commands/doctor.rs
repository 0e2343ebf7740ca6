// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::chat_id;
use crate::ledger;
use crate::models::PaymentType;
use crate::utils::{fmt_money, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, m)?;
    let rows = diagnose(conn, chat)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection, chat: i64) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Transactions pointing at categories that no longer exist in this chat
    let mut stmt = conn.prepare(
        "SELECT category_id, COUNT(*) FROM transactions
         WHERE chat_id=?1 AND category_id IS NOT NULL
           AND category_id NOT IN (SELECT id FROM categories WHERE chat_id=?1)
         GROUP BY category_id ORDER BY category_id",
    )?;
    let mut cur = stmt.query(params![chat])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let n: i64 = r.get(1)?;
        rows.push(vec![
            "orphan_category".into(),
            format!("category #{} referenced by {} transactions", id, n),
        ]);
    }

    // 2) Balances below zero are allowed but usually a typo
    let bal = ledger::balance(conn, chat)?;
    for p in PaymentType::ALL {
        let v = bal.get(p);
        if v < Decimal::ZERO {
            rows.push(vec!["negative_balance".into(), format!("{} {}", p, fmt_money(&v))]);
        }
    }

    // 3) Amounts stored as floats by the legacy bot
    let legacy: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE chat_id=?1 AND typeof(amount)='real'",
        params![chat],
        |r| r.get(0),
    )?;
    if legacy > 0 {
        rows.push(vec![
            "float_amounts".into(),
            format!("{} transactions stored as floating point", legacy),
        ]);
    }
    Ok(rows)
}
