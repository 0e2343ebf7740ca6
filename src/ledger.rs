// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Append-only log of cash and card movements, partitioned by chat.
//!
//! Amounts are stored as non-negative decimal text; the direction of a
//! movement lives only in `operation_type`.

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Balance, NewTransaction, OperationType, PaymentType, Transaction};
use crate::utils::{checked_add, decimal_at, fmt_ts, opt_decimal_at, parse_ts};

pub(crate) const SELECT_COLUMNS: &str = "SELECT id, chat_id, amount, payment_type, operation_type, description, created_at, user_id, username, category_id, quantity, unit_price, cost FROM transactions";

/// Validates and writes one transaction, returning its id. Nothing is
/// written when validation fails.
pub fn append(conn: &Connection, tx: &NewTransaction) -> LedgerResult<i64> {
    if tx.amount < Decimal::ZERO {
        tracing::warn!(chat_id = tx.chat_id, amount = %tx.amount, "rejected negative amount");
        return Err(LedgerError::validation(format!(
            "amount must not be negative, got {}",
            tx.amount
        )));
    }
    for (field, value) in [
        ("quantity", tx.quantity),
        ("unit_price", tx.unit_price),
        ("cost", tx.cost),
    ] {
        if let Some(v) = value.filter(|v| *v < Decimal::ZERO) {
            tracing::warn!(chat_id = tx.chat_id, field, value = %v, "rejected negative value");
            return Err(LedgerError::validation(format!(
                "{} must not be negative, got {}",
                field, v
            )));
        }
    }
    let created_at = fmt_ts(Utc::now());
    conn.execute(
        "INSERT INTO transactions(chat_id, amount, payment_type, operation_type, description,
             created_at, user_id, username, category_id, quantity, unit_price, cost)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            tx.chat_id,
            tx.amount.normalize().to_string(),
            tx.payment_type,
            tx.operation_type,
            tx.description,
            created_at,
            tx.user_id,
            tx.username,
            tx.category_id,
            tx.quantity.map(|d| d.normalize().to_string()),
            tx.unit_price.map(|d| d.normalize().to_string()),
            tx.cost.map(|d| d.normalize().to_string()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(
        chat_id = tx.chat_id,
        id,
        amount = %tx.amount,
        payment = %tx.payment_type,
        operation = %tx.operation_type,
        "appended transaction"
    );
    Ok(id)
}

/// Cash and card balances of a chat. Either may be negative; no floor is
/// enforced. Totals beyond the `Decimal` range are an `Overflow` error.
pub fn balance(conn: &Connection, chat_id: i64) -> LedgerResult<Balance> {
    let mut stmt = conn.prepare(
        "SELECT payment_type, operation_type, amount FROM transactions WHERE chat_id=?1",
    )?;
    let mut rows = stmt.query(params![chat_id])?;
    let mut bal = Balance::default();
    while let Some(r) = rows.next()? {
        let payment: PaymentType = r.get(0)?;
        let operation: OperationType = r.get(1)?;
        let signed = operation.signed(decimal_at(r, 2, "amount")?);
        match payment {
            PaymentType::Cash => bal.cash = checked_add(bal.cash, signed, "cash balance")?,
            PaymentType::Card => bal.card = checked_add(bal.card, signed, "card balance")?,
        }
    }
    Ok(bal)
}

/// Newest first, at most `limit` rows.
pub fn recent(conn: &Connection, chat_id: i64, limit: usize) -> LedgerResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE chat_id=?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
        SELECT_COLUMNS
    ))?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let mut rows = stmt.query(params![chat_id, limit])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(transaction_from_row(r)?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, chat_id: i64, id: i64) -> LedgerResult<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!("{} WHERE chat_id=?1 AND id=?2", SELECT_COLUMNS))?;
    let mut rows = stmt.query(params![chat_id, id])?;
    let found = match rows.next()? {
        Some(r) => Some(transaction_from_row(r)?),
        None => None,
    };
    Ok(found)
}

/// Deletes every transaction of the chat. Returns the number removed.
pub fn clear(conn: &Connection, chat_id: i64) -> LedgerResult<usize> {
    let removed = conn.execute("DELETE FROM transactions WHERE chat_id=?1", params![chat_id])?;
    tracing::info!(chat_id, removed, "cleared transactions");
    Ok(removed)
}

/// Deletes the chat's transactions and categories together. Returns
/// `(transactions, categories)` removed.
pub fn clear_all(conn: &Connection, chat_id: i64) -> LedgerResult<(usize, usize)> {
    let tx = conn.unchecked_transaction()?;
    let txs = tx.execute("DELETE FROM transactions WHERE chat_id=?1", params![chat_id])?;
    let cats = tx.execute("DELETE FROM categories WHERE chat_id=?1", params![chat_id])?;
    tx.commit()?;
    tracing::info!(chat_id, transactions = txs, categories = cats, "cleared chat");
    Ok((txs, cats))
}

pub(crate) fn transaction_from_row(r: &Row<'_>) -> LedgerResult<Transaction> {
    let created_at: String = r.get(6)?;
    let amount: Decimal = decimal_at(r, 2, "amount")?;
    Ok(Transaction {
        id: r.get(0)?,
        chat_id: r.get(1)?,
        amount,
        payment_type: r.get(3)?,
        operation_type: r.get(4)?,
        description: r.get(5)?,
        created_at: parse_ts(&created_at)?,
        user_id: r.get(7)?,
        username: r.get(8)?,
        category_id: r.get(9)?,
        quantity: opt_decimal_at(r, 10, "quantity")?,
        unit_price: opt_decimal_at(r, 11, "unit_price")?,
        cost: opt_decimal_at(r, 12, "cost")?,
    })
}
