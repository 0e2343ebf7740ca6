// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, chat_id, opt_arg};
use crate::models::{CategoryKind, NewTransaction, OperationType, PaymentType, Transaction};
use crate::parse::parse_entry;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use crate::{categories, ledger};
use anyhow::{anyhow, bail, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn add(conn: &Connection, sub: &clap::ArgMatches, operation: OperationType) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let payment: PaymentType = arg(sub, "payment")?.parse()?;

    let mut entry = NewTransaction::new(chat, amount, payment, operation);
    entry.description = opt_arg(sub, "description").map(str::to_string);
    entry.user_id = sub.get_one::<i64>("user_id").copied();
    entry.username = opt_arg(sub, "username").map(str::to_string);
    entry.quantity = opt_decimal(sub, "quantity")?;
    entry.unit_price = opt_decimal(sub, "unit_price")?;
    entry.cost = opt_decimal(sub, "cost")?;
    if let Some(name) = opt_arg(sub, "category") {
        entry.category_id = Some(resolve_category(conn, chat, name, operation)?);
    }

    let id = ledger::append(conn, &entry)?;
    println!(
        "Recorded #{}: {}{} {}",
        id,
        sign(operation),
        fmt_money(&amount),
        payment
    );
    print_balance(conn, chat)
}

/// Free-text entry, e.g. `+1000 нал`.
pub fn say(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let text = sub
        .get_many::<String>("text")
        .map(|parts| parts.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let Some(parsed) = parse_entry(&text) else {
        println!("Could not recognize an amount. Try '1000 cash', '+500 card' or '-200 нал'.");
        return Ok(());
    };
    let payment = match (parsed.payment_type, opt_arg(sub, "payment")) {
        (Some(p), _) => p,
        (None, Some(p)) => p.parse()?,
        (None, None) => {
            println!("No payment type given. Add 'cash'/'нал' or 'card'/'карт', e.g. '1000 cash'.");
            return Ok(());
        }
    };

    let mut entry = NewTransaction::new(chat, parsed.amount, payment, parsed.operation);
    entry.description = Some(text.trim().to_string());
    let id = ledger::append(conn, &entry)?;
    println!(
        "Recorded #{}: {}{} {}",
        id,
        sign(parsed.operation),
        fmt_money(&parsed.amount),
        payment
    );
    print_balance(conn, chat)
}

#[derive(Serialize)]
struct BalanceView {
    cash: Decimal,
    card: Decimal,
    total: Decimal,
}

pub fn balance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let bal = ledger::balance(conn, chat)?;
    let view = BalanceView {
        cash: bal.cash,
        card: bal.card,
        total: bal.total()?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        print_balance(conn, chat)?;
    }
    Ok(())
}

fn print_balance(conn: &Connection, chat: i64) -> Result<()> {
    let bal = ledger::balance(conn, chat)?;
    let rows = vec![
        vec!["Cash".to_string(), fmt_money(&bal.cash)],
        vec!["Card".to_string(), fmt_money(&bal.card)],
        vec!["Total".to_string(), fmt_money(&bal.total()?)],
    ];
    println!("{}", pretty_table(&["Balance", "Amount"], rows));
    Ok(())
}

#[derive(Serialize)]
pub struct HistoryRow {
    pub id: i64,
    pub created_at: String,
    pub amount: String,
    pub payment: String,
    pub category: String,
    pub description: String,
    pub user: String,
}

pub fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(10);
    let data = history_rows(conn, chat, limit)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No transactions yet");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .into_iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.created_at,
                r.amount,
                r.payment,
                r.category,
                r.description,
                r.user,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "When (UTC)", "Amount", "Payment", "Category", "Description", "User"],
            rows,
        )
    );
    Ok(())
}

/// Recent transactions rendered for display; deleted categories show as
/// uncategorized.
pub fn history_rows(conn: &Connection, chat: i64, limit: usize) -> Result<Vec<HistoryRow>> {
    let names = category_names(conn, chat)?;
    Ok(ledger::recent(conn, chat, limit)?
        .iter()
        .map(|t| HistoryRow {
            id: t.id,
            created_at: crate::utils::fmt_ts(t.created_at),
            amount: format!("{}{}", sign(t.operation_type), fmt_money(&t.amount)),
            payment: t.payment_type.to_string(),
            category: category_label(&names, t),
            description: t.description.clone().unwrap_or_default(),
            user: t.username.clone().unwrap_or_default(),
        })
        .collect())
}

pub fn reset(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let removed = ledger::clear(conn, chat)?;
    println!("Balance reset: removed {} transactions", removed);
    Ok(())
}

pub fn wipe(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    if !sub.get_flag("yes") {
        bail!("Refusing to wipe chat {} without --yes", chat);
    }
    let (txs, cats) = ledger::clear_all(conn, chat)?;
    println!("Wiped chat {}: {} transactions, {} categories", chat, txs, cats);
    Ok(())
}

pub(crate) fn category_names(conn: &Connection, chat: i64) -> Result<HashMap<i64, String>> {
    Ok(categories::list(conn, chat, None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

pub(crate) fn category_label(names: &HashMap<i64, String>, t: &Transaction) -> String {
    t.category_id
        .and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| "(uncategorized)".into())
}

// Prefers the kind matching the direction, then any kind with that name.
fn resolve_category(
    conn: &Connection,
    chat: i64,
    name: &str,
    operation: OperationType,
) -> Result<i64> {
    let preferred = match operation {
        OperationType::Add => CategoryKind::IncomeSource,
        OperationType::Subtract => CategoryKind::ExpenseCategory,
    };
    let found = match categories::find_by_name(conn, chat, name, Some(preferred))? {
        Some(c) => Some(c),
        None => categories::find_by_name(conn, chat, name, None)?,
    };
    found
        .map(|c| c.id)
        .ok_or_else(|| anyhow!("Category '{}' not found", name))
}

fn opt_decimal(sub: &clap::ArgMatches, id: &str) -> Result<Option<Decimal>> {
    opt_arg(sub, id).map(parse_decimal).transpose()
}

fn sign(op: OperationType) -> &'static str {
    match op {
        OperationType::Add => "+",
        OperationType::Subtract => "-",
    }
}
