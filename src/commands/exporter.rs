// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::{category_label, category_names};
use super::{arg, chat_id};
use crate::ledger;
use crate::utils::fmt_ts;
use anyhow::{bail, Result};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn opt_string<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let chat = chat_id(conn, sub)?;
    let names = category_names(conn, chat)?;
    let mut rows = ledger::recent(conn, chat, usize::MAX)?;
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "created_at",
                "operation",
                "payment",
                "amount",
                "category",
                "description",
                "username",
                "quantity",
                "unit_price",
                "cost",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    fmt_ts(t.created_at),
                    t.operation_type.to_string(),
                    t.payment_type.to_string(),
                    t.amount.to_string(),
                    category_label(&names, t),
                    t.description.clone().unwrap_or_default(),
                    t.username.clone().unwrap_or_default(),
                    opt_string(&t.quantity),
                    opt_string(&t.unit_price),
                    opt_string(&t.cost),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "created_at": fmt_ts(t.created_at),
                        "operation": t.operation_type,
                        "payment": t.payment_type,
                        "amount": t.amount.to_string(),
                        "category": category_label(&names, t),
                        "description": t.description,
                        "username": t.username,
                        "quantity": t.quantity.map(|d| d.to_string()),
                        "unit_price": t.unit_price.map(|d| d.to_string()),
                        "cost": t.cost.map(|d| d.to_string()),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    tracing::info!(chat_id = chat, count = rows.len(), out, "exported transactions");
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
