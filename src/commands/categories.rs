// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, chat_id, kind_opt, opt_arg};
use crate::categories;
use crate::models::{Category, CategoryKind};
use crate::utils::{fmt_ts, maybe_print_json, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let chat = chat_id(conn, sub)?;
            let name = arg(sub, "name")?;
            let kind = kind_opt(sub)?.ok_or_else(|| anyhow!("--type is required"))?;
            match categories::create(conn, chat, name, kind, opt_arg(sub, "description"))? {
                Some(id) => println!("Added {} '{}' (#{})", kind_label(kind), name.trim(), id),
                None => println!("{} '{}' already exists", kind_label(kind), name.trim()),
            }
        }
        Some(("list", sub)) => {
            let chat = chat_id(conn, sub)?;
            let data = categories::list(conn, chat, kind_opt(sub)?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                println!("{}", table(&data));
            }
        }
        Some(("rm", sub)) => {
            let chat = chat_id(conn, sub)?;
            let name = arg(sub, "name")?;
            match categories::find_by_name(conn, chat, name, kind_opt(sub)?)? {
                Some(c) => {
                    categories::delete(conn, chat, c.id)?;
                    println!("Removed {} '{}'", kind_label(c.kind), c.name);
                }
                None => println!("No category named '{}'", name),
            }
        }
        Some(("find", sub)) => {
            let chat = chat_id(conn, sub)?;
            let name = arg(sub, "name")?;
            let found = categories::find_by_name(conn, chat, name, kind_opt(sub)?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &found)? {
                match found {
                    Some(c) => println!("{}", table(&[c])),
                    None => println!("No category named '{}'", name),
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn table(data: &[Category]) -> comfy_table::Table {
    let rows = data
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                kind_label(c.kind).to_string(),
                c.description.clone().unwrap_or_default(),
                fmt_ts(c.created_at),
            ]
        })
        .collect();
    pretty_table(&["ID", "Name", "Type", "Description", "Created"], rows)
}

pub(crate) fn kind_label(kind: CategoryKind) -> &'static str {
    match kind {
        CategoryKind::IncomeSource => "Income source",
        CategoryKind::ExpenseCategory => "Expense category",
    }
}
