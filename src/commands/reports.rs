// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{chat_id, opt_arg, window_days};
use crate::categories;
use crate::economics::{self, BreakdownRow};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("by-category", sub)) => by_category(conn, sub)?,
        Some(("breakdown", sub)) => breakdown(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn pct(d: &Decimal) -> String {
    format!("{:.1}%", d.round_dp(1))
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let days = window_days(conn, sub)?;
    let s = economics::summary(conn, chat, days)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let data = vec![
        vec!["Sales".to_string(), s.transactions_count.to_string()],
        vec!["Units sold".to_string(), s.units_sold.normalize().to_string()],
        vec!["Revenue".to_string(), fmt_money(&s.revenue)],
        vec!["Cost".to_string(), fmt_money(&s.cost)],
        vec!["Profit".to_string(), fmt_money(&s.profit)],
        vec!["Margin".to_string(), pct(&s.margin)],
        vec!["Average check".to_string(), fmt_money(&s.avg_check)],
        vec!["Average unit price".to_string(), fmt_money(&s.avg_unit_price)],
    ];
    let header = format!("Last {} days", days);
    println!("{}", pretty_table(&[header.as_str(), "Value"], data));
    Ok(())
}

fn by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let days = window_days(conn, sub)?;
    let category_id = match opt_arg(sub, "category") {
        Some(name) => match categories::find_by_name(conn, chat, name, None)? {
            Some(c) => Some(c.id),
            None => {
                println!("No category named '{}'", name);
                return Ok(());
            }
        },
        None => None,
    };
    let data = economics::by_category(conn, chat, category_id, days)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No sales in the last {} days", days);
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|r| {
            vec![
                r.category_name
                    .clone()
                    .unwrap_or_else(|| "(uncategorized)".into()),
                r.transactions_count.to_string(),
                r.total_quantity.normalize().to_string(),
                fmt_money(&r.avg_unit_price),
                fmt_money(&r.total_revenue),
                fmt_money(&r.total_cost),
                fmt_money(&r.profit),
                pct(&r.margin),
                fmt_money(&r.avg_transaction_amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Category", "Sales", "Units", "Avg price", "Revenue", "Cost", "Profit", "Margin",
                "Avg check",
            ],
            rows,
        )
    );
    Ok(())
}

fn breakdown_rows(rows: &[BreakdownRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.transactions_count.to_string(),
                fmt_money(&r.total),
                pct(&r.share),
            ]
        })
        .collect()
}

fn breakdown(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let chat = chat_id(conn, sub)?;
    let days = window_days(conn, sub)?;
    let b = economics::categorized_breakdown(conn, chat, days)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &b)? {
        return Ok(());
    }
    let headers = ["Category", "Entries", "Total", "Share"];
    println!("Income sources (last {} days)", days);
    println!("{}", pretty_table(&headers, breakdown_rows(&b.incomes)));
    println!("Expense categories (last {} days)", days);
    println!("{}", pretty_table(&headers, breakdown_rows(&b.expenses)));
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Net"],
            vec![vec![
                fmt_money(&b.total_income),
                fmt_money(&b.total_expense),
                fmt_money(&b.total),
            ]],
        )
    );
    Ok(())
}
