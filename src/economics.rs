// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Unit economics over a trailing window of the ledger.
//!
//! Revenue is the sum of add amounts, cost the sum of the `cost` field on
//! subtract entries. Missing quantities, prices and costs count as zero in
//! sums and are left out of averages. Every ratio with a zero denominator is
//! reported as zero. Totals that leave the `Decimal` range surface as
//! `LedgerError::Overflow`.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::categories;
use crate::error::LedgerResult;
use crate::ledger::{transaction_from_row, SELECT_COLUMNS};
use crate::models::{CategoryKind, OperationType, Transaction};
use crate::utils::{checked_add, checked_sub, fmt_ts, mean, percent_of};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub transactions_count: u64,
    pub units_sold: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
    pub avg_check: Decimal,
    pub avg_unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEconomics {
    /// `None` groups transactions with no category or a deleted one.
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub transactions_count: u64,
    pub total_quantity: Decimal,
    pub avg_unit_price: Decimal,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
    pub avg_transaction_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub transactions_count: u64,
    pub total: Decimal,
    /// Percent of the total for this category type.
    pub share: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Breakdown {
    pub incomes: Vec<BreakdownRow>,
    pub expenses: Vec<BreakdownRow>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Default)]
struct Tally {
    sales: u64,
    quantity: Decimal,
    revenue: Decimal,
    cost: Decimal,
    unit_price_sum: Decimal,
    unit_price_n: u64,
}

impl Tally {
    fn push(&mut self, t: &Transaction) -> LedgerResult<()> {
        match t.operation_type {
            OperationType::Add => {
                self.sales += 1;
                self.revenue = checked_add(self.revenue, t.amount, "revenue")?;
                let qty = t.quantity.unwrap_or(Decimal::ZERO);
                self.quantity = checked_add(self.quantity, qty, "units sold")?;
                if qty > Decimal::ZERO {
                    if let Some(price) = t.unit_price {
                        self.unit_price_sum =
                            checked_add(self.unit_price_sum, price, "unit price")?;
                        self.unit_price_n += 1;
                    }
                }
            }
            OperationType::Subtract => {
                let cost = t.cost.unwrap_or(Decimal::ZERO);
                self.cost = checked_add(self.cost, cost, "cost")?;
            }
        }
        Ok(())
    }

    fn profit(&self) -> LedgerResult<Decimal> {
        checked_sub(self.revenue, self.cost, "profit")
    }

    fn summary(&self) -> LedgerResult<Summary> {
        let profit = self.profit()?;
        Ok(Summary {
            transactions_count: self.sales,
            units_sold: self.quantity,
            revenue: self.revenue,
            cost: self.cost,
            profit,
            margin: percent_of(profit, self.revenue)?,
            avg_check: mean(self.revenue, self.sales)?,
            avg_unit_price: mean(self.unit_price_sum, self.unit_price_n)?,
        })
    }

    fn economics(
        &self,
        id: Option<i64>,
        name: Option<String>,
    ) -> LedgerResult<CategoryEconomics> {
        let s = self.summary()?;
        Ok(CategoryEconomics {
            category_id: id,
            category_name: name,
            transactions_count: s.transactions_count,
            total_quantity: s.units_sold,
            avg_unit_price: s.avg_unit_price,
            total_revenue: s.revenue,
            total_cost: s.cost,
            profit: s.profit,
            margin: s.margin,
            avg_transaction_amount: s.avg_check,
        })
    }
}

/// Start of a `days`-long window ending at `now`.
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn window(conn: &Connection, chat_id: i64, since: DateTime<Utc>) -> LedgerResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE chat_id=?1 AND created_at >= ?2 ORDER BY id",
        SELECT_COLUMNS
    ))?;
    let mut rows = stmt.query(params![chat_id, fmt_ts(since)])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(transaction_from_row(r)?);
    }
    Ok(out)
}

pub fn summary(conn: &Connection, chat_id: i64, days: u32) -> LedgerResult<Summary> {
    summary_as_of(conn, chat_id, days, Utc::now())
}

pub fn summary_as_of(
    conn: &Connection,
    chat_id: i64,
    days: u32,
    now: DateTime<Utc>,
) -> LedgerResult<Summary> {
    let mut tally = Tally::default();
    for t in window(conn, chat_id, window_start(now, days))? {
        tally.push(&t)?;
    }
    tally.summary()
}

pub fn by_category(
    conn: &Connection,
    chat_id: i64,
    category_id: Option<i64>,
    days: u32,
) -> LedgerResult<Vec<CategoryEconomics>> {
    by_category_as_of(conn, chat_id, category_id, days, Utc::now())
}

/// Per-category metrics, highest revenue first. Only groups with at least
/// one sale in the window are reported.
pub fn by_category_as_of(
    conn: &Connection,
    chat_id: i64,
    category_id: Option<i64>,
    days: u32,
    now: DateTime<Utc>,
) -> LedgerResult<Vec<CategoryEconomics>> {
    let names: HashMap<i64, String> = categories::list(conn, chat_id, None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut groups: HashMap<Option<i64>, Tally> = HashMap::new();
    for t in window(conn, chat_id, window_start(now, days))? {
        let key = match category_id {
            Some(wanted) if t.category_id != Some(wanted) => continue,
            Some(wanted) => Some(wanted),
            None => t.category_id.filter(|id| names.contains_key(id)),
        };
        groups.entry(key).or_default().push(&t)?;
    }

    let mut out = Vec::new();
    for (id, tally) in groups.into_iter().filter(|(_, tally)| tally.sales > 0) {
        out.push(tally.economics(id, id.and_then(|id| names.get(&id).cloned()))?);
    }
    out.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.category_name.cmp(&b.category_name))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    Ok(out)
}

pub fn categorized_breakdown(
    conn: &Connection,
    chat_id: i64,
    days: u32,
) -> LedgerResult<Breakdown> {
    categorized_breakdown_as_of(conn, chat_id, days, Utc::now())
}

/// Income sources against add entries and expense categories against
/// subtract entries. Every category of the chat is listed, idle ones with
/// zero totals.
pub fn categorized_breakdown_as_of(
    conn: &Connection,
    chat_id: i64,
    days: u32,
    now: DateTime<Utc>,
) -> LedgerResult<Breakdown> {
    let mut sums: HashMap<(i64, OperationType), (u64, Decimal)> = HashMap::new();
    for t in window(conn, chat_id, window_start(now, days))? {
        if let Some(cid) = t.category_id {
            let e = sums
                .entry((cid, t.operation_type))
                .or_insert((0, Decimal::ZERO));
            e.0 += 1;
            e.1 = checked_add(e.1, t.amount, "category total")?;
        }
    }

    let rows_for = |kind: CategoryKind| -> LedgerResult<(Vec<BreakdownRow>, Decimal)> {
        let mut rows: Vec<BreakdownRow> = categories::list(conn, chat_id, Some(kind))?
            .into_iter()
            .map(|c| {
                let (count, total) = sums
                    .get(&(c.id, kind.operation()))
                    .copied()
                    .unwrap_or((0, Decimal::ZERO));
                BreakdownRow {
                    category_id: c.id,
                    name: c.name,
                    description: c.description,
                    transactions_count: count,
                    total,
                    share: Decimal::ZERO,
                }
            })
            .collect();
        let mut kind_total = Decimal::ZERO;
        for r in &rows {
            kind_total = checked_add(kind_total, r.total, "type total")?;
        }
        for r in rows.iter_mut() {
            r.share = percent_of(r.total, kind_total)?;
        }
        rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        Ok((rows, kind_total))
    };

    let (incomes, total_income) = rows_for(CategoryKind::IncomeSource)?;
    let (expenses, total_expense) = rows_for(CategoryKind::ExpenseCategory)?;
    Ok(Breakdown {
        incomes,
        expenses,
        total_income,
        total_expense,
        total: checked_sub(total_income, total_expense, "net total")?,
    })
}
