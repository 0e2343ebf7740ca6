// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

/// Storage format of `created_at`; matches SQLite's `CURRENT_TIMESTAMP` so
/// string order is chronological order.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub fn parse_ts(s: &str) -> LedgerResult<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| LedgerError::Decode {
            column: "created_at".into(),
            value: s.to_string(),
        })
}

/// Reads a decimal column. Amounts are written as TEXT, but databases created
/// by the legacy bot hold REAL values, so numeric storage classes are accepted
/// too.
pub fn opt_decimal_at(r: &Row<'_>, idx: usize, column: &str) -> LedgerResult<Option<Decimal>> {
    let decode_err = |value: String| LedgerError::Decode {
        column: column.to_string(),
        value,
    };
    match r.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(Decimal::from(i))),
        ValueRef::Real(f) => Decimal::try_from(f)
            .map(|d| Some(d.normalize()))
            .map_err(|_| decode_err(f.to_string())),
        ValueRef::Text(bytes) => {
            let s = String::from_utf8_lossy(bytes);
            s.trim()
                .parse::<Decimal>()
                .map(Some)
                .map_err(|_| decode_err(s.to_string()))
        }
        ValueRef::Blob(_) => Err(decode_err("<blob>".into())),
    }
}

pub fn decimal_at(r: &Row<'_>, idx: usize, column: &str) -> LedgerResult<Decimal> {
    Ok(opt_decimal_at(r, idx, column)?.unwrap_or(Decimal::ZERO))
}

pub fn checked_add(a: Decimal, b: Decimal, what: &'static str) -> LedgerResult<Decimal> {
    a.checked_add(b).ok_or(LedgerError::Overflow(what))
}

pub fn checked_sub(a: Decimal, b: Decimal, what: &'static str) -> LedgerResult<Decimal> {
    a.checked_sub(b).ok_or(LedgerError::Overflow(what))
}

/// `part / whole * 100`, or zero when `whole` is not positive.
pub fn percent_of(part: Decimal, whole: Decimal) -> LedgerResult<Decimal> {
    if whole <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(LedgerError::Overflow("percentage"))
}

pub fn mean(sum: Decimal, count: u64) -> LedgerResult<Decimal> {
    if count == 0 {
        return Ok(Decimal::ZERO);
    }
    sum.checked_div(Decimal::from(count))
        .ok_or(LedgerError::Overflow("average"))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}
