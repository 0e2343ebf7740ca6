// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-chat registry of income sources and expense categories.
//!
//! Names are unique per `(chat, type)` ignoring case. Deleting a category
//! never touches transactions: their `category_id` is left pointing at the
//! removed row and views report them as uncategorized.

use chrono::Utc;
use rusqlite::{params, Connection, Row};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryKind};
use crate::utils::{fmt_ts, parse_ts};

const SELECT_COLUMNS: &str = "SELECT id, chat_id, name, description, type, created_at FROM categories";

/// Case-folded form used for uniqueness and lookups. SQLite's `LOWER` only
/// folds ASCII, so this is computed here and stored alongside the name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Returns the new id, or `None` when the chat already has a category of
/// this kind with the same name.
pub fn create(
    conn: &Connection,
    chat_id: i64,
    name: &str,
    kind: CategoryKind,
    description: Option<&str>,
) -> LedgerResult<Option<i64>> {
    let name = name.trim();
    if name.is_empty() {
        tracing::warn!(chat_id, "rejected category with blank name");
        return Err(LedgerError::validation("category name must not be empty"));
    }
    let description = description.map(str::trim).filter(|d| !d.is_empty());
    let inserted = conn.execute(
        "INSERT INTO categories(chat_id, name, name_norm, description, type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(chat_id, name_norm, type) DO NOTHING",
        params![
            chat_id,
            name,
            normalize_name(name),
            description,
            kind,
            fmt_ts(Utc::now())
        ],
    )?;
    if inserted == 0 {
        tracing::debug!(chat_id, name, %kind, "category already exists");
        return Ok(None);
    }
    let id = conn.last_insert_rowid();
    tracing::debug!(chat_id, id, name, %kind, "created category");
    Ok(Some(id))
}

/// Categories of a chat ordered by name, or by type then name when no kind
/// is given.
pub fn list(
    conn: &Connection,
    chat_id: i64,
    kind: Option<CategoryKind>,
) -> LedgerResult<Vec<Category>> {
    let mut out = Vec::new();
    match kind {
        Some(k) => {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE chat_id=?1 AND type=?2 ORDER BY name_norm, id",
                SELECT_COLUMNS
            ))?;
            let mut rows = stmt.query(params![chat_id, k])?;
            while let Some(r) = rows.next()? {
                out.push(category_from_row(r)?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE chat_id=?1 ORDER BY name_norm, id",
                SELECT_COLUMNS
            ))?;
            let mut rows = stmt.query(params![chat_id])?;
            while let Some(r) = rows.next()? {
                out.push(category_from_row(r)?);
            }
            // stable: keeps name order inside each kind
            out.sort_by_key(|c| c.kind);
        }
    }
    Ok(out)
}

/// Case-insensitive lookup. Without a kind, income sources win over expense
/// categories sharing the same name.
pub fn find_by_name(
    conn: &Connection,
    chat_id: i64,
    name: &str,
    kind: Option<CategoryKind>,
) -> LedgerResult<Option<Category>> {
    let norm = normalize_name(name);
    if norm.is_empty() {
        return Ok(None);
    }
    let mut stmt = conn.prepare(&format!(
        "{} WHERE chat_id=?1 AND name_norm=?2 AND (?3 IS NULL OR type=?3)",
        SELECT_COLUMNS
    ))?;
    let mut rows = stmt.query(params![chat_id, norm, kind])?;
    let mut found = Vec::new();
    while let Some(r) = rows.next()? {
        found.push(category_from_row(r)?);
    }
    found.sort_by_key(|c| c.kind);
    Ok(found.into_iter().next())
}

pub fn get(conn: &Connection, chat_id: i64, id: i64) -> LedgerResult<Option<Category>> {
    let mut stmt = conn.prepare(&format!("{} WHERE chat_id=?1 AND id=?2", SELECT_COLUMNS))?;
    let mut rows = stmt.query(params![chat_id, id])?;
    match rows.next()? {
        Some(r) => Ok(Some(category_from_row(r)?)),
        None => Ok(None),
    }
}

/// Removes the category row only. Returns whether anything was deleted.
pub fn delete(conn: &Connection, chat_id: i64, id: i64) -> LedgerResult<bool> {
    let removed = conn.execute(
        "DELETE FROM categories WHERE id=?1 AND chat_id=?2",
        params![id, chat_id],
    )?;
    if removed > 0 {
        tracing::info!(chat_id, id, "deleted category");
    }
    Ok(removed > 0)
}

fn category_from_row(r: &Row<'_>) -> LedgerResult<Category> {
    let created_at: String = r.get(5)?;
    Ok(Category {
        id: r.get(0)?,
        chat_id: r.get(1)?,
        name: r.get(2)?,
        description: r.get(3)?,
        kind: r.get(4)?,
        created_at: parse_ts(&created_at)?,
    })
}
