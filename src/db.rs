// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::categories::normalize_name;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Cashdesk", "cashdesk"));

/// One schema step. Every step must be safe to run against a database that
/// already has its effect (databases written by the legacy bot carry some of
/// these columns without any migration bookkeeping).
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    apply: fn(&Connection) -> rusqlite::Result<()>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_transactions",
        apply: create_transactions,
    },
    Migration {
        version: 2,
        name: "unit_economics_columns",
        apply: unit_economics_columns,
    },
    Migration {
        version: 3,
        name: "typed_categories",
        apply: typed_categories,
    },
    Migration {
        version: 4,
        name: "aggregation_indexes",
        apply: aggregation_indexes,
    },
    Migration {
        version: 5,
        name: "settings",
        apply: settings,
    },
];

pub fn db_path(custom: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = custom {
        if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return Ok(p.to_path_buf());
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("cashdesk.sqlite"))
}

pub fn open_or_init(custom: Option<&Path>) -> Result<Connection> {
    let path = db_path(custom)?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    migrate(&mut conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    migrate(&mut conn)?;
    Ok(conn)
}

/// Applies every migration not yet recorded in `schema_migrations`, each in
/// its own transaction. Returns the versions applied by this call.
pub fn migrate(conn: &mut Connection) -> Result<Vec<i64>> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations(
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        let done: Option<i64> = conn
            .query_row(
                "SELECT version FROM schema_migrations WHERE version=?1",
                params![m.version],
                |r| r.get(0),
            )
            .optional()?;
        if done.is_some() {
            continue;
        }
        let tx = conn.transaction()?;
        (m.apply)(&tx).with_context(|| format!("Migration {} ({}) failed", m.version, m.name))?;
        tx.execute(
            "INSERT INTO schema_migrations(version, name) VALUES (?1, ?2)",
            params![m.version, m.name],
        )?;
        tx.commit()?;
        tracing::info!(version = m.version, name = m.name, "applied migration");
        applied.push(m.version);
    }
    Ok(applied)
}

pub fn applied_versions(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let rows = stmt.query_map([], |r| r.get::<_, i64>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            params![table],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn columns(conn: &Connection, table: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(1))?;
    let mut out = HashSet::new();
    for row in rows {
        out.insert(row?);
    }
    Ok(out)
}

fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    decl: &str,
) -> rusqlite::Result<()> {
    if !columns(conn, table)?.contains(column) {
        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {};",
            table, column, decl
        ))?;
        tracing::debug!(table, column, "added column");
    }
    Ok(())
}

fn create_transactions(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        payment_type TEXT NOT NULL,
        operation_type TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        user_id INTEGER,
        username TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_chat ON transactions(chat_id);
    "#,
    )
}

fn unit_economics_columns(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "transactions", "category_id", "INTEGER")?;
    add_column_if_missing(conn, "transactions", "quantity", "TEXT")?;
    add_column_if_missing(conn, "transactions", "unit_price", "TEXT")?;
    add_column_if_missing(conn, "transactions", "cost", "TEXT")?;
    Ok(())
}

const CATEGORIES_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        name_norm TEXT NOT NULL,
        description TEXT,
        type TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(chat_id, name_norm, type)
    );
"#;

// Legacy category tables have no type and are unique on the raw name only.
// Rows are carried over as income sources keeping their ids, so transaction
// references stay valid; names that collide once normalized keep the oldest.
fn typed_categories(conn: &Connection) -> rusqlite::Result<()> {
    if !table_exists(conn, "categories")? {
        return conn.execute_batch(CATEGORIES_DDL);
    }
    let cols = columns(conn, "categories")?;
    if cols.contains("type") && cols.contains("name_norm") {
        return Ok(());
    }

    conn.execute_batch("ALTER TABLE categories RENAME TO categories_legacy;")?;
    conn.execute_batch(CATEGORIES_DDL)?;
    let mut stmt = conn.prepare(
        "SELECT id, chat_id, name, description, created_at FROM categories_legacy ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
        ))
    })?;
    let mut carried = 0usize;
    for row in rows {
        let (id, chat_id, name, description, created_at) = row?;
        carried += conn.execute(
            "INSERT OR IGNORE INTO categories(id, chat_id, name, name_norm, description, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'income_source', COALESCE(?6, CURRENT_TIMESTAMP))",
            params![id, chat_id, name, normalize_name(&name), description, created_at],
        )?;
    }
    drop(stmt);
    conn.execute_batch("DROP TABLE categories_legacy;")?;
    tracing::info!(carried, "rebuilt legacy categories table");
    Ok(())
}

fn aggregation_indexes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE INDEX IF NOT EXISTS idx_transactions_chat_category
        ON transactions(chat_id, category_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_created
        ON transactions(created_at);
    "#,
    )
}

fn settings(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "#,
    )
}
