// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::arg;
use crate::db;
use crate::economics::DEFAULT_WINDOW_DAYS;
use crate::utils::{get_setting, pretty_table, set_setting};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let path = db::db_path(sub.get_one::<PathBuf>("db").map(PathBuf::as_path))?;
            let default_chat = get_setting(conn, "default_chat")?.unwrap_or_else(|| "-".into());
            let days = get_setting(conn, "report_days")?
                .unwrap_or_else(|| format!("{} (default)", DEFAULT_WINDOW_DAYS));
            let versions = db::applied_versions(conn)?;
            let rows = vec![
                vec!["database".to_string(), path.display().to_string()],
                vec!["default_chat".to_string(), default_chat],
                vec!["report_days".to_string(), days],
                vec![
                    "schema_version".to_string(),
                    versions.last().map(|v| v.to_string()).unwrap_or_default(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = arg(sub, "value")?.trim();
            match key {
                "default_chat" => {
                    value
                        .parse::<i64>()
                        .with_context(|| format!("Invalid chat id '{}'", value))?;
                }
                "report_days" => {
                    value
                        .parse::<u32>()
                        .with_context(|| format!("Invalid day count '{}'", value))?;
                }
                other => bail!("Unknown setting '{}'", other),
            }
            set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
