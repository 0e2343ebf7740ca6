// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod transactions;
pub mod reports;
pub mod exporter;
pub mod doctor;
pub mod settings;

use anyhow::{anyhow, Result};
use rusqlite::Connection;

use crate::economics::DEFAULT_WINDOW_DAYS;
use crate::models::CategoryKind;
use crate::utils::get_setting;

pub(crate) fn arg<'a>(m: &'a clap::ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("Missing required argument '{}'", id))
}

pub(crate) fn opt_arg<'a>(m: &'a clap::ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// `--chat` / `CASHDESK_CHAT`, falling back to the `default_chat` setting.
pub fn chat_id(conn: &Connection, m: &clap::ArgMatches) -> Result<i64> {
    if let Some(id) = m.get_one::<i64>("chat") {
        return Ok(*id);
    }
    match get_setting(conn, "default_chat")? {
        Some(v) => v
            .parse::<i64>()
            .map_err(|_| anyhow!("Stored default_chat '{}' is not a chat id", v)),
        None => Err(anyhow!(
            "No chat selected: pass --chat <id> or run `cashdesk config set default_chat <id>`"
        )),
    }
}

/// `--days`, falling back to the `report_days` setting and then 30.
pub fn window_days(conn: &Connection, m: &clap::ArgMatches) -> Result<u32> {
    if let Some(d) = m.get_one::<u32>("days") {
        return Ok(*d);
    }
    match get_setting(conn, "report_days")? {
        Some(v) => v
            .parse::<u32>()
            .map_err(|_| anyhow!("Stored report_days '{}' is not a day count", v)),
        None => Ok(DEFAULT_WINDOW_DAYS),
    }
}

pub(crate) fn kind_opt(m: &clap::ArgMatches) -> Result<Option<CategoryKind>> {
    Ok(match opt_arg(m, "type") {
        Some(t) => Some(t.parse()?),
        None => None,
    })
}
