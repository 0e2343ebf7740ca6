// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cashdesk::models::OperationType;
use cashdesk::{cli, commands, db};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    init_tracing(
        matches
            .get_one::<String>("log_level")
            .map(String::as_str)
            .unwrap_or("warn"),
    );

    let db_path = matches.get_one::<PathBuf>("db").map(PathBuf::as_path);
    let conn = db::open_or_init(db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database ready at {}", db::db_path(db_path)?.display());
        }
        Some(("balance", sub)) => commands::transactions::balance(&conn, sub)?,
        Some(("history", sub)) => commands::transactions::history(&conn, sub)?,
        Some(("add", sub)) => commands::transactions::add(&conn, sub, OperationType::Add)?,
        Some(("subtract", sub)) => {
            commands::transactions::add(&conn, sub, OperationType::Subtract)?
        }
        Some(("say", sub)) => commands::transactions::say(&conn, sub)?,
        Some(("reset", sub)) => commands::transactions::reset(&conn, sub)?,
        Some(("wipe", sub)) => commands::transactions::wipe(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
