// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print JSON lines"),
    )
}

fn days_arg() -> Arg {
    Arg::new("days")
        .long("days")
        .value_parser(value_parser!(u32))
        .help("Trailing window in days (default: report_days setting or 30)")
}

fn kind_arg(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .short('t')
        .required(required)
        .value_parser(["income", "expense", "income_source", "expense_category"])
        .help("Category type")
}

fn entry_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("amount")
                .required(true)
                .allow_hyphen_values(true)
                .help("Amount, e.g. 1000 or 500,50"),
        )
        .arg(
            Arg::new("payment")
                .long("payment")
                .short('p')
                .required(true)
                .help("cash | card"),
        )
        .arg(Arg::new("description").long("description").short('d'))
        .arg(
            Arg::new("category")
                .long("category")
                .short('c')
                .help("Category name"),
        )
        .arg(Arg::new("quantity").long("quantity").short('q'))
        .arg(Arg::new("unit_price").long("unit-price"))
        .arg(
            Arg::new("cost")
                .long("cost")
                .help("Cost of goods sold (subtract entries)"),
        )
        .arg(
            Arg::new("user_id")
                .long("user-id")
                .value_parser(value_parser!(i64)),
        )
        .arg(Arg::new("username").long("username"))
}

pub fn build_cli() -> Command {
    Command::new("cashdesk")
        .about("Chat-scoped cash/card ledger with unit economics")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("CASHDESK_DB")
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database path"),
        )
        .arg(
            Arg::new("chat")
                .long("chat")
                .global(true)
                .env("CASHDESK_CHAT")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64))
                .help("Chat id (default: default_chat setting)"),
        )
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .global(true)
                .env("CASHDESK_LOG")
                .default_value("warn")
                .help("tracing filter, e.g. info or cashdesk=debug"),
        )
        .subcommand(Command::new("init").about("Create or migrate the database"))
        .subcommand(json_flags(
            Command::new("balance").about("Show cash and card balances"),
        ))
        .subcommand(json_flags(
            Command::new("history").about("Show recent transactions").arg(
                Arg::new("limit")
                    .long("limit")
                    .short('n')
                    .default_value("10")
                    .value_parser(value_parser!(usize)),
            ),
        ))
        .subcommand(entry_command("add", "Record money coming in"))
        .subcommand(entry_command("subtract", "Record money going out"))
        .subcommand(
            Command::new("say")
                .about("Record a free-text entry such as '+1000 нал' or '-500 card'")
                .arg(
                    Arg::new("text")
                        .required(true)
                        .num_args(1..)
                        .allow_hyphen_values(true),
                )
                .arg(
                    Arg::new("payment")
                        .long("payment")
                        .short('p')
                        .help("Payment type when the text names none"),
                ),
        )
        .subcommand(Command::new("reset").about("Delete every transaction of the chat"))
        .subcommand(
            Command::new("wipe")
                .about("Delete every transaction and category of the chat")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm the irreversible wipe"),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage income sources and expense categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(kind_arg(true))
                        .arg(Arg::new("description").long("description").short('d')),
                )
                .subcommand(json_flags(Command::new("list").arg(kind_arg(false))))
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("name").required(true))
                        .arg(kind_arg(false)),
                )
                .subcommand(json_flags(
                    Command::new("find")
                        .arg(Arg::new("name").required(true))
                        .arg(kind_arg(false)),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Unit economics over a trailing window")
                .subcommand(json_flags(Command::new("summary").arg(days_arg())))
                .subcommand(json_flags(
                    Command::new("by-category")
                        .arg(days_arg())
                        .arg(Arg::new("category").long("category").short('c')),
                ))
                .subcommand(json_flags(Command::new("breakdown").arg(days_arg()))),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .short('f')
                            .default_value("csv")
                            .help("csv | json"),
                    )
                    .arg(Arg::new("out").long("out").short('o').required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check the chat's data for anomalies"))
        .subcommand(
            Command::new("config")
                .about("Show or change stored settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("key")
                                .required(true)
                                .value_parser(["default_chat", "report_days"]),
                        )
                        .arg(
                            Arg::new("value")
                                .required(true)
                                .allow_hyphen_values(true),
                        ),
                ),
        )
}
