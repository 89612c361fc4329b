// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn with_json(cmd: Command) -> Command {
    cmd.arg(flag("json", "Print pretty JSON"))
        .arg(flag("jsonl", "Print one JSON object per line"))
}

fn period_args(cmd: Command) -> Command {
    cmd.arg(
        opt("period", "month | year | custom")
            .default_value("month")
            .value_parser(["month", "year", "custom"]),
    )
    .arg(opt("anchor", "Anchor date YYYY-MM-DD (default: today)"))
    .arg(opt("from", "Custom range start YYYY-MM-DD"))
    .arg(opt("to", "Custom range end YYYY-MM-DD"))
    .arg(
        opt("by", "category | member | tag")
            .default_value("category")
            .value_parser(["category", "member", "tag"]),
    )
    .arg(type_arg().default_value("expense"))
}

fn type_arg() -> Arg {
    opt("type", "income | expense").value_parser(["income", "expense"])
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(type_arg().default_value("expense"))
                .arg(req("amount", "Amount, a positive number"))
                .arg(req("category", "Category name"))
                .arg(opt("date", "Date YYYY-MM-DD (default: today)"))
                .arg(opt("note", "Free text note"))
                .arg(opt("member", "Member name (default: the default member)"))
                .arg(opt("tag", "Tag name, repeatable").action(ArgAction::Append))
                .arg(flag("refunded", "Record as already refunded")),
        )
        .subcommand(
            Command::new("edit")
                .about("Change fields of a transaction")
                .arg(req("id", "Transaction id").value_parser(value_parser!(i64)))
                .arg(type_arg())
                .arg(opt("amount", "New amount"))
                .arg(opt("category", "New category name"))
                .arg(opt("date", "New date YYYY-MM-DD"))
                .arg(opt("note", "New note"))
                .arg(flag("clear-note", "Remove the note"))
                .arg(opt("member", "New member name"))
                .arg(opt("tags", "Replace the tag set, comma separated ('' clears)")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(req("id", "Transaction id").value_parser(value_parser!(i64))),
        )
        .subcommand(
            Command::new("refund")
                .about("Mark a transaction refunded")
                .arg(req("id", "Transaction id").value_parser(value_parser!(i64)))
                .arg(flag("undo", "Clear the refunded flag instead")),
        )
        .subcommand(with_json(
            Command::new("list")
                .about("List transactions newest first, one page at a time")
                .arg(
                    opt("page", "Page number, from 1")
                        .default_value("1")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    opt("page-size", "Rows per page")
                        .default_value("20")
                        .value_parser(value_parser!(usize)),
                )
                .arg(type_arg())
                .arg(opt("member", "Member name, repeatable").action(ArgAction::Append))
                .arg(opt("tag", "Tag name, repeatable").action(ArgAction::Append))
                .arg(opt("category", "Category name"))
                .arg(opt("search", "Text in note or category"))
                .arg(opt("from", "Start date YYYY-MM-DD"))
                .arg(opt("to", "End date YYYY-MM-DD")),
        ))
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(type_arg().required(true))
                .arg(req("name", "Category name"))
                .arg(opt("icon", "Display icon").default_value("")),
        )
        .subcommand(with_json(Command::new("list").arg(type_arg())))
        .subcommand(
            Command::new("rename")
                .arg(type_arg().required(true))
                .arg(req("name", "Current name"))
                .arg(req("to", "New name"))
                .arg(flag(
                    "propagate",
                    "Also rewrite past transactions carrying the old name",
                )),
        )
        .subcommand(
            Command::new("icon")
                .arg(type_arg().required(true))
                .arg(req("name", "Category name"))
                .arg(req("icon", "New icon")),
        )
        .subcommand(
            Command::new("rm")
                .arg(type_arg().required(true))
                .arg(req("name", "Category name")),
        )
        .subcommand(
            Command::new("reorder")
                .arg(type_arg().required(true))
                .arg(req("names", "Category names in display order, comma separated")),
        )
}

fn member_cmd() -> Command {
    Command::new("member")
        .about("Manage household members")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("name", "Member name"))
                .arg(opt("budget", "Monthly budget")),
        )
        .subcommand(with_json(Command::new("list")))
        .subcommand(
            Command::new("edit")
                .arg(req("name", "Member name"))
                .arg(opt("rename", "New name"))
                .arg(opt("budget", "New monthly budget"))
                .arg(flag("clear-budget", "Remove the monthly budget")),
        )
        .subcommand(Command::new("rm").arg(req("name", "Member name")))
}

fn tag_cmd() -> Command {
    Command::new("tag")
        .about("Manage tags")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("name", "Tag name"))
                .arg(opt("color", "Color #RRGGBB")),
        )
        .subcommand(with_json(Command::new("list")))
        .subcommand(
            Command::new("edit")
                .arg(req("name", "Tag name"))
                .arg(opt("rename", "New name"))
                .arg(opt("color", "New color #RRGGBB")),
        )
        .subcommand(Command::new("rm").arg(req("name", "Tag name")))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Statistics over the ledger")
        .subcommand_required(true)
        .subcommand(with_json(period_args(
            Command::new("stats").about("Ranked groups, totals and month-over-month change"),
        )))
        .subcommand(with_json(
            period_args(Command::new("drill").about("Transactions behind one group"))
                .arg(req("key", "Category, member or tag name")),
        ))
        .subcommand(with_json(
            Command::new("calendar")
                .about("Income and expense per day of a month")
                .arg(req("month", "Month YYYY-MM")),
        ))
        .subcommand(with_json(
            Command::new("trend")
                .about("Income and expense per month of a year")
                .arg(req("year", "Year").value_parser(value_parser!(i32))),
        ))
        .subcommand(with_json(
            Command::new("budgets")
                .about("Member spending against monthly budgets")
                .arg(req("month", "Month YYYY-MM")),
        ))
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .version(crate_version!())
        .about("Household ledger with category, member and tag reports")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("Database file (default: $PENNYWISE_DB or the platform data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(tx_cmd())
        .subcommand(category_cmd())
        .subcommand(member_cmd())
        .subcommand(tag_cmd())
        .subcommand(report_cmd())
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions")
                    .about("Import transactions from CSV")
                    .arg(req("path", "CSV file")),
            ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .about("Export transactions")
                    .arg(opt("format", "csv | json").default_value("csv"))
                    .arg(req("out", "Output file")),
            ),
        )
}
