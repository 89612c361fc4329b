// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{add, d, dec, expense, income, setup};
use pennywise::budgets::member_budget_usage;
use pennywise::models::TxType;
use pennywise::stats::{Dimension, GroupKey};
use pennywise::{cli, commands::reports, store};

fn stats_args(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["pennywise", "report", "stats"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("report", report_m)) => match report_m.subcommand() {
            Some(("stats", stats_m)) => stats_m.clone(),
            _ => panic!("no stats subcommand"),
        },
        _ => panic!("no report subcommand"),
    }
}

#[test]
fn cli_defaults_to_monthly_expense_by_category() {
    let mut conn = setup();
    add(&mut conn, expense("10", "Food", "2024-05-03"));
    add(&mut conn, expense("4", "Food", "2024-04-20"));
    add(&mut conn, income("100", "Salary", "2024-05-01"));

    let sub = stats_args(&["--anchor", "2024-05-31"]);
    let report = reports::run_stats(&conn, &sub).unwrap();
    assert_eq!(report.r#type, TxType::Expense);
    assert_eq!(report.dimension, Dimension::Category);
    assert_eq!(report.interval.start, d("2024-05-01"));
    assert_eq!(report.prior_interval.start, d("2024-04-01"));
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].key, GroupKey::Category("Food".into()));
    assert_eq!(report.totals.expense, dec("10"));
    assert_eq!(report.totals.income, dec("100"));
    assert_eq!(report.totals.expense_change_pct, dec("150"));
}

#[test]
fn cli_custom_period_needs_both_bounds() {
    let conn = setup();
    let sub = stats_args(&["--period", "custom", "--from", "2024-01-01"]);
    let err = reports::run_stats(&conn, &sub).unwrap_err();
    assert!(err.to_string().contains("--to is required"));

    let sub = stats_args(&[
        "--period",
        "custom",
        "--from",
        "2024-01-01",
        "--to",
        "2025-06-01",
    ]);
    assert!(reports::run_stats(&conn, &sub).is_err());
}

#[test]
fn cli_member_income_report() {
    let mut conn = setup();
    let alex = store::add_member(&conn, "Alex", None).unwrap();
    add(&mut conn, income("30", "Salary", "2024-02-10").with_member(alex));
    add(&mut conn, income("10", "Bonus", "2024-02-11"));

    let sub = stats_args(&[
        "--anchor",
        "2024-02-15",
        "--by",
        "member",
        "--type",
        "income",
    ]);
    let report = reports::run_stats(&conn, &sub).unwrap();
    let names: Vec<&str> = report.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Alex", "Me"]);
    assert_eq!(report.groups[0].percent, dec("75"));
}

#[test]
fn budget_usage_skips_members_without_budget() {
    let mut conn = setup();
    let alex = store::add_member(&conn, "Alex", Some(dec("200"))).unwrap();
    store::add_member(&conn, "Sam", Some(dec("50"))).unwrap();
    add(&mut conn, expense("50", "Food", "2024-03-02").with_member(alex));
    add(&mut conn, expense("30", "Food", "2024-03-09").with_member(alex).refunded(true));
    add(&mut conn, expense("40", "Food", "2024-04-01").with_member(alex));
    add(&mut conn, expense("9", "Food", "2024-03-02"));

    let usage = member_budget_usage(&conn, 2024, 3).unwrap();
    assert_eq!(usage.len(), 2);
    assert_eq!(usage[0].member, "Alex");
    assert_eq!(usage[0].spent, dec("50"));
    assert_eq!(usage[0].remaining, dec("150"));
    assert_eq!(usage[0].used_pct, dec("25"));
    assert_eq!(usage[1].member, "Sam");
    assert_eq!(usage[1].spent, dec("0"));
    assert_eq!(usage[1].remaining, dec("50"));
}
