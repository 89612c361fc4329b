// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budgets::member_budget_usage;
use crate::calendar::compute_daily_totals;
use crate::drill::list_contributing;
use crate::models::TxType;
use crate::period::{self, PeriodKind, PeriodRequest};
use crate::stats::{
    Dimension, GroupKey, StatsReport, StatsRequest, accumulate, compute_stats, monthly_trend,
};
use crate::utils::{
    fmt_money, fmt_pct, id_for_member, id_for_tag, maybe_print_json, parse_date, parse_month,
    pretty_table,
};
use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("stats", sub)) => stats(conn, sub)?,
        Some(("drill", sub)) => drill(conn, sub)?,
        Some(("calendar", sub)) => calendar(conn, sub)?,
        Some(("trend", sub)) => trend(conn, sub)?,
        Some(("budgets", sub)) => budgets(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Build the report request from `--period/--anchor/--from/--to/--by/--type`.
pub fn request_from_args(sub: &clap::ArgMatches) -> Result<StatsRequest> {
    let kind: PeriodKind = sub.get_one::<String>("period").unwrap().parse()?;
    let anchor = match sub.get_one::<String>("anchor") {
        Some(a) => parse_date(a)?,
        None => Local::now().date_naive(),
    };
    let period = match kind {
        PeriodKind::Month => PeriodRequest::month(anchor),
        PeriodKind::Year => PeriodRequest::year(anchor),
        PeriodKind::Custom => {
            let from = parse_date(
                sub.get_one::<String>("from")
                    .context("--from is required for a custom period")?,
            )?;
            let to = parse_date(
                sub.get_one::<String>("to")
                    .context("--to is required for a custom period")?,
            )?;
            PeriodRequest::custom(anchor, from, to)
        }
    };
    let dimension: Dimension = sub.get_one::<String>("by").unwrap().parse()?;
    let r#type: TxType = sub.get_one::<String>("type").unwrap().parse()?;
    Ok(StatsRequest {
        period,
        dimension,
        r#type,
    })
}

pub fn run_stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<StatsReport> {
    let req = request_from_args(sub)?;
    Ok(compute_stats(conn, &req)?)
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = run_stats(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let rows = report
        .groups
        .iter()
        .map(|g| {
            vec![
                g.icon.clone().unwrap_or_default(),
                g.name.clone(),
                fmt_money(&g.amount),
                fmt_pct(&g.percent),
            ]
        })
        .collect();
    println!(
        "{} by {:?} for {}",
        report.r#type, report.dimension, report.interval
    );
    println!("{}", pretty_table(&["", "Group", "Amount", "Share"], rows));
    let t = &report.totals;
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Balance", "Income vs prior month", "Expense vs prior month"],
            vec![vec![
                fmt_money(&t.income),
                fmt_money(&t.expense),
                fmt_money(&t.balance),
                fmt_pct(&t.income_change_pct),
                fmt_pct(&t.expense_change_pct),
            ]],
        )
    );
    Ok(())
}

fn drill(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let req = request_from_args(sub)?;
    let resolved = period::resolve(&req.period)?;
    let raw = sub.get_one::<String>("key").unwrap().trim().to_string();
    let key = match req.dimension {
        Dimension::Category => GroupKey::Category(raw),
        Dimension::Member => GroupKey::Member(id_for_member(conn, &raw)?),
        Dimension::Tag => GroupKey::Tag(id_for_tag(conn, &raw)?),
    };
    let rows = list_contributing(conn, &resolved.current, &key, req.r#type)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let mut total = rust_decimal::Decimal::ZERO;
    for t in &rows {
        accumulate(&mut total, t.amount, "drill-through total")?;
    }
    let data = rows
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.id.to_string(),
                fmt_money(&t.amount),
                t.category.clone(),
                t.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Date", "ID", "Amount", "Category", "Note"], data));
    println!("Total for {}: {}", key, fmt_money(&total));
    Ok(())
}

fn calendar(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let days = compute_daily_totals(conn, year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &days)? {
        return Ok(());
    }
    let rows = days
        .iter()
        .map(|(d, t)| vec![d.to_string(), fmt_money(&t.income), fmt_money(&t.expense)])
        .collect();
    println!("{}", pretty_table(&["Date", "Income", "Expense"], rows));
    Ok(())
}

fn trend(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub.get_one::<i32>("year").unwrap();
    let months = monthly_trend(conn, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &months)? {
        return Ok(());
    }
    let rows = months
        .iter()
        .map(|m| {
            vec![
                format!("{}-{:02}", year, m.month),
                fmt_money(&m.income),
                fmt_money(&m.expense),
                fmt_money(&m.balance),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Income", "Expense", "Balance"], rows));
    Ok(())
}

fn budgets(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let usage = member_budget_usage(conn, year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &usage)? {
        return Ok(());
    }
    let rows = usage
        .into_iter()
        .map(|u| {
            vec![
                u.member,
                fmt_money(&u.budget),
                fmt_money(&u.spent),
                fmt_money(&u.remaining),
                fmt_pct(&u.used_pct),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Member", "Budget", "Spent", "Remaining", "Used"], rows)
    );
    Ok(())
}
