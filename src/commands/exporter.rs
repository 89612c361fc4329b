// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{self, TX_COLUMNS, query_transactions};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;

pub const HEADER: [&str; 8] = [
    "date", "type", "amount", "category", "note", "member", "tags", "refunded",
];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
            let out = sub.get_one::<String>("out").unwrap();
            export_transactions(conn, &fmt, out)?;
            println!("Exported transactions to {}", out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Write the whole ledger, oldest first, in the import column layout.
pub fn export_transactions(conn: &Connection, fmt: &str, out: &str) -> Result<()> {
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let members: HashMap<i64, String> = store::list_members(conn)?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect();
    let tags: HashMap<i64, String> = store::list_tags(conn)?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let sql = format!("SELECT {TX_COLUMNS} FROM transactions t ORDER BY t.date, t.created_at, t.id");
    let rows = query_transactions(conn, &sql, [])?;

    let records: Vec<[String; 8]> = rows
        .iter()
        .map(|t| {
            let tag_names: Vec<&str> = t
                .tags
                .iter()
                .filter_map(|id| tags.get(id).map(String::as_str))
                .collect();
            [
                t.date.to_string(),
                t.r#type.to_string(),
                t.amount.to_string(),
                t.category.clone(),
                t.note.clone().unwrap_or_default(),
                members.get(&t.member_id).cloned().unwrap_or_default(),
                tag_names.join(";"),
                t.refunded.to_string(),
            ]
        })
        .collect();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(HEADER)?;
        for rec in &records {
            wtr.write_record(rec)?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = rows
            .iter()
            .zip(&records)
            .map(|(t, r)| {
                json!({
                    "date": r[0], "type": r[1], "amount": r[2], "category": r[3],
                    "note": t.note, "member": r[5],
                    "tags": r[6].split(';').filter(|s| !s.is_empty()).collect::<Vec<_>>(),
                    "refunded": t.refunded
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    tracing::info!(out, count = records.len(), fmt, "transactions exported");
    Ok(())
}
