// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, NewTransaction, SELF_MEMBER_ID, TxType};
use crate::store;
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::{HashMap, hash_map::Entry};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let n = import_transactions(conn, path)?;
            println!("Imported {} transactions from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Live category for the name, or the first category of the type when the
/// name is unknown.
fn resolve_category(
    conn: &Connection,
    r#type: TxType,
    name: &str,
    cache: &mut HashMap<(TxType, String), Category>,
) -> Result<Category> {
    match cache.entry((r#type, name.to_string())) {
        Entry::Occupied(e) => Ok(e.get().clone()),
        Entry::Vacant(e) => {
            let found = match store::find_category(conn, r#type, name)? {
                Some(c) => c,
                None => {
                    let fallback = store::list_categories(conn, Some(r#type))?
                        .into_iter()
                        .next()
                        .ok_or_else(|| anyhow!("No {} categories to import into", r#type))?;
                    tracing::warn!(
                        requested = name,
                        using = %fallback.name,
                        "unknown category, using first available"
                    );
                    fallback
                }
            };
            Ok(e.insert(found).clone())
        }
    }
}

/// Import `date,type,amount,category,note,member,tags,refunded` rows in a
/// single transaction; any bad row aborts the whole file.
pub fn import_transactions(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut category_cache: HashMap<(TxType, String), Category> = HashMap::new();
    let mut member_cache: HashMap<String, i64> = HashMap::new();
    let mut count = 0usize;

    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let row = line + 2;
        let date_raw = rec.get(0).context("date missing")?.trim();
        let type_raw = rec.get(1).context("type missing")?.trim();
        let amount_raw = rec.get(2).context("amount missing")?.trim();
        let category = rec.get(3).unwrap_or("").trim();
        let note = rec
            .get(4)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let member = rec.get(5).unwrap_or("").trim();
        let tags_raw = rec.get(6).unwrap_or("").trim();
        let refunded = parse_flag(rec.get(7).unwrap_or(""));

        let date = parse_date(date_raw).with_context(|| format!("Row {}: bad date", row))?;
        let r#type: TxType = type_raw
            .parse()
            .with_context(|| format!("Row {}: bad type", row))?;
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Row {}: bad amount", row))?
            .abs();

        let cat = resolve_category(&tx, r#type, category, &mut category_cache)?;

        let member_id = if member.is_empty() {
            SELF_MEMBER_ID
        } else {
            match member_cache.entry(member.to_string()) {
                Entry::Occupied(e) => *e.get(),
                Entry::Vacant(e) => {
                    let id: Option<i64> = tx
                        .query_row(
                            "SELECT id FROM members WHERE name=?1",
                            params![member],
                            |r| r.get(0),
                        )
                        .optional()?;
                    *e.insert(id.unwrap_or_else(|| {
                        tracing::warn!(member, "unknown member, using default member");
                        SELF_MEMBER_ID
                    }))
                }
            }
        };

        let mut tag_ids = Vec::new();
        for name in tags_raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            tag_ids.push(store::tag_id_or_create(&tx, name)?);
        }

        let mut new = NewTransaction::new(r#type, amount, &cat.name, date)
            .with_member(member_id)
            .with_tags(&tag_ids)
            .refunded(refunded);
        new.category_icon = cat.icon.clone();
        new.note = note;
        store::insert_transaction(&tx, &new).with_context(|| format!("Row {}", row))?;
        count += 1;
    }
    tx.commit()?;
    tracing::info!(path, count, "transactions imported");
    Ok(count)
}
