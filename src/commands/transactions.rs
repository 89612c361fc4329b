// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::listing::{self, ListFilter, TransactionPage};
use crate::models::{NewTransaction, SELF_MEMBER_ID, TransactionPatch, TxType};
use crate::period::DateRange;
use crate::store;
use crate::utils::{
    fmt_money, id_for_member, id_for_tag, maybe_print_json, parse_date, parse_decimal,
    pretty_table, split_list,
};
use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::delete_transaction(conn, id)?;
            println!("Deleted transaction {}", id);
        }
        Some(("refund", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let refunded = !sub.get_flag("undo");
            store::set_refunded(conn, id, refunded)?;
            if refunded {
                println!("Transaction {} marked refunded", id);
            } else {
                println!("Transaction {} no longer refunded", id);
            }
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Live icon for a category name; the category must exist for its type.
fn category_icon(conn: &Connection, r#type: TxType, name: &str) -> Result<String> {
    let cat = store::find_category(conn, r#type, name)?
        .with_context(|| format!("Category '{}' ({}) not found", name.trim(), r#type))?;
    Ok(cat.icon)
}

fn tag_ids(conn: &Connection, names: &[String]) -> Result<Vec<i64>> {
    names.iter().map(|n| id_for_tag(conn, n)).collect()
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let r#type: TxType = sub.get_one::<String>("type").unwrap().parse()?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let member_id = match sub.get_one::<String>("member") {
        Some(name) => id_for_member(conn, name)?,
        None => SELF_MEMBER_ID,
    };
    let tag_names: Vec<String> = sub
        .get_many::<String>("tag")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    let mut new = NewTransaction::new(r#type, amount, &category, date)
        .with_member(member_id)
        .with_tags(&tag_ids(conn, &tag_names)?)
        .refunded(sub.get_flag("refunded"));
    new.category_icon = category_icon(conn, r#type, &category)?;
    new.note = sub
        .get_one::<String>("note")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let id = store::add_transaction(conn, &new)?;
    println!(
        "Recorded {} {} in '{}' on {} (id {})",
        r#type,
        fmt_money(&amount),
        category,
        date,
        id
    );
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let current = store::get_transaction(conn, id)?;
    let mut patch = TransactionPatch::default();

    if let Some(t) = sub.get_one::<String>("type") {
        patch.r#type = Some(t.parse()?);
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        patch.amount = Some(parse_decimal(a)?);
    }
    let r#type = patch.r#type.unwrap_or(current.r#type);
    if let Some(c) = sub.get_one::<String>("category") {
        patch.category_icon = Some(category_icon(conn, r#type, c)?);
        patch.category = Some(c.trim().to_string());
    } else if r#type != current.r#type {
        // the kept category must also exist for the new type
        patch.category_icon = Some(category_icon(conn, r#type, &current.category)?);
    }
    if let Some(d) = sub.get_one::<String>("date") {
        patch.date = Some(parse_date(d)?);
    }
    if sub.get_flag("clear-note") {
        patch.note = Some(None);
    } else if let Some(n) = sub.get_one::<String>("note") {
        patch.note = Some(Some(n.trim().to_string()));
    }
    if let Some(name) = sub.get_one::<String>("member") {
        patch.member_id = Some(id_for_member(conn, name)?);
    }
    if let Some(raw) = sub.get_one::<String>("tags") {
        patch.tags = Some(tag_ids(conn, &split_list(raw))?);
    }

    if patch.is_empty() {
        println!("Nothing to change for transaction {}", id);
        return Ok(());
    }
    store::update_transaction(conn, id, &patch)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn filter_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<ListFilter> {
    let mut filter = ListFilter::default();
    if let Some(t) = sub.get_one::<String>("type") {
        filter.r#type = Some(t.parse()?);
    }
    if let Some(names) = sub.get_many::<String>("member") {
        for n in names {
            filter.member_ids.push(id_for_member(conn, n)?);
        }
    }
    if let Some(names) = sub.get_many::<String>("tag") {
        for n in names {
            filter.tag_ids.push(id_for_tag(conn, n)?);
        }
    }
    filter.category = sub.get_one::<String>("category").map(|s| s.trim().to_string());
    filter.search = sub.get_one::<String>("search").cloned();
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    filter.date_range = DateRange::open(from, to)?;
    Ok(filter)
}

/// Resolve the `tx list` arguments and fetch the requested page.
pub fn query_page(conn: &Connection, sub: &clap::ArgMatches) -> Result<TransactionPage> {
    let page = *sub.get_one::<usize>("page").unwrap_or(&1);
    let page_size = *sub.get_one::<usize>("page-size").unwrap_or(&20);
    let filter = filter_from_args(conn, sub)?;
    Ok(listing::list_transactions(conn, page, page_size, &filter)?)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = query_page(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &page)? {
        return Ok(());
    }

    let members: HashMap<i64, String> = store::list_members(conn)?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect();
    let tags: HashMap<i64, String> = store::list_tags(conn)?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let rows: Vec<Vec<String>> = page
        .transactions()
        .map(|t| {
            let tag_names: Vec<&str> = t
                .tags
                .iter()
                .filter_map(|id| tags.get(id).map(String::as_str))
                .collect();
            vec![
                t.date.to_string(),
                t.id.to_string(),
                t.r#type.to_string(),
                fmt_money(&t.amount),
                format!("{} {}", t.category_icon, t.category).trim().to_string(),
                members.get(&t.member_id).cloned().unwrap_or_default(),
                tag_names.join(", "),
                t.note.clone().unwrap_or_default(),
                if t.refunded { "yes".into() } else { String::new() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "ID", "Type", "Amount", "Category", "Member", "Tags", "Note", "Refunded"],
            rows,
        )
    );
    if page.has_more {
        println!("More rows available: use --page to continue");
    }
    Ok(())
}
