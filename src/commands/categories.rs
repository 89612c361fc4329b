// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxType;
use crate::store;
use crate::utils::{id_for_category, maybe_print_json, pretty_table, split_list};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let r#type: TxType = sub.get_one::<String>("type").unwrap().parse()?;
            let name = sub.get_one::<String>("name").unwrap().trim();
            let icon = sub.get_one::<String>("icon").map(String::as_str).unwrap_or("");
            store::add_category(conn, r#type, name, icon)?;
            println!("Added {} category '{}'", r#type, name);
        }
        Some(("list", sub)) => {
            let r#type = sub
                .get_one::<String>("type")
                .map(|t| t.parse::<TxType>())
                .transpose()?;
            let cats = store::list_categories(conn, r#type)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let rows = cats
                    .into_iter()
                    .map(|c| vec![c.r#type.to_string(), c.icon, c.name, c.sort_order.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Type", "Icon", "Category", "Order"], rows));
            }
        }
        Some(("rename", sub)) => {
            let typ = sub.get_one::<String>("type").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let to = sub.get_one::<String>("to").unwrap().trim();
            let id = id_for_category(conn, typ, name)?;
            let rewritten = store::rename_category(conn, id, to, sub.get_flag("propagate"))?;
            println!(
                "Renamed category '{}' to '{}' ({} transactions rewritten)",
                name.trim(),
                to,
                rewritten
            );
        }
        Some(("icon", sub)) => {
            let typ = sub.get_one::<String>("type").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let icon = sub.get_one::<String>("icon").unwrap();
            let id = id_for_category(conn, typ, name)?;
            store::set_category_icon(conn, id, icon)?;
            println!("Icon for '{}' set to {}", name.trim(), icon.trim());
        }
        Some(("rm", sub)) => {
            let typ = sub.get_one::<String>("type").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let id = id_for_category(conn, typ, name)?;
            store::delete_category(conn, id)?;
            println!("Removed category '{}'", name.trim());
        }
        Some(("reorder", sub)) => {
            let typ = sub.get_one::<String>("type").unwrap();
            let r#type: TxType = typ.parse()?;
            let ids = split_list(sub.get_one::<String>("names").unwrap())
                .iter()
                .map(|n| id_for_category(conn, typ, n))
                .collect::<Result<Vec<_>>>()?;
            store::reorder_categories(conn, r#type, &ids)?;
            println!("Reordered {} {} categories", ids.len(), r#type);
        }
        _ => {}
    }
    Ok(())
}
