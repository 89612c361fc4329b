// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{id_for_tag, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let color = sub.get_one::<String>("color").map(String::as_str);
            store::add_tag(conn, name, color)?;
            println!("Added tag '{}'", name);
        }
        Some(("list", sub)) => {
            let tags = store::list_tags(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tags)? {
                let rows = tags
                    .into_iter()
                    .map(|t| vec![t.id.to_string(), t.name, t.color])
                    .collect();
                println!("{}", pretty_table(&["ID", "Tag", "Color"], rows));
            }
        }
        Some(("edit", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let id = id_for_tag(conn, name)?;
            store::update_tag(
                conn,
                id,
                sub.get_one::<String>("rename").map(String::as_str),
                sub.get_one::<String>("color").map(String::as_str),
            )?;
            println!("Updated tag '{}'", name.trim());
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let id = id_for_tag(conn, name)?;
            store::delete_tag(conn, id)?;
            println!("Removed tag '{}'", name.trim());
        }
        _ => {}
    }
    Ok(())
}
