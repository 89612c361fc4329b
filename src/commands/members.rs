// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{fmt_money, id_for_member, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let budget = sub
                .get_one::<String>("budget")
                .map(|b| parse_decimal(b))
                .transpose()?;
            store::add_member(conn, name, budget)?;
            println!("Added member '{}'", name);
        }
        Some(("list", sub)) => {
            let members = store::list_members(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &members)? {
                let rows = members
                    .into_iter()
                    .map(|m| {
                        vec![
                            m.id.to_string(),
                            m.name,
                            m.budget.map(|b| fmt_money(&b)).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Member", "Monthly budget"], rows));
            }
        }
        Some(("edit", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let id = id_for_member(conn, name)?;
            let rename = sub.get_one::<String>("rename").map(String::as_str);
            let budget = if sub.get_flag("clear-budget") {
                Some(None)
            } else {
                sub.get_one::<String>("budget")
                    .map(|b| parse_decimal(b))
                    .transpose()?
                    .map(Some)
            };
            store::update_member(conn, id, rename, budget)?;
            println!("Updated member '{}'", name.trim());
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let id = id_for_member(conn, name)?;
            store::delete_member(conn, id)?;
            println!("Removed member '{}'", name.trim());
        }
        _ => {}
    }
    Ok(())
}
