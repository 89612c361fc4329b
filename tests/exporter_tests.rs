// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{add, expense, income, setup};
use pennywise::{cli, commands::exporter, commands::importer, store};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn run_export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pennywise",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_writes_pretty_json() {
    let mut conn = setup();
    let alex = store::add_member(&conn, "Alex", None).unwrap();
    let work = store::add_tag(&conn, "work", None).unwrap();
    add(
        &mut conn,
        expense("12.34", "Food", "2025-01-02")
            .with_note("Weekly run")
            .with_member(alex)
            .with_tags(&[work]),
    );
    add(&mut conn, income("100", "Salary", "2025-01-01").refunded(true));

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(&conn, "json", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2025-01-01",
                "type": "income",
                "amount": "100",
                "category": "Salary",
                "note": null,
                "member": "Me",
                "tags": [],
                "refunded": true
            },
            {
                "date": "2025-01-02",
                "type": "expense",
                "amount": "12.34",
                "category": "Food",
                "note": "Weekly run",
                "member": "Alex",
                "tags": ["work"],
                "refunded": false
            }
        ])
    );
}

#[test]
fn csv_export_reimports_into_a_fresh_ledger() {
    let mut conn = setup();
    let a = store::add_tag(&conn, "a", None).unwrap();
    let b = store::add_tag(&conn, "b", None).unwrap();
    add(&mut conn, expense("3.50", "Transport", "2025-03-01").with_tags(&[a, b]));
    add(&mut conn, expense("8", "Food", "2025-03-02").with_note("pizza, large"));

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("ledger.csv");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(&conn, "csv", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        contents.lines().next().unwrap(),
        exporter::HEADER.join(",")
    );

    let mut fresh = setup();
    let n = importer::import_transactions(&mut fresh, &out_str).unwrap();
    assert_eq!(n, 2);
    let first = store::get_transaction(&fresh, 1).unwrap();
    assert_eq!(first.category, "Transport");
    assert_eq!(first.tags.len(), 2);
    let second = store::get_transaction(&fresh, 2).unwrap();
    assert_eq!(second.note.as_deref(), Some("pizza, large"));
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();
    assert!(run_export(&conn, "xml", &out_str).is_err());
    assert!(!out_path.exists());
}
