// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{dec, setup};
use pennywise::models::SELF_MEMBER_ID;
use pennywise::{cli, commands::importer, store};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "date,type,amount,category,note,member,tags,refunded";

fn csv_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = setup();
    let file = csv_file(&["2025-02-03,expense,5.00,Food,,,,"]);

    let path = file.path().to_str().unwrap().to_string();
    let padded = format!("  {}  ", path);
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["pennywise", "import", "transactions", "--path", &padded]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&mut conn, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }
    assert_eq!(count(&conn), 1);
}

#[test]
fn importer_resolves_names_and_creates_tags() {
    let mut conn = setup();
    let alex = store::add_member(&conn, "Alex", None).unwrap();
    let file = csv_file(&[
        "2025-02-03,expense,-20.00, Transport ,  bus pass  ,Alex,commute; work,no",
        "2025-02-04,income,1000,Salary,,,,true",
    ]);
    let n = importer::import_transactions(&mut conn, file.path().to_str().unwrap()).unwrap();
    assert_eq!(n, 2);

    let bus = store::get_transaction(&conn, 1).unwrap();
    assert_eq!(bus.amount, dec("20.00"));
    assert_eq!(bus.category, "Transport");
    assert_eq!(bus.category_icon, "🚌");
    assert_eq!(bus.note.as_deref(), Some("bus pass"));
    assert_eq!(bus.member_id, alex);
    assert!(!bus.refunded);

    let tags = store::list_tags(&conn).unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["commute", "work"]);
    assert_eq!(bus.tags.len(), 2);

    let pay = store::get_transaction(&conn, 2).unwrap();
    assert_eq!(pay.member_id, SELF_MEMBER_ID);
    assert!(pay.refunded);
    assert_eq!(pay.note, None);
}

#[test]
fn importer_falls_back_for_unknown_category_and_member() {
    let mut conn = setup();
    let file = csv_file(&[
        "2025-02-03,expense,7,Mystery,,Nobody,,",
        "2025-02-03,income,9,Lottery,,,,",
    ]);
    importer::import_transactions(&mut conn, file.path().to_str().unwrap()).unwrap();

    let spend = store::get_transaction(&conn, 1).unwrap();
    assert_eq!(spend.category, "Food");
    assert_eq!(spend.category_icon, "🍔");
    assert_eq!(spend.member_id, SELF_MEMBER_ID);

    let gain = store::get_transaction(&conn, 2).unwrap();
    assert_eq!(gain.category, "Salary");
    assert_eq!(store::list_members(&conn).unwrap().len(), 1);
}

#[test]
fn importer_rejects_invalid_date_and_keeps_nothing() {
    let mut conn = setup();
    let file = csv_file(&[
        "2025-02-03,expense,5,Food,,,newtag,",
        "2025-13-03,expense,5,Food,,,,",
    ]);

    let path = file.path().to_str().unwrap().to_string();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["pennywise", "import", "transactions", "--path", &path]);
    if let Some(("import", import_m)) = matches.subcommand() {
        let err = importer::handle(&mut conn, import_m).unwrap_err();
        assert!(format!("{:#}", err).contains("Row 3: bad date"));
    } else {
        panic!("no import subcommand");
    }
    assert_eq!(count(&conn), 0);
    assert!(store::list_tags(&conn).unwrap().is_empty());
}

#[test]
fn importer_rejects_unknown_type() {
    let mut conn = setup();
    let file = csv_file(&["2025-02-03,transfer,5,Food,,,,"]);
    let err = importer::import_transactions(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("Row 2: bad type"));
    assert_eq!(count(&conn), 0);
}
