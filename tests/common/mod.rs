// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use pennywise::db;
use pennywise::models::{NewTransaction, TxType};
use pennywise::store;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn expense(amount: &str, category: &str, date: &str) -> NewTransaction {
    NewTransaction::new(TxType::Expense, dec(amount), category, d(date))
}

pub fn income(amount: &str, category: &str, date: &str) -> NewTransaction {
    NewTransaction::new(TxType::Income, dec(amount), category, d(date))
}

/// Insert with the live category icon as snapshot, like the CLI does.
pub fn add(conn: &mut Connection, mut new: NewTransaction) -> i64 {
    if let Some(cat) = store::find_category(conn, new.r#type, &new.category).unwrap() {
        new.category_icon = cat.icon;
    }
    store::add_transaction(conn, &new).unwrap()
}
