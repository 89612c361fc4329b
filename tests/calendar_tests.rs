// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{add, d, dec, expense, income, setup};
use pennywise::LedgerError;
use pennywise::calendar::{DayTotals, compute_daily_totals, day_or_zero};
use rust_decimal::Decimal;

#[test]
fn daily_totals_are_sparse_and_skip_refunds() {
    let mut conn = setup();
    add(&mut conn, expense("10", "Food", "2024-03-01"));
    add(&mut conn, expense("2.50", "Transport", "2024-03-01"));
    add(&mut conn, income("5", "Bonus", "2024-03-01"));
    add(&mut conn, expense("7", "Food", "2024-03-02").refunded(true));
    add(&mut conn, expense("3", "Food", "2024-03-31"));
    add(&mut conn, expense("50", "Food", "2024-02-29"));
    add(&mut conn, expense("50", "Food", "2024-04-01"));

    let days = compute_daily_totals(&conn, 2024, 3).unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(
        days[&d("2024-03-01")],
        DayTotals {
            income: dec("5"),
            expense: dec("12.50"),
        }
    );
    // the refunded row still marks the day, but adds nothing
    assert_eq!(days[&d("2024-03-02")], DayTotals::default());
    assert_eq!(days[&d("2024-03-31")].expense, dec("3"));
    assert!(!days.contains_key(&d("2024-03-05")));
    assert_eq!(day_or_zero(&days, d("2024-03-05")).expense, Decimal::ZERO);
}

#[test]
fn daily_totals_serialize_with_iso_keys() {
    let mut conn = setup();
    add(&mut conn, income("8", "Salary", "2024-06-09"));
    let days = compute_daily_totals(&conn, 2024, 6).unwrap();
    let v = serde_json::to_value(&days).unwrap();
    assert_eq!(v["2024-06-09"]["income"], "8");
    assert_eq!(v["2024-06-09"]["expense"], "0");
}

#[test]
fn invalid_month_is_rejected() {
    let conn = setup();
    assert!(matches!(
        compute_daily_totals(&conn, 2024, 13),
        Err(LedgerError::InvalidRange(_))
    ));
}

#[test]
fn daily_overflow_is_an_error() {
    let mut conn = setup();
    add(
        &mut conn,
        expense("79228162514264337593543950335", "Food", "2024-03-01"),
    );
    add(&mut conn, expense("1", "Transport", "2024-03-01"));
    assert!(matches!(
        compute_daily_totals(&conn, 2024, 3),
        Err(LedgerError::AmountOverflow(_))
    ));
}
