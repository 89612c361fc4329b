// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-day income/expense rollup for a calendar month.

use crate::errors::LedgerResult;
use crate::models::TxType;
use crate::period::DateRange;
use crate::stats::accumulate;
use crate::store;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayTotals {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Sparse day map: a day is present when any transaction falls on it, even
/// one that is refunded, but refunded amounts are never summed. Missing days
/// read as zero.
pub fn compute_daily_totals(
    conn: &Connection,
    year: i32,
    month: u32,
) -> LedgerResult<BTreeMap<NaiveDate, DayTotals>> {
    let range = DateRange::for_month(year, month)?;
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for tx in store::transactions_between(conn, &range, None, true)? {
        let day = days.entry(tx.date).or_default();
        if tx.refunded {
            continue;
        }
        match tx.r#type {
            TxType::Income => accumulate(&mut day.income, tx.amount, "daily income")?,
            TxType::Expense => accumulate(&mut day.expense, tx.amount, "daily expense")?,
        }
    }
    tracing::debug!(%range, days = days.len(), "daily totals computed");
    Ok(days)
}

/// Lookup that treats a missing day as `{0, 0}`.
pub fn day_or_zero(days: &BTreeMap<NaiveDate, DayTotals>, date: NaiveDate) -> DayTotals {
    days.get(&date).copied().unwrap_or_default()
}
