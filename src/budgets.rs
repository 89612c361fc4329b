// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::LedgerResult;
use crate::models::TxType;
use crate::period::DateRange;
use crate::stats::{Dimension, GroupKey, contributing_rows, group_amounts, share_of};
use crate::store;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub member_id: i64,
    pub member: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub used_pct: Decimal,
}

/// Expense against each member's monthly cap. Members without a budget are
/// skipped.
pub fn member_budget_usage(
    conn: &Connection,
    year: i32,
    month: u32,
) -> LedgerResult<Vec<BudgetUsage>> {
    let range = DateRange::for_month(year, month)?;
    let rows = contributing_rows(conn, &range, TxType::Expense)?;
    let spent: HashMap<i64, Decimal> = group_amounts(&rows, Dimension::Member)?
        .into_iter()
        .filter_map(|(key, amt)| match key {
            GroupKey::Member(id) => Some((id, amt)),
            _ => None,
        })
        .collect();

    let mut out = Vec::new();
    for m in store::list_members(conn)? {
        let Some(budget) = m.budget else { continue };
        let used = spent.get(&m.id).copied().unwrap_or(Decimal::ZERO);
        out.push(BudgetUsage {
            member_id: m.id,
            member: m.name,
            budget,
            spent: used,
            remaining: budget - used,
            used_pct: share_of(used, budget),
        });
    }
    Ok(out)
}
