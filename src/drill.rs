// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Drill-through: the transactions behind one aggregate group.

use crate::errors::LedgerResult;
use crate::models::{Transaction, TxType};
use crate::period::DateRange;
use crate::stats::{GroupKey, contributing_rows};
use rusqlite::Connection;

/// Every transaction that fed `key`'s amount in a report over `interval`,
/// newest first. Uses the same row source and group membership as
/// [`crate::stats::compute_stats`], so the amounts add up to the group total.
pub fn list_contributing(
    conn: &Connection,
    interval: &DateRange,
    key: &GroupKey,
    r#type: TxType,
) -> LedgerResult<Vec<Transaction>> {
    let dimension = key.dimension();
    let mut rows: Vec<Transaction> = contributing_rows(conn, interval, r#type)?
        .into_iter()
        .filter(|tx| dimension.keys_of(tx).contains(key))
        .collect();
    rows.reverse();
    tracing::debug!(%interval, %key, rows = rows.len(), "drill-through listed");
    Ok(rows)
}
