// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Paged chronological ledger listing. Refunded rows are included here; only
//! the reports leave them out.

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Transaction, TxType};
use crate::period::DateRange;
use crate::store::{TX_COLUMNS, query_transactions};
use chrono::NaiveDate;
use rusqlite::{Connection, ToSql};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub r#type: Option<TxType>,
    /// Any of these members; empty means no member filter.
    pub member_ids: Vec<i64>,
    /// Carries at least one of these tags; empty means no tag filter.
    pub tag_ids: Vec<i64>,
    pub category: Option<String>,
    /// Case-insensitive substring of note or category.
    pub search: Option<String>,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    /// Days newest first; rows inside a day newest first.
    pub days: Vec<DayGroup>,
    pub has_more: bool,
}

impl TransactionPage {
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.days.iter().flat_map(|d| d.transactions.iter())
    }

    pub fn len(&self) -> usize {
        self.days.iter().map(|d| d.transactions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// One page (1-based) of the ledger, ordered by date then insertion time,
/// newest first. Fetches `page_size + 1` rows to decide `has_more`.
pub fn list_transactions(
    conn: &Connection,
    page: usize,
    page_size: usize,
    filter: &ListFilter,
) -> LedgerResult<TransactionPage> {
    if page == 0 {
        return Err(LedgerError::InvalidPage("pages start at 1".into()));
    }
    if page_size == 0 {
        return Err(LedgerError::InvalidPage("page size must be positive".into()));
    }
    // SQLite takes LIMIT/OFFSET as i64; a negative OFFSET would read as 0
    let limit = page_size
        .checked_add(1)
        .and_then(|n| i64::try_from(n).ok())
        .ok_or_else(|| LedgerError::InvalidPage(format!("page size {} is too large", page_size)))?;
    let offset = (page - 1)
        .checked_mul(page_size)
        .and_then(|n| i64::try_from(n).ok())
        .ok_or_else(|| {
            LedgerError::InvalidPage(format!("page {} of size {} is out of range", page, page_size))
        })?;

    let mut sql = format!("SELECT {TX_COLUMNS} FROM transactions t WHERE 1=1");
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(t) = filter.r#type {
        sql.push_str(" AND t.type=?");
        params_vec.push(Box::new(t));
    }
    if !filter.member_ids.is_empty() {
        sql.push_str(&format!(
            " AND t.member_id IN ({})",
            placeholders(filter.member_ids.len())
        ));
        for id in &filter.member_ids {
            params_vec.push(Box::new(*id));
        }
    }
    if !filter.tag_ids.is_empty() {
        sql.push_str(&format!(
            " AND t.id IN (SELECT transaction_id FROM transaction_tags WHERE tag_id IN ({}))",
            placeholders(filter.tag_ids.len())
        ));
        for id in &filter.tag_ids {
            params_vec.push(Box::new(*id));
        }
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND t.category=?");
        params_vec.push(Box::new(cat.clone()));
    }
    if let Some(text) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(
            " AND (IFNULL(t.note,'') LIKE ? ESCAPE '\\' OR t.category LIKE ? ESCAPE '\\')",
        );
        let pat = like_pattern(text);
        params_vec.push(Box::new(pat.clone()));
        params_vec.push(Box::new(pat));
    }
    if let Some(range) = &filter.date_range {
        sql.push_str(" AND t.date BETWEEN ? AND ?");
        params_vec.push(Box::new(range.start));
        params_vec.push(Box::new(range.end));
    }
    sql.push_str(" ORDER BY t.date DESC, t.created_at DESC, t.id DESC LIMIT ? OFFSET ?");
    params_vec.push(Box::new(limit));
    params_vec.push(Box::new(offset));

    let mut rows = query_transactions(
        conn,
        &sql,
        rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
    )?;
    let has_more = rows.len() > page_size;
    rows.truncate(page_size);

    let mut days: Vec<DayGroup> = Vec::new();
    for tx in rows {
        match days.last_mut() {
            Some(day) if day.date == tx.date => day.transactions.push(tx),
            _ => days.push(DayGroup {
                date: tx.date,
                transactions: vec![tx],
            }),
        }
    }
    Ok(TransactionPage { days, has_more })
}
