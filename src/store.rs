// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger store: the only code that writes transactions, members, tags and
//! categories. Every multi-statement write runs inside one SQLite
//! transaction, so a failure leaves the database as it was.

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{
    Category, Member, NewTransaction, SELF_MEMBER_ID, Tag, Transaction, TransactionPatch, TxType,
};
use crate::period::DateRange;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use rust_decimal::Decimal;

pub const DEFAULT_TAG_COLOR: &str = "#9E9E9E";

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern compiles"));

pub(crate) const TX_COLUMNS: &str = "t.id, t.type, t.amount, t.category, t.category_icon, \
     t.note, t.date, t.member_id, t.refunded, t.created_at";

fn parse_decimal_column(idx: usize, raw: &str) -> rusqlite::Result<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn tx_from_row(r: &Row) -> rusqlite::Result<Transaction> {
    let amount: String = r.get(2)?;
    Ok(Transaction {
        id: r.get(0)?,
        r#type: r.get(1)?,
        amount: parse_decimal_column(2, &amount)?,
        category: r.get(3)?,
        category_icon: r.get(4)?,
        note: r.get(5)?,
        date: r.get(6)?,
        member_id: r.get(7)?,
        refunded: r.get(8)?,
        tags: Vec::new(),
        created_at: r.get(9)?,
    })
}

/// Run a query selecting `TX_COLUMNS` and fill in each row's tag set.
pub(crate) fn query_transactions<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> LedgerResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(sql)?;
    let mut out = stmt
        .query_map(params, tx_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    attach_tags(conn, &mut out)?;
    Ok(out)
}

fn attach_tags(conn: &Connection, txs: &mut [Transaction]) -> LedgerResult<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT tag_id FROM transaction_tags WHERE transaction_id=?1 ORDER BY tag_id",
    )?;
    for tx in txs.iter_mut() {
        tx.tags = stmt
            .query_map([tx.id], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
    }
    Ok(())
}

fn check_amount(amount: Decimal) -> LedgerResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

fn check_color(color: &str) -> LedgerResult<()> {
    if !COLOR_RE.is_match(color) {
        return Err(LedgerError::InvalidColor(color.to_string()));
    }
    Ok(())
}

fn normalized_tags(tags: &[i64]) -> Vec<i64> {
    let mut out = tags.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn write_tags(conn: &Connection, transaction_id: i64, tags: &[i64]) -> LedgerResult<()> {
    let mut stmt = conn
        .prepare_cached("INSERT INTO transaction_tags(transaction_id, tag_id) VALUES (?1, ?2)")?;
    for tag_id in normalized_tags(tags) {
        stmt.execute(params![transaction_id, tag_id])?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Insert a transaction and its tag rows. The caller owns the transaction
/// boundary; use [`add_transaction`] for a self-contained write.
pub fn insert_transaction(conn: &Connection, new: &NewTransaction) -> LedgerResult<i64> {
    check_amount(new.amount)?;
    conn.execute(
        "INSERT INTO transactions(type, amount, category, category_icon, note, date, member_id, refunded, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            new.r#type,
            new.amount.to_string(),
            new.category,
            new.category_icon,
            new.note,
            new.date,
            new.member_id,
            new.refunded,
            now_stamp(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    write_tags(conn, id, &new.tags)?;
    tracing::debug!(id, kind = %new.r#type, amount = %new.amount, "transaction inserted");
    Ok(id)
}

pub fn add_transaction(conn: &mut Connection, new: &NewTransaction) -> LedgerResult<i64> {
    let tx = conn.transaction()?;
    let id = insert_transaction(&tx, new)?;
    tx.commit()?;
    Ok(id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> LedgerResult<Transaction> {
    let sql = format!("SELECT {TX_COLUMNS} FROM transactions t WHERE t.id=?1");
    query_transactions(conn, &sql, [id])?
        .pop()
        .ok_or_else(|| LedgerError::not_found("Transaction", id))
}

/// Apply a partial update. A `tags` patch deletes every join row for the
/// transaction and re-inserts the new set; nothing is diffed.
pub fn update_transaction(
    conn: &mut Connection,
    id: i64,
    patch: &TransactionPatch,
) -> LedgerResult<()> {
    let tx = conn.transaction()?;
    let mut cur = get_transaction(&tx, id)?;
    if let Some(t) = patch.r#type {
        cur.r#type = t;
    }
    if let Some(a) = patch.amount {
        check_amount(a)?;
        cur.amount = a;
    }
    if let Some(c) = &patch.category {
        cur.category = c.clone();
    }
    if let Some(i) = &patch.category_icon {
        cur.category_icon = i.clone();
    }
    if let Some(n) = &patch.note {
        cur.note = n.clone();
    }
    if let Some(d) = patch.date {
        cur.date = d;
    }
    if let Some(m) = patch.member_id {
        cur.member_id = m;
    }
    if let Some(r) = patch.refunded {
        cur.refunded = r;
    }
    tx.execute(
        "UPDATE transactions SET type=?1, amount=?2, category=?3, category_icon=?4, note=?5,
             date=?6, member_id=?7, refunded=?8
         WHERE id=?9",
        params![
            cur.r#type,
            cur.amount.to_string(),
            cur.category,
            cur.category_icon,
            cur.note,
            cur.date,
            cur.member_id,
            cur.refunded,
            id,
        ],
    )?;
    if let Some(tags) = &patch.tags {
        tx.execute(
            "DELETE FROM transaction_tags WHERE transaction_id=?1",
            params![id],
        )?;
        write_tags(&tx, id, tags)?;
    }
    tx.commit()?;
    tracing::debug!(id, "transaction updated");
    Ok(())
}

pub fn set_refunded(conn: &Connection, id: i64, refunded: bool) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE transactions SET refunded=?1 WHERE id=?2",
        params![refunded, id],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found("Transaction", id));
    }
    tracing::debug!(id, refunded, "refund flag set");
    Ok(())
}

/// Delete a transaction; its tag rows go with it through the cascade.
pub fn delete_transaction(conn: &Connection, id: i64) -> LedgerResult<()> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::not_found("Transaction", id));
    }
    tracing::debug!(id, "transaction deleted");
    Ok(())
}

/// Every transaction dated inside `range`, oldest first (date, then
/// insertion time, then id).
pub fn transactions_between(
    conn: &Connection,
    range: &DateRange,
    r#type: Option<TxType>,
    include_refunded: bool,
) -> LedgerResult<Vec<Transaction>> {
    let sql = format!(
        "SELECT {TX_COLUMNS} FROM transactions t
         WHERE t.date BETWEEN ?1 AND ?2
           AND (?3 IS NULL OR t.type=?3)
           AND (?4 OR t.refunded=0)
         ORDER BY t.date, t.created_at, t.id"
    );
    query_transactions(
        conn,
        &sql,
        params![range.start, range.end, r#type, include_refunded],
    )
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

fn member_from_row(r: &Row) -> rusqlite::Result<Member> {
    let budget: Option<String> = r.get(2)?;
    Ok(Member {
        id: r.get(0)?,
        name: r.get(1)?,
        budget: budget.map(|b| parse_decimal_column(2, &b)).transpose()?,
    })
}

fn check_budget(budget: Option<Decimal>) -> LedgerResult<()> {
    match budget {
        Some(b) if b < Decimal::ZERO => Err(LedgerError::InvalidAmount(b)),
        _ => Ok(()),
    }
}

pub fn add_member(conn: &Connection, name: &str, budget: Option<Decimal>) -> LedgerResult<i64> {
    check_budget(budget)?;
    conn.execute(
        "INSERT INTO members(name, budget) VALUES (?1, ?2)",
        params![name.trim(), budget.map(|b| b.to_string())],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(id, name, "member added");
    Ok(id)
}

pub fn get_member(conn: &Connection, id: i64) -> LedgerResult<Member> {
    conn.query_row(
        "SELECT id, name, budget FROM members WHERE id=?1",
        params![id],
        member_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Member", id))
}

pub fn list_members(conn: &Connection) -> LedgerResult<Vec<Member>> {
    let mut stmt = conn.prepare("SELECT id, name, budget FROM members ORDER BY id")?;
    let rows = stmt.query_map([], member_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// `budget: Some(None)` clears the cap.
pub fn update_member(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    budget: Option<Option<Decimal>>,
) -> LedgerResult<()> {
    let mut cur = get_member(conn, id)?;
    if let Some(n) = name {
        cur.name = n.trim().to_string();
    }
    if let Some(b) = budget {
        check_budget(b)?;
        cur.budget = b;
    }
    conn.execute(
        "UPDATE members SET name=?1, budget=?2 WHERE id=?3",
        params![cur.name, cur.budget.map(|b| b.to_string()), id],
    )?;
    tracing::debug!(id, "member updated");
    Ok(())
}

/// Delete a member, moving its transactions to the default member.
pub fn delete_member(conn: &mut Connection, id: i64) -> LedgerResult<()> {
    if id == SELF_MEMBER_ID {
        return Err(LedgerError::ProtectedMember(id));
    }
    let tx = conn.transaction()?;
    get_member(&tx, id)?;
    let moved = tx.execute(
        "UPDATE transactions SET member_id=?1 WHERE member_id=?2",
        params![SELF_MEMBER_ID, id],
    )?;
    tx.execute("DELETE FROM members WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::debug!(id, moved, "member deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

fn tag_from_row(r: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: r.get(0)?,
        name: r.get(1)?,
        color: r.get(2)?,
    })
}

pub fn add_tag(conn: &Connection, name: &str, color: Option<&str>) -> LedgerResult<i64> {
    let color = color.map(str::trim).unwrap_or(DEFAULT_TAG_COLOR);
    check_color(color)?;
    conn.execute(
        "INSERT INTO tags(name, color) VALUES (?1, ?2)",
        params![name.trim(), color],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(id, name, "tag added");
    Ok(id)
}

pub fn get_tag(conn: &Connection, id: i64) -> LedgerResult<Tag> {
    conn.query_row(
        "SELECT id, name, color FROM tags WHERE id=?1",
        params![id],
        tag_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Tag", id))
}

pub fn list_tags(conn: &Connection) -> LedgerResult<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY name")?;
    let rows = stmt.query_map([], tag_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_tag(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    color: Option<&str>,
) -> LedgerResult<()> {
    let mut cur = get_tag(conn, id)?;
    if let Some(n) = name {
        cur.name = n.trim().to_string();
    }
    if let Some(c) = color {
        check_color(c.trim())?;
        cur.color = c.trim().to_string();
    }
    conn.execute(
        "UPDATE tags SET name=?1, color=?2 WHERE id=?3",
        params![cur.name, cur.color, id],
    )?;
    Ok(())
}

/// Delete a tag and, through the cascade, every association to it.
pub fn delete_tag(conn: &Connection, id: i64) -> LedgerResult<()> {
    let n = conn.execute("DELETE FROM tags WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::not_found("Tag", id));
    }
    tracing::debug!(id, "tag deleted");
    Ok(())
}

pub fn tag_id_or_create(conn: &Connection, name: &str) -> LedgerResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM tags WHERE name=?1",
            params![name.trim()],
            |r| r.get(0),
        )
        .optional()?;
    match existing {
        Some(id) => Ok(id),
        None => add_tag(conn, name, None),
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

fn category_from_row(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        r#type: r.get(1)?,
        name: r.get(2)?,
        icon: r.get(3)?,
        sort_order: r.get(4)?,
    })
}

const CATEGORY_COLUMNS: &str = "id, type, name, icon, sort_order";

pub fn add_category(conn: &Connection, r#type: TxType, name: &str, icon: &str) -> LedgerResult<i64> {
    conn.execute(
        "INSERT INTO categories(type, name, icon, sort_order)
         VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM categories WHERE type=?1))",
        params![r#type, name.trim(), icon.trim()],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(id, name, kind = %r#type, "category added");
    Ok(id)
}

pub fn get_category(conn: &Connection, id: i64) -> LedgerResult<Category> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id=?1"),
        params![id],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Category", id))
}

pub fn find_category(conn: &Connection, r#type: TxType, name: &str) -> LedgerResult<Option<Category>> {
    Ok(conn
        .query_row(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE type=?1 AND name=?2"),
            params![r#type, name.trim()],
            category_from_row,
        )
        .optional()?)
}

/// Categories ordered by type then display order.
pub fn list_categories(conn: &Connection, r#type: Option<TxType>) -> LedgerResult<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories
         WHERE (?1 IS NULL OR type=?1)
         ORDER BY type, sort_order, id"
    ))?;
    let rows = stmt.query_map(params![r#type], category_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Rename a category. With `propagate`, transactions that still carry the
/// old name (same type) are rewritten too; returns how many were.
pub fn rename_category(
    conn: &mut Connection,
    id: i64,
    new_name: &str,
    propagate: bool,
) -> LedgerResult<usize> {
    let tx = conn.transaction()?;
    let cur = get_category(&tx, id)?;
    tx.execute(
        "UPDATE categories SET name=?1 WHERE id=?2",
        params![new_name.trim(), id],
    )?;
    let rewritten = if propagate {
        tx.execute(
            "UPDATE transactions SET category=?1, category_icon=?2 WHERE type=?3 AND category=?4",
            params![new_name.trim(), cur.icon, cur.r#type, cur.name],
        )?
    } else {
        0
    };
    tx.commit()?;
    tracing::debug!(id, from = %cur.name, to = new_name, rewritten, "category renamed");
    Ok(rewritten)
}

pub fn set_category_icon(conn: &Connection, id: i64, icon: &str) -> LedgerResult<()> {
    let n = conn.execute(
        "UPDATE categories SET icon=?1 WHERE id=?2",
        params![icon.trim(), id],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found("Category", id));
    }
    Ok(())
}

/// Transactions keep their category snapshot after the category is gone.
pub fn delete_category(conn: &Connection, id: i64) -> LedgerResult<()> {
    let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::not_found("Category", id));
    }
    tracing::debug!(id, "category deleted");
    Ok(())
}

/// Assign `sort_order` 0.. following `ids`. Every id must be a category of
/// `type`; otherwise nothing changes.
pub fn reorder_categories(conn: &mut Connection, r#type: TxType, ids: &[i64]) -> LedgerResult<()> {
    let tx = conn.transaction()?;
    for (pos, id) in ids.iter().enumerate() {
        let n = tx.execute(
            "UPDATE categories SET sort_order=?1 WHERE id=?2 AND type=?3",
            params![pos as i64, id, r#type],
        )?;
        if n == 0 {
            return Err(LedgerError::not_found("Category", *id));
        }
    }
    tx.commit()?;
    Ok(())
}
