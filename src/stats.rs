// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period aggregation: ranked groups by category, member or tag plus
//! whole-period totals and month-over-month change.
//!
//! Refunded transactions never contribute. Everything is recomputed from the
//! ledger on every call.

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Transaction, TxType};
use crate::period::{self, DateRange, PeriodRequest};
use crate::store;
use chrono::Datelike;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Icon shown for every member group.
pub const MEMBER_ICON: &str = "👤";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Category,
    Member,
    Tag,
}

impl FromStr for Dimension {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "category" => Ok(Dimension::Category),
            "member" => Ok(Dimension::Member),
            "tag" => Ok(Dimension::Tag),
            other => Err(LedgerError::UnknownDimension(other.to_string())),
        }
    }
}

/// Identifies one aggregate group; also the drill-through handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "dimension", content = "key", rename_all = "lowercase")]
pub enum GroupKey {
    Category(String),
    Member(i64),
    Tag(i64),
}

impl GroupKey {
    pub fn dimension(&self) -> Dimension {
        match self {
            GroupKey::Category(_) => Dimension::Category,
            GroupKey::Member(_) => Dimension::Member,
            GroupKey::Tag(_) => Dimension::Tag,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Category(name) => write!(f, "category '{}'", name),
            GroupKey::Member(id) => write!(f, "member #{}", id),
            GroupKey::Tag(id) => write!(f, "tag #{}", id),
        }
    }
}

impl Dimension {
    /// Groups a transaction belongs to. A tagged transaction belongs to every
    /// one of its tags, so tag groups can overlap.
    pub fn keys_of(&self, tx: &Transaction) -> Vec<GroupKey> {
        match self {
            Dimension::Category => vec![GroupKey::Category(tx.category.clone())],
            Dimension::Member => vec![GroupKey::Member(tx.member_id)],
            Dimension::Tag => tx.tags.iter().map(|t| GroupKey::Tag(*t)).collect(),
        }
    }
}

/// Transactions that can contribute to a report over `range`: right type,
/// not refunded. The drill-through uses this same function.
pub(crate) fn contributing_rows(
    conn: &Connection,
    range: &DateRange,
    r#type: TxType,
) -> LedgerResult<Vec<Transaction>> {
    store::transactions_between(conn, range, Some(r#type), false)
}

#[derive(Debug, Clone, Copy)]
pub struct StatsRequest {
    pub period: PeriodRequest,
    pub dimension: Dimension,
    pub r#type: TxType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatGroup {
    pub key: GroupKey,
    pub name: String,
    pub amount: Decimal,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Share of the sum of all group amounts, 0..=100.
    pub percent: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub income_change_pct: Decimal,
    pub expense_change_pct: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub interval: DateRange,
    pub prior_interval: DateRange,
    pub dimension: Dimension,
    pub r#type: TxType,
    pub groups: Vec<StatGroup>,
    pub totals: PeriodTotals,
}

/// `(current - prior) / prior * 100`, or zero when there is nothing to
/// compare against or the ratio does not fit in a `Decimal`.
pub fn pct_change(current: Decimal, prior: Decimal) -> Decimal {
    if prior.is_zero() {
        return Decimal::ZERO;
    }
    current
        .checked_sub(prior)
        .and_then(|delta| delta.checked_div(prior))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// `part / whole * 100`, zero when `whole` is zero or the ratio overflows.
pub fn share_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Add a transaction's magnitude to a running total.
pub(crate) fn accumulate(total: &mut Decimal, amount: Decimal, what: &str) -> LedgerResult<()> {
    *total = total
        .checked_add(amount.abs())
        .ok_or_else(|| LedgerError::AmountOverflow(what.to_string()))?;
    Ok(())
}

/// Non-refunded (income, expense) sums over `range`.
pub fn income_expense(conn: &Connection, range: &DateRange) -> LedgerResult<(Decimal, Decimal)> {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for tx in store::transactions_between(conn, range, None, false)? {
        match tx.r#type {
            TxType::Income => accumulate(&mut income, tx.amount, "income")?,
            TxType::Expense => accumulate(&mut expense, tx.amount, "expense")?,
        }
    }
    Ok((income, expense))
}

/// Sum per group in first-seen order, then ranked by amount descending.
/// Equal amounts keep first-seen order (rows scanned oldest first).
pub fn group_amounts(
    rows: &[Transaction],
    dimension: Dimension,
) -> LedgerResult<Vec<(GroupKey, Decimal)>> {
    let mut order: Vec<(GroupKey, Decimal)> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    for tx in rows {
        for key in dimension.keys_of(tx) {
            let slot = match index.get(&key) {
                Some(slot) => *slot,
                None => {
                    index.insert(key.clone(), order.len());
                    order.push((key.clone(), Decimal::ZERO));
                    order.len() - 1
                }
            };
            let (key, sum) = &mut order[slot];
            *sum = sum
                .checked_add(tx.amount.abs())
                .ok_or_else(|| LedgerError::AmountOverflow(key.to_string()))?;
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(order)
}

struct Labels {
    category_icons: HashMap<String, String>,
    members: HashMap<i64, String>,
    tags: HashMap<i64, (String, String)>,
}

impl Labels {
    fn load(conn: &Connection, dimension: Dimension, r#type: TxType) -> LedgerResult<Self> {
        let mut labels = Labels {
            category_icons: HashMap::new(),
            members: HashMap::new(),
            tags: HashMap::new(),
        };
        match dimension {
            Dimension::Category => {
                let mut stmt = conn.prepare("SELECT name, icon FROM categories WHERE type=?1")?;
                let rows = stmt.query_map(params![r#type], |r| {
                    Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (name, icon) = row?;
                    labels.category_icons.insert(name, icon);
                }
            }
            Dimension::Member => {
                for m in store::list_members(conn)? {
                    labels.members.insert(m.id, m.name);
                }
            }
            Dimension::Tag => {
                for t in store::list_tags(conn)? {
                    labels.tags.insert(t.id, (t.name, t.color));
                }
            }
        }
        Ok(labels)
    }

    /// (name, icon, color) for a group. Category icons come from the live
    /// category when one matches, else from the transaction's own snapshot.
    fn describe(
        &self,
        key: &GroupKey,
        snapshot_icon: Option<&str>,
    ) -> (String, Option<String>, Option<String>) {
        match key {
            GroupKey::Category(name) => {
                let icon = self
                    .category_icons
                    .get(name)
                    .cloned()
                    .or_else(|| snapshot_icon.map(str::to_string));
                (name.clone(), icon, None)
            }
            GroupKey::Member(id) => {
                let name = self.members.get(id).cloned().unwrap_or_else(|| {
                    tracing::warn!(member_id = id, "member missing, using placeholder name");
                    format!("Member #{}", id)
                });
                (name, Some(MEMBER_ICON.to_string()), None)
            }
            GroupKey::Tag(id) => match self.tags.get(id) {
                Some((name, color)) => (name.clone(), None, Some(color.clone())),
                None => (format!("Tag #{}", id), None, None),
            },
        }
    }
}

pub fn compute_stats(conn: &Connection, req: &StatsRequest) -> LedgerResult<StatsReport> {
    let resolved = period::resolve(&req.period)?;
    let rows = contributing_rows(conn, &resolved.current, req.r#type)?;
    let ranked = group_amounts(&rows, req.dimension)?;
    let mut group_total = Decimal::ZERO;
    for (_, amount) in &ranked {
        accumulate(&mut group_total, *amount, "group total")?;
    }

    let labels = Labels::load(conn, req.dimension, req.r#type)?;
    // latest snapshot icon per category name, for categories no longer live
    let mut snapshot_icons: HashMap<&str, &str> = HashMap::new();
    if req.dimension == Dimension::Category {
        for tx in &rows {
            snapshot_icons.insert(tx.category.as_str(), tx.category_icon.as_str());
        }
    }

    let groups = ranked
        .into_iter()
        .map(|(key, amount)| {
            let snapshot = match &key {
                GroupKey::Category(name) => snapshot_icons.get(name.as_str()).copied(),
                _ => None,
            };
            let (name, icon, color) = labels.describe(&key, snapshot);
            StatGroup {
                percent: share_of(amount, group_total),
                key,
                name,
                amount,
                icon,
                color,
            }
        })
        .collect::<Vec<_>>();

    let (income, expense) = income_expense(conn, &resolved.current)?;
    let (prior_income, prior_expense) = income_expense(conn, &resolved.prior_month)?;
    let totals = PeriodTotals {
        income,
        expense,
        balance: income - expense,
        income_change_pct: pct_change(income, prior_income),
        expense_change_pct: pct_change(expense, prior_expense),
    };

    tracing::debug!(
        interval = %resolved.current,
        dimension = ?req.dimension,
        kind = %req.r#type,
        rows = rows.len(),
        groups = groups.len(),
        "stats computed"
    );

    Ok(StatsReport {
        interval: resolved.current,
        prior_interval: resolved.prior_month,
        dimension: req.dimension,
        r#type: req.r#type,
        groups,
        totals,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthTotals {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

/// Twelve months of non-refunded totals for `year`, January first.
pub fn monthly_trend(conn: &Connection, year: i32) -> LedgerResult<Vec<MonthTotals>> {
    let year_range = DateRange::for_month(year, 1).map(|jan| DateRange::year_of(jan.start))?;
    let mut months: Vec<MonthTotals> = (1..=12)
        .map(|month| MonthTotals {
            month,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            balance: Decimal::ZERO,
        })
        .collect();
    for tx in store::transactions_between(conn, &year_range, None, false)? {
        let slot = &mut months[tx.date.month0() as usize];
        match tx.r#type {
            TxType::Income => accumulate(&mut slot.income, tx.amount, "monthly income")?,
            TxType::Expense => accumulate(&mut slot.expense, tx.amount, "monthly expense")?,
        }
    }
    for m in months.iter_mut() {
        m.balance = m.income - m.expense;
    }
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_change_guards_zero_prior() {
        assert_eq!(pct_change(Decimal::from(50), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            pct_change(Decimal::from(150), Decimal::from(100)),
            Decimal::from(50)
        );
        assert_eq!(
            pct_change(Decimal::from(50), Decimal::from(100)),
            Decimal::from(-50)
        );
    }

    #[test]
    fn pct_change_out_of_range_is_zero() {
        let tiny = Decimal::new(1, 28);
        assert_eq!(pct_change(Decimal::from(1000), tiny), Decimal::ZERO);
        assert_eq!(share_of(Decimal::MAX, tiny), Decimal::ZERO);
    }

    #[test]
    fn accumulate_reports_overflow() {
        let mut total = Decimal::MAX;
        assert!(matches!(
            accumulate(&mut total, Decimal::ONE, "expense"),
            Err(LedgerError::AmountOverflow(_))
        ));
        assert_eq!(total, Decimal::MAX);
    }

    #[test]
    fn share_of_guards_zero_total() {
        assert_eq!(share_of(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            share_of(Decimal::from(1), Decimal::from(4)),
            Decimal::from(25)
        );
    }

    #[test]
    fn dimension_parses() {
        assert_eq!("Tag".parse::<Dimension>().unwrap(), Dimension::Tag);
        assert!("payee".parse::<Dimension>().is_err());
    }
}
