// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::LedgerError;
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The default member every transaction falls back to.
pub const SELF_MEMBER_ID: i64 = 1;

/// Direction of a transaction. Amounts are stored as magnitudes, so this is
/// the only carrier of sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxType::Income),
            "expense" => Ok(TxType::Expense),
            other => Err(LedgerError::UnknownType(other.to_string())),
        }
    }
}

impl ToSql for TxType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TxType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub budget: Option<Decimal>, // monthly cap
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub r#type: TxType,
    pub name: String,
    pub icon: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub r#type: TxType,
    pub amount: Decimal,
    /// Category name as it was when the transaction was recorded.
    pub category: String,
    pub category_icon: String,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub member_id: i64,
    pub refunded: bool,
    pub tags: Vec<i64>,
    pub created_at: String,
}

/// Fields for a new ledger row; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub r#type: TxType,
    pub amount: Decimal,
    pub category: String,
    pub category_icon: String,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub member_id: i64,
    pub refunded: bool,
    pub tags: Vec<i64>,
}

impl NewTransaction {
    pub fn new(r#type: TxType, amount: Decimal, category: &str, date: NaiveDate) -> Self {
        Self {
            r#type,
            amount,
            category: category.to_string(),
            category_icon: String::new(),
            note: None,
            date,
            member_id: SELF_MEMBER_ID,
            refunded: false,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[i64]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    pub fn with_member(mut self, member_id: i64) -> Self {
        self.member_id = member_id;
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn refunded(mut self, refunded: bool) -> Self {
        self.refunded = refunded;
        self
    }
}

/// Partial update. `None` leaves a field untouched; `tags: Some(..)` replaces
/// the whole tag set.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub r#type: Option<TxType>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub category_icon: Option<String>,
    pub note: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub member_id: Option<i64>,
    pub refunded: Option<bool>,
    pub tags: Option<Vec<i64>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.r#type.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.category_icon.is_none()
            && self.note.is_none()
            && self.date.is_none()
            && self.member_id.is_none()
            && self.refunded.is_none()
            && self.tags.is_none()
    }
}
