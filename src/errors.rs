// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures surfaced by the ledger store and the report engine.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("Invalid amount {0}: amounts must be greater than zero")]
    InvalidAmount(Decimal),
    #[error("Unknown transaction type '{0}', expected income|expense")]
    UnknownType(String),
    #[error("Unknown dimension '{0}', expected category|member|tag")]
    UnknownDimension(String),
    #[error("Unknown period '{0}', expected month|year|custom")]
    UnknownPeriod(String),
    #[error("Member {0} is the default member and cannot be deleted")]
    ProtectedMember(i64),
    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
    #[error("Invalid page: {0}")]
    InvalidPage(String),
    #[error("Amount overflow while summing {0}")]
    AmountOverflow(String),
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        LedgerError::NotFound { kind, id }
    }
}
