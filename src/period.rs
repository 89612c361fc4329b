// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Maps a report period (month, year or custom range around an anchor date)
//! to concrete inclusive date intervals.

use crate::errors::{LedgerError, LedgerResult};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest custom range accepted, counted inclusively in days.
pub const MAX_CUSTOM_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Month,
    Year,
    Custom,
}

impl FromStr for PeriodKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(PeriodKind::Month),
            "year" => Ok(PeriodKind::Year),
            "custom" => Ok(PeriodKind::Custom),
            other => Err(LedgerError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Inclusive calendar-day interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `end < start`. No length limit.
    pub fn new(start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        if end < start {
            return Err(LedgerError::InvalidRange(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Range for a user-chosen custom period: ordered and at most 366 days.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        let range = Self::new(start, end)?;
        if range.days() > MAX_CUSTOM_DAYS {
            return Err(LedgerError::InvalidRange(format!(
                "{}..{} spans {} days, limit is {}",
                start,
                end,
                range.days(),
                MAX_CUSTOM_DAYS
            )));
        }
        Ok(range)
    }

    /// Range with optional ends; a missing end is unbounded on that side.
    /// `None` when both are missing.
    pub fn open(start: Option<NaiveDate>, end: Option<NaiveDate>) -> LedgerResult<Option<Self>> {
        if start.is_none() && end.is_none() {
            return Ok(None);
        }
        // four-digit years keep the ISO text comparable in SQL
        let lo = NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN);
        let hi = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX);
        Self::new(start.unwrap_or(lo), end.unwrap_or(hi)).map(Some)
    }

    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    pub fn year_of(date: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
        let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
        Self { start, end }
    }

    /// Whole calendar month, rejecting a month number outside 1..=12.
    pub fn for_month(year: i32, month: u32) -> LedgerResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            LedgerError::InvalidRange(format!("{}-{:02} is not a calendar month", year, month))
        })?;
        Ok(Self::month_of(first))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// What the caller asked for; resolution is stateless per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRequest {
    pub kind: PeriodKind,
    pub anchor: NaiveDate,
    pub custom: Option<(NaiveDate, NaiveDate)>,
}

impl PeriodRequest {
    pub fn month(anchor: NaiveDate) -> Self {
        Self {
            kind: PeriodKind::Month,
            anchor,
            custom: None,
        }
    }

    pub fn year(anchor: NaiveDate) -> Self {
        Self {
            kind: PeriodKind::Year,
            anchor,
            custom: None,
        }
    }

    pub fn custom(anchor: NaiveDate, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            kind: PeriodKind::Custom,
            anchor,
            custom: Some((start, end)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPeriod {
    pub current: DateRange,
    /// Calendar month before the anchor's month, whatever `kind` was asked.
    pub prior_month: DateRange,
}

pub fn resolve(req: &PeriodRequest) -> LedgerResult<ResolvedPeriod> {
    let current = match req.kind {
        PeriodKind::Month => DateRange::month_of(req.anchor),
        PeriodKind::Year => DateRange::year_of(req.anchor),
        PeriodKind::Custom => {
            let (start, end) = req.custom.ok_or_else(|| {
                LedgerError::InvalidRange("custom period needs a start and an end".into())
            })?;
            DateRange::custom(start, end)?
        }
    };
    let prior_month = DateRange::month_of(shift_months(req.anchor, -1));
    Ok(ResolvedPeriod {
        current,
        prior_month,
    })
}

/// Move a date by whole months, clamping the day to the target month's length.
pub fn shift_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn month_uses_anchor_not_clock() {
        let p = resolve(&PeriodRequest::month(d("2021-02-14"))).unwrap();
        assert_eq!(p.current.start, d("2021-02-01"));
        assert_eq!(p.current.end, d("2021-02-28"));
        assert_eq!(p.prior_month.start, d("2021-01-01"));
        assert_eq!(p.prior_month.end, d("2021-01-31"));
    }

    #[test]
    fn prior_month_crosses_year_boundary() {
        let p = resolve(&PeriodRequest::year(d("2024-01-20"))).unwrap();
        assert_eq!(p.current.start, d("2024-01-01"));
        assert_eq!(p.current.end, d("2024-12-31"));
        assert_eq!(p.prior_month.start, d("2023-12-01"));
        assert_eq!(p.prior_month.end, d("2023-12-31"));
    }

    #[test]
    fn custom_limits() {
        assert!(DateRange::custom(d("2024-01-01"), d("2024-12-31")).is_ok());
        assert!(matches!(
            DateRange::custom(d("2023-01-01"), d("2024-01-02")),
            Err(LedgerError::InvalidRange(_))
        ));
        assert!(matches!(
            DateRange::custom(d("2024-01-02"), d("2024-01-01")),
            Err(LedgerError::InvalidRange(_))
        ));
        let single = DateRange::custom(d("2024-01-02"), d("2024-01-02")).unwrap();
        assert_eq!(single.days(), 1);
    }

    #[test]
    fn custom_without_bounds_is_rejected() {
        let req = PeriodRequest {
            kind: PeriodKind::Custom,
            anchor: d("2024-01-01"),
            custom: None,
        };
        assert!(matches!(resolve(&req), Err(LedgerError::InvalidRange(_))));
    }

    #[test]
    fn shift_clamps_day() {
        assert_eq!(shift_months(d("2024-03-31"), -1), d("2024-02-29"));
        assert_eq!(shift_months(d("2024-12-15"), 1), d("2025-01-15"));
    }
}
