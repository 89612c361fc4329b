// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod db;
pub mod drill;
pub mod errors;
pub mod listing;
pub mod models;
pub mod period;
pub mod stats;
pub mod store;
pub mod utils;

pub use errors::{LedgerError, LedgerResult};
