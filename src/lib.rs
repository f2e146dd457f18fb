//! # Expense Splitter
//!
//! Shared household expense tracking: expenses are split between household
//! members under three strategies (equal, income-weighted, explicitly
//! assigned), recurring expenses materialize on a fixed cadence, and the
//! accumulated ledger nets down to a single settlement payment between the
//! two parents.

pub mod domain;
pub mod rest;
pub mod storage;
