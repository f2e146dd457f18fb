//! # File-based Storage Module
//!
//! File-backed implementation of the storage traits. The household roster
//! and the recurring expense definitions are stored as human-readable YAML;
//! the expense ledger is a CSV file whose rows carry their share list as a
//! JSON-encoded column. All writes replace whole files through a temp-file
//! rename, so one expense plus its shares is always applied as a unit.

pub mod connection;
pub mod expense_repository;
pub mod person_repository;
pub mod recurring_expense_repository;

pub use connection::CsvConnection;
pub use expense_repository::ExpenseRepository;
pub use person_repository::PersonRepository;
pub use recurring_expense_repository::RecurringExpenseRepository;
