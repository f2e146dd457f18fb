//! Domain layer: allocation, settlement and recurrence logic plus the
//! services around the expense ledger and the household roster.

pub mod allocation_service;
pub mod clock;
pub mod commands;
pub mod expense_service;
pub mod models;
pub mod person_service;
pub mod recurring_service;
pub mod settlement_service;

pub use allocation_service::AllocationService;
pub use clock::{Clock, SystemClock};
pub use expense_service::{ExpenseError, ExpenseService};
pub use person_service::PersonService;
pub use recurring_service::RecurringExpenseService;
pub use settlement_service::SettlementService;
