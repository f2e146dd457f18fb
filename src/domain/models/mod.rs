//! Domain models for the expense splitter.

pub mod expense;
pub mod person;
pub mod recurring_expense;
pub mod settlement;

pub use expense::{Expense, ExpenseShare, SplitType};
pub use person::Person;
pub use recurring_expense::{Frequency, RecurringExpense};
pub use settlement::SettlementInstruction;
