//! Storage layer: backend-agnostic traits plus the file-based implementation.

pub mod csv;
pub mod traits;

pub use csv::CsvConnection;
pub use traits::{Connection, ExpenseStorage, PersonStorage, RecurringExpenseStorage};
