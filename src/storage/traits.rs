//! # Storage Traits
//!
//! Storage abstraction traits that keep the domain layer independent of the
//! concrete storage backend. The file-based implementation lives in
//! `storage::csv`; a database-backed one could implement the same traits
//! without touching the services.

use anyhow::Result;

use crate::domain::models::expense::Expense;
use crate::domain::models::person::Person;
use crate::domain::models::recurring_expense::RecurringExpense;

/// Interface for household roster storage.
pub trait PersonStorage: Send + Sync {
    /// Store a new person
    fn store_person(&self, person: &Person) -> Result<()>;

    /// Retrieve a specific person by ID
    fn get_person(&self, person_id: &str) -> Result<Option<Person>>;

    /// List all household members, parents first, then ordered by name
    fn list_persons(&self) -> Result<Vec<Person>>;
}

/// Interface for the expense ledger.
///
/// An expense and its share set are one record: every write replaces the
/// expense together with all of its shares, so a reader never observes an
/// expense with a partial share set.
pub trait ExpenseStorage: Send + Sync {
    /// Store a new expense together with its shares
    fn store_expense(&self, expense: &Expense) -> Result<()>;

    /// Retrieve a specific expense by ID
    fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>>;

    /// List all expenses ordered by date descending (most recent first)
    fn list_expenses(&self) -> Result<Vec<Expense>>;

    /// Replace an existing expense and its full share set
    fn update_expense(&self, expense: &Expense) -> Result<()>;

    /// Delete an expense and its shares
    /// Returns true if the expense was found and deleted, false otherwise
    fn delete_expense(&self, expense_id: &str) -> Result<bool>;
}

/// Interface for recurring expense definition storage.
pub trait RecurringExpenseStorage: Send + Sync {
    /// Store a new recurring expense definition
    fn store_recurring_expense(&self, recurring: &RecurringExpense) -> Result<()>;

    /// List all recurring expense definitions
    fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>>;

    /// List only the active recurring expense definitions
    fn list_active_recurring_expenses(&self) -> Result<Vec<RecurringExpense>>;

    /// Update an existing recurring expense definition (e.g. to advance
    /// `last_created` after materialization)
    fn update_recurring_expense(&self, recurring: &RecurringExpense) -> Result<()>;
}

/// Interface for storage connections.
///
/// Provides factory methods for creating repositories so the domain layer
/// can work with any backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone {
    type PersonRepository: PersonStorage + Clone;
    type ExpenseRepository: ExpenseStorage + Clone;
    type RecurringExpenseRepository: RecurringExpenseStorage + Clone;

    fn create_person_repository(&self) -> Self::PersonRepository;
    fn create_expense_repository(&self) -> Self::ExpenseRepository;
    fn create_recurring_expense_repository(&self) -> Self::RecurringExpenseRepository;
}
