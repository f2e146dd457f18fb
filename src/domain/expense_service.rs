//! Expense lifecycle: create, edit, delete, list, stats.
//!
//! The allocation engine itself degrades bad input to an empty share list;
//! this service is the strict gate in front of it. Commands are validated
//! and rejected with a typed `ExpenseError` before any allocation happens,
//! so an empty share list can never silently reach the ledger through this
//! path.
//!
//! Edits are whole-record replacements: the share set is recomputed from the
//! edited fields and swapped in together with the expense, never patched.

use anyhow::Result;
use chrono::{Datelike, Utc};
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::allocation_service::AllocationService;
use crate::domain::commands::expenses::{
    CreateExpenseCommand, ExpenseStats, UpdateExpenseCommand,
};
use crate::domain::models::expense::{Expense, SplitType};
use crate::domain::models::person::Person;
use crate::storage::traits::{Connection, ExpenseStorage, PersonStorage};

/// Validation and lookup failures for expense commands.
#[derive(Debug, Error, PartialEq)]
pub enum ExpenseError {
    #[error("Expense amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Description must not be empty")]
    EmptyDescription,
    #[error("Assigned split requires at least one recipient")]
    MissingRecipients,
    #[error("Payer not found: {0}")]
    UnknownPayer(String),
    #[error("Expense not found: {0}")]
    NotFound(String),
}

/// Service for managing the expense ledger.
#[derive(Clone)]
pub struct ExpenseService<C: Connection> {
    expense_repository: C::ExpenseRepository,
    person_repository: C::PersonRepository,
    allocation_service: AllocationService,
}

impl<C: Connection> ExpenseService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            expense_repository: connection.create_expense_repository(),
            person_repository: connection.create_person_repository(),
            allocation_service: AllocationService::new(),
        }
    }

    /// Create a new expense: validate, allocate shares, persist atomically.
    pub fn create_expense(&self, command: CreateExpenseCommand) -> Result<Expense> {
        Self::validate(
            command.amount,
            &command.description,
            command.split_type,
            &command.assigned_person_ids,
        )?;

        // Roster is loaded fresh for this calculation.
        let roster = self.person_repository.list_persons()?;
        self.require_payer(&roster, &command.payer_id)?;

        let shares = self.allocation_service.calculate_shares(
            command.amount,
            command.split_type,
            &roster,
            &command.assigned_person_ids,
        );

        let now = Utc::now();
        let expense = Expense {
            id: Expense::generate_id(now.timestamp_millis() as u64),
            amount: command.amount,
            description: command.description,
            date: command.date.unwrap_or(now),
            payer_id: command.payer_id,
            category: command.category,
            split_type: command.split_type,
            recurring_expense_id: None,
            shares,
        };

        self.expense_repository.store_expense(&expense)?;

        info!(
            "Created expense '{}' ({:.2}, {})",
            expense.description, expense.amount, expense.split_type
        );
        Ok(expense)
    }

    /// Edit an expense by replacing the whole record including its shares.
    pub fn update_expense(&self, command: UpdateExpenseCommand) -> Result<Expense> {
        Self::validate(
            command.amount,
            &command.description,
            command.split_type,
            &command.assigned_person_ids,
        )?;

        let existing = self
            .expense_repository
            .get_expense(&command.expense_id)?
            .ok_or_else(|| ExpenseError::NotFound(command.expense_id.clone()))?;

        let roster = self.person_repository.list_persons()?;
        self.require_payer(&roster, &command.payer_id)?;

        let shares = self.allocation_service.calculate_shares(
            command.amount,
            command.split_type,
            &roster,
            &command.assigned_person_ids,
        );

        let updated = Expense {
            id: existing.id,
            amount: command.amount,
            description: command.description,
            date: existing.date,
            payer_id: command.payer_id,
            category: command.category,
            split_type: command.split_type,
            recurring_expense_id: existing.recurring_expense_id,
            shares,
        };

        self.expense_repository.update_expense(&updated)?;

        info!("Updated expense {} with a fresh share set", updated.id);
        Ok(updated)
    }

    /// Delete an expense together with its shares.
    pub fn delete_expense(&self, expense_id: &str) -> Result<bool> {
        let deleted = self.expense_repository.delete_expense(expense_id)?;
        if deleted {
            info!("Deleted expense {}", expense_id);
        }
        Ok(deleted)
    }

    /// List all expenses, most recent first.
    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.expense_repository.list_expenses()
    }

    /// Overall and current-month spending totals.
    pub fn stats(&self) -> Result<ExpenseStats> {
        let expenses = self.expense_repository.list_expenses()?;
        let now = Utc::now();

        let total = expenses.iter().map(|e| e.amount).sum();
        let this_month = expenses
            .iter()
            .filter(|e| e.date.year() == now.year() && e.date.month() == now.month())
            .map(|e| e.amount)
            .sum();

        Ok(ExpenseStats { total, this_month })
    }

    fn validate(
        amount: f64,
        description: &str,
        split_type: SplitType,
        assigned_person_ids: &[String],
    ) -> Result<(), ExpenseError> {
        if amount <= 0.0 {
            return Err(ExpenseError::NonPositiveAmount);
        }
        if description.trim().is_empty() {
            return Err(ExpenseError::EmptyDescription);
        }
        if split_type == SplitType::Assigned && assigned_person_ids.is_empty() {
            return Err(ExpenseError::MissingRecipients);
        }
        Ok(())
    }

    fn require_payer(&self, roster: &[Person], payer_id: &str) -> Result<(), ExpenseError> {
        if roster.iter().any(|p| p.id == payer_id) {
            Ok(())
        } else {
            Err(ExpenseError::UnknownPayer(payer_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::CsvConnection;
    use tempfile::tempdir;

    fn setup_service() -> (
        ExpenseService<CsvConnection>,
        Arc<CsvConnection>,
        tempfile::TempDir,
    ) {
        let temp_dir = tempdir().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (ExpenseService::new(connection.clone()), connection, temp_dir)
    }

    fn seed_household(connection: &CsvConnection) {
        let person_repository = connection.create_person_repository();
        for (id, name, is_parent, income) in [
            ("p1", "Jenny", true, Some(3500.0)),
            ("p2", "Eric", true, Some(4500.0)),
            ("k1", "Melina", false, None),
        ] {
            person_repository
                .store_person(&Person {
                    id: id.to_string(),
                    name: name.to_string(),
                    is_parent,
                    income,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .unwrap();
        }
    }

    fn create_command() -> CreateExpenseCommand {
        CreateExpenseCommand {
            amount: 100.0,
            description: "Wocheneinkauf".to_string(),
            payer_id: "p1".to_string(),
            category: "Lebensmittel".to_string(),
            split_type: SplitType::Equal,
            assigned_person_ids: Vec::new(),
            date: None,
        }
    }

    fn expense_error(result: Result<Expense>) -> ExpenseError {
        result.unwrap_err().downcast::<ExpenseError>().unwrap()
    }

    #[test]
    fn test_create_expense_allocates_and_persists() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let expense = service.create_expense(create_command()).unwrap();

        assert_eq!(expense.shares.len(), 2);
        assert!((expense.shares_total() - 100.0).abs() < 1e-9);

        let stored = connection.create_expense_repository().list_expenses().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], expense);
    }

    #[test]
    fn test_back_to_back_creates_get_distinct_ids() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        // Two creates in quick succession can share a millisecond; the
        // generated IDs must still differ.
        let first = service.create_expense(create_command()).unwrap();
        let second = service.create_expense(create_command()).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(service.list_expenses().unwrap().len(), 2);
    }

    #[test]
    fn test_create_rejects_non_positive_amount() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        for amount in [0.0, -5.0] {
            let mut command = create_command();
            command.amount = amount;
            assert_eq!(
                expense_error(service.create_expense(command)),
                ExpenseError::NonPositiveAmount
            );
        }
    }

    #[test]
    fn test_create_rejects_empty_description() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let mut command = create_command();
        command.description = "   ".to_string();
        assert_eq!(
            expense_error(service.create_expense(command)),
            ExpenseError::EmptyDescription
        );
    }

    #[test]
    fn test_create_rejects_assigned_without_recipients() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let mut command = create_command();
        command.split_type = SplitType::Assigned;
        assert_eq!(
            expense_error(service.create_expense(command)),
            ExpenseError::MissingRecipients
        );
    }

    #[test]
    fn test_create_rejects_unknown_payer() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let mut command = create_command();
        command.payer_id = "stranger".to_string();
        assert_eq!(
            expense_error(service.create_expense(command)),
            ExpenseError::UnknownPayer("stranger".to_string())
        );
    }

    #[test]
    fn test_create_assigned_to_dependent_splits_between_parents() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let mut command = create_command();
        command.split_type = SplitType::Assigned;
        command.assigned_person_ids = vec!["k1".to_string()];

        let expense = service.create_expense(command).unwrap();

        assert_eq!(expense.shares.len(), 2);
        assert!(expense.shares.iter().all(|s| s.amount == 50.0));
        assert!(expense.shares.iter().all(|s| s.person_id != "k1"));
    }

    #[test]
    fn test_update_replaces_shares_wholesale() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let expense = service.create_expense(create_command()).unwrap();
        assert_eq!(expense.shares.len(), 2);

        let updated = service
            .update_expense(UpdateExpenseCommand {
                expense_id: expense.id.clone(),
                amount: 200.0,
                description: "Wocheneinkauf (korrigiert)".to_string(),
                payer_id: "p2".to_string(),
                category: "Lebensmittel".to_string(),
                split_type: SplitType::Assigned,
                assigned_person_ids: vec!["p2".to_string()],
            })
            .unwrap();

        assert_eq!(updated.id, expense.id);
        assert_eq!(updated.shares.len(), 1);
        assert_eq!(updated.shares[0].person_id, "p2");
        assert_eq!(updated.shares[0].amount, 200.0);
        // Creation date survives the edit.
        assert_eq!(updated.date, expense.date);

        let stored = connection
            .create_expense_repository()
            .get_expense(&expense.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn test_update_missing_expense() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let result = service.update_expense(UpdateExpenseCommand {
            expense_id: "expense::missing".to_string(),
            amount: 10.0,
            description: "x".to_string(),
            payer_id: "p1".to_string(),
            category: "Sonstiges".to_string(),
            split_type: SplitType::Equal,
            assigned_person_ids: Vec::new(),
        });

        assert_eq!(
            expense_error(result),
            ExpenseError::NotFound("expense::missing".to_string())
        );
    }

    #[test]
    fn test_delete_expense() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let expense = service.create_expense(create_command()).unwrap();

        assert!(service.delete_expense(&expense.id).unwrap());
        assert!(!service.delete_expense(&expense.id).unwrap());
        assert!(service.list_expenses().unwrap().is_empty());
    }

    #[test]
    fn test_stats_totals() {
        let (service, connection, _dir) = setup_service();
        seed_household(&connection);

        let mut old = create_command();
        old.amount = 40.0;
        old.date = Some(Utc::now() - chrono::Duration::days(400));
        service.create_expense(old).unwrap();

        let mut current = create_command();
        current.amount = 60.0;
        service.create_expense(current).unwrap();

        let stats = service.stats().unwrap();
        assert!((stats.total - 100.0).abs() < 1e-9);
        assert!((stats.this_month - 60.0).abs() < 1e-9);
    }
}
