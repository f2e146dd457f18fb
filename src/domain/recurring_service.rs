//! Recurring expense processing.
//!
//! Walks the active recurring expense definitions and materializes a
//! concrete expense for every definition whose cadence has elapsed. The due
//! check counts whole days since `last_created` against a fixed per-frequency
//! threshold (1/7/30/365); it is deliberately not calendar-aware.
//!
//! Materialization is fail-closed: the new expense and its shares are
//! persisted first, and only then is `last_created` advanced. If persistence
//! fails the definition is left untouched and the next run retries, so a
//! billing period is never skipped silently.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use crate::domain::allocation_service::AllocationService;
use crate::domain::clock::Clock;
use crate::domain::commands::recurring::ProcessRecurringResult;
use crate::domain::models::expense::Expense;
use crate::domain::models::person::Person;
use crate::domain::models::recurring_expense::RecurringExpense;
use crate::storage::traits::{
    Connection, ExpenseStorage, PersonStorage, RecurringExpenseStorage,
};

/// Service that materializes recurring expenses when they come due.
#[derive(Clone)]
pub struct RecurringExpenseService<C: Connection> {
    recurring_repository: C::RecurringExpenseRepository,
    expense_repository: C::ExpenseRepository,
    person_repository: C::PersonRepository,
    allocation_service: AllocationService,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> RecurringExpenseService<C> {
    pub fn new(connection: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            recurring_repository: connection.create_recurring_expense_repository(),
            expense_repository: connection.create_expense_repository(),
            person_repository: connection.create_person_repository(),
            allocation_service: AllocationService::new(),
            clock,
        }
    }

    /// Whether an occurrence is due at `now`.
    ///
    /// A definition that never fired is due immediately. Otherwise the whole
    /// days elapsed since the last firing must reach the frequency threshold.
    pub fn is_due(recurring: &RecurringExpense, now: DateTime<Utc>) -> bool {
        match recurring.last_created {
            None => true,
            Some(last_created) => {
                (now - last_created).num_days() >= recurring.frequency.threshold_days()
            }
        }
    }

    /// Process all active recurring expenses against the injected clock.
    pub fn process_recurring_expenses(&self) -> Result<ProcessRecurringResult> {
        self.process_due(self.clock.now())
    }

    /// Process all active recurring expenses against an explicit `now`.
    ///
    /// Inactive definitions are skipped entirely, regardless of how much
    /// time has passed. Expired definitions are the scheduling caller's
    /// responsibility to deactivate; no end-date check happens here.
    pub fn process_due(&self, now: DateTime<Utc>) -> Result<ProcessRecurringResult> {
        let recurring_expenses = self.recurring_repository.list_active_recurring_expenses()?;
        info!(
            "Processing {} active recurring expense(s) at {}",
            recurring_expenses.len(),
            now.to_rfc3339()
        );

        // Roster is loaded fresh for this run, never cached across runs.
        let roster = self.person_repository.list_persons()?;

        let mut created = Vec::new();

        for recurring in recurring_expenses {
            if !Self::is_due(&recurring, now) {
                debug!(
                    "Recurring expense {} not due yet (last created {:?})",
                    recurring.id, recurring.last_created
                );
                continue;
            }

            let expense = self.materialize(&recurring, now, &roster)?;

            // Advance only after the expense is safely persisted.
            let mut advanced = recurring.clone();
            advanced.last_created = Some(now);
            self.recurring_repository.update_recurring_expense(&advanced)?;

            info!(
                "Materialized recurring expense {} as {} ({:.2})",
                recurring.id, expense.id, expense.amount
            );
            created.push(expense);
        }

        Ok(ProcessRecurringResult { created })
    }

    /// Build and persist the concrete expense for one due definition.
    fn materialize(
        &self,
        recurring: &RecurringExpense,
        now: DateTime<Utc>,
        roster: &[Person],
    ) -> Result<Expense> {
        let shares = self.allocation_service.calculate_shares(
            recurring.amount,
            recurring.split_type,
            roster,
            &recurring.assigned_person_ids,
        );

        let expense = Expense {
            id: Expense::generate_recurring_id(&recurring.id, now.timestamp_millis() as u64),
            amount: recurring.amount,
            description: recurring.description.clone(),
            date: now,
            payer_id: recurring.payer_id.clone(),
            category: recurring.category.clone(),
            split_type: recurring.split_type,
            recurring_expense_id: Some(recurring.id.clone()),
            shares,
        };

        self.expense_repository.store_expense(&expense)?;
        Ok(expense)
    }
}
