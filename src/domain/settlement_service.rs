//! Settlement calculation between the two parents.
//!
//! Reduces the full expense ledger to at most one payment instruction: each
//! expense credits its payer with the fronted amount and debits every parent
//! with the share assigned to them; the resulting net balance determines who
//! pays whom. Shares held by dependents never enter the balances — they only
//! mattered when the allocation decided how much landed on each parent.
//!
//! The netting is strictly two-party. With any other number of parents the
//! result is empty: that is a defined "not applicable" outcome, not an
//! error. Generalizing to N parties would need a minimum-cash-flow netting
//! algorithm, which is a different problem and out of scope here.

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::domain::models::expense::Expense;
use crate::domain::models::person::Person;
use crate::domain::models::settlement::SettlementInstruction;
use crate::storage::traits::{Connection, ExpenseStorage, PersonStorage};

/// Balances below this are treated as settled.
const SETTLEMENT_EPSILON: f64 = 0.01;

/// Service computing who owes whom across the recorded expenses.
#[derive(Clone)]
pub struct SettlementService<C: Connection> {
    expense_repository: C::ExpenseRepository,
    person_repository: C::PersonRepository,
}

impl<C: Connection> SettlementService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            expense_repository: connection.create_expense_repository(),
            person_repository: connection.create_person_repository(),
        }
    }

    /// Load the ledger and the parent roster, then net them.
    pub fn calculate_settlement(&self) -> Result<Vec<SettlementInstruction>> {
        let expenses = self.expense_repository.list_expenses()?;
        let parents: Vec<Person> = self
            .person_repository
            .list_persons()?
            .into_iter()
            .filter(|p| p.is_parent)
            .collect();

        let instructions = Self::net_settlement(&expenses, &parents);
        info!(
            "Settlement over {} expenses and {} parents: {} instruction(s)",
            expenses.len(),
            parents.len(),
            instructions.len()
        );

        Ok(instructions)
    }

    /// Pure two-party netting over an in-memory ledger.
    ///
    /// Returns empty unless exactly two parents are given. Idempotent: the
    /// same ledger always yields the same instructions.
    pub fn net_settlement(
        expenses: &[Expense],
        parents: &[Person],
    ) -> Vec<SettlementInstruction> {
        if parents.len() != 2 {
            return Vec::new();
        }

        let (first, second) = (&parents[0], &parents[1]);
        let mut first_balance = 0.0;
        let mut second_balance = 0.0;

        for expense in expenses {
            // Credit whoever fronted the money.
            if expense.payer_id == first.id {
                first_balance += expense.amount;
            } else if expense.payer_id == second.id {
                second_balance += expense.amount;
            }

            // Debit each parent with what the allocation assigned to them.
            for share in &expense.shares {
                if share.person_id == first.id {
                    first_balance -= share.amount;
                } else if share.person_id == second.id {
                    second_balance -= share.amount;
                }
            }
        }

        let net_balance = first_balance - second_balance;

        if net_balance.abs() < SETTLEMENT_EPSILON {
            return Vec::new();
        }

        // The parent with the lower balance pays the other one.
        let (debtor, creditor) = if net_balance > 0.0 {
            (second, first)
        } else {
            (first, second)
        };

        vec![SettlementInstruction {
            from_person_id: debtor.id.clone(),
            from_name: debtor.name.clone(),
            to_person_id: creditor.id.clone(),
            to_name: creditor.name.clone(),
            amount: net_balance.abs(),
        }]
    }
}
