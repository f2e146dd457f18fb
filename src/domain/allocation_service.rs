//! Expense share allocation.
//!
//! This service turns an expense amount into per-person shares according to
//! the household's split rules. It is a pure computation: the roster is
//! handed in by the caller and nothing is read from or written to storage.
//!
//! ## Split rules
//!
//! - `Equal`: the amount is divided evenly between the parents. Dependents
//!   never receive a direct share.
//! - `Weighted`: the amount is divided between the parents in proportion to
//!   their income. Parents without an income still get a zero-valued share
//!   entry so there is always one entry per parent. If no parent has any
//!   income, every share is zero.
//! - `Assigned`: the amount goes to the explicitly named recipients. If any
//!   named recipient is a dependent, the whole amount is instead split
//!   evenly between all parents, because dependents are never settlement
//!   parties.
//!
//! Invalid inputs (no parents for an Equal split, no recipients for an
//! Assigned split) degrade to an empty share list rather than an error;
//! callers that want strict validation do it before calling in (see
//! `ExpenseService`).

use log::warn;

use crate::domain::models::expense::{ExpenseShare, SplitType};
use crate::domain::models::person::Person;

/// Stateless allocation engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationService;

impl AllocationService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the per-person shares of `amount` under the given split type.
    ///
    /// The returned shares always sum to `amount` (within floating point
    /// tolerance) unless the result is empty. No rounding to currency minor
    /// units happens here; that is a rendering concern.
    pub fn calculate_shares(
        &self,
        amount: f64,
        split_type: SplitType,
        roster: &[Person],
        assigned_person_ids: &[String],
    ) -> Vec<ExpenseShare> {
        let parents: Vec<&Person> = roster.iter().filter(|p| p.is_parent).collect();

        match split_type {
            SplitType::Equal => Self::split_evenly(amount, &parents),
            SplitType::Weighted => Self::split_by_income(amount, &parents),
            SplitType::Assigned => {
                Self::split_assigned(amount, roster, &parents, assigned_person_ids)
            }
        }
    }

    /// Divide `amount` evenly across the given people.
    fn split_evenly(amount: f64, people: &[&Person]) -> Vec<ExpenseShare> {
        if people.is_empty() {
            warn!("Even split requested with nobody to split between");
            return Vec::new();
        }

        let share = amount / people.len() as f64;
        people
            .iter()
            .map(|p| ExpenseShare {
                person_id: p.id.clone(),
                person_name: p.name.clone(),
                amount: share,
            })
            .collect()
    }

    /// Divide `amount` across the parents in proportion to their income.
    ///
    /// A total income of zero yields all-zero shares, not an equal split.
    fn split_by_income(amount: f64, parents: &[&Person]) -> Vec<ExpenseShare> {
        let total_income: f64 = parents.iter().map(|p| p.income_weight()).sum();

        parents
            .iter()
            .map(|p| ExpenseShare {
                person_id: p.id.clone(),
                person_name: p.name.clone(),
                amount: if total_income > 0.0 {
                    amount * p.income_weight() / total_income
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Divide `amount` across explicitly named recipients.
    fn split_assigned(
        amount: f64,
        roster: &[Person],
        parents: &[&Person],
        assigned_person_ids: &[String],
    ) -> Vec<ExpenseShare> {
        if assigned_person_ids.is_empty() {
            warn!("Assigned split requested without recipients");
            return Vec::new();
        }

        let assigned: Vec<&Person> = roster
            .iter()
            .filter(|p| assigned_person_ids.iter().any(|id| id == &p.id))
            .collect();

        let any_dependent = assigned.iter().any(|p| !p.is_parent);

        // Costs attributed to a dependent are carried evenly by all parents,
        // regardless of which parents were also named.
        if any_dependent && !parents.is_empty() {
            return Self::split_evenly(amount, parents);
        }

        Self::split_evenly(amount, &assigned)
    }
}
