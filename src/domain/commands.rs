//! Domain-level command and result types.
//!
//! These structs are used by services inside the domain layer. The REST
//! layer is responsible for mapping its request/response DTOs to these
//! internal types.

pub mod expenses {
    use crate::domain::models::expense::SplitType;
    use chrono::{DateTime, Utc};

    /// Input for creating a new expense.
    #[derive(Debug, Clone)]
    pub struct CreateExpenseCommand {
        pub amount: f64,
        pub description: String,
        pub payer_id: String,
        pub category: String,
        pub split_type: SplitType,
        /// Recipients for ASSIGNED splits; ignored for the other types.
        pub assigned_person_ids: Vec<String>,
        /// Optional date override; uses the current time if not provided.
        pub date: Option<DateTime<Utc>>,
    }

    /// Input for editing an existing expense.
    ///
    /// Edits are whole-record replacements: shares are recomputed from the
    /// fields below and the old share set is discarded.
    #[derive(Debug, Clone)]
    pub struct UpdateExpenseCommand {
        pub expense_id: String,
        pub amount: f64,
        pub description: String,
        pub payer_id: String,
        pub category: String,
        pub split_type: SplitType,
        pub assigned_person_ids: Vec<String>,
    }

    /// Ledger totals for the stats endpoint.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ExpenseStats {
        pub total: f64,
        pub this_month: f64,
    }
}

pub mod persons {
    /// Input for adding a household member.
    #[derive(Debug, Clone)]
    pub struct CreatePersonCommand {
        pub name: String,
        pub is_parent: bool,
        pub income: Option<f64>,
    }
}

pub mod recurring {
    use crate::domain::models::expense::Expense;

    /// Result of one recurring-expense processing run.
    #[derive(Debug, Clone)]
    pub struct ProcessRecurringResult {
        /// Expenses materialized during this run, in processing order.
        pub created: Vec<Expense>,
    }
}
