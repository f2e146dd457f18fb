//! Domain models for expenses and their per-person shares.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an expense amount is divided into shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitType {
    /// Split evenly between parents only.
    Equal,
    /// Split between parents in proportion to their income.
    Weighted,
    /// Split among an explicitly named set of people.
    Assigned,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "EQUAL",
            SplitType::Weighted => "WEIGHTED",
            SplitType::Assigned => "ASSIGNED",
        }
    }

    /// Parse the storage/API tag back into a split type.
    pub fn parse(s: &str) -> Result<SplitType, String> {
        match s {
            "EQUAL" => Ok(SplitType::Equal),
            "WEIGHTED" => Ok(SplitType::Weighted),
            "ASSIGNED" => Ok(SplitType::Assigned),
            other => Err(format!("Unknown split type: {}", other)),
        }
    }
}

impl std::fmt::Display for SplitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One person's share of an expense. Amounts are never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub person_id: String,
    /// Display name carried along so consumers don't need a roster lookup.
    pub person_name: String,
    pub amount: f64,
}

/// A concrete household expense together with its resolved shares.
///
/// Invariant: the share amounts sum to `amount` within floating point
/// tolerance. An expense and its shares are always written and replaced as
/// one unit; edits replace the whole share set rather than patching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub date: DateTime<Utc>,
    pub payer_id: String,
    pub category: String,
    pub split_type: SplitType,
    /// Set when this expense was materialized from a recurring definition.
    pub recurring_expense_id: Option<String>,
    pub shares: Vec<ExpenseShare>,
}

impl Expense {
    /// Generate a unique expense ID.
    /// Format: `expense::<timestamp_millis>::<random_suffix>`
    /// Example: `expense::1700000000000::af3c`
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!(
            "expense::{}::{}",
            timestamp_millis,
            Self::generate_random_suffix(4)
        )
    }

    /// Generate the ID for an expense materialized from a recurring
    /// definition. Scoped by the definition so several definitions firing
    /// at the same instant never collide.
    /// Format: `expense::<recurring_id>::<timestamp_millis>`
    pub fn generate_recurring_id(recurring_id: &str, timestamp_millis: u64) -> String {
        format!("expense::{}::{}", recurring_id, timestamp_millis)
    }

    /// Generate a random hex suffix for expense IDs.
    fn generate_random_suffix(len: usize) -> String {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }

    /// Sum of the share amounts, for conservation checks.
    pub fn shares_total(&self) -> f64 {
        self.shares.iter().map(|s| s.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_type_round_trip() {
        for split_type in [SplitType::Equal, SplitType::Weighted, SplitType::Assigned] {
            assert_eq!(SplitType::parse(split_type.as_str()), Ok(split_type));
        }
    }

    #[test]
    fn test_split_type_parse_unknown() {
        let result = SplitType::parse("HALVSIES");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("HALVSIES"));
    }

    #[test]
    fn test_generate_id() {
        let id = Expense::generate_id(1234567890);
        assert!(id.starts_with("expense::1234567890::"));
        let suffix = id.rsplit("::").next().unwrap();
        assert!(!suffix.is_empty() && suffix.len() <= 4);
    }

    #[test]
    fn test_generate_recurring_id_scoped_by_definition() {
        let first = Expense::generate_recurring_id("recurring::1", 1234567890);
        let second = Expense::generate_recurring_id("recurring::2", 1234567890);

        assert_eq!(first, "expense::recurring::1::1234567890");
        // Same instant, different definitions, distinct IDs.
        assert_ne!(first, second);
    }
}
