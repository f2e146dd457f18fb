//! Domain model for recurring expense definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expense::SplitType;

/// How often a recurring expense fires.
///
/// Thresholds are fixed day counts, not calendar-aware: a "month" is always
/// 30 days and a "year" always 365. Known approximation, kept on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Whole days that must elapse before the next occurrence is due.
    pub fn threshold_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
            Frequency::Yearly => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Result<Frequency, String> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(format!("Unknown frequency: {}", other)),
        }
    }
}

/// A template for an expense that repeats on a fixed cadence.
///
/// Materialized into a concrete `Expense` by the recurring expense service
/// when the elapsed time since `last_created` crosses the frequency
/// threshold. `last_created` only advances after the materialized expense
/// has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub payer_id: String,
    pub category: String,
    pub split_type: SplitType,
    pub frequency: Frequency,
    /// Explicit recipients for ASSIGNED splits; empty otherwise.
    pub assigned_person_ids: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub last_created: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl RecurringExpense {
    /// Generate a unique recurring expense ID.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("recurring::{}", timestamp_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_thresholds() {
        assert_eq!(Frequency::Daily.threshold_days(), 1);
        assert_eq!(Frequency::Weekly.threshold_days(), 7);
        assert_eq!(Frequency::Monthly.threshold_days(), 30);
        assert_eq!(Frequency::Yearly.threshold_days(), 365);
    }

    #[test]
    fn test_frequency_round_trip() {
        for frequency in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Yearly,
        ] {
            assert_eq!(Frequency::parse(frequency.as_str()), Ok(frequency));
        }
        assert!(Frequency::parse("fortnightly").is_err());
    }
}
