//! Domain model representing a household member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member of the household.
///
/// Parents are the settlement parties: they can pay for expenses and owe each
/// other money. Everyone else is a dependent whose costs are carried by the
/// parents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub is_parent: bool,
    /// Monthly income, only consulted for weighted splits.
    pub income: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Generate a unique ID for a person
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("person::{}", timestamp_millis)
    }

    /// Income as a weight for the weighted split; missing income counts as 0.
    pub fn income_weight(&self) -> f64 {
        self.income.unwrap_or(0.0)
    }
}
