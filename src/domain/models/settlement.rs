//! Domain model for settlement instructions.

use serde::{Deserialize, Serialize};

/// A single directed payment that zeroes the net balance between the two
/// parents. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementInstruction {
    pub from_person_id: String,
    pub from_name: String,
    pub to_person_id: String,
    pub to_name: String,
    pub amount: f64,
}
