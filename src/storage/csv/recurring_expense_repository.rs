//! # YAML Recurring Expense Repository
//!
//! Stores recurring expense definitions in a single human-readable YAML file
//! (`recurring_expenses.yaml`), rewritten atomically on every mutation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::domain::models::expense::SplitType;
use crate::domain::models::recurring_expense::{Frequency, RecurringExpense};
use crate::storage::traits::RecurringExpenseStorage;

/// Intermediate struct for YAML serialization with string date fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlRecurringExpense {
    id: String,
    amount: f64,
    description: String,
    payer_id: String,
    category: String,
    split_type: String,
    frequency: String,
    #[serde(default)]
    assigned_person_ids: Vec<String>,
    start_date: String,
    end_date: Option<String>,
    last_created: Option<String>,
    is_active: bool,
}

impl YamlRecurringExpense {
    fn from_domain(recurring: &RecurringExpense) -> Self {
        Self {
            id: recurring.id.clone(),
            amount: recurring.amount,
            description: recurring.description.clone(),
            payer_id: recurring.payer_id.clone(),
            category: recurring.category.clone(),
            split_type: recurring.split_type.as_str().to_string(),
            frequency: recurring.frequency.as_str().to_string(),
            assigned_person_ids: recurring.assigned_person_ids.clone(),
            start_date: recurring.start_date.to_rfc3339(),
            end_date: recurring.end_date.map(|d| d.to_rfc3339()),
            last_created: recurring.last_created.map(|d| d.to_rfc3339()),
            is_active: recurring.is_active,
        }
    }

    fn into_domain(self) -> Result<RecurringExpense> {
        Ok(RecurringExpense {
            split_type: SplitType::parse(&self.split_type).map_err(anyhow::Error::msg)?,
            frequency: Frequency::parse(&self.frequency).map_err(anyhow::Error::msg)?,
            start_date: parse_timestamp(&self.start_date)?,
            end_date: self.end_date.as_deref().map(parse_timestamp).transpose()?,
            last_created: self.last_created.as_deref().map(parse_timestamp).transpose()?,
            id: self.id,
            amount: self.amount,
            description: self.description,
            payer_id: self.payer_id,
            category: self.category,
            assigned_person_ids: self.assigned_person_ids,
            is_active: self.is_active,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// YAML-backed recurring expense repository
#[derive(Debug, Clone)]
pub struct RecurringExpenseRepository {
    connection: CsvConnection,
}

impl RecurringExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        let path = self.connection.recurring_expenses_file_path();

        if !path.exists() {
            debug!("No recurring expenses file at {:?}", path);
            return Ok(Vec::new());
        }

        let yaml_content = std::fs::read_to_string(&path)?;
        let yaml_entries: Vec<YamlRecurringExpense> = serde_yaml::from_str(&yaml_content)?;

        yaml_entries
            .into_iter()
            .map(YamlRecurringExpense::into_domain)
            .collect()
    }

    fn write_recurring_expenses(&self, entries: &[RecurringExpense]) -> Result<()> {
        let yaml_entries: Vec<YamlRecurringExpense> =
            entries.iter().map(YamlRecurringExpense::from_domain).collect();
        let yaml_content = serde_yaml::to_string(&yaml_entries)?;

        CsvConnection::write_atomically(
            &self.connection.recurring_expenses_file_path(),
            &yaml_content,
        )
    }
}

impl RecurringExpenseStorage for RecurringExpenseRepository {
    fn store_recurring_expense(&self, recurring: &RecurringExpense) -> Result<()> {
        let mut entries = self.read_recurring_expenses()?;

        if entries.iter().any(|r| r.id == recurring.id) {
            return Err(anyhow::anyhow!(
                "Recurring expense already exists: {}",
                recurring.id
            ));
        }

        entries.push(recurring.clone());
        self.write_recurring_expenses(&entries)?;

        info!(
            "Stored recurring expense '{}' ({}, {})",
            recurring.description,
            recurring.id,
            recurring.frequency.as_str()
        );
        Ok(())
    }

    fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        self.read_recurring_expenses()
    }

    fn list_active_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        let entries = self.read_recurring_expenses()?;
        Ok(entries.into_iter().filter(|r| r.is_active).collect())
    }

    fn update_recurring_expense(&self, recurring: &RecurringExpense) -> Result<()> {
        let mut entries = self.read_recurring_expenses()?;

        let position = entries
            .iter()
            .position(|r| r.id == recurring.id)
            .ok_or_else(|| anyhow::anyhow!("Recurring expense not found: {}", recurring.id))?;

        entries[position] = recurring.clone();
        self.write_recurring_expenses(&entries)?;

        debug!("Updated recurring expense {}", recurring.id);
        Ok(())
    }
}
