//! # CSV Expense Repository
//!
//! Stores the expense ledger in a single CSV file (`expenses.csv`). Each row
//! is one expense; the resolved share list rides along as a JSON-encoded
//! column so an expense and its shares are always written, replaced and
//! deleted as one unit. The whole file is rewritten through a temp-file
//! rename on every mutation, so a reader never sees a half-applied edit.
//!
//! ## File Format
//!
//! ```csv
//! id,date,description,amount,payer_id,category,split_type,recurring_expense_id,shares
//! expense::1700000000000,2026-08-01T12:00:00+00:00,Groceries,84.30,person::1,Lebensmittel,EQUAL,,"[{""person_id"":...}]"
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::expense::{Expense, ExpenseShare, SplitType};
use crate::storage::traits::ExpenseStorage;

const HEADER: [&str; 9] = [
    "id",
    "date",
    "description",
    "amount",
    "payer_id",
    "category",
    "split_type",
    "recurring_expense_id",
    "shares",
];

/// CSV-based expense repository
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    connection: CsvConnection,
}

impl ExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read every expense from the ledger file.
    fn read_expenses(&self) -> Result<Vec<Expense>> {
        let file_path = self.connection.expenses_file_path();

        if !file_path.exists() {
            debug!("No expense ledger at {:?}, returning empty list", file_path);
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut expenses = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            let id = record.get(0).unwrap_or("").to_string();
            let date = parse_date(record.get(1).unwrap_or(""))
                .with_context(|| format!("Invalid date in expense {}", id))?;
            let amount = record
                .get(3)
                .unwrap_or("0")
                .parse::<f64>()
                .with_context(|| format!("Invalid amount in expense {}", id))?;
            let split_type = SplitType::parse(record.get(6).unwrap_or(""))
                .map_err(|e| anyhow::anyhow!("Expense {}: {}", id, e))?;
            let recurring_expense_id = match record.get(7) {
                Some("") | None => None,
                Some(value) => Some(value.to_string()),
            };
            let shares: Vec<ExpenseShare> = serde_json::from_str(record.get(8).unwrap_or("[]"))
                .with_context(|| format!("Invalid shares in expense {}", id))?;

            expenses.push(Expense {
                id,
                date,
                description: record.get(2).unwrap_or("").to_string(),
                amount,
                payer_id: record.get(4).unwrap_or("").to_string(),
                category: record.get(5).unwrap_or("").to_string(),
                split_type,
                recurring_expense_id,
                shares,
            });
        }

        Ok(expenses)
    }

    /// Rewrite the whole ledger file atomically.
    fn write_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let file_path = self.connection.expenses_file_path();
        let temp_path = file_path.with_extension("tmp");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let writer = BufWriter::new(file);
        let mut csv_writer = Writer::from_writer(writer);

        csv_writer.write_record(HEADER)?;

        for expense in expenses {
            let date = expense.date.to_rfc3339();
            let amount = expense.amount.to_string();
            let shares = serde_json::to_string(&expense.shares)?;

            csv_writer.write_record([
                expense.id.as_str(),
                date.as_str(),
                expense.description.as_str(),
                amount.as_str(),
                expense.payer_id.as_str(),
                expense.category.as_str(),
                expense.split_type.as_str(),
                expense.recurring_expense_id.as_deref().unwrap_or(""),
                shares.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        drop(csv_writer);
        std::fs::rename(&temp_path, &file_path)?;

        Ok(())
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

impl ExpenseStorage for ExpenseRepository {
    fn store_expense(&self, expense: &Expense) -> Result<()> {
        let mut expenses = self.read_expenses()?;

        if expenses.iter().any(|e| e.id == expense.id) {
            return Err(anyhow::anyhow!("Expense already exists: {}", expense.id));
        }

        expenses.push(expense.clone());
        self.write_expenses(&expenses)?;

        info!(
            "Stored expense '{}' ({}) with {} shares",
            expense.description,
            expense.id,
            expense.shares.len()
        );
        Ok(())
    }

    fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>> {
        let expenses = self.read_expenses()?;
        Ok(expenses.into_iter().find(|e| e.id == expense_id))
    }

    fn list_expenses(&self) -> Result<Vec<Expense>> {
        let mut expenses = self.read_expenses()?;
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    fn update_expense(&self, expense: &Expense) -> Result<()> {
        let mut expenses = self.read_expenses()?;

        let position = expenses
            .iter()
            .position(|e| e.id == expense.id)
            .ok_or_else(|| anyhow::anyhow!("Expense not found: {}", expense.id))?;

        expenses[position] = expense.clone();
        self.write_expenses(&expenses)?;

        info!("Replaced expense {} and its share set", expense.id);
        Ok(())
    }

    fn delete_expense(&self, expense_id: &str) -> Result<bool> {
        let mut expenses = self.read_expenses()?;
        let before = expenses.len();

        expenses.retain(|e| e.id != expense_id);

        if expenses.len() == before {
            return Ok(false);
        }

        self.write_expenses(&expenses)?;
        info!("Deleted expense {}", expense_id);
        Ok(true)
    }
}
