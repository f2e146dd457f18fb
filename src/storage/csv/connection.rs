//! File-based storage connection.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::expense_repository::ExpenseRepository;
use super::person_repository::PersonRepository;
use super::recurring_expense_repository::RecurringExpenseRepository;
use crate::storage::traits::Connection;

/// CsvConnection manages the data directory and file paths for the
/// file-based repositories.
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new connection with a base directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the YAML file holding the household roster.
    pub fn persons_file_path(&self) -> PathBuf {
        self.base_directory.join("persons.yaml")
    }

    /// Path of the CSV file holding the expense ledger.
    pub fn expenses_file_path(&self) -> PathBuf {
        self.base_directory.join("expenses.csv")
    }

    /// Path of the YAML file holding the recurring expense definitions.
    pub fn recurring_expenses_file_path(&self) -> PathBuf {
        self.base_directory.join("recurring_expenses.yaml")
    }

    /// Atomically replace `path` with `contents` via a temp file rename.
    pub(crate) fn write_atomically(path: &Path, contents: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl Connection for CsvConnection {
    type PersonRepository = PersonRepository;
    type ExpenseRepository = ExpenseRepository;
    type RecurringExpenseRepository = RecurringExpenseRepository;

    fn create_person_repository(&self) -> Self::PersonRepository {
        PersonRepository::new(self.clone())
    }

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        ExpenseRepository::new(self.clone())
    }

    fn create_recurring_expense_repository(&self) -> Self::RecurringExpenseRepository {
        RecurringExpenseRepository::new(self.clone())
    }
}
