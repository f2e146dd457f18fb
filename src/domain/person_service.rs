//! Household roster management.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::persons::CreatePersonCommand;
use crate::domain::models::person::Person;
use crate::storage::traits::{Connection, PersonStorage};

/// Service for managing household members.
#[derive(Clone)]
pub struct PersonService<C: Connection> {
    person_repository: C::PersonRepository,
}

impl<C: Connection> PersonService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            person_repository: connection.create_person_repository(),
        }
    }

    /// List all household members, parents first, then ordered by name.
    pub fn list_persons(&self) -> Result<Vec<Person>> {
        self.person_repository.list_persons()
    }

    /// Add a household member.
    pub fn create_person(&self, command: CreatePersonCommand) -> Result<Person> {
        if command.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Person name must not be empty"));
        }

        if let Some(income) = command.income {
            if income < 0.0 {
                return Err(anyhow::anyhow!("Income cannot be negative"));
            }
        }

        let now = Utc::now();
        let person = Person {
            id: Person::generate_id(now.timestamp_millis() as u64),
            name: command.name.trim().to_string(),
            is_parent: command.is_parent,
            income: command.income,
            created_at: now,
            updated_at: now,
        };

        self.person_repository.store_person(&person)?;

        info!(
            "Created {} '{}' ({})",
            if person.is_parent { "parent" } else { "dependent" },
            person.name,
            person.id
        );
        Ok(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::CsvConnection;
    use tempfile::tempdir;

    fn setup_service() -> (PersonService<CsvConnection>, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (PersonService::new(connection), temp_dir)
    }

    #[test]
    fn test_create_and_list_persons() {
        let (service, _dir) = setup_service();

        service
            .create_person(CreatePersonCommand {
                name: "Jenny".to_string(),
                is_parent: true,
                income: Some(3500.0),
            })
            .unwrap();

        let persons = service.list_persons().unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name, "Jenny");
        assert!(persons[0].is_parent);
        assert_eq!(persons[0].income, Some(3500.0));
    }

    #[test]
    fn test_create_person_trims_name() {
        let (service, _dir) = setup_service();

        let person = service
            .create_person(CreatePersonCommand {
                name: "  Melina  ".to_string(),
                is_parent: false,
                income: None,
            })
            .unwrap();

        assert_eq!(person.name, "Melina");
        assert!(!person.is_parent);
    }

    #[test]
    fn test_create_person_rejects_empty_name() {
        let (service, _dir) = setup_service();

        let result = service.create_person(CreatePersonCommand {
            name: "  ".to_string(),
            is_parent: false,
            income: None,
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_create_person_rejects_negative_income() {
        let (service, _dir) = setup_service();

        let result = service.create_person(CreatePersonCommand {
            name: "Eric".to_string(),
            is_parent: true,
            income: Some(-1.0),
        });

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("negative"));
    }
}
