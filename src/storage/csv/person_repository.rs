//! # YAML Person Repository
//!
//! Stores the household roster in a single human-readable YAML file
//! (`persons.yaml`). The roster is household-sized, so the whole file is
//! read and rewritten on every operation; writes go through the atomic
//! temp-file-then-rename pattern.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::domain::models::person::Person;
use crate::storage::traits::PersonStorage;

/// Intermediate struct for YAML serialization with string date fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlPerson {
    id: String,
    name: String,
    is_parent: bool,
    income: Option<f64>,
    created_at: String,
    updated_at: String,
}

impl YamlPerson {
    fn from_domain(person: &Person) -> Self {
        Self {
            id: person.id.clone(),
            name: person.name.clone(),
            is_parent: person.is_parent,
            income: person.income,
            created_at: person.created_at.to_rfc3339(),
            updated_at: person.updated_at.to_rfc3339(),
        }
    }

    fn into_domain(self) -> Result<Person> {
        Ok(Person {
            id: self.id,
            name: self.name,
            is_parent: self.is_parent,
            income: self.income,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// YAML-backed person repository
#[derive(Debug, Clone)]
pub struct PersonRepository {
    connection: CsvConnection,
}

impl PersonRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_persons(&self) -> Result<Vec<Person>> {
        let path = self.connection.persons_file_path();

        if !path.exists() {
            debug!("No persons file at {:?}, returning empty roster", path);
            return Ok(Vec::new());
        }

        let yaml_content = std::fs::read_to_string(&path)?;
        let yaml_persons: Vec<YamlPerson> = serde_yaml::from_str(&yaml_content)?;

        yaml_persons.into_iter().map(YamlPerson::into_domain).collect()
    }

    fn write_persons(&self, persons: &[Person]) -> Result<()> {
        let yaml_persons: Vec<YamlPerson> = persons.iter().map(YamlPerson::from_domain).collect();
        let yaml_content = serde_yaml::to_string(&yaml_persons)?;

        CsvConnection::write_atomically(&self.connection.persons_file_path(), &yaml_content)
    }
}

impl PersonStorage for PersonRepository {
    fn store_person(&self, person: &Person) -> Result<()> {
        let mut persons = self.read_persons()?;

        if persons.iter().any(|p| p.id == person.id) {
            return Err(anyhow::anyhow!("Person already exists: {}", person.id));
        }

        persons.push(person.clone());
        self.write_persons(&persons)?;

        info!("Stored person '{}' ({})", person.name, person.id);
        Ok(())
    }

    fn get_person(&self, person_id: &str) -> Result<Option<Person>> {
        let persons = self.read_persons()?;
        Ok(persons.into_iter().find(|p| p.id == person_id))
    }

    fn list_persons(&self) -> Result<Vec<Person>> {
        let mut persons = self.read_persons()?;
        // Parents first, then by name.
        persons.sort_by(|a, b| {
            b.is_parent
                .cmp(&a.is_parent)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(persons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_person(id: &str, name: &str, is_parent: bool, income: Option<f64>) -> Person {
        Person {
            id: id.to_string(),
            name: name.to_string(),
            is_parent,
            income,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn setup_repository() -> (PersonRepository, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (PersonRepository::new(connection), temp_dir)
    }

    #[test]
    fn test_store_and_get_person() {
        let (repository, _dir) = setup_repository();
        let person = test_person("p1", "Jenny", true, Some(3500.0));

        repository.store_person(&person).unwrap();

        let loaded = repository.get_person("p1").unwrap().unwrap();
        assert_eq!(loaded.name, "Jenny");
        assert_eq!(loaded.income, Some(3500.0));
        assert!(loaded.is_parent);
    }

    #[test]
    fn test_get_person_not_found() {
        let (repository, _dir) = setup_repository();
        assert!(repository.get_person("missing").unwrap().is_none());
    }

    #[test]
    fn test_store_duplicate_person_fails() {
        let (repository, _dir) = setup_repository();
        let person = test_person("p1", "Jenny", true, None);

        repository.store_person(&person).unwrap();
        let result = repository.store_person(&person);

        assert!(result.is_err());
    }

    #[test]
    fn test_list_persons_parents_first_then_by_name() {
        let (repository, _dir) = setup_repository();

        repository
            .store_person(&test_person("k2", "Anna", false, None))
            .unwrap();
        repository
            .store_person(&test_person("p2", "Eric", true, Some(4500.0)))
            .unwrap();
        repository
            .store_person(&test_person("k1", "Melina", false, None))
            .unwrap();
        repository
            .store_person(&test_person("p1", "Jenny", true, Some(3500.0)))
            .unwrap();

        let persons = repository.list_persons().unwrap();
        let names: Vec<&str> = persons.iter().map(|p| p.name.as_str()).collect();
        // Parents ahead of dependents, alphabetical within each group.
        assert_eq!(names, vec!["Eric", "Jenny", "Anna", "Melina"]);
    }

    #[test]
    fn test_empty_roster_when_file_missing() {
        let (repository, _dir) = setup_repository();
        assert!(repository.list_persons().unwrap().is_empty());
    }
}
