//! In-memory directory of persons, users, providers, roles and locations.
//!
//! Hosts without a database-backed directory (the CLI, tests, form previews) load a YAML
//! snapshot into an [`InMemoryDirectory`], which answers both the [`IdentityResolver`] and the
//! [`Directory`] queries.
//!
//! Snapshot layout:
//!
//! ```yaml
//! persons:
//!   - { id: 1, name: "Jane Doe" }
//! roles: [Provider]
//! users:
//!   - { username: jdoe, person: 1, roles: [Provider] }
//! providers:
//!   - { id: 10, person: 1 }
//! locations:
//!   - { id: 1, name: "Outpatient Clinic" }
//! ```

use crate::config::from_yaml_str;
use crate::domain::{Location, Person, PersonId, PersonStub, Provider, ProviderId, Role};
use crate::services::{Directory, IdentityResolver};
use crate::{FormError, FormResult};
use formentry_types::NonEmptyText;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectorySnapshot {
    #[serde(default)]
    persons: Vec<Person>,
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default)]
    users: Vec<UserRecord>,
    #[serde(default)]
    providers: Vec<ProviderRecord>,
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UserRecord {
    username: String,
    person: PersonId,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderRecord {
    id: ProviderId,
    #[serde(default)]
    person: Option<PersonId>,
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryDirectory {
    persons: Vec<Person>,
    roles: Vec<Role>,
    users: Vec<UserRecord>,
    providers: Vec<ProviderRecord>,
    locations: Vec<Location>,
}

impl InMemoryDirectory {
    /// Parse a directory snapshot from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `FormError::YamlDeserialization` when the text does not match the snapshot
    /// layout and `FormError::InvalidInput` when a user or provider refers to an unknown
    /// person.
    pub fn from_yaml_str(yaml_text: &str) -> FormResult<Self> {
        let snapshot: DirectorySnapshot = from_yaml_str(yaml_text)?;
        let mut directory = Self {
            persons: snapshot.persons,
            roles: snapshot.roles,
            users: Vec::new(),
            providers: Vec::new(),
            locations: snapshot.locations,
        };

        for user in snapshot.users {
            directory.push_user(user)?;
        }
        for provider in snapshot.providers {
            directory.push_provider(provider)?;
        }

        tracing::debug!(
            "loaded directory with {} persons, {} users, {} providers, {} locations",
            directory.persons.len(),
            directory.users.len(),
            directory.providers.len(),
            directory.locations.len()
        );

        Ok(directory)
    }

    pub fn from_yaml_file(path: &Path) -> FormResult<Self> {
        let text = std::fs::read_to_string(path).map_err(FormError::FileRead)?;
        Self::from_yaml_str(&text)
    }

    fn push_user(&mut self, user: UserRecord) -> FormResult<()> {
        if self.person_by_id(user.person).is_none() {
            return Err(FormError::InvalidInput(format!(
                "user {} refers to unknown person {}",
                user.username, user.person
            )));
        }
        for role in &user.roles {
            if !self.roles.iter().any(|r| r.name.as_str() == role) {
                let name =
                    NonEmptyText::new(role).map_err(|e| FormError::InvalidInput(e.to_string()))?;
                self.roles.push(Role { name });
            }
        }
        self.users.push(user);
        Ok(())
    }

    fn push_provider(&mut self, provider: ProviderRecord) -> FormResult<()> {
        if let Some(person) = provider.person {
            if self.person_by_id(person).is_none() {
                return Err(FormError::InvalidInput(format!(
                    "provider {} refers to unknown person {}",
                    provider.id, person
                )));
            }
        }
        self.providers.push(provider);
        Ok(())
    }

    fn person_by_id(&self, id: PersonId) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }
}

impl IdentityResolver for InMemoryDirectory {
    /// Accepts a numeric person id, a person uuid or a username.
    fn person(&self, token: &str) -> Option<Person> {
        let token = token.trim();
        if let Ok(id) = token.parse::<PersonId>() {
            return self.person_by_id(id).cloned();
        }
        if let Ok(uuid) = Uuid::parse_str(token) {
            return self.persons.iter().find(|p| p.uuid == uuid).cloned();
        }
        self.users
            .iter()
            .find(|u| u.username == token)
            .and_then(|u| self.person_by_id(u.person))
            .cloned()
    }

    fn role(&self, name: &str) -> Option<Role> {
        let name = name.trim();
        self.roles.iter().find(|r| r.name.as_str() == name).cloned()
    }

    /// Accepts a numeric location id, a location uuid or the exact location name.
    fn location(&self, token: &str) -> Option<Location> {
        let token = token.trim();
        if let Ok(id) = token.parse::<crate::domain::LocationId>() {
            return self.locations.iter().find(|l| l.id == id).cloned();
        }
        if let Ok(uuid) = Uuid::parse_str(token) {
            return self.locations.iter().find(|l| l.uuid == uuid).cloned();
        }
        self.locations
            .iter()
            .find(|l| l.name.as_str() == token)
            .cloned()
    }
}

impl Directory for InMemoryDirectory {
    fn all_locations(&self) -> Vec<Location> {
        self.locations.clone()
    }

    fn users_as_person_stubs(&self, role: Option<&Role>) -> Vec<PersonStub> {
        let mut seen = HashSet::new();
        self.users
            .iter()
            .filter(|u| match role {
                Some(role) => u.roles.iter().any(|r| r == role.name.as_str()),
                None => true,
            })
            .filter(|u| seen.insert(u.person))
            .filter_map(|u| self.person_by_id(u.person))
            .map(Person::stub)
            .collect()
    }

    fn providers_with_person(&self) -> Vec<Provider> {
        self.providers
            .iter()
            .filter_map(|p| {
                let person = self.person_by_id(p.person?)?.clone();
                Some(Provider {
                    id: p.id,
                    person: Some(person),
                })
            })
            .collect()
    }
}
