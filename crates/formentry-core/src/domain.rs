//! Domain entities the encounter detail element reads from and writes to.
//!
//! Persistence of these entities is owned by the host application; the form core only holds
//! request-scoped copies handed to it by the directory and resolver collaborators.

use crate::options::SelectOption;
use chrono::NaiveDateTime;
use formentry_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }
    };
}

entity_id!(
    /// Numeric primary key of a person.
    PersonId
);
entity_id!(
    /// Numeric primary key of a location.
    LocationId
);
entity_id!(
    /// Numeric primary key of a provider record.
    ProviderId
);

/// A person known to the deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    /// Full display name.
    pub name: NonEmptyText,
}

impl Person {
    pub fn stub(&self) -> PersonStub {
        PersonStub {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Lightweight id/name pair used when listing users and providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonStub {
    pub id: PersonId,
    pub name: NonEmptyText,
}

impl PersonStub {
    pub fn to_option(&self, selected: bool) -> SelectOption {
        SelectOption::new(self.name.as_str(), self.id.to_string(), selected)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role {
    pub name: NonEmptyText,
}

/// A place where encounters happen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub name: NonEmptyText,
}

impl Location {
    pub fn to_option(&self, selected: bool) -> SelectOption {
        SelectOption::new(self.name.as_str(), self.id.to_string(), selected)
    }
}

/// A provider record, optionally linked to a person.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provider {
    pub id: ProviderId,
    pub person: Option<Person>,
}

/// The encounter being entered or edited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub encounter_datetime: Option<NaiveDateTime>,
    pub provider: Option<Person>,
    pub location: Option<Location>,
    #[serde(default)]
    pub voided: bool,
}
