//! Collaborators the form core consumes from the host application.
//!
//! The traits here are the seams between the encounter element and the surrounding system:
//! entity resolution, directory listings, localised messages and the clock. They are bundled
//! into [`FormEntryServices`] for the duration of one request.

use crate::constants::{
    MSG_CANNOT_BE_IN_FUTURE, MSG_CHOOSE_LOCATION, MSG_CHOOSE_PROVIDER, MSG_INVALID_DATE,
    MSG_INVALID_TIME, MSG_REQUIRED, MSG_VALUE_PLACEHOLDER, MSG_VOIDED,
};
use crate::domain::{Location, Person, PersonStub, Provider, Role};
use crate::providers::ProviderSource;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Resolves string references from form configuration or submitted values to entities.
///
/// `None` means the reference does not name anything known to the deployment.
pub trait IdentityResolver {
    fn person(&self, token: &str) -> Option<Person>;
    fn role(&self, name: &str) -> Option<Role>;
    fn location(&self, token: &str) -> Option<Location>;
}

/// Listing queries used to build candidate option lists.
pub trait Directory {
    fn all_locations(&self) -> Vec<Location>;

    /// Users holding `role` as person stubs, or every user when `role` is `None`.
    fn users_as_person_stubs(&self, role: Option<&Role>) -> Vec<PersonStub>;

    /// Provider records that are linked to a person.
    fn providers_with_person(&self) -> Vec<Provider>;
}

/// Localised message lookup.
pub trait MessageSource {
    fn message(&self, key: &str) -> String;
}

pub trait Clock {
    /// Current wall-clock time in the deployment's local timezone.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock pinned to one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Message source backed by an in-memory table.
///
/// Unknown keys are returned unchanged, which keeps missing translations visible in the
/// rendered form rather than producing blank labels.
#[derive(Clone, Debug, Default)]
pub struct StaticMessages {
    messages: HashMap<String, String>,
}

impl StaticMessages {
    /// The default English bundle for every key the encounter element uses.
    pub fn english() -> Self {
        let messages = [
            (MSG_REQUIRED, "Required"),
            (MSG_CANNOT_BE_IN_FUTURE, "Cannot be in the future"),
            (MSG_INVALID_DATE, "Invalid date"),
            (MSG_INVALID_TIME, "Invalid time"),
            (MSG_CHOOSE_PROVIDER, "Choose a provider"),
            (MSG_CHOOSE_LOCATION, "Choose a location"),
            (MSG_VOIDED, "Voided"),
            (MSG_VALUE_PLACEHOLDER, "Search..."),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { messages }
    }

    pub fn with_message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(key.into(), text.into());
        self
    }
}

impl MessageSource for StaticMessages {
    fn message(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Request-scoped bundle of collaborators.
#[derive(Clone, Copy)]
pub struct FormEntryServices<'a> {
    pub resolver: &'a dyn IdentityResolver,
    pub directory: &'a dyn Directory,
    pub messages: &'a dyn MessageSource,
    pub clock: &'a dyn Clock,
    pub providers: &'a dyn ProviderSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_message_keys_echo_the_key() {
        let messages = StaticMessages::english().with_message("custom.key", "Custom");
        assert_eq!(messages.message(MSG_REQUIRED), "Required");
        assert_eq!(messages.message("custom.key"), "Custom");
        assert_eq!(messages.message("missing.key"), "missing.key");
    }
}
