//! Provider candidate strategies.
//!
//! Whether a deployment has provider entities is decided once at startup (see
//! [`crate::config::ProviderCapability`]). The element asks the selected strategy for the
//! default candidate list and for filtering explicitly listed persons.

use crate::domain::PersonStub;
use crate::options::SelectOption;
use crate::services::{Directory, IdentityResolver};
use std::collections::HashSet;

pub trait ProviderSource {
    /// Candidates offered when the element configuration names neither persons nor a role.
    fn default_candidates(
        &self,
        resolver: &dyn IdentityResolver,
        directory: &dyn Directory,
    ) -> Vec<PersonStub>;

    /// Drops options whose person is not a provider.
    fn retain_providers(&self, directory: &dyn Directory, options: &mut Vec<SelectOption>);
}

/// Strategy for deployments that record providers as entities linked to persons.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProviderEntitySource;

impl ProviderSource for ProviderEntitySource {
    fn default_candidates(
        &self,
        _resolver: &dyn IdentityResolver,
        directory: &dyn Directory,
    ) -> Vec<PersonStub> {
        let mut seen = HashSet::new();
        directory
            .providers_with_person()
            .into_iter()
            .filter_map(|provider| provider.person)
            .filter(|person| seen.insert(person.id))
            .map(|person| person.stub())
            .collect()
    }

    fn retain_providers(&self, directory: &dyn Directory, options: &mut Vec<SelectOption>) {
        let provider_person_ids: HashSet<String> = directory
            .providers_with_person()
            .into_iter()
            .filter_map(|provider| provider.person)
            .map(|person| person.id.to_string())
            .collect();

        let before = options.len();
        options.retain(|option| provider_person_ids.contains(&option.value));
        if options.len() != before {
            tracing::debug!(
                "removed {} listed persons that are not providers",
                before - options.len()
            );
        }
    }
}

/// Strategy for deployments without provider entities: members of a configured role,
/// falling back to every user when that role is unknown or has no members.
#[derive(Clone, Debug)]
pub struct RoleMembershipSource {
    default_role: String,
}

impl RoleMembershipSource {
    pub fn new(default_role: impl Into<String>) -> Self {
        Self {
            default_role: default_role.into(),
        }
    }
}

impl ProviderSource for RoleMembershipSource {
    fn default_candidates(
        &self,
        resolver: &dyn IdentityResolver,
        directory: &dyn Directory,
    ) -> Vec<PersonStub> {
        let members = resolver
            .role(&self.default_role)
            .map(|role| directory.users_as_person_stubs(Some(&role)))
            .unwrap_or_default();

        if members.is_empty() {
            tracing::warn!(
                "provider role '{}' has no members, listing all users",
                self.default_role
            );
            return directory.users_as_person_stubs(None);
        }

        members
    }

    fn retain_providers(&self, _directory: &dyn Directory, _options: &mut Vec<SelectOption>) {}
}
