//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the form services. Deployment-wide defaults (the default location and the role
//! whose members act as providers) are explicit fields here instead of values looked up from
//! process-wide state while a form is being rendered.

use crate::constants::DEFAULT_PROVIDER_ROLE;
use crate::providers::{ProviderEntitySource, ProviderSource, RoleMembershipSource};
use crate::{FormError, FormResult};
use serde::de::DeserializeOwned;
use std::str::FromStr;

/// Whether the deployment records providers as their own entity type.
///
/// Older deployments only know users and roles; in that case provider candidates come from
/// role membership and explicit `persons` lists are not filtered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderCapability {
    ProviderEntities,
    PersonsOnly,
}

impl FromStr for ProviderCapability {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "providers" => Ok(ProviderCapability::ProviderEntities),
            "false" | "no" | "0" | "persons" => Ok(ProviderCapability::PersonsOnly),
            other => Err(FormError::InvalidInput(format!(
                "unrecognised provider capability: {other}"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct FormEntryConfig {
    default_location: Option<String>,
    default_provider_role: String,
    provider_capability: ProviderCapability,
}

impl FormEntryConfig {
    /// Create a new `FormEntryConfig`.
    ///
    /// `default_location` is an unresolved location reference (id, uuid or name); it is
    /// resolved per request through [`crate::services::IdentityResolver`].
    pub fn new(
        default_location: Option<String>,
        default_provider_role: String,
        provider_capability: ProviderCapability,
    ) -> FormResult<Self> {
        if default_provider_role.trim().is_empty() {
            return Err(FormError::InvalidInput(
                "default_provider_role cannot be empty".into(),
            ));
        }

        let default_location = default_location
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            default_location,
            default_provider_role: default_provider_role.trim().to_string(),
            provider_capability,
        })
    }

    pub fn default_location(&self) -> Option<&str> {
        self.default_location.as_deref()
    }

    pub fn default_provider_role(&self) -> &str {
        &self.default_provider_role
    }

    pub fn provider_capability(&self) -> ProviderCapability {
        self.provider_capability
    }

    /// Selects the provider listing strategy for this deployment.
    pub fn provider_source(&self) -> Box<dyn ProviderSource> {
        match self.provider_capability {
            ProviderCapability::ProviderEntities => Box::new(ProviderEntitySource),
            ProviderCapability::PersonsOnly => Box::new(RoleMembershipSource::new(
                self.default_provider_role.clone(),
            )),
        }
    }
}

impl Default for FormEntryConfig {
    fn default() -> Self {
        Self {
            default_location: None,
            default_provider_role: DEFAULT_PROVIDER_ROLE.to_string(),
            provider_capability: ProviderCapability::ProviderEntities,
        }
    }
}

/// Parse the provider capability from an optional string value.
///
/// If `value` is `None` or empty/whitespace, provider entities are assumed to exist.
pub fn provider_capability_from_env_value(value: Option<String>) -> FormResult<ProviderCapability> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<ProviderCapability>()).transpose()?;

    Ok(parsed.unwrap_or(ProviderCapability::ProviderEntities))
}

/// Deserialize YAML text, reporting the path of the first field that does not fit `T`.
pub(crate) fn from_yaml_str<T: DeserializeOwned>(yaml_text: &str) -> FormResult<T> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        FormError::YamlDeserialization {
            path,
            source: err.into_inner(),
        }
    })
}
