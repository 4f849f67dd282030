/// Errors raised by the encounter form core.
///
/// Variants in the first group are authoring mistakes in an element's configuration or in
/// the deployment's startup configuration. They are raised while an element is being built
/// and abort the render of the enclosing form. Validation failures of submitted values are
/// never reported through this type; see [`crate::element::FieldError`].
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cannot find person: {0}")]
    PersonNotFound(String),
    #[error("cannot find role: {0}")]
    RoleNotFound(String),
    #[error("cannot find location: {0}")]
    LocationNotFound(String),
    #[error("invalid default provider specified for encounter: {0}")]
    InvalidDefaultProvider(String),
    #[error("invalid default location specified for encounter: {0}")]
    InvalidDefaultLocation(String),
    #[error("invalid default date: {0}")]
    InvalidDefaultDate(String),
    #[error("default provider is the current user but no user is authenticated")]
    MissingAuthenticatedUser,

    #[error("invalid value submitted for field {field}: {reason}")]
    InvalidSubmission { field: String, reason: String },

    #[error("failed to read fixture file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize YAML at {path}: {source}")]
    YamlDeserialization {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to deserialize parameters: {0}")]
    ParameterDeserialization(serde_json::Error),
}

impl FormError {
    /// Whether this error is an authoring/configuration mistake rather than an I/O or
    /// fixture-loading failure.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FormError::InvalidInput(_)
                | FormError::PersonNotFound(_)
                | FormError::RoleNotFound(_)
                | FormError::LocationNotFound(_)
                | FormError::InvalidDefaultProvider(_)
                | FormError::InvalidDefaultLocation(_)
                | FormError::InvalidDefaultDate(_)
                | FormError::MissingAuthenticatedUser
                | FormError::ParameterDeserialization(_)
        )
    }
}

pub type FormResult<T> = std::result::Result<T, FormError>;
