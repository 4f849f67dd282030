//! Request-scoped form state: mode, widget registry, submitted values and the session that
//! receives accepted values.

use crate::domain::{Encounter, Location, Person};
use crate::element::FieldError;
use chrono::NaiveDateTime;
use formentry_types::FieldName;
use std::collections::{BTreeMap, HashMap};

/// How the form is being shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormMode {
    /// Read-only rendering of an existing encounter.
    View,
    /// Editing an existing encounter.
    Edit,
    /// Entering a new encounter.
    Enter,
}

impl std::str::FromStr for FormMode {
    type Err = crate::FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(FormMode::View),
            "edit" => Ok(FormMode::Edit),
            "enter" => Ok(FormMode::Enter),
            other => Err(crate::FormError::InvalidInput(format!(
                "unknown form mode: {other}"
            ))),
        }
    }
}

/// Kind of a registered widget, kept for introspection by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetKind {
    Date,
    Time,
    Dropdown,
    Autocomplete,
    Checkbox,
    Error,
}

/// Client-side accessor exposing a field to page scripts under a property name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyAccessor {
    pub property: String,
    pub field: FieldName,
    pub getter: Option<&'static str>,
    pub setter: Option<&'static str>,
}

/// Assigns field names to widgets in registration order.
#[derive(Clone, Debug, Default)]
pub struct WidgetRegistry {
    widgets: Vec<(FieldName, WidgetKind)>,
}

impl WidgetRegistry {
    pub fn register(&mut self, kind: WidgetKind) -> FieldName {
        let field = FieldName::generated(self.widgets.len() + 1);
        self.widgets.push((field.clone(), kind));
        field
    }

    /// Registers an error indicator. Call right after registering its data widget so the
    /// pair gets adjacent names.
    pub fn register_error(&mut self) -> FieldName {
        self.register(WidgetKind::Error)
    }

    /// Registered fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, WidgetKind)> {
        self.widgets.iter().map(|(name, kind)| (name, *kind))
    }
}

/// Everything a form element needs to know about the current render.
#[derive(Clone, Debug)]
pub struct FormEntryContext {
    mode: FormMode,
    existing_encounter: Option<Encounter>,
    default_location: Option<Location>,
    authenticated_person: Option<Person>,
    registry: WidgetRegistry,
    property_accessors: Vec<PropertyAccessor>,
    recorded_errors: BTreeMap<FieldName, String>,
    previous_encounter_date: Option<NaiveDateTime>,
}

impl FormEntryContext {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            existing_encounter: None,
            default_location: None,
            authenticated_person: None,
            registry: WidgetRegistry::default(),
            property_accessors: Vec::new(),
            recorded_errors: BTreeMap::new(),
            previous_encounter_date: None,
        }
    }

    pub fn with_existing_encounter(mut self, encounter: Encounter) -> Self {
        self.existing_encounter = Some(encounter);
        self
    }

    pub fn with_default_location(mut self, location: Option<Location>) -> Self {
        self.default_location = location;
        self
    }

    pub fn with_authenticated_person(mut self, person: Option<Person>) -> Self {
        self.authenticated_person = person;
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn existing_encounter(&self) -> Option<&Encounter> {
        self.existing_encounter.as_ref()
    }

    pub fn default_location(&self) -> Option<&Location> {
        self.default_location.as_ref()
    }

    pub fn authenticated_person(&self) -> Option<&Person> {
        self.authenticated_person.as_ref()
    }

    pub fn register_widget(&mut self, kind: WidgetKind) -> FieldName {
        self.registry.register(kind)
    }

    pub fn register_error_widget(&mut self) -> FieldName {
        self.registry.register_error()
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn register_property_accessor(&mut self, accessor: PropertyAccessor) {
        self.property_accessors.push(accessor);
    }

    pub fn property_accessors(&self) -> &[PropertyAccessor] {
        &self.property_accessors
    }

    /// Keeps validation messages so error indicators show them when the form is re-rendered.
    pub fn record_errors(&mut self, errors: &[FieldError]) {
        for error in errors {
            self.recorded_errors
                .insert(error.field.clone(), error.message.clone());
        }
    }

    pub fn recorded_error(&self, field: &FieldName) -> Option<&str> {
        self.recorded_errors.get(field).map(String::as_str)
    }

    pub fn set_previous_encounter_date(&mut self, date: NaiveDateTime) {
        self.previous_encounter_date = Some(date);
    }

    /// Encounter date before this submission changed it, for elements that need it.
    pub fn previous_encounter_date(&self) -> Option<NaiveDateTime> {
        self.previous_encounter_date
    }
}

/// Raw submitted form values, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Submission {
    values: HashMap<String, Vec<String>>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .entry(field.as_ref().to_string())
            .or_default()
            .push(value.into());
    }

    /// First submitted value for `field`.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn values(&self, field: &str) -> &[String] {
        self.values.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Submission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut submission = Submission::new();
        for (field, value) in iter {
            submission.push(field, value);
        }
        submission
    }
}

/// One form submission being applied to an encounter.
#[derive(Clone, Debug)]
pub struct FormEntrySession {
    pub context: FormEntryContext,
    pub encounter: Encounter,
    void_encounter: bool,
}

impl FormEntrySession {
    /// Starts a session editing `encounter` (a fresh default encounter when entering).
    pub fn new(context: FormEntryContext, encounter: Encounter) -> Self {
        Self {
            context,
            encounter,
            void_encounter: false,
        }
    }

    /// Starts a session seeded from the context's existing encounter, if any.
    pub fn for_context(context: FormEntryContext) -> Self {
        let encounter = context.existing_encounter().cloned().unwrap_or_default();
        Self::new(context, encounter)
    }

    pub fn set_void_encounter(&mut self, void: bool) {
        self.void_encounter = void;
    }

    pub fn void_encounter(&self) -> bool {
        self.void_encounter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_fields_in_registration_order() {
        let mut registry = WidgetRegistry::default();
        let time = registry.register(WidgetKind::Time);
        let time_error = registry.register_error();
        let date = registry.register(WidgetKind::Date);

        assert_eq!(time.as_str(), "w1");
        assert_eq!(time_error.as_str(), "w2");
        assert_eq!(date.as_str(), "w3");
        let kinds: Vec<WidgetKind> = registry.fields().map(|(_, kind)| kind).collect();
        assert_eq!(kinds, vec![WidgetKind::Time, WidgetKind::Error, WidgetKind::Date]);
    }

    #[test]
    fn submission_keeps_value_lists() {
        let submission: Submission = [("w1", "a"), ("w1", "b"), ("w2", "c")]
            .into_iter()
            .collect();
        assert_eq!(submission.value("w1"), Some("a"));
        assert_eq!(submission.values("w1"), ["a".to_string(), "b".to_string()]);
        assert_eq!(submission.value("w9"), None);
        assert!(submission.values("w9").is_empty());
    }

    #[test]
    fn form_mode_parses_case_insensitively() {
        assert_eq!("EDIT".parse::<FormMode>().unwrap(), FormMode::Edit);
        assert!("preview".parse::<FormMode>().is_err());
    }
}
