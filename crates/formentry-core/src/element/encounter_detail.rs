//! Composite element for the encounter's own details: date and time, provider, location and
//! the void toggle.
//!
//! Each sub-widget is optional and configured independently from
//! [`EncounterDetailParameters`]. All entity references in the configuration are resolved
//! while the element is built; an unresolvable reference is an authoring mistake and fails
//! construction. Submitted values are resolved again during validation and application.

use super::{FieldError, FormElement, ValidationErrorKind};
use crate::constants::{
    CURRENT_USER, DATE_GETTER_FUNCTION, DATE_SETTER_FUNCTION, DATE_TIME_SPACER,
    EXISTING_ENCOUNTER_ON_DATE_HOOK, MSG_CHOOSE_LOCATION, MSG_CHOOSE_PROVIDER,
    MSG_VALUE_PLACEHOLDER, MSG_VOIDED,
};
use crate::context::{FormEntryContext, FormEntrySession, FormMode, PropertyAccessor, Submission};
use crate::domain::{Location, Person};
use crate::options::{remove_by_value, sort_options, SelectOption};
use crate::parameters::{EncounterDetailParameters, SelectionStyle};
use crate::services::{Clock, FormEntryServices, IdentityResolver};
use crate::widgets::{
    AutocompleteWidget, CheckboxWidget, DateWidget, DropdownWidget, ErrorWidget,
    InitialSelection, SingleOptionWidget, TimeWidget, Widget,
};
use crate::{FormError, FormResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use formentry_types::FieldName;

/// Sub-widget groups of the element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterPart {
    Date,
    Time,
    Provider,
    Location,
    Void,
}

/// A data widget with its registered field and paired error indicator.
#[derive(Debug)]
struct Slot<W> {
    widget: W,
    field: FieldName,
    error_field: FieldName,
}

impl<W: Widget> Slot<W> {
    fn register(widget: W, context: &mut FormEntryContext) -> Self {
        let field = context.register_widget(widget.kind());
        let error_field = context.register_error_widget();
        Self {
            widget,
            field,
            error_field,
        }
    }

    fn render(&self, context: &FormEntryContext) -> String {
        self.widget.render(&self.field, context)
    }

    fn render_error(&self, context: &FormEntryContext) -> String {
        ErrorWidget.render(&self.error_field, context)
    }

    fn raw_value<'s>(&self, submission: &'s Submission) -> Option<&'s str> {
        self.widget
            .raw_value(&self.field, submission)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

type SelectionSlot = Slot<Box<dyn SingleOptionWidget>>;

/// The encounter's date and time, provider, location and void toggle as one form element.
///
/// Every part is optional. A part that is present owns a data widget and an error indicator,
/// both registered with the [`FormEntryContext`] when the element is built.
#[derive(Debug)]
pub struct EncounterDetailElement {
    id: Option<String>,
    date: Option<Slot<DateWidget>>,
    time: Option<Slot<TimeWidget>>,
    provider: Option<SelectionSlot>,
    location: Option<SelectionSlot>,
    void: Option<Slot<CheckboxWidget>>,
}

impl EncounterDetailElement {
    /// Builds the configured sub-widgets and registers them with `context`.
    ///
    /// Parts are built in date and time, provider, location, void order. Field names follow
    /// registration order, with the time widget registered ahead of the date widget.
    ///
    /// # Arguments
    ///
    /// * `context` - Mode, existing encounter and defaults for this render; receives the
    ///   widget registrations
    /// * `params` - Which parts to show and how to populate them
    /// * `services` - Lookups used to resolve configured references and list candidates
    ///
    /// # Errors
    ///
    /// Returns `FormError` if:
    /// - a listed person, role or location cannot be resolved
    /// - the default provider, default location or default date is invalid
    /// - the default provider is `currentuser` and nobody is authenticated
    pub fn new(
        context: &mut FormEntryContext,
        params: &EncounterDetailParameters,
        services: &FormEntryServices<'_>,
    ) -> FormResult<Self> {
        let (date, time) = build_date_and_time(context, params)?;
        let provider = build_provider(context, params, services)?;
        let location = build_location(context, params, services)?;

        let void = if params.show_void_encounter && context.mode() == FormMode::Edit {
            let mut widget =
                CheckboxWidget::new(format!(" {}", services.messages.message(MSG_VOIDED)));
            widget.set_initially_checked(context.existing_encounter().is_some_and(|e| e.voided));
            Some(Slot::register(widget, context))
        } else {
            None
        };

        Ok(Self {
            id: params.scope_id().map(str::to_string),
            date,
            time,
            provider,
            location,
            void,
        })
    }

    /// Date widget, when `date` is configured.
    pub fn date_widget(&self) -> Option<&DateWidget> {
        self.date.as_ref().map(|s| &s.widget)
    }

    pub fn time_widget(&self) -> Option<&TimeWidget> {
        self.time.as_ref().map(|s| &s.widget)
    }

    pub fn provider_widget(&self) -> Option<&dyn SingleOptionWidget> {
        self.provider.as_ref().map(|s| s.widget.as_ref())
    }

    pub fn location_widget(&self) -> Option<&dyn SingleOptionWidget> {
        self.location.as_ref().map(|s| s.widget.as_ref())
    }

    pub fn void_widget(&self) -> Option<&CheckboxWidget> {
        self.void.as_ref().map(|s| &s.widget)
    }

    /// Data field and error field registered for `part`, if that part is present.
    pub fn fields(&self, part: EncounterPart) -> Option<(&FieldName, &FieldName)> {
        fn pair<W>(slot: &Option<Slot<W>>) -> Option<(&FieldName, &FieldName)> {
            slot.as_ref().map(|s| (&s.field, &s.error_field))
        }

        match part {
            EncounterPart::Date => pair(&self.date),
            EncounterPart::Time => pair(&self.time),
            EncounterPart::Provider => pair(&self.provider),
            EncounterPart::Location => pair(&self.location),
            EncounterPart::Void => pair(&self.void),
        }
    }

    /// Exposes one field group to page scripts as `<id>.value` / `<id>.error`.
    ///
    /// Only the first present group in date, provider, location order is exposed because
    /// the property names are not qualified by group.
    fn register_property_accessors(&self, id: &str, context: &mut FormEntryContext) {
        let (field, error_field, getter, setter) = if let Some(date) = &self.date {
            (
                &date.field,
                &date.error_field,
                Some(DATE_GETTER_FUNCTION),
                Some(DATE_SETTER_FUNCTION),
            )
        } else if let Some(provider) = &self.provider {
            (&provider.field, &provider.error_field, None, None)
        } else if let Some(location) = &self.location {
            (&location.field, &location.error_field, None, None)
        } else {
            return;
        };

        context.register_property_accessor(PropertyAccessor {
            property: format!("{id}.value"),
            field: field.clone(),
            getter,
            setter,
        });
        context.register_property_accessor(PropertyAccessor {
            property: format!("{id}.error"),
            field: error_field.clone(),
            getter: None,
            setter: None,
        });
    }

    fn validate_date(
        &self,
        date: &Slot<DateWidget>,
        submission: &Submission,
        clock: &dyn Clock,
    ) -> Result<(), ValidationErrorKind> {
        let day = date
            .widget
            .value(&date.field, submission)
            .map_err(|_| ValidationErrorKind::InvalidDate)?;
        let time = match &self.time {
            Some(time) => time
                .widget
                .value(&time.field, submission)
                .map_err(|_| ValidationErrorKind::InvalidTime)?,
            None => None,
        };

        let combined = combine_date_and_time(day, time).ok_or(ValidationErrorKind::Required)?;
        if combined > clock.now() {
            return Err(ValidationErrorKind::CannotBeInFuture);
        }
        Ok(())
    }
}

impl FormElement for EncounterDetailElement {
    fn render(&self, context: &mut FormEntryContext) -> String {
        let mut html = String::new();

        if let Some(id) = &self.id {
            html.push_str(&format!(
                "<span id='{}'>",
                html_escape::encode_single_quoted_attribute(id)
            ));
            self.register_property_accessors(id, context);
        }

        let context: &FormEntryContext = context;
        let show_errors = context.mode() != FormMode::View;

        if let Some(date) = &self.date {
            html.push_str(&date.render(context));
            if show_errors {
                html.push_str(&date.render_error(context));
            }
        }
        if let Some(time) = &self.time {
            html.push_str(DATE_TIME_SPACER);
            html.push_str(&time.render(context));
            if show_errors {
                html.push_str(&time.render_error(context));
            }
        }
        for slot in [&self.provider, &self.location].into_iter().flatten() {
            html.push_str(&slot.render(context));
            if show_errors {
                html.push_str(&slot.render_error(context));
            }
        }
        if let Some(void) = &self.void {
            if context.mode() == FormMode::Edit {
                html.push_str(&void.render(context));
            }
        }

        if self.id.is_some() {
            html.push_str("</span>");
        }

        html
    }

    fn validate(
        &self,
        submission: &Submission,
        services: &FormEntryServices<'_>,
    ) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if let Some(date) = &self.date {
            if let Err(kind) = self.validate_date(date, submission, services.clock) {
                errors.push(FieldError::new(&date.error_field, kind, services.messages));
            }
        }

        if let Some(provider) = &self.provider {
            if submitted_person(provider, submission, services.resolver).is_none() {
                errors.push(FieldError::new(
                    &provider.error_field,
                    ValidationErrorKind::Required,
                    services.messages,
                ));
            }
        }

        if let Some(location) = &self.location {
            if submitted_location(location, submission, services.resolver).is_none() {
                errors.push(FieldError::new(
                    &location.error_field,
                    ValidationErrorKind::Required,
                    services.messages,
                ));
            }
        }

        if !errors.is_empty() {
            tracing::debug!("encounter details rejected with {} errors", errors.len());
        }
        errors
    }

    fn apply_submission(
        &self,
        session: &mut FormEntrySession,
        submission: &Submission,
        services: &FormEntryServices<'_>,
    ) -> FormResult<()> {
        if let Some(date) = &self.date {
            let new_date = date
                .widget
                .value(&date.field, submission)
                .map_err(|e| invalid_submission(&date.field, e))?
                .and_then(|d| d.and_hms_opt(0, 0, 0));

            if let Some(previous) = session.encounter.encounter_datetime {
                if Some(previous) != new_date {
                    session.context.set_previous_encounter_date(previous);
                }
            }
            session.encounter.encounter_datetime = new_date;
        }

        if let Some(time) = &self.time {
            let time_of_day = time
                .widget
                .value(&time.field, submission)
                .map_err(|e| invalid_submission(&time.field, e))?;
            if let Some(time_of_day) = time_of_day {
                session.encounter.encounter_datetime = session
                    .encounter
                    .encounter_datetime
                    .map(|current| current.date().and_time(time_of_day));
            }
        }

        if let Some(provider) = &self.provider {
            session.encounter.provider = submitted_person(provider, submission, services.resolver);
        }

        if let Some(location) = &self.location {
            session.encounter.location =
                submitted_location(location, submission, services.resolver);
        }

        if let Some(void) = &self.void {
            // An unticked box leaves voiding to the session; un-voiding is not decided here.
            if void.widget.is_checked(&void.field, submission) {
                session.set_void_encounter(true);
            }
        }

        Ok(())
    }
}

fn invalid_submission(field: &FieldName, error: chrono::ParseError) -> FormError {
    FormError::InvalidSubmission {
        field: field.to_string(),
        reason: error.to_string(),
    }
}

fn combine_date_and_time(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<NaiveDateTime> {
    date.map(|d| d.and_time(time.unwrap_or(NaiveTime::MIN)))
}

fn submitted_person(
    slot: &SelectionSlot,
    submission: &Submission,
    resolver: &dyn IdentityResolver,
) -> Option<Person> {
    slot.raw_value(submission).and_then(|v| resolver.person(v))
}

fn submitted_location(
    slot: &SelectionSlot,
    submission: &Submission,
    resolver: &dyn IdentityResolver,
) -> Option<Location> {
    slot.raw_value(submission).and_then(|v| resolver.location(v))
}

fn build_date_and_time(
    context: &mut FormEntryContext,
    params: &EncounterDetailParameters,
) -> FormResult<(Option<Slot<DateWidget>>, Option<Slot<TimeWidget>>)> {
    if !params.date {
        return Ok((None, None));
    }

    let default_date = params.default_date()?;
    let initial = context
        .existing_encounter()
        .and_then(|e| e.encounter_datetime)
        .or(default_date);

    let mut date_widget = DateWidget::new();
    date_widget.set_initial_value(initial.map(|d| d.date()));
    if let Some(check) = params.date_change_check() {
        date_widget.set_on_change(format!("{EXISTING_ENCOUNTER_ON_DATE_HOOK}(this, '{check}') "));
    }

    // The time widget is registered ahead of the date widget.
    let time = params.show_time.then(|| {
        let mut time_widget = TimeWidget::new();
        time_widget.set_initial_value(initial.map(|d| d.time()));
        Slot::register(time_widget, context)
    });
    let date = Slot::register(date_widget, context);

    Ok((Some(date), time))
}

fn build_provider(
    context: &mut FormEntryContext,
    params: &EncounterDetailParameters,
    services: &FormEntryServices<'_>,
) -> FormResult<Option<SelectionSlot>> {
    if !params.provider {
        return Ok(None);
    }

    let mut options = if let Some(persons) = params.persons() {
        let mut listed = persons
            .into_iter()
            .map(|token| {
                services
                    .resolver
                    .person(token)
                    .map(|p| p.stub().to_option(false))
                    .ok_or_else(|| FormError::PersonNotFound(token.to_string()))
            })
            .collect::<FormResult<Vec<_>>>()?;
        services
            .providers
            .retain_providers(services.directory, &mut listed);
        listed
    } else if let Some(role_name) = params.role() {
        let role = services
            .resolver
            .role(role_name)
            .ok_or_else(|| FormError::RoleNotFound(role_name.to_string()))?;
        services
            .directory
            .users_as_person_stubs(Some(&role))
            .iter()
            .map(|stub| stub.to_option(false))
            .collect()
    } else {
        services
            .providers
            .default_candidates(services.resolver, services.directory)
            .iter()
            .map(|stub| stub.to_option(false))
            .collect()
    };

    let default_provider = match context.existing_encounter() {
        Some(encounter) => encounter.provider.clone(),
        None => match params.default_reference() {
            Some(reference) if reference.eq_ignore_ascii_case(CURRENT_USER) => Some(
                context
                    .authenticated_person()
                    .cloned()
                    .ok_or(FormError::MissingAuthenticatedUser)?,
            ),
            Some(reference) => Some(
                services
                    .resolver
                    .person(reference)
                    .ok_or_else(|| FormError::InvalidDefaultProvider(reference.to_string()))?,
            ),
            None => None,
        },
    };

    if let Some(provider) = &default_provider {
        remove_by_value(&mut options, &provider.id.to_string());
        options.push(provider.stub().to_option(true));
    }
    sort_options(&mut options);

    tracing::debug!("provider widget built with {} candidates", options.len());

    let initial = default_provider
        .map(|p| InitialSelection::new(p.name.as_str(), p.id.to_string()));
    let widget = selection_widget(
        params.selection_style,
        options,
        initial,
        MSG_CHOOSE_PROVIDER,
        services,
    );
    Ok(Some(Slot::register(widget, context)))
}

fn build_location(
    context: &mut FormEntryContext,
    params: &EncounterDetailParameters,
    services: &FormEntryServices<'_>,
) -> FormResult<Option<SelectionSlot>> {
    if !params.location {
        return Ok(None);
    }

    let configured_default = match context.existing_encounter() {
        Some(encounter) => encounter.location.clone(),
        None => match params.default_reference() {
            Some(reference) => Some(
                services
                    .resolver
                    .location(reference)
                    .ok_or_else(|| FormError::InvalidDefaultLocation(reference.to_string()))?,
            ),
            None => None,
        },
    };
    let default_location = configured_default.or_else(|| context.default_location().cloned());
    let is_default =
        |location: &Location| default_location.as_ref().is_some_and(|d| d.id == location.id);

    let options = match params.location_order() {
        Some(order) => order
            .into_iter()
            .map(|token| {
                services
                    .resolver
                    .location(token)
                    .map(|l| l.to_option(is_default(&l)))
                    .ok_or_else(|| FormError::LocationNotFound(token.to_string()))
            })
            .collect::<FormResult<Vec<_>>>()?,
        None => {
            let mut all: Vec<SelectOption> = services
                .directory
                .all_locations()
                .iter()
                .map(|l| l.to_option(is_default(l)))
                .collect();
            sort_options(&mut all);
            all
        }
    };

    tracing::debug!("location widget built with {} candidates", options.len());

    let initial = default_location
        .as_ref()
        .map(|l| InitialSelection::new(l.name.as_str(), l.id.to_string()));
    let widget = selection_widget(
        params.selection_style,
        options,
        initial,
        MSG_CHOOSE_LOCATION,
        services,
    );
    Ok(Some(Slot::register(widget, context)))
}

/// Creates the widget for `style` with its leading blank or prompt option followed by
/// `options`.
fn selection_widget(
    style: SelectionStyle,
    options: Vec<SelectOption>,
    initial: Option<InitialSelection>,
    prompt_key: &str,
    services: &FormEntryServices<'_>,
) -> Box<dyn SingleOptionWidget> {
    let mut widget: Box<dyn SingleOptionWidget> = match style {
        SelectionStyle::Autocomplete => {
            let mut widget =
                AutocompleteWidget::new(services.messages.message(MSG_VALUE_PLACEHOLDER));
            widget.add_option(SelectOption::empty());
            Box::new(widget)
        }
        SelectionStyle::Dropdown => {
            let mut widget = DropdownWidget::new();
            widget.add_option(SelectOption::new(
                services.messages.message(prompt_key),
                "",
                initial.is_none(),
            ));
            Box::new(widget)
        }
    };

    for option in options {
        widget.add_option(option);
    }
    widget.set_initial_value(initial);
    widget
}
