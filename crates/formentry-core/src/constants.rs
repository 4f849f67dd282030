//! Constants used throughout the encounter form core.
//!
//! Message keys and client-side function names are part of the contract with the message
//! bundles and the page scripts served alongside the rendered markup, so they must not be
//! renamed independently of those assets.

/// Role whose members are offered as providers when the deployment has no provider entities.
pub const DEFAULT_PROVIDER_ROLE: &str = "Provider";

/// Literal `default` value that selects the authenticated user's person as provider.
pub const CURRENT_USER: &str = "currentuser";

/// Suffix of the hidden companion input rendered by the autocomplete widget.
pub const HIDDEN_FIELD_SUFFIX: &str = "_hid";

/// Placeholder printed in view mode when a widget has no value.
pub const EMPTY_VALUE_PLACEHOLDER: &str = "____";

/// Spacer emitted between the date and time widgets.
pub const DATE_TIME_SPACER: &str = "&#160;";

/// Date format used by the date widget for rendering and parsing.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format used by the time widget for rendering.
pub const TIME_FORMAT: &str = "%H:%M";

// Message keys.
pub const MSG_REQUIRED: &str = "htmlformentry.error.required";
pub const MSG_CANNOT_BE_IN_FUTURE: &str = "htmlformentry.error.cannotBeInFuture";
pub const MSG_INVALID_DATE: &str = "htmlformentry.error.invalidDate";
pub const MSG_INVALID_TIME: &str = "htmlformentry.error.invalidTime";
pub const MSG_CHOOSE_PROVIDER: &str = "htmlformentry.chooseAProvider";
pub const MSG_CHOOSE_LOCATION: &str = "htmlformentry.chooseALocation";
pub const MSG_VOIDED: &str = "general.voided";
pub const MSG_VALUE_PLACEHOLDER: &str = "htmlformentry.form.value.placeholder";

// Client-side script hooks.
pub const EXISTING_ENCOUNTER_ON_DATE_HOOK: &str = "existingEncounterOnDate";
pub const AUTOCOMPLETE_BLUR_HOOK: &str = "onblurOptionAutocomplete";
pub const AUTOCOMPLETE_FOCUS_HOOK: &str = "setupOptionAutocomplete";
pub const DATE_GETTER_FUNCTION: &str = "dateFieldGetterFunction";
pub const DATE_SETTER_FUNCTION: &str = "dateSetterFunction";
