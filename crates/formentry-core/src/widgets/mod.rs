//! Renderable, submission-bindable controls.
//!
//! Widgets do not know their own field name: the element registers them with the
//! [`FormEntryContext`] and passes the assigned name back in when rendering or reading
//! submitted values.

mod autocomplete;
mod checkbox;
mod date;
mod dropdown;
mod error;
mod time;

pub use autocomplete::{escape_option_label, AutocompleteWidget};
pub use checkbox::CheckboxWidget;
pub use date::DateWidget;
pub use dropdown::DropdownWidget;
pub use error::ErrorWidget;
pub use time::TimeWidget;

use crate::constants::EMPTY_VALUE_PLACEHOLDER;
use crate::context::{FormEntryContext, Submission, WidgetKind};
use crate::options::SelectOption;
use formentry_types::FieldName;

pub trait Widget {
    fn kind(&self) -> WidgetKind;

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String;

    /// The raw submitted string for this widget, without interpretation.
    fn raw_value<'s>(&self, field: &FieldName, submission: &'s Submission) -> Option<&'s str> {
        submission.value(field.as_str())
    }
}

/// The option a single-option widget starts out showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitialSelection {
    pub label: String,
    pub value: String,
}

impl InitialSelection {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A widget choosing one value out of an ordered option list.
///
/// The provider and location pickers are built against this trait so that the dropdown and
/// the autocomplete are interchangeable.
pub trait SingleOptionWidget: Widget + std::fmt::Debug {
    /// Options in display order.
    fn options(&self) -> &[SelectOption];

    /// Appends `option` after the existing ones.
    fn add_option(&mut self, option: SelectOption);

    fn initial_value(&self) -> Option<&InitialSelection>;

    /// Sets the option shown before the user changes anything. The dropdown matches it by
    /// value; the autocomplete matches it by label and uses the value to settle shared labels.
    fn set_initial_value(&mut self, initial: Option<InitialSelection>);
}

pub(crate) fn display_value(text: &str) -> String {
    format!(
        "<span class=\"value\">{}</span>",
        html_escape::encode_text(text)
    )
}

pub(crate) fn display_empty_value() -> String {
    format!("<span class=\"emptyValue\">{EMPTY_VALUE_PLACEHOLDER}</span>")
}

pub(crate) fn attr(value: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

impl<T: Widget + ?Sized> Widget for Box<T> {
    fn kind(&self) -> WidgetKind {
        (**self).kind()
    }

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String {
        (**self).render(field, context)
    }

    fn raw_value<'s>(&self, field: &FieldName, submission: &'s Submission) -> Option<&'s str> {
        (**self).raw_value(field, submission)
    }
}
