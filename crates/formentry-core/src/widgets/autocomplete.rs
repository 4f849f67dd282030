//! Free-text input with client-side suggestions over a fixed option list.
//!
//! The page script receives the option labels and values as two parallel comma-joined
//! strings embedded in single-quoted JavaScript arguments. The visible input only drives
//! the lookup; the hidden companion input (`<field>_hid`, submitted under `<field>`) carries
//! the chosen option's value.

use super::{
    attr, display_empty_value, display_value, InitialSelection, SingleOptionWidget, Widget,
};
use crate::constants::{AUTOCOMPLETE_BLUR_HOOK, AUTOCOMPLETE_FOCUS_HOOK, HIDDEN_FIELD_SUFFIX};
use crate::context::{FormEntryContext, FormMode, WidgetKind};
use crate::options::{find_initial, SelectOption};
use formentry_types::FieldName;
use std::cell::OnceCell;

/// Escapes an option label for a single-quoted script argument.
///
/// Backslashes are doubled first, then `'` becomes `\'`, then `"` also becomes `\'`. The
/// last step is lossy: a label containing `"` comes back with `'` on the client. The client
/// scripts depend on this exact scheme, so it is kept as is.
pub fn escape_option_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\'")
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SerializedOptions {
    names: String,
    values: String,
}

#[derive(Clone, Debug, Default)]
pub struct AutocompleteWidget {
    options: Vec<SelectOption>,
    initial_value: Option<InitialSelection>,
    placeholder: String,
    serialized: OnceCell<SerializedOptions>,
}

impl AutocompleteWidget {
    /// `placeholder` is the localised hint shown in the empty text input.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..Self::default()
        }
    }

    /// Comma-joined escaped labels and values, computed on first use.
    fn serialized(&self) -> &SerializedOptions {
        self.serialized.get_or_init(|| SerializedOptions {
            names: self
                .options
                .iter()
                .map(|o| escape_option_label(&o.label))
                .collect::<Vec<_>>()
                .join(","),
            values: self
                .options
                .iter()
                .map(|o| o.value.as_str())
                .collect::<Vec<_>>()
                .join(","),
        })
    }

    /// Option shown in the text input when the widget is rendered for editing.
    ///
    /// Only edit mode pre-selects. Matching is by label, with shared labels settled by the
    /// initial value; the returned option is never flagged as selected.
    fn displayed_option(&self, mode: FormMode) -> Option<SelectOption> {
        if mode != FormMode::Edit {
            return None;
        }
        let initial = self.initial_value.as_ref()?;
        let found = find_initial(&self.options, &initial.label, &initial.value);
        if found.is_none() {
            tracing::warn!(
                "initial value '{}' is not among the autocomplete options",
                initial.label
            );
        }
        found.map(|o| SelectOption::new(o.label.clone(), o.value.clone(), false))
    }

    fn render_view(&self) -> String {
        match &self.initial_value {
            Some(initial) => {
                let label = find_initial(&self.options, &initial.label, &initial.value)
                    .map(|o| o.label.as_str())
                    .unwrap_or(initial.label.as_str());
                display_value(label)
            }
            None => display_empty_value(),
        }
    }
}

impl Widget for AutocompleteWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Autocomplete
    }

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String {
        if context.mode() == FormMode::View {
            return self.render_view();
        }

        let serialized = self.serialized();
        let displayed = self.displayed_option(context.mode());
        let (label, value) = displayed
            .as_ref()
            .map(|o| (o.label.as_str(), o.value.as_str()))
            .unwrap_or(("", ""));

        let script_args = format!("this,'{}','{}'", serialized.names, serialized.values);
        let script_args = attr(&script_args);

        let mut html = format!(
            "<input type=\"text\" id=\"{field}\" value=\"{}\" \
             onblur=\"{AUTOCOMPLETE_BLUR_HOOK}({script_args})\" \
             onfocus=\"{AUTOCOMPLETE_FOCUS_HOOK}({script_args})\" placeholder=\"{}\" />",
            attr(label),
            attr(&self.placeholder)
        );
        html.push_str(&format!(
            "\n<input type=\"hidden\" id=\"{}\" name=\"{field}\" value=\"{}\" />",
            field.with_suffix(HIDDEN_FIELD_SUFFIX),
            attr(value)
        ));
        html
    }
}

impl SingleOptionWidget for AutocompleteWidget {
    fn options(&self) -> &[SelectOption] {
        &self.options
    }

    fn add_option(&mut self, option: SelectOption) {
        self.options.push(option);
        self.serialized.take();
    }

    fn initial_value(&self) -> Option<&InitialSelection> {
        self.initial_value.as_ref()
    }

    fn set_initial_value(&mut self, initial: Option<InitialSelection>) {
        self.initial_value = initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Submission;

    fn widget() -> AutocompleteWidget {
        let mut widget = AutocompleteWidget::new("Search...");
        widget.add_option(SelectOption::empty());
        widget.add_option(SelectOption::new("Jane Doe", "1", false));
        widget.add_option(SelectOption::new("O'Brien, Pat", "2", false));
        widget
    }

    /// Extracts the `value` attribute of the hidden companion input.
    fn hidden_value(html: &str) -> &str {
        let hidden = &html[html.find("type=\"hidden\"").unwrap()..];
        let start = hidden.find("value=\"").unwrap() + "value=\"".len();
        let end = hidden[start..].find('"').unwrap();
        &hidden[start..start + end]
    }

    #[test]
    fn escape_is_applied_in_order_and_is_lossy_for_double_quotes() {
        assert_eq!(escape_option_label(r"a\b"), r"a\\b");
        assert_eq!(escape_option_label("O'Brien"), r"O\'Brien");
        assert_eq!(escape_option_label("say \"hi\""), r"say \'hi\'");
        assert_eq!(
            escape_option_label("say 'hi'"),
            escape_option_label("say \"hi\"")
        );
    }

    #[test]
    fn view_mode_prints_matching_label_or_raw_initial_value() {
        let context = FormEntryContext::new(FormMode::View);
        let field = FieldName::generated(1);

        let mut widget = widget();
        assert_eq!(
            widget.render(&field, &context),
            "<span class=\"emptyValue\">____</span>"
        );

        widget.set_initial_value(Some(InitialSelection::new("Jane Doe", "1")));
        assert_eq!(
            widget.render(&field, &context),
            "<span class=\"value\">Jane Doe</span>"
        );

        widget.set_initial_value(Some(InitialSelection::new("Retired Provider", "9")));
        assert_eq!(
            widget.render(&field, &context),
            "<span class=\"value\">Retired Provider</span>"
        );
    }

    #[test]
    fn edit_mode_renders_visible_and_hidden_inputs() {
        let mut widget = widget();
        widget.set_initial_value(Some(InitialSelection::new("Jane Doe", "1")));

        let html = widget.render(&FieldName::generated(3), &FormEntryContext::new(FormMode::Edit));
        let expected_args = r"this,',Jane Doe,O\'Brien, Pat',',1,2'";
        assert!(html.starts_with("<input type=\"text\" id=\"w3\" value=\"Jane Doe\" "));
        assert!(
            html.contains(&format!("onblur=\"onblurOptionAutocomplete({expected_args})\"")),
            "{html}"
        );
        assert!(html.contains(&format!(
            "onfocus=\"setupOptionAutocomplete({expected_args})\""
        )));
        assert!(html.contains("placeholder=\"Search...\""));
        assert!(html.ends_with("\n<input type=\"hidden\" id=\"w3_hid\" name=\"w3\" value=\"1\" />"));
    }

    #[test]
    fn enter_mode_does_not_preselect() {
        let mut widget = widget();
        widget.set_initial_value(Some(InitialSelection::new("Jane Doe", "1")));

        let html = widget.render(&FieldName::generated(3), &FormEntryContext::new(FormMode::Enter));
        assert!(html.starts_with("<input type=\"text\" id=\"w3\" value=\"\" "));
        assert_eq!(hidden_value(&html), "");
    }

    #[test]
    fn hidden_value_round_trips_through_raw_value() {
        let mut widget = widget();
        widget.set_initial_value(Some(InitialSelection::new("O'Brien, Pat", "2")));
        let field = FieldName::generated(3);

        let html = widget.render(&field, &FormEntryContext::new(FormMode::Edit));
        let submitted = hidden_value(&html).to_string();
        let submission = Submission::new().with(field.as_str(), submitted);

        assert_eq!(widget.raw_value(&field, &submission), Some("2"));
    }

    #[test]
    fn shared_labels_preselect_the_initial_value() {
        let mut widget = AutocompleteWidget::new("Search...");
        widget.add_option(SelectOption::empty());
        widget.add_option(SelectOption::new("John Smith", "5", false));
        widget.add_option(SelectOption::new("John Smith", "6", true));
        widget.set_initial_value(Some(InitialSelection::new("John Smith", "6")));

        let html = widget.render(&FieldName::generated(1), &FormEntryContext::new(FormMode::Edit));
        assert_eq!(hidden_value(&html), "6");
    }

    #[test]
    fn serialized_options_are_cached_until_options_change() {
        let mut widget = widget();
        assert_eq!(widget.serialized().values, ",1,2");
        assert_eq!(widget.serialized().values, ",1,2");

        widget.add_option(SelectOption::new("Zed", "3", false));
        assert_eq!(widget.serialized().values, ",1,2,3");
    }
}
