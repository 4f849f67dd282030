use super::{attr, display_empty_value, display_value, InitialSelection, SingleOptionWidget, Widget};
use crate::context::{FormEntryContext, FormMode, WidgetKind};
use crate::options::SelectOption;
use formentry_types::FieldName;

#[derive(Clone, Debug, Default)]
pub struct DropdownWidget {
    options: Vec<SelectOption>,
    initial_value: Option<InitialSelection>,
}

impl DropdownWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the option rendered as selected: the one matching the initial value, else
    /// the first option flagged as selected.
    fn selected_index(&self) -> Option<usize> {
        self.initial_value
            .as_ref()
            .and_then(|initial| self.options.iter().position(|o| o.value == initial.value))
            .or_else(|| self.options.iter().position(|o| o.selected))
    }
}

impl Widget for DropdownWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Dropdown
    }

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String {
        let selected = self.selected_index();

        if context.mode() == FormMode::View {
            let label = match (selected, &self.initial_value) {
                (Some(index), Some(_)) => Some(self.options[index].label.as_str()),
                (None, Some(initial)) => Some(initial.label.as_str()),
                _ => None,
            };
            return match label {
                Some(label) if !label.is_empty() => display_value(label),
                _ => display_empty_value(),
            };
        }

        let mut html = format!("<select id=\"{field}\" name=\"{field}\">");
        for (index, option) in self.options.iter().enumerate() {
            html.push_str(&format!("<option value=\"{}\"", attr(&option.value)));
            if selected == Some(index) {
                html.push_str(" selected=\"true\"");
            }
            html.push_str(&format!(
                ">{}</option>",
                html_escape::encode_text(&option.label)
            ));
        }
        html.push_str("</select>");
        html
    }
}

impl SingleOptionWidget for DropdownWidget {
    fn options(&self) -> &[SelectOption] {
        &self.options
    }

    fn add_option(&mut self, option: SelectOption) {
        self.options.push(option);
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

    fn widget() -> DropdownWidget {
        let mut widget = DropdownWidget::new();
        widget.add_option(SelectOption::new("Choose a location", "", false));
        widget.add_option(SelectOption::new("Annex & Lab", "1", false));
        widget.add_option(SelectOption::new("Main", "2", true));
        widget
    }

    #[test]
    fn marks_flagged_option_selected_and_escapes_labels() {
        let html = widget().render(&FieldName::generated(5), &FormEntryContext::new(FormMode::Enter));
        assert_eq!(
            html,
            "<select id=\"w5\" name=\"w5\"><option value=\"\">Choose a location</option>\
             <option value=\"1\">Annex &amp; Lab</option>\
             <option value=\"2\" selected=\"true\">Main</option></select>"
        );
    }

    #[test]
    fn initial_value_wins_over_flag() {
        let mut widget = widget();
        widget.set_initial_value(Some(InitialSelection::new("Annex & Lab", "1")));
        let html = widget.render(&FieldName::generated(5), &FormEntryContext::new(FormMode::Edit));
        assert!(html.contains("<option value=\"1\" selected=\"true\">"));
        assert!(!html.contains("<option value=\"2\" selected"));
    }

    #[test]
    fn view_mode_shows_initial_label() {
        let mut widget = widget();
        let context = FormEntryContext::new(FormMode::View);
        assert_eq!(
            widget.render(&FieldName::generated(5), &context),
            "<span class=\"emptyValue\">____</span>"
        );

        widget.set_initial_value(Some(InitialSelection::new("Main", "2")));
        assert_eq!(
            widget.render(&FieldName::generated(5), &context),
            "<span class=\"value\">Main</span>"
        );
    }
}
