use super::{display_value, Widget};
use crate::context::{FormEntryContext, FormMode, Submission, WidgetKind};
use formentry_types::FieldName;

/// Checkbox submitting `"true"` when ticked.
#[derive(Clone, Debug, Default)]
pub struct CheckboxWidget {
    label: String,
    initially_checked: bool,
}

impl CheckboxWidget {
    pub const CHECKED_VALUE: &'static str = "true";

    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            initially_checked: false,
        }
    }

    pub fn set_initially_checked(&mut self, checked: bool) {
        self.initially_checked = checked;
    }

    pub fn initially_checked(&self) -> bool {
        self.initially_checked
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_checked(&self, field: &FieldName, submission: &Submission) -> bool {
        self.raw_value(field, submission) == Some(Self::CHECKED_VALUE)
    }
}

impl Widget for CheckboxWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Checkbox
    }

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String {
        if context.mode() == FormMode::View {
            let mark = if self.initially_checked { "[X]" } else { "[&#160;&#160;]" };
            return format!("{mark}{}", display_value(&self.label));
        }

        let checked = if self.initially_checked {
            " checked=\"true\""
        } else {
            ""
        };
        format!(
            "<input type=\"checkbox\" id=\"{field}\" name=\"{field}\" value=\"{}\"{checked}/>\
             <label for=\"{field}\">{}</label>",
            Self::CHECKED_VALUE,
            html_escape::encode_text(&self.label)
        )
    }
}
