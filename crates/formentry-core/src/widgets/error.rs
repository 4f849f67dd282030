use super::Widget;
use crate::context::{FormEntryContext, WidgetKind};
use formentry_types::FieldName;

/// Placeholder that displays the validation failure of its paired data widget.
///
/// Hidden until the context carries a recorded error for its field; page scripts also fill
/// it in during client-side validation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorWidget;

impl Widget for ErrorWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Error
    }

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String {
        match context.recorded_error(field) {
            Some(message) => format!(
                "<span class=\"error field-error\" id=\"{field}\">{}</span>",
                html_escape::encode_text(message)
            ),
            None => format!(
                "<span class=\"error field-error\" style=\"display: none\" id=\"{field}\"></span>"
            ),
        }
    }
}
