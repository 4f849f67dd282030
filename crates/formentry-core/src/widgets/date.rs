use super::{attr, display_empty_value, display_value, Widget};
use crate::constants::DATE_FORMAT;
use crate::context::{FormEntryContext, FormMode, Submission, WidgetKind};
use chrono::NaiveDate;
use formentry_types::FieldName;

#[derive(Clone, Debug, Default)]
pub struct DateWidget {
    initial_value: Option<NaiveDate>,
    on_change: Option<String>,
}

impl DateWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_initial_value(&mut self, date: Option<NaiveDate>) {
        self.initial_value = date;
    }

    pub fn initial_value(&self) -> Option<NaiveDate> {
        self.initial_value
    }

    /// Script run by the page when the date changes.
    pub fn set_on_change(&mut self, script: impl Into<String>) {
        self.on_change = Some(script.into());
    }

    pub fn on_change(&self) -> Option<&str> {
        self.on_change.as_deref()
    }

    /// Parses the submitted date. Blank input is `Ok(None)`.
    pub fn value(
        &self,
        field: &FieldName,
        submission: &Submission,
    ) -> Result<Option<NaiveDate>, chrono::ParseError> {
        match self.raw_value(field, submission).map(str::trim) {
            Some(raw) if !raw.is_empty() => NaiveDate::parse_from_str(raw, DATE_FORMAT).map(Some),
            _ => Ok(None),
        }
    }
}

impl Widget for DateWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Date
    }

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String {
        let formatted = self
            .initial_value
            .map(|d| d.format(DATE_FORMAT).to_string());

        if context.mode() == FormMode::View {
            return match formatted {
                Some(text) => display_value(&text),
                None => display_empty_value(),
            };
        }

        let mut html = format!(
            "<input type=\"text\" size=\"10\" id=\"{field}\" name=\"{field}\" value=\"{}\"",
            formatted.unwrap_or_default()
        );
        if let Some(script) = &self.on_change {
            html.push_str(&format!(" onchange=\"{}\"", attr(script)));
        }
        html.push_str("/>");
        html
    }
}
