use super::{display_empty_value, display_value, Widget};
use crate::constants::TIME_FORMAT;
use crate::context::{FormEntryContext, FormMode, Submission, WidgetKind};
use chrono::NaiveTime;
use formentry_types::FieldName;

/// Time-of-day input, `HH:MM` (seconds accepted on submission).
#[derive(Clone, Debug, Default)]
pub struct TimeWidget {
    initial_value: Option<NaiveTime>,
}

impl TimeWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_initial_value(&mut self, time: Option<NaiveTime>) {
        self.initial_value = time;
    }

    pub fn initial_value(&self) -> Option<NaiveTime> {
        self.initial_value
    }

    pub fn value(
        &self,
        field: &FieldName,
        submission: &Submission,
    ) -> Result<Option<NaiveTime>, chrono::ParseError> {
        match self.raw_value(field, submission).map(str::trim) {
            Some(raw) if !raw.is_empty() => NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, TIME_FORMAT))
                .map(Some),
            _ => Ok(None),
        }
    }
}

impl Widget for TimeWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Time
    }

    fn render(&self, field: &FieldName, context: &FormEntryContext) -> String {
        let formatted = self
            .initial_value
            .map(|t| t.format(TIME_FORMAT).to_string());

        if context.mode() == FormMode::View {
            return match formatted {
                Some(text) => display_value(&text),
                None => display_empty_value(),
            };
        }

        format!(
            "<input type=\"text\" size=\"5\" id=\"{field}\" name=\"{field}\" value=\"{}\"/>",
            formatted.unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minutes_and_seconds_precision() {
        let widget = TimeWidget::new();
        let field = FieldName::generated(2);

        assert_eq!(
            widget
                .value(&field, &Submission::new().with("w2", "14:30"))
                .unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0)
        );
        assert_eq!(
            widget
                .value(&field, &Submission::new().with("w2", "07:05:09"))
                .unwrap(),
            NaiveTime::from_hms_opt(7, 5, 9)
        );
        assert!(widget
            .value(&field, &Submission::new().with("w2", "half past two"))
            .is_err());
    }

    #[test]
    fn renders_prefilled_input() {
        let mut widget = TimeWidget::new();
        widget.set_initial_value(NaiveTime::from_hms_opt(9, 5, 0));
        let html = widget.render(&FieldName::generated(4), &FormEntryContext::new(FormMode::Edit));
        assert_eq!(
            html,
            "<input type=\"text\" size=\"5\" id=\"w4\" name=\"w4\" value=\"09:05\"/>"
        );
    }
}
