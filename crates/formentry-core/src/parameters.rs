//! Declarative configuration of an encounter detail element.
//!
//! Form definitions hand element attributes over as a string map, while fixtures and tests
//! tend to use YAML with native booleans. Both shapes deserialize into
//! [`EncounterDetailParameters`].

use crate::config::from_yaml_str;
use crate::{FormError, FormResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// How single-option sub-widgets (provider, location) are presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SelectionStyle {
    #[default]
    Dropdown,
    Autocomplete,
}

impl From<String> for SelectionStyle {
    /// Anything other than `autocomplete` selects the dropdown.
    fn from(value: String) -> Self {
        if value.trim() == "autocomplete" {
            SelectionStyle::Autocomplete
        } else {
            SelectionStyle::Dropdown
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Text(String),
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagRepr::deserialize(deserializer)? {
        FlagRepr::Bool(b) => b,
        FlagRepr::Text(s) => s.trim().eq_ignore_ascii_case("true"),
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterDetailParameters {
    #[serde(default, deserialize_with = "flag")]
    pub date: bool,
    #[serde(default)]
    pub default_date: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub show_time: bool,
    /// Passed through to the client-side duplicate encounter check.
    #[serde(default)]
    pub disallow_multiple_encounters_on_date: Option<String>,

    #[serde(default, deserialize_with = "flag")]
    pub provider: bool,
    #[serde(default, rename = "type")]
    pub selection_style: SelectionStyle,
    #[serde(default)]
    pub persons: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Default provider or location reference; `currentuser` for the provider.
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default, deserialize_with = "flag")]
    pub location: bool,
    #[serde(default)]
    pub order: Option<String>,

    #[serde(default, deserialize_with = "flag")]
    pub show_void_encounter: bool,
    #[serde(default)]
    pub id: Option<String>,

    /// Attributes this element does not read, such as styling hooks on the form tag.
    #[serde(flatten)]
    pub unrecognised: BTreeMap<String, serde_json::Value>,
}

fn split_list(list: &Option<String>) -> Option<Vec<&str>> {
    list.as_deref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
    })
    .filter(|items| !items.is_empty())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl EncounterDetailParameters {
    pub fn from_yaml_str(yaml_text: &str) -> FormResult<Self> {
        from_yaml_str(yaml_text).map(Self::log_unrecognised)
    }

    /// Builds parameters from the raw string attributes of a form tag.
    pub fn from_attributes<I, K, V>(attributes: I) -> FormResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: serde_json::Map<String, serde_json::Value> = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map))
            .map(Self::log_unrecognised)
            .map_err(FormError::ParameterDeserialization)
    }

    fn log_unrecognised(self) -> Self {
        if !self.unrecognised.is_empty() {
            let keys: Vec<&str> = self.unrecognised.keys().map(String::as_str).collect();
            tracing::debug!("ignoring unrecognised encounter detail attributes: {:?}", keys);
        }
        self
    }

    /// Person references listed in `persons`, in order.
    pub fn persons(&self) -> Option<Vec<&str>> {
        split_list(&self.persons)
    }

    /// Location references listed in `order`, in order.
    pub fn location_order(&self) -> Option<Vec<&str>> {
        split_list(&self.order)
    }

    pub fn role(&self) -> Option<&str> {
        non_blank(&self.role)
    }

    pub fn default_reference(&self) -> Option<&str> {
        non_blank(&self.default)
    }

    pub fn date_change_check(&self) -> Option<&str> {
        non_blank(&self.disallow_multiple_encounters_on_date)
    }

    pub fn scope_id(&self) -> Option<&str> {
        non_blank(&self.id)
    }

    /// Parses `defaultDate`. Accepts `YYYY-MM-DD`, optionally followed by `T` or a space and
    /// `HH:MM` or `HH:MM:SS`.
    pub fn default_date(&self) -> FormResult<Option<NaiveDateTime>> {
        let Some(raw) = non_blank(&self.default_date) else {
            return Ok(None);
        };

        const DATE_TIME_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ];

        DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(Some)
            .ok_or_else(|| FormError::InvalidDefaultDate(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_attributes_become_typed_flags() {
        let params = EncounterDetailParameters::from_attributes([
            ("date", "true"),
            ("showTime", "TRUE"),
            ("provider", "false"),
            ("type", "autocomplete"),
            ("persons", " 1, 2 ,,3"),
        ])
        .unwrap();

        assert!(params.date);
        assert!(params.show_time);
        assert!(!params.provider);
        assert_eq!(params.selection_style, SelectionStyle::Autocomplete);
        assert_eq!(params.persons(), Some(vec!["1", "2", "3"]));
    }

    #[test]
    fn blank_lists_count_as_unset() {
        let params =
            EncounterDetailParameters::from_attributes([("persons", " , "), ("order", "")]).unwrap();
        assert_eq!(params.persons(), None);
        assert_eq!(params.location_order(), None);
    }

    #[test]
    fn yaml_accepts_native_booleans() {
        let params = EncounterDetailParameters::from_yaml_str(
            "location: true\nshowVoidEncounter: true\norder: 'Ward,Clinic'\nid: encounterLocation\n",
        )
        .unwrap();

        assert!(params.location);
        assert!(params.show_void_encounter);
        assert_eq!(params.location_order(), Some(vec!["Ward", "Clinic"]));
        assert_eq!(params.scope_id(), Some("encounterLocation"));
        assert_eq!(params.selection_style, SelectionStyle::Dropdown);
    }

    #[test]
    fn unknown_type_falls_back_to_dropdown() {
        let params = EncounterDetailParameters::from_attributes([("type", "radio")]).unwrap();
        assert_eq!(params.selection_style, SelectionStyle::Dropdown);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let params =
            EncounterDetailParameters::from_attributes([("location", "true"), ("style", "wide")])
                .unwrap();
        assert!(params.location);
        assert_eq!(params.unrecognised.len(), 1);
        assert!(params.unrecognised.contains_key("style"));

        let params = EncounterDetailParameters::from_yaml_str("date: true
class: compact
").unwrap();
        assert!(params.date);
        assert!(params.unrecognised.contains_key("class"));
    }

    #[test]
    fn default_date_formats() {
        let parse = |raw: &str| {
            EncounterDetailParameters {
                default_date: Some(raw.to_string()),
                ..Default::default()
            }
            .default_date()
        };

        let midnight = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse("2024-01-15T00:00").unwrap(), Some(midnight));
        assert_eq!(parse("2024-01-15").unwrap(), Some(midnight));
        assert_eq!(
            parse("2024-01-15 08:30:15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(8, 30, 15)
        );
        assert!(matches!(
            parse("15 Jan 2024"),
            Err(FormError::InvalidDefaultDate(_))
        ));
        assert_eq!(parse("  ").unwrap(), None);
    }
}
