/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input cannot be used as a form field name
    #[error("invalid field name: {0}")]
    InvalidFieldName(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
/// Person names and location names are carried as `NonEmptyText` so that every option label
/// rendered into a selection widget has something to show.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Name under which a widget is registered with the rendering context.
///
/// Field names are embedded verbatim into `id`/`name` attributes and client-side script
/// calls, so only ASCII alphanumerics, `_` and `-` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(String);

impl FieldName {
    /// Validates and wraps a field name.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let name = input.into();
        let ok = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !ok {
            return Err(TextError::InvalidFieldName(name));
        }
        Ok(Self(name))
    }

    /// Builds the generated name for the `sequence`-th registered widget (`w1`, `w2`, ...).
    pub fn generated(sequence: usize) -> Self {
        Self(format!("w{sequence}"))
    }

    /// Returns a derived name such as `w3_hid`.
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  Jane Doe ").unwrap().as_str(), "Jane Doe");
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn field_name_rejects_markup_characters() {
        assert!(FieldName::new("w12").is_ok());
        assert!(FieldName::new("encounter-date_1").is_ok());
        assert!(matches!(
            FieldName::new("w1\" onclick=\"x"),
            Err(TextError::InvalidFieldName(_))
        ));
        assert!(FieldName::new("").is_err());
    }

    #[test]
    fn generated_names_follow_sequence() {
        assert_eq!(FieldName::generated(3).as_str(), "w3");
        assert_eq!(FieldName::generated(3).with_suffix("_hid"), "w3_hid");
    }
}
