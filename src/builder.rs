use std::borrow::Cow;

use crate::{
    error::Error,
    types::{LanguageBundle, ResourceString},
};

/// Values a filter may hand to [`LanguageBundleBuilder`].
///
/// Returns `None` when the value has no text representation, which the
/// builder reports as a format error.
pub trait TextValue {
    fn as_text(&self) -> Option<Cow<'_, str>>;
}

impl TextValue for str {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl TextValue for String {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

impl TextValue for serde_json::Value {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        self.as_str().map(Cow::Borrowed)
    }
}

/// Append-only builder for a [`LanguageBundle`].
///
/// Entries added without an explicit sequence number get the next number in
/// insertion order, starting at 1.
///
/// # Example
///
/// ```rust
/// use resfilter::builder::LanguageBundleBuilder;
///
/// let mut builder = LanguageBundleBuilder::new();
/// builder.add("greeting", "Hello")?;
/// builder.add("farewell", "Bye")?;
/// let bundle = builder.build();
/// assert_eq!(bundle.resource_strings()[1].sequence_number, 2);
/// # Ok::<(), resfilter::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct LanguageBundleBuilder {
    resource_strings: Vec<ResourceString>,
    embedded_language_code: Option<String>,
}

impl LanguageBundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the language tag carried by the source document.
    pub fn embedded_language_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.embedded_language_code = Some(code.into());
        self
    }

    /// Adds an entry with an auto-assigned sequence number.
    pub fn add<V>(&mut self, key: impl Into<String>, value: &V) -> Result<&mut Self, Error>
    where
        V: TextValue + ?Sized,
    {
        let sequence_number = self.resource_strings.len() as u32 + 1;
        self.add_with_sequence(key, value, sequence_number)
    }

    /// Adds an entry with an explicit sequence number.
    pub fn add_with_sequence<V>(
        &mut self,
        key: impl Into<String>,
        value: &V,
        sequence_number: u32,
    ) -> Result<&mut Self, Error>
    where
        V: TextValue + ?Sized,
    {
        let key = key.into();
        let text = value.as_text().ok_or_else(|| {
            Error::format(format!("the value of resource `{}` is not a string", key))
        })?;
        self.resource_strings
            .push(ResourceString::new(key, text.into_owned(), sequence_number));
        Ok(self)
    }

    /// Adds a fully constructed entry, notes included.
    pub fn add_resource_string(&mut self, resource_string: ResourceString) -> &mut Self {
        self.resource_strings.push(resource_string);
        self
    }

    pub fn build(self) -> LanguageBundle {
        LanguageBundle {
            resource_strings: self.resource_strings,
            embedded_language_code: self.embedded_language_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auto_sequence_numbers_follow_insertion() {
        let mut builder = LanguageBundleBuilder::new();
        builder.add("a", "A").unwrap().add("b", "B").unwrap();
        let bundle = builder.build();
        let numbers: Vec<u32> = bundle
            .resource_strings()
            .iter()
            .map(|rs| rs.sequence_number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_explicit_sequence_numbers_are_kept() {
        let mut builder = LanguageBundleBuilder::new();
        builder.add_with_sequence("late", "L", 10).unwrap();
        builder.add_with_sequence("early", "E", 3).unwrap();
        let bundle = builder.build();
        let sorted: Vec<&str> = bundle
            .sorted_resource_strings()
            .iter()
            .map(|rs| rs.key.as_str())
            .collect();
        assert_eq!(sorted, vec!["early", "late"]);
    }

    #[test]
    fn test_json_string_value_accepted() {
        let mut builder = LanguageBundleBuilder::new();
        builder.add("k", &json!("text")).unwrap();
        assert_eq!(builder.build().resource_strings()[0].value, "text");
    }

    #[test]
    fn test_non_text_value_is_format_error() {
        let mut builder = LanguageBundleBuilder::new();
        let err = builder.add("count", &json!(42)).unwrap_err();
        assert!(err.is_format_error());
        assert!(err.to_string().contains("count"));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_embedded_language_code() {
        let mut builder = LanguageBundleBuilder::new();
        builder.embedded_language_code("de");
        let notes = ResourceString::new("p", "v", 1).with_note("comment");
        builder.add_resource_string(notes);
        let bundle = builder.build();
        assert_eq!(bundle.embedded_language_code(), Some("de"));
        assert_eq!(bundle.resource_strings()[0].notes, vec!["comment"]);
    }
}
