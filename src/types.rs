//! Core, format-agnostic types for resfilter.
//! Filters parse into these; writers and the merge engine consume these.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// One translatable unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceString {
    /// Identifier of the entry, unique within its bundle.
    pub key: String,

    /// The text. Arrays (`[a, b]`) and plural sets (`{key, plural, {...}}`)
    /// are encoded into this single string.
    pub value: String,

    /// Output order, 1-based.
    pub sequence_number: u32,

    /// Free-text comments attached to the entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ResourceString {
    pub fn new(key: impl Into<String>, value: impl Into<String>, sequence_number: u32) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            sequence_number,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl Display for ResourceString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ResourceString {{ key: {}, value: {}, sequence_number: {} }}",
            self.key, self.value, self.sequence_number
        )
    }
}

/// An ordered collection of [`ResourceString`]s for one language.
///
/// Bundles are produced by [`crate::builder::LanguageBundleBuilder`] or by a
/// filter's `parse`, and are never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LanguageBundle {
    #[serde(default)]
    pub(crate) resource_strings: Vec<ResourceString>,

    /// Language tag found inside the source document, if the format has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub(crate) embedded_language_code: Option<String>,
}

impl LanguageBundle {
    /// Entries in insertion order.
    pub fn resource_strings(&self) -> &[ResourceString] {
        &self.resource_strings
    }

    /// Entries ordered by sequence number. Entries sharing a number keep
    /// their insertion order.
    pub fn sorted_resource_strings(&self) -> Vec<&ResourceString> {
        let mut sorted: Vec<&ResourceString> = self.resource_strings.iter().collect();
        sorted.sort_by_key(|rs| rs.sequence_number);
        sorted
    }

    pub fn embedded_language_code(&self) -> Option<&str> {
        self.embedded_language_code.as_deref()
    }

    pub fn find(&self, key: &str) -> Option<&ResourceString> {
        self.resource_strings.iter().find(|rs| rs.key == key)
    }

    /// Builds a key to value lookup. For duplicate keys the last entry wins.
    pub fn key_value_map(&self) -> HashMap<&str, &str> {
        self.resource_strings
            .iter()
            .map(|rs| (rs.key.as_str(), rs.value.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resource_strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_strings.is_empty()
    }
}

/// Standard CLDR plural categories.
///
/// The declaration order is the canonical serialization order, so a
/// [`PluralCategoryMap`] iterates categories the way they must be written.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone, Copy, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub const ALL: [PluralCategory; 6] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
        PluralCategory::Other,
    ];

    /// The lower-case CLDR keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }
}

impl Display for PluralCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluralCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ZERO" => Ok(PluralCategory::Zero),
            "ONE" => Ok(PluralCategory::One),
            "TWO" => Ok(PluralCategory::Two),
            "FEW" => Ok(PluralCategory::Few),
            "MANY" => Ok(PluralCategory::Many),
            "OTHER" => Ok(PluralCategory::Other),
            _ => Err(format!("Unknown plural category: {}", s)),
        }
    }
}

/// Category → message. Iterates in canonical category order.
pub type PluralCategoryMap = BTreeMap<PluralCategory, String>;
