//! Options handed to every filter operation.

use unic_langid::LanguageIdentifier;

use crate::error::Error;

/// Behavior options for [`crate::traits::ResourceFilter`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    /// Locale selecting word-break rules for line wrapping. Also used as the
    /// language tag when writing a format that embeds one and the bundle
    /// carries none.
    pub locale: Option<LanguageIdentifier>,
}

impl FilterOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the locale.
    pub fn with_locale(mut self, locale: Option<LanguageIdentifier>) -> Self {
        self.locale = locale;
        self
    }

    /// Creates options for a BCP 47 language tag such as `pt-BR`.
    pub fn for_language_tag(tag: &str) -> Result<Self, Error> {
        let locale = tag
            .parse::<LanguageIdentifier>()
            .map_err(|e| Error::Configuration(format!("invalid language tag `{}`: {}", tag, e)))?;
        Ok(Self::new().with_locale(Some(locale)))
    }

    pub fn language_tag(&self) -> Option<String> {
        self.locale.as_ref().map(ToString::to_string)
    }
}
