//! Resource filters for localization pipelines.
//!
//! A filter turns a resource file into a [`LanguageBundle`] (an ordered list
//! of key/value strings), writes a bundle as a fresh file, or merges a bundle
//! into an existing file while leaving every untranslated line untouched.
//!
//! Two formats are supported:
//!
//! - Android `strings.xml`, including `string-array` and `plurals` elements,
//!   with line-preserving merge and 80-column wrapping of replaced elements.
//! - globalize.js JSON message bundles.
//!
//! Values that are not plain text travel through the bundle in encoded form:
//! arrays as `[a, b, c]` and plurals as
//! `{key, plural, {one{1 file} other{%d files}}}` (see [`plural`]).
//!
//! ```rust
//! use resfilter::{AndroidStrings, FilterOptions, LanguageBundleBuilder, ResourceFilter};
//!
//! let base = r#"<resources>
//!     <string name="greeting">Hello</string>
//! </resources>
//! "#;
//! let mut translations = LanguageBundleBuilder::new();
//! translations.add("greeting", "Bonjour")?;
//!
//! let merged = AndroidStrings.merge_str(base, &translations.build(), &FilterOptions::new())?;
//! assert!(merged.contains(r#"<string name="greeting">Bonjour</string>"#));
//! # Ok::<(), resfilter::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod codec;
pub mod error;
pub mod formats;
pub mod options;
pub mod plural;
pub mod traits;
pub mod types;
pub mod wrap;

// Re-export most used types for easy consumption
pub use crate::{
    builder::{LanguageBundleBuilder, TextValue},
    codec::convert,
    error::Error,
    formats::{AndroidStrings, FormatType, GlobalizeJs},
    options::FilterOptions,
    traits::ResourceFilter,
    types::{LanguageBundle, PluralCategory, PluralCategoryMap, ResourceString},
};
