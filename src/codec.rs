//! Path-based entry points that pick a filter by [`FormatType`].
//!
//! The format is either given explicitly or inferred from the file extension
//! (`.xml` for Android, `.json`/`.js` for globalize.js). Android resource
//! directories also carry a language (`res/values-fr/strings.xml`); when a
//! parsed bundle has no embedded language code it is taken from the path.

use std::path::Path;

use tracing::debug;
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    formats::{AndroidStrings, FormatType, GlobalizeJs},
    options::FilterOptions,
    traits::ResourceFilter,
    types::LanguageBundle,
};

/// Infers the format of `path` from its extension.
pub fn infer_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FormatType> {
    path.as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .and_then(FormatType::from_extension)
}

/// Attempts to infer a language tag from an Android resource directory in
/// `path` (`values-fr` → `fr`, `values-pt-rBR` → `pt-BR`,
/// `values-b+sr+Latn` → `sr-Latn`).
///
/// Only the language and region qualifiers are read; anything after them
/// (`values-fr-night`) is ignored.
pub fn infer_language_from_path<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref().components().rev().find_map(|c| {
        let component = c.as_os_str().to_str()?;
        language_qualifier(component.strip_prefix("values-")?)
    })
}

fn language_qualifier(qualifiers: &str) -> Option<String> {
    let mut parts = qualifiers.split('-');
    let first = parts.next()?;

    let tag = if let Some(bcp47) = first.strip_prefix("b+") {
        bcp47.replace('+', "-")
    } else {
        // Legacy qualifiers use a two-letter ISO 639-1 code, which keeps
        // `car`, `land` or `night` from being read as languages.
        if first.len() != 2 || !first.chars().all(|c| c.is_ascii_lowercase()) {
            return None;
        }
        match parts
            .next()
            .and_then(|part| part.strip_prefix('r'))
            .filter(|region| region.len() == 2 && region.chars().all(|c| c.is_ascii_uppercase()))
        {
            Some(region) => format!("{}-{}", first, region),
            None => first.to_string(),
        }
    };

    tag.parse::<LanguageIdentifier>().ok().map(|id| id.to_string())
}

fn resolve_format(path: &Path, format: Option<FormatType>) -> Result<FormatType, Error> {
    format
        .or_else(|| infer_format_from_extension(path))
        .ok_or_else(|| {
            Error::Configuration(format!(
                "cannot infer the resource format of `{}`, please specify one",
                path.display()
            ))
        })
}

/// Parses the file at `path`.
pub fn parse_file<P: AsRef<Path>>(
    path: P,
    format: Option<FormatType>,
    options: &FilterOptions,
) -> Result<LanguageBundle, Error> {
    let path = path.as_ref();
    let format = resolve_format(path, format)?;
    debug!(path = %path.display(), %format, "parsing resource file");

    let mut bundle = match format {
        FormatType::AndroidStrings => AndroidStrings.parse_file(path, options)?,
        FormatType::GlobalizeJs => GlobalizeJs.parse_file(path, options)?,
    };
    if bundle.embedded_language_code.is_none() {
        bundle.embedded_language_code = infer_language_from_path(path);
    }
    Ok(bundle)
}

/// Writes `bundle` to a new file at `path`.
pub fn write_file<P: AsRef<Path>>(
    path: P,
    format: Option<FormatType>,
    bundle: &LanguageBundle,
    options: &FilterOptions,
) -> Result<(), Error> {
    let path = path.as_ref();
    let format = resolve_format(path, format)?;
    debug!(path = %path.display(), %format, "writing resource file");

    match format {
        FormatType::AndroidStrings => AndroidStrings.write_file(path, bundle, options),
        FormatType::GlobalizeJs => GlobalizeJs.write_file(path, bundle, options),
    }
}

/// Merges `bundle` into the file at `base` and writes the result to `output`.
///
/// The format is resolved from `base`.
pub fn merge_file<P: AsRef<Path>, Q: AsRef<Path>>(
    base: P,
    output: Q,
    format: Option<FormatType>,
    bundle: &LanguageBundle,
    options: &FilterOptions,
) -> Result<(), Error> {
    let base = base.as_ref();
    let output = output.as_ref();
    let format = resolve_format(base, format)?;
    debug!(base = %base.display(), output = %output.display(), %format, "merging resource file");

    match format {
        FormatType::AndroidStrings => AndroidStrings.merge_file(base, output, bundle, options),
        FormatType::GlobalizeJs => GlobalizeJs.merge_file(base, output, bundle, options),
    }
}

/// Converts a resource file from one format to another, inferring both
/// formats from the file extensions.
///
/// ```rust,no_run
/// use resfilter::{FilterOptions, codec::convert};
///
/// convert("res/values-fr/strings.xml", "fr.json", &FilterOptions::new())?;
/// # Ok::<(), resfilter::Error>(())
/// ```
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &FilterOptions,
) -> Result<(), Error> {
    let bundle = parse_file(input, None, options)?;
    write_file(output, None, &bundle, options)
}
