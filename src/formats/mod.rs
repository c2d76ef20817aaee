pub mod android_strings;
pub mod globalize_js;

use std::{fmt, str::FromStr};

use crate::error::Error;

// Reexporting the filters for easier access
pub use android_strings::AndroidStrings;
pub use globalize_js::GlobalizeJs;

/// The resource formats a filter exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    AndroidStrings,
    GlobalizeJs,
}

impl FormatType {
    pub const ALL: [FormatType; 2] = [FormatType::AndroidStrings, FormatType::GlobalizeJs];

    /// The file extension files of this format are usually written with.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::AndroidStrings => "xml",
            FormatType::GlobalizeJs => "json",
        }
    }

    /// Infers the format from a file extension, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xml" => Some(FormatType::AndroidStrings),
            "json" | "js" => Some(FormatType::GlobalizeJs),
            _ => None,
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatType::AndroidStrings => write!(f, "android"),
            FormatType::GlobalizeJs => write!(f, "globalizejs"),
        }
    }
}

impl FromStr for FormatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" | "androidstrings" | "android-strings" => Ok(FormatType::AndroidStrings),
            "globalizejs" | "globalize.js" | "globalize" => Ok(FormatType::GlobalizeJs),
            other => Err(Error::Configuration(format!(
                "unknown resource format `{}` (expected one of: android, globalizejs)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_from_str_agree() {
        for format in FormatType::ALL {
            assert_eq!(format.to_string().parse::<FormatType>().unwrap(), format);
        }
        assert_eq!(
            "Globalize.js".parse::<FormatType>().unwrap(),
            FormatType::GlobalizeJs
        );
    }

    #[test]
    fn test_unknown_format_is_configuration_error() {
        let err = "xliff".parse::<FormatType>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(FormatType::from_extension("xml"), Some(FormatType::AndroidStrings));
        assert_eq!(FormatType::from_extension("JSON"), Some(FormatType::GlobalizeJs));
        assert_eq!(FormatType::from_extension("js"), Some(FormatType::GlobalizeJs));
        assert_eq!(FormatType::from_extension("strings"), None);
    }
}
