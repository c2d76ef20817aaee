//! All error types for the resfilter crate.
//!
//! These are returned from every fallible operation (parsing, writing, merging).
//! Plural decoding is deliberately infallible and never produces one of these.

use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The environment or the options handed to a filter are unusable
    /// (invalid locale tag, unknown format name, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The input does not conform to the grammar the filter expects.
    #[error("invalid resource format: {message}")]
    Format {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a format error without an underlying cause.
    pub fn format(message: impl Into<String>) -> Self {
        Error::Format {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a format error wrapping the error that caused it.
    pub fn format_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Format {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` for errors caused by malformed input.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Format { .. })
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        match e {
            // quick-xml shares the reader's error behind an Arc
            quick_xml::Error::Io(io) => Error::Io(
                Arc::try_unwrap(io)
                    .unwrap_or_else(|io| std::io::Error::new(io.kind(), io.to_string())),
            ),
            other => Error::format_with_source("malformed XML document", other),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Error::format_with_source("malformed XML attribute", e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Io(e.into())
        } else {
            Error::format_with_source("malformed JSON document", e)
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Self {
        Error::format_with_source("input is not valid UTF-8", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_configuration_error() {
        let error = Error::Configuration("bad locale".to_string());
        assert_eq!(error.to_string(), "configuration error: bad locale");
        assert!(!error.is_format_error());
    }

    #[test]
    fn test_format_error_without_source() {
        let error = Error::format("root is not an object");
        assert_eq!(
            error.to_string(),
            "invalid resource format: root is not an object"
        );
        assert!(error.is_format_error());
        assert!(error.source().is_none());
    }

    #[test]
    fn test_json_error_keeps_cause() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::from(json_error);
        assert!(error.is_format_error());
        assert!(error.source().is_some());
    }

    #[test]
    fn test_xml_error_is_format_error() {
        let mut reader = quick_xml::Reader::from_str("<a></b>");
        let mut buf = Vec::new();
        let xml_error = loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Eof) => panic!("expected an error"),
                Ok(_) => {}
                Err(e) => break e,
            }
        };
        let error = Error::from(xml_error);
        assert!(error.is_format_error());
        assert!(error.to_string().contains("malformed XML"));
    }

    #[test]
    fn test_xml_io_error_keeps_original_error() {
        #[derive(Debug)]
        struct Cause;
        impl std::fmt::Display for Cause {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "disk went away")
            }
        }
        impl std::error::Error for Cause {}

        let io_error = io::Error::new(io::ErrorKind::BrokenPipe, Cause);
        let error = Error::from(quick_xml::Error::Io(Arc::new(io_error)));
        match error {
            Error::Io(io) => {
                assert_eq!(io.kind(), io::ErrorKind::BrokenPipe);
                assert!(io.get_ref().is_some_and(|inner| inner.is::<Cause>()));
            }
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::Configuration("test".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Configuration"));
        assert!(debug.contains("test"));
    }
}
