//! Support for globalize.js message bundles.
//!
//! A file holds a single top-level language tag whose value is a tree of
//! messages:
//!
//! ```json
//! { "en": { "menu": { "open": "Open", "help": ["Press", "F1"] } } }
//! ```
//!
//! Nested objects produce dot-joined keys (`menu.open`), and an array of
//! strings is one message whose parts are joined with single spaces.

use std::{
    collections::HashMap,
    io::{BufRead, ErrorKind, Write},
};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    builder::LanguageBundleBuilder,
    error::Error,
    options::FilterOptions,
    traits::ResourceFilter,
    types::LanguageBundle,
};

const BYTE_ORDER_MARK: char = '\u{feff}';
const KEY_SEPARATOR: char = '.';

/// Filter for globalize.js JSON files.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalizeJs;

impl ResourceFilter for GlobalizeJs {
    fn parse<R: BufRead>(&self, reader: R, _options: &FilterOptions) -> Result<LanguageBundle, Error> {
        let (language, messages) = read_document(reader)?;

        let mut builder = LanguageBundleBuilder::new();
        builder.embedded_language_code(language);
        let mut sequence_number = 0;
        add_bundle_strings(&messages, "", &mut builder, &mut sequence_number)?;

        let bundle = builder.build();
        debug!(
            entries = bundle.len(),
            language = bundle.embedded_language_code(),
            "parsed globalize.js bundle"
        );
        Ok(bundle)
    }

    fn write<W: Write>(
        &self,
        mut writer: W,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<(), Error> {
        let language = bundle
            .embedded_language_code()
            .map(str::to_string)
            .or_else(|| options.language_tag())
            .ok_or_else(|| {
                Error::format("a language tag is required to write a globalize.js bundle")
            })?;

        let mut messages = Map::new();
        for resource_string in bundle.sorted_resource_strings() {
            insert_nested(
                &mut messages,
                &resource_string.key,
                &resource_string.key,
                &resource_string.value,
            )?;
        }

        write_document(&mut writer, language, messages)?;
        debug!(entries = bundle.len(), "wrote globalize.js bundle");
        Ok(())
    }

    fn merge<R: BufRead, W: Write>(
        &self,
        base: R,
        mut writer: W,
        bundle: &LanguageBundle,
        _options: &FilterOptions,
    ) -> Result<(), Error> {
        let (language, mut messages) = read_document(base)?;
        let values = bundle.key_value_map();

        let mut replaced = 0usize;
        replace_values(&mut messages, "", &values, &mut replaced);

        write_document(&mut writer, language, messages)?;
        debug!(replaced, "merged globalize.js bundle");
        Ok(())
    }
}

/// Reads the document and returns its language tag and message tree.
fn read_document<R: BufRead>(mut reader: R) -> Result<(String, Map<String, Value>), Error> {
    let mut content = String::new();
    reader.read_to_string(&mut content).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => Error::format_with_source("input is not valid UTF-8", e),
        _ => Error::Io(e),
    })?;
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&content);

    let Value::Object(root) = serde_json::from_str::<Value>(content)? else {
        return Err(Error::format("the root JSON element is not a JSON object"));
    };
    if root.len() != 1 {
        return Err(Error::format(
            "only one top level language tag element is allowed per file",
        ));
    }
    let Some((language, messages)) = root.into_iter().next() else {
        return Err(Error::format("the root JSON object is empty"));
    };
    let Value::Object(messages) = messages else {
        return Err(Error::format(
            "the top level language element is not a JSON object",
        ));
    };
    Ok((language, messages))
}

fn write_document<W: Write>(
    writer: &mut W,
    language: String,
    messages: Map<String, Value>,
) -> Result<(), Error> {
    let mut root = Map::new();
    root.insert(language, Value::Object(messages));
    serde_json::to_writer_pretty(&mut *writer, &Value::Object(root))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_SEPARATOR, key)
    }
}

fn add_bundle_strings(
    messages: &Map<String, Value>,
    prefix: &str,
    builder: &mut LanguageBundleBuilder,
    sequence_number: &mut u32,
) -> Result<(), Error> {
    for (key, value) in messages {
        let path = join_key(prefix, key);
        match value {
            Value::Object(nested) => {
                add_bundle_strings(nested, &path, builder, sequence_number)?;
            }
            Value::Array(parts) => {
                let joined = parts
                    .iter()
                    .map(|part| {
                        part.as_str().ok_or_else(|| {
                            Error::format(format!(
                                "array `{}` must contain only strings in a globalize.js bundle",
                                path
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?
                    .join(" ");
                *sequence_number += 1;
                builder.add_with_sequence(path, joined.as_str(), *sequence_number)?;
            }
            leaf => {
                *sequence_number += 1;
                builder.add_with_sequence(path, leaf, *sequence_number)?;
            }
        }
    }
    Ok(())
}

/// Inserts `value` at the dotted path `key`, creating intermediate objects.
fn insert_nested(
    messages: &mut Map<String, Value>,
    key: &str,
    full_key: &str,
    value: &str,
) -> Result<(), Error> {
    let conflict = || {
        Error::format(format!(
            "resource key `{}` is both a message and a group of messages",
            full_key
        ))
    };
    match key.split_once(KEY_SEPARATOR) {
        None => {
            if messages.get(key).is_some_and(Value::is_object) {
                return Err(conflict());
            }
            messages.insert(key.to_string(), Value::String(value.to_string()));
            Ok(())
        }
        Some((head, rest)) => {
            let entry = messages
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match entry {
                Value::Object(nested) => insert_nested(nested, rest, full_key, value),
                _ => Err(conflict()),
            }
        }
    }
}

fn replace_values(
    messages: &mut Map<String, Value>,
    prefix: &str,
    values: &HashMap<&str, &str>,
    replaced: &mut usize,
) {
    for (key, value) in messages.iter_mut() {
        let path = join_key(prefix, key);
        match value {
            Value::Object(nested) => replace_values(nested, &path, values, replaced),
            _ => {
                if let Some(new_value) = values.get(path.as_str()) {
                    *value = Value::String(new_value.to_string());
                    *replaced += 1;
                }
            }
        }
    }
}
