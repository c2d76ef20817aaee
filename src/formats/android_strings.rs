//! Support for Android `strings.xml` resources.
//!
//! `<string>`, `<string-array>` and `<plurals>` elements are flattened into a
//! [`LanguageBundle`]. Arrays are stored as `[a, b, c]` and plural sets through
//! the [`crate::plural`] codec, so every element becomes exactly one entry.
//!
//! Writing builds a fresh document. Merging patches an existing document line
//! by line and only touches elements whose key has a new value, so comments,
//! blank lines and formatting elsewhere in the file survive untouched.

use std::{
    collections::HashMap,
    io::{BufRead, ErrorKind, Write},
};

use lazy_static::lazy_static;
use quick_xml::{
    Reader, Writer,
    escape::partial_escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::{
    builder::LanguageBundleBuilder,
    error::Error,
    options::FilterOptions,
    plural,
    traits::ResourceFilter,
    types::{LanguageBundle, PluralCategory, PluralCategoryMap, ResourceString},
    wrap::{WordBreaker, continuation_indent, format_message},
};

const RESOURCES_TAG: &str = "resources";
const STRING_TAG: &str = "string";
const STRING_ARRAY_TAG: &str = "string-array";
const PLURALS_TAG: &str = "plurals";
const ITEM_TAG: &str = "item";
const NAME_ATTR: &[u8] = b"name";
const QUANTITY_ATTR: &[u8] = b"quantity";
const INDENT_SIZE: usize = 4;

lazy_static! {
    static ref STRING_ARRAY_OPEN: Regex = Regex::new(r"^(\s*)(<string-array\s[^>]*>)").unwrap();
    static ref STRING_ARRAY_CLOSE: Regex = Regex::new(r"</string-array\s*>").unwrap();
    static ref STRING_OPEN: Regex = Regex::new(r"^(\s*)(<string\s[^>]*>)").unwrap();
    static ref STRING_CLOSE: Regex = Regex::new(r"</string\s*>").unwrap();
    static ref PLURALS_OPEN: Regex = Regex::new(r"^(\s*)(<plurals\s[^>]*>)").unwrap();
    static ref PLURALS_CLOSE: Regex = Regex::new(r"</plurals\s*>").unwrap();
    static ref NAME_VALUE: Regex = Regex::new(r#"\sname\s*=\s*"([^"]*)""#).unwrap();
}

/// Filter for Android `strings.xml` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidStrings;

impl ResourceFilter for AndroidStrings {
    fn parse<R: BufRead>(&self, reader: R, _options: &FilterOptions) -> Result<LanguageBundle, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        let config = xml_reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;

        let mut builder = LanguageBundleBuilder::new();
        let mut sequence_number: u32 = 1;
        let mut depth: usize = 0;
        let mut has_root = false;
        let mut buf = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) if depth == 0 => {
                    if has_root {
                        return Err(Error::format(format!(
                            "unexpected element <{}> after the root element",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    has_root = true;
                    depth = 1;
                }
                Event::Text(e) if depth == 0 => {
                    if !e.iter().all(u8::is_ascii_whitespace) {
                        return Err(Error::format("text outside of the root element"));
                    }
                }
                Event::CData(_) if depth == 0 => {
                    return Err(Error::format("text outside of the root element"));
                }
                Event::Start(e) => match e.name().as_ref() {
                    b"string" => {
                        let key = name_attribute(&e)?;
                        let value = read_text_content(&mut xml_reader)?;
                        builder.add_with_sequence(key, &value, sequence_number)?;
                        sequence_number += 1;
                    }
                    b"string-array" => {
                        let key = name_attribute(&e)?;
                        let items = read_array_items(&mut xml_reader)?;
                        let value = format!("[{}]", items.join(", "));
                        builder.add_with_sequence(key, &value, sequence_number)?;
                        sequence_number += 1;
                    }
                    b"plurals" => {
                        let key = name_attribute(&e)?;
                        let (categories, notes) = read_plurals(&mut xml_reader, &key)?;
                        let value = plural::encode(&key, &categories);
                        let mut resource_string = ResourceString::new(key, value, sequence_number);
                        if !notes.is_empty() {
                            resource_string = resource_string.with_note(notes);
                        }
                        builder.add_resource_string(resource_string);
                        sequence_number += 1;
                    }
                    // Container elements are transparent to numbering.
                    _ => depth += 1,
                },
                Event::End(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| Error::format("closing tag without an open element"))?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !has_root {
            return Err(Error::format("document has no root element"));
        }
        if depth > 0 {
            return Err(unexpected_eof());
        }

        let bundle = builder.build();
        debug!(entries = bundle.len(), "parsed android strings");
        Ok(bundle)
    }

    fn write<W: Write>(
        &self,
        mut writer: W,
        bundle: &LanguageBundle,
        _options: &FilterOptions,
    ) -> Result<(), Error> {
        let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', INDENT_SIZE);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
        xml_writer.write_event(Event::Start(BytesStart::new(RESOURCES_TAG)))?;

        let entries = bundle.sorted_resource_strings();
        for resource_string in &entries {
            let value = resource_string.value.as_str();
            if let Some(items) = array_items(value) {
                write_string_array(&mut xml_writer, &resource_string.key, &items)?;
                continue;
            }
            let categories = plural::decode(value);
            if categories.is_empty() {
                write_string(&mut xml_writer, &resource_string.key, value)?;
            } else {
                write_plurals(&mut xml_writer, resource_string, &categories)?;
            }
        }

        xml_writer.write_event(Event::End(BytesEnd::new(RESOURCES_TAG)))?;
        xml_writer.get_mut().write_all(b"\n")?;
        writer.flush()?;

        debug!(entries = entries.len(), "wrote android strings");
        Ok(())
    }

    fn merge<R: BufRead, W: Write>(
        &self,
        mut base: R,
        mut writer: W,
        bundle: &LanguageBundle,
        options: &FilterOptions,
    ) -> Result<(), Error> {
        let values = bundle.key_value_map();
        let breaker = WordBreaker::from_options(options);

        let mut state = ScanState::Outside;
        let mut replaced = 0usize;
        let mut line = String::new();

        loop {
            line.clear();
            let read = base.read_line(&mut line).map_err(|e| match e.kind() {
                ErrorKind::InvalidData => Error::format_with_source("base document is not valid UTF-8", e),
                _ => Error::Io(e),
            })?;
            if read == 0 {
                break;
            }
            let (content, ending) = split_line_ending(&line);

            state = match state {
                ScanState::Skipping(kind) if kind.closes(content) => ScanState::Outside,
                ScanState::Skipping(kind) => ScanState::Skipping(kind),
                ScanState::Outside => match replacement_block(content, &values, &breaker) {
                    Some((kind, block)) => {
                        if ending == "\r\n" {
                            writer.write_all(block.replace('\n', "\r\n").as_bytes())?;
                        } else {
                            writer.write_all(block.as_bytes())?;
                        }
                        replaced += 1;
                        if kind.closes_after_opening(content) {
                            ScanState::Outside
                        } else {
                            ScanState::Skipping(kind)
                        }
                    }
                    None => {
                        writer.write_all(line.as_bytes())?;
                        ScanState::Outside
                    }
                },
            };
        }
        writer.flush()?;

        debug!(replaced, "merged android strings");
        Ok(())
    }
}

/// Position of the merge scanner relative to the element being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Lines are copied unless they open a translated element.
    Outside,
    /// Lines of a replaced element are dropped up to its closing tag.
    Skipping(ElementKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    String,
    StringArray,
    Plurals,
}

impl ElementKind {
    const ALL: [ElementKind; 3] = [
        ElementKind::StringArray,
        ElementKind::String,
        ElementKind::Plurals,
    ];

    fn tag(self) -> &'static str {
        match self {
            ElementKind::String => STRING_TAG,
            ElementKind::StringArray => STRING_ARRAY_TAG,
            ElementKind::Plurals => PLURALS_TAG,
        }
    }

    fn opening_pattern(self) -> &'static Regex {
        match self {
            ElementKind::String => &STRING_OPEN,
            ElementKind::StringArray => &STRING_ARRAY_OPEN,
            ElementKind::Plurals => &PLURALS_OPEN,
        }
    }

    fn closes(self, line: &str) -> bool {
        match self {
            ElementKind::String => STRING_CLOSE.is_match(line),
            ElementKind::StringArray => STRING_ARRAY_CLOSE.is_match(line),
            ElementKind::Plurals => PLURALS_CLOSE.is_match(line),
        }
    }

    /// Whether the element opened on `line` also ends on it.
    fn closes_after_opening(self, line: &str) -> bool {
        self.opening_pattern()
            .find(line)
            .is_some_and(|opening| self.closes(&line[opening.end()..]))
    }

    /// Matches `line` against the opening tag of each element kind.
    fn classify(line: &str) -> Option<(ElementKind, OpeningTag<'_>)> {
        ElementKind::ALL.into_iter().find_map(|kind| {
            let captures = kind.opening_pattern().captures(line)?;
            let indent = captures.get(1)?.as_str();
            let tag = captures.get(2)?.as_str();
            // Empty elements have nothing to replace.
            if tag.ends_with("/>") {
                return None;
            }
            let key = NAME_VALUE.captures(tag)?.get(1)?.as_str();
            Some((kind, OpeningTag { indent, tag, key }))
        })
    }
}

#[derive(Debug)]
struct OpeningTag<'a> {
    indent: &'a str,
    tag: &'a str,
    key: &'a str,
}

/// Builds the text that replaces the element opened on `line`, or `None`
/// when the line must be copied unchanged.
fn replacement_block(
    line: &str,
    values: &HashMap<&str, &str>,
    breaker: &WordBreaker,
) -> Option<(ElementKind, String)> {
    let (kind, opening) = ElementKind::classify(line)?;
    let Some(value) = values.get(opening.key) else {
        trace!(key = opening.key, "no new value; keeping element");
        return None;
    };

    let indent = opening.indent;
    let nested = format!("{}{}", indent, continuation_indent(indent));
    let closing = format!("</{}>", kind.tag());

    let block = match kind {
        ElementKind::String => {
            format_message(opening.tag, &partial_escape(*value), &closing, indent, breaker)
        }
        ElementKind::StringArray => {
            let Some(items) = array_items(value) else {
                trace!(key = opening.key, "value is not an array; keeping element");
                return None;
            };
            let mut block = format!("{}{}\n", indent, opening.tag);
            for item in items {
                block.push_str(&format_message(
                    "<item>",
                    &partial_escape(item),
                    "</item>",
                    &nested,
                    breaker,
                ));
            }
            block.push_str(indent);
            block.push_str(&closing);
            block.push('\n');
            block
        }
        ElementKind::Plurals => {
            let categories = plural::decode(value);
            if categories.is_empty() {
                trace!(key = opening.key, "value has no plural forms; keeping element");
                return None;
            }
            let mut block = format!("{}{}\n", indent, opening.tag);
            for (category, message) in &categories {
                block.push_str(&format_message(
                    &format!("<item quantity=\"{}\">", category),
                    &partial_escape(message.trim()),
                    "</item>",
                    &nested,
                    breaker,
                ));
            }
            block.push_str(indent);
            block.push_str(&closing);
            block.push('\n');
            block
        }
    };

    trace!(key = opening.key, element = kind.tag(), "replacing element");
    Some((kind, block))
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

/// Splits a `[a, b, c]` value into its trimmed items. Returns `None` for
/// values that are not bracket-delimited.
fn array_items(value: &str) -> Option<Vec<&str>> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(inner.split(',').map(str::trim).collect())
}

fn write_string<W: Write>(xml_writer: &mut Writer<W>, key: &str, value: &str) -> Result<(), Error> {
    let elem = BytesStart::new(STRING_TAG).with_attributes([("name", key)]);
    xml_writer.write_event(Event::Start(elem))?;
    xml_writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(value))))?;
    xml_writer.write_event(Event::End(BytesEnd::new(STRING_TAG)))?;
    Ok(())
}

fn write_string_array<W: Write>(
    xml_writer: &mut Writer<W>,
    key: &str,
    items: &[&str],
) -> Result<(), Error> {
    let elem = BytesStart::new(STRING_ARRAY_TAG).with_attributes([("name", key)]);
    xml_writer.write_event(Event::Start(elem))?;
    for &item in items {
        xml_writer.write_event(Event::Start(BytesStart::new(ITEM_TAG)))?;
        xml_writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(item))))?;
        xml_writer.write_event(Event::End(BytesEnd::new(ITEM_TAG)))?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new(STRING_ARRAY_TAG)))?;
    Ok(())
}

fn write_plurals<W: Write>(
    xml_writer: &mut Writer<W>,
    resource_string: &ResourceString,
    categories: &PluralCategoryMap,
) -> Result<(), Error> {
    let elem = BytesStart::new(PLURALS_TAG).with_attributes([("name", resource_string.key.as_str())]);
    xml_writer.write_event(Event::Start(elem))?;
    for note in &resource_string.notes {
        xml_writer.write_event(Event::Comment(BytesText::from_escaped(note.as_str())))?;
    }
    for (category, message) in categories {
        let item = BytesStart::new(ITEM_TAG).with_attributes([("quantity", category.as_str())]);
        xml_writer.write_event(Event::Start(item))?;
        xml_writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(message))))?;
        xml_writer.write_event(Event::End(BytesEnd::new(ITEM_TAG)))?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new(PLURALS_TAG)))?;
    Ok(())
}

fn unexpected_eof() -> Error {
    Error::format("unexpected end of document: unclosed element")
}

fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn name_attribute(e: &BytesStart) -> Result<String, Error> {
    attribute(e, NAME_ATTR)?.ok_or_else(|| {
        Error::format(format!(
            "<{}> element missing 'name'",
            String::from_utf8_lossy(e.name().as_ref())
        ))
    })
}

/// Reads the concatenated text of everything up to the end of the current
/// element, descendants included.
fn read_text_content<R: BufRead>(xml_reader: &mut Reader<R>) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut text = String::new();
    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(text),
            Event::End(_) => depth -= 1,
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(std::str::from_utf8(&e)?),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
        buf.clear();
    }
}

fn read_array_items<R: BufRead>(xml_reader: &mut Reader<R>) -> Result<Vec<String>, Error> {
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut items = Vec::new();
    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == ITEM_TAG.as_bytes() => {
                items.push(read_text_content(xml_reader)?);
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(items),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
        buf.clear();
    }
}

/// Reads the items of a `<plurals>` element and the text of its non-blank
/// comments, concatenated.
fn read_plurals<R: BufRead>(
    xml_reader: &mut Reader<R>,
    key: &str,
) -> Result<(PluralCategoryMap, String), Error> {
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut categories = PluralCategoryMap::new();
    let mut notes = String::new();
    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == ITEM_TAG.as_bytes() => {
                let quantity = attribute(&e, QUANTITY_ATTR)?.ok_or_else(|| {
                    Error::format(format!("plural item of `{}` missing 'quantity'", key))
                })?;
                let message = read_text_content(xml_reader)?;
                match quantity.parse::<PluralCategory>() {
                    Ok(category) => {
                        categories.insert(category, message);
                    }
                    Err(_) => warn!(key, quantity = %quantity, "skipping plural item with unknown quantity"),
                }
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok((categories, notes)),
            Event::End(_) => depth -= 1,
            Event::Comment(c) if depth == 0 => {
                let comment = std::str::from_utf8(&c)?;
                if !comment.trim().is_empty() {
                    notes.push_str(comment);
                }
            }
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
        buf.clear();
    }
}
