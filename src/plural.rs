//! Plural codec.
//!
//! A set of plural variants is stored in a single resource value using a
//! message-format style argument:
//!
//! ```text
//! {files, plural, {one{1 file} other{%d files}}}
//! ```
//!
//! Decoding is a best-effort classifier, not a validator. It only recognizes
//! the first top-level `plural` argument and reports "no categories" for any
//! input it cannot make sense of, so callers can fall back to treating the
//! value as plain text.

use crate::types::{PluralCategory, PluralCategoryMap};

const PLURAL_KEYWORD: &str = "plural";
const OFFSET_PREFIX: &str = "offset:";

/// Encodes plural variants into a flat value, categories in canonical order.
///
/// # Example
///
/// ```rust
/// use resfilter::plural;
/// use resfilter::types::{PluralCategory, PluralCategoryMap};
///
/// let mut forms = PluralCategoryMap::new();
/// forms.insert(PluralCategory::Other, "%d files".to_string());
/// forms.insert(PluralCategory::One, "1 file".to_string());
/// assert_eq!(
///     plural::encode("count", &forms),
///     "{count, plural, {one{1 file} other{%d files}}}"
/// );
/// ```
pub fn encode(key: &str, categories: &PluralCategoryMap) -> String {
    let body = categories
        .iter()
        .map(|(category, message)| format!("{}{{{}}}", category, message))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{{{}, {}, {{{}}}}}", key, PLURAL_KEYWORD, body)
}

/// Extracts the plural variants of the first plural argument in `input`.
///
/// Returns an empty map when there is no plural argument or the input is
/// malformed. Selectors that are not one of the six plural categories
/// (explicit values such as `=0`) are skipped.
pub fn decode(input: &str) -> PluralCategoryMap {
    find_plural_argument(input)
        .map(|argument| argument.categories)
        .unwrap_or_default()
}

/// Returns `true` if `input` contains a well-formed top-level plural argument.
pub fn contains_plural(input: &str) -> bool {
    find_plural_argument(input).is_some()
}

/// Returns the text of the first plural argument, braces included.
pub fn plural_argument(input: &str) -> Option<&str> {
    find_plural_argument(input).map(|argument| &input[argument.start..argument.end])
}

#[derive(Debug)]
struct PluralArgument {
    start: usize,
    end: usize,
    categories: PluralCategoryMap,
}

/// Marker for input the scanner cannot follow.
#[derive(Debug)]
struct Malformed;

fn find_plural_argument(input: &str) -> Option<PluralArgument> {
    if !input.contains(PLURAL_KEYWORD) {
        return None;
    }
    Scanner::new(input).find_plural().ok().flatten()
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Walks top-level message text until the first plural argument.
    fn find_plural(&mut self) -> Result<Option<PluralArgument>, Malformed> {
        while let Some(b) = self.peek() {
            match b {
                b'\'' => self.skip_apostrophe(false),
                b'{' => {
                    let start = self.pos;
                    self.pos += 1;
                    if let Some(categories) = self.argument()? {
                        return Ok(Some(PluralArgument {
                            start,
                            end: self.pos,
                            categories,
                        }));
                    }
                }
                b'}' => return Err(Malformed),
                _ => self.pos += 1,
            }
        }
        Ok(None)
    }

    /// Parses an argument after its opening brace. Returns the categories if
    /// it was a plural argument; any other argument is skipped.
    fn argument(&mut self) -> Result<Option<PluralCategoryMap>, Malformed> {
        self.skip_whitespace();
        if self.name().is_empty() {
            return Err(Malformed);
        }
        self.skip_whitespace();
        match self.next_byte()? {
            b'}' => return Ok(None),
            b',' => {}
            _ => return Err(Malformed),
        }

        self.skip_whitespace();
        let arg_type = self.name();
        if arg_type.is_empty() {
            return Err(Malformed);
        }
        self.skip_whitespace();
        match self.next_byte()? {
            b'}' => return Ok(None),
            b',' => {}
            _ => return Err(Malformed),
        }

        if arg_type.eq_ignore_ascii_case(PLURAL_KEYWORD) {
            return self.plural_style().map(Some);
        }
        self.skip_to_close(1)?;
        Ok(None)
    }

    /// Reads `[offset:N] [{] selector{message} ... [}] }`.
    fn plural_style(&mut self) -> Result<PluralCategoryMap, Malformed> {
        let mut categories = PluralCategoryMap::new();

        self.skip_whitespace();
        if self.input[self.pos..].starts_with(OFFSET_PREFIX) {
            self.pos += OFFSET_PREFIX.len();
            self.skip_whitespace();
            if self.number().is_empty() {
                return Err(Malformed);
            }
            self.skip_whitespace();
        }

        let wrapped = self.peek() == Some(b'{');
        if wrapped {
            self.pos += 1;
        }

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(Malformed),
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {}
            }

            let category = self.selector()?.parse::<PluralCategory>().ok();

            self.skip_whitespace();
            if self.peek() != Some(b'{') {
                return Err(Malformed);
            }
            let message_start = self.pos;
            self.pos += 1;
            self.skip_to_close(1)?;
            let message_end = self.pos - 1;

            if let Some(category) = category {
                categories.insert(category, self.input[message_start + 1..message_end].to_string());
            }
        }

        if wrapped {
            self.skip_whitespace();
            if self.next_byte()? != b'}' {
                return Err(Malformed);
            }
        }
        Ok(categories)
    }

    /// Advances past the brace closing the current nesting level. `depth`
    /// counts the braces already opened.
    fn skip_to_close(&mut self, mut depth: usize) -> Result<(), Malformed> {
        while let Some(b) = self.peek() {
            match b {
                b'\'' => {
                    self.skip_apostrophe(true);
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(Malformed)
    }

    /// Apostrophe quoting: `''` is a literal apostrophe, an apostrophe before
    /// a syntax character starts quoted text, any other apostrophe is literal.
    fn skip_apostrophe(&mut self, in_message: bool) {
        match self.bytes.get(self.pos + 1) {
            Some(b'\'') => self.pos += 2,
            Some(b'{') | Some(b'}') | Some(b'|') => self.skip_quoted(),
            Some(b'#') if in_message => self.skip_quoted(),
            _ => self.pos += 1,
        }
    }

    fn skip_quoted(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek() {
            if b == b'\'' {
                if self.bytes.get(self.pos + 1) == Some(&b'\'') {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return;
            }
            self.pos += 1;
        }
    }

    fn selector(&mut self) -> Result<&'a str, Malformed> {
        let start = self.pos;
        if self.peek() == Some(b'=') {
            self.pos += 1;
            if self.number().is_empty() {
                return Err(Malformed);
            }
            return Ok(&self.input[start..self.pos]);
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Malformed);
        }
        Ok(&self.input[start..self.pos])
    }

    fn name(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| {
            !b.is_ascii_whitespace() && !matches!(b, b'{' | b'}' | b',' | b'\'')
        }) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn number(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || b == b'.' || b == b'-')
        {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> Result<u8, Malformed> {
        let b = self.peek().ok_or(Malformed)?;
        self.pos += 1;
        Ok(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(pairs: &[(PluralCategory, &str)]) -> PluralCategoryMap {
        pairs
            .iter()
            .map(|(category, message)| (*category, message.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_canonical_order() {
        let map = forms(&[
            (PluralCategory::Other, "%d files"),
            (PluralCategory::Few, "%d filey"),
            (PluralCategory::One, "1 file"),
        ]);
        assert_eq!(
            encode("count", &map),
            "{count, plural, {one{1 file} few{%d filey} other{%d files}}}"
        );
    }

    #[test]
    fn test_decode_encoded_value() {
        let map = forms(&[(PluralCategory::One, "1 item"), (PluralCategory::Other, "N items")]);
        let decoded = decode(&encode("items", &map));
        assert_eq!(decoded, map);
        assert!(!decoded.contains_key(&PluralCategory::Zero));
    }

    #[test]
    fn test_decode_plain_icu_form() {
        let decoded = decode("{n, plural, one{# song} other{# songs}}");
        assert_eq!(decoded[&PluralCategory::One], "# song");
        assert_eq!(decoded[&PluralCategory::Other], "# songs");
    }

    #[test]
    fn test_decode_without_keyword_short_circuits() {
        assert!(decode("{n, select, a{x} other{y}}").is_empty());
        assert!(decode("Just text").is_empty());
        assert!(!contains_plural("Just text"));
    }

    #[test]
    fn test_decode_keyword_in_plain_text() {
        assert!(decode("The plural of mouse is mice").is_empty());
        assert!(!contains_plural("The plural of mouse is mice"));
    }

    #[test]
    fn test_decode_malformed_returns_empty() {
        for input in [
            "{n, plural, one{unterminated",
            "{n, plural, one 1 file}",
            "{n, plural, {one{x} other{y}}",
            "} plural {",
            "{, plural, one{x}}",
            "{n, plural, offset: one{x}}",
        ] {
            assert!(decode(input).is_empty(), "input: {}", input);
            assert!(!contains_plural(input), "input: {}", input);
        }
    }

    #[test]
    fn test_decode_nested_braces_in_message() {
        let decoded = decode("{n, plural, one{{name} has one file} other{{name} has # files}}");
        assert_eq!(decoded[&PluralCategory::One], "{name} has one file");
        assert_eq!(decoded[&PluralCategory::Other], "{name} has # files");
    }

    #[test]
    fn test_decode_skips_explicit_selectors_and_offset() {
        let decoded = decode("{n, plural, offset:1 =0{nobody} one{just you} other{you and # others}}");
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[&PluralCategory::One], "just you");
    }

    #[test]
    fn test_decode_after_leading_text_and_arguments() {
        let input = "Hi {user}, {when, date, short}: {n, plural, one{1 msg} other{# msgs}} today";
        let decoded = decode(input);
        assert_eq!(decoded[&PluralCategory::One], "1 msg");
        assert_eq!(
            plural_argument(input),
            Some("{n, plural, one{1 msg} other{# msgs}}")
        );
    }

    #[test]
    fn test_quoted_braces_are_text() {
        let decoded = decode("{n, plural, one{a '{' brace} other{b '}' brace}}");
        assert_eq!(decoded[&PluralCategory::One], "a '{' brace");
        assert_eq!(decoded[&PluralCategory::Other], "b '}' brace");
    }

    #[test]
    fn test_only_first_plural_argument_is_read() {
        let decoded = decode("{a, plural, one{first} other{firsts}} {b, plural, few{second}}");
        assert_eq!(decoded.len(), 2);
        assert!(!decoded.contains_key(&PluralCategory::Few));
    }

    #[test]
    fn test_contains_plural_with_empty_body() {
        assert!(contains_plural("{k, plural, {}}"));
        assert!(decode("{k, plural, {}}").is_empty());
    }

    #[test]
    fn test_array_value_is_not_plural() {
        assert!(!contains_plural("[plural, singular]"));
    }
}
