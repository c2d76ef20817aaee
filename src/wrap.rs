//! Width-limited formatting of element text for the merge engine.
//!
//! A message either fits on the line with its tags, or it is broken at word
//! boundaries onto continuation lines indented one level deeper than the
//! element itself:
//!
//! ```text
//!     <string name="about">
//!         This is a fairly long message that does not fit on a single line
//!         together with its tags.
//!     </string>
//! ```

use unic_langid::LanguageIdentifier;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::options::FilterOptions;

/// Maximum display width of a formatted line.
pub const MAX_LINE_WIDTH: usize = 80;

/// Display width of a tab in an indentation prefix.
pub const TAB_WIDTH: usize = 4;

const SPACE_INDENT: &str = "    ";
const TAB_INDENT: &str = "\t";

/// Word-boundary segmenter used when wrapping messages.
///
/// Boundaries follow Unicode text segmentation (UAX #29), so scripts written
/// without spaces still get break opportunities. One breaker is created per
/// operation and reused for every entry.
#[derive(Debug, Clone, Default)]
pub struct WordBreaker {
    locale: Option<LanguageIdentifier>,
}

impl WordBreaker {
    pub fn new(locale: Option<LanguageIdentifier>) -> Self {
        Self { locale }
    }

    pub fn from_options(options: &FilterOptions) -> Self {
        Self::new(options.locale.clone())
    }

    pub fn locale(&self) -> Option<&LanguageIdentifier> {
        self.locale.as_ref()
    }

    /// Byte offsets of every word boundary in `text`, including `0` and
    /// `text.len()`.
    pub fn boundaries(&self, text: &str) -> Vec<usize> {
        let mut boundaries: Vec<usize> = text
            .split_word_bound_indices()
            .map(|(idx, _)| idx)
            .collect();
        if boundaries.first() != Some(&0) {
            boundaries.insert(0, 0);
        }
        if !text.is_empty() {
            boundaries.push(text.len());
        }
        boundaries
    }
}

/// The extra indentation for lines nested inside an element: one tab when
/// the element is indented with tabs, four spaces otherwise.
pub fn continuation_indent(indent: &str) -> &'static str {
    if indent.starts_with('\t') {
        TAB_INDENT
    } else {
        SPACE_INDENT
    }
}

/// Display width of an indentation prefix. Tabs count as four columns.
pub fn indent_width(indent: &str) -> usize {
    indent
        .chars()
        .map(|c| match c {
            '\t' => TAB_WIDTH,
            ' ' => 1,
            _ => 0,
        })
        .sum()
}

/// Formats `opening + message + closing` at indentation `indent`.
///
/// Every produced line ends with `\n`.
pub fn format_message(
    opening: &str,
    message: &str,
    closing: &str,
    indent: &str,
    breaker: &WordBreaker,
) -> String {
    let used = indent_width(indent);
    let mut output = String::new();
    output.push_str(indent);
    output.push_str(opening);

    if used + opening.width() + message.width() + closing.width() < MAX_LINE_WIDTH {
        output.push_str(message);
        output.push_str(closing);
        output.push('\n');
        return output;
    }
    output.push('\n');

    let available = MAX_LINE_WIDTH.saturating_sub(used + TAB_WIDTH);
    let nested = continuation_indent(indent);
    let mut push_line = |span: &str| {
        output.push_str(indent);
        output.push_str(nested);
        output.push_str(span);
        output.push('\n');
    };

    let boundaries = breaker.boundaries(message);
    let mut start = 0;
    let mut prev = 0;
    for &end in boundaries.iter().skip(1) {
        if message[start..end].width() > available && prev > start {
            push_line(&message[start..prev]);
            start = prev;
        }
        if end == message.len() {
            push_line(&message[start..end]);
        }
        prev = end;
    }

    output.push_str(indent);
    output.push_str(closing);
    output.push('\n');
    output
}
