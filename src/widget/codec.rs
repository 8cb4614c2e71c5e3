//! Widget delimiter encoding
//!
//! Widgets are stored in markdown text as `$$<info> <content>$$`. A payload
//! may itself contain `$$`, which would close the widget early, so every pair
//! of adjacent `$` characters in the payload is split by a zero-width space.
//! The separator is invisible when rendered and is not whitespace to the
//! `regex` crate, so rule patterns such as `\$\S+` still match across it.

use regex::Regex;
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Marker that opens and closes an encoded widget.
pub const WIDGET_DELIMITER: &str = "$$";

/// Separator inserted between adjacent `$` characters inside a payload.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

const DELIMITER_CHAR: char = '$';

static OPEN_MARKER: OnceLock<Regex> = OnceLock::new();

/// `$$widget<n>` followed by one whitespace character.
fn open_marker() -> &'static Regex {
    OPEN_MARKER.get_or_init(|| {
        Regex::new(r"\$\$(widget\d+)\s").expect("widget open marker pattern is valid")
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Marker Scanning
// ─────────────────────────────────────────────────────────────────────────────

/// Location of a widget open marker inside a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenMarker<'a> {
    /// Byte offset of the leading `$$`
    pub start: usize,
    /// Byte offset just past the whitespace that ends the marker
    pub end: usize,
    /// The widget id, e.g. `widget0`
    pub info: &'a str,
}

impl<'a> OpenMarker<'a> {
    fn from_captures(caps: regex::Captures<'a>) -> Option<Self> {
        let whole = caps.get(0)?;
        let info = caps.get(1)?;
        Some(Self {
            start: whole.start(),
            end: whole.end(),
            info: info.as_str(),
        })
    }
}

/// Find the first widget open marker in `text`.
pub(crate) fn find_open_marker(text: &str) -> Option<OpenMarker<'_>> {
    OpenMarker::from_captures(open_marker().captures(text)?)
}

/// Find the last widget open marker in `text`.
fn find_last_open_marker(text: &str) -> Option<OpenMarker<'_>> {
    OpenMarker::from_captures(open_marker().captures_iter(text).last()?)
}

/// Find the closing `$$` of a widget whose payload starts at `text`.
///
/// Escaped payloads never contain `$$` and never end in `$`, so the first
/// `$$` is always the close marker.
pub(crate) fn find_close_delimiter(text: &str) -> Option<usize> {
    text.find(WIDGET_DELIMITER)
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding / Decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Strip every widget marker from `text`, leaving only the payloads.
///
/// Each pass removes the last open marker and the first `$$` after it, so a
/// nested widget is closed before the widget around it. Passes repeat until no
/// open marker is left anywhere, so the result never contains a marker, even
/// one formed by joining the text around a removed marker.
///
/// # Example
/// ```ignore
/// let text = unwrap_widget_syntax("say $$widget0 $hi$$!");
/// assert_eq!(text, "say $hi!");
/// ```
pub fn unwrap_widget_syntax(text: &str) -> String {
    let mut text = text.to_string();

    while let Some(marker) = find_last_open_marker(&text) {
        let mut unwrapped = String::with_capacity(text.len());
        unwrapped.push_str(&text[..marker.start]);

        let rest = &text[marker.end..];
        match rest.find(WIDGET_DELIMITER) {
            Some(close) => {
                unwrapped.push_str(&rest[..close]);
                unwrapped.push_str(&rest[close + WIDGET_DELIMITER.len()..]);
            }
            None => unwrapped.push_str(rest),
        }

        text = unwrapped;
    }

    text
}

/// Split every pair of adjacent `$` characters with a zero-width space.
///
/// Runs of three or more are fully split, so the output never contains `$$`.
/// A trailing `$` is followed by a zero-width space too, otherwise it would
/// merge with the close marker.
pub fn escape_widget_delimiter(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    let mut previous = None;

    for c in content.chars() {
        if c == DELIMITER_CHAR && previous == Some(DELIMITER_CHAR) {
            escaped.push(ZERO_WIDTH_SPACE);
        }
        escaped.push(c);
        previous = Some(c);
    }

    if previous == Some(DELIMITER_CHAR) {
        escaped.push(ZERO_WIDTH_SPACE);
    }

    escaped
}

/// Drop the separator that escaping appends after a trailing `$`.
///
/// Separators between `$` characters inside the text are kept.
pub fn trim_trailing_separator(text: &str) -> &str {
    match text.strip_suffix(ZERO_WIDTH_SPACE) {
        Some(rest) if rest.ends_with(DELIMITER_CHAR) => rest,
        _ => text,
    }
}

/// Encode `content` as widget text tagged with `info`.
///
/// A payload ending in `$` gains a trailing zero-width space, so decoding
/// `create_widget_content("widget0", "cost$")` yields `"cost$\u{200B}"`.
/// [`trim_trailing_separator`] removes it again.
///
/// # Example
/// ```ignore
/// assert_eq!(
///     create_widget_content("widget0", "a$$b"),
///     "$$widget0 a$\u{200B}$b$$"
/// );
/// ```
pub fn create_widget_content(info: &str, content: &str) -> String {
    format!(
        "{delim}{info} {content}{delim}",
        delim = WIDGET_DELIMITER,
        info = info,
        content = escape_widget_delimiter(content)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
