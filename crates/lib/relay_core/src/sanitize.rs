//! Citation-marker removal for assistant replies.
//!
//! File-search assistants annotate their output with bracketed source markers
//! such as `【12:3†doc.pdf】` or `〖…〗`. These are meaningless to the end user
//! and are stripped before a reply leaves the relay.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Shortest match of either bracket pair. A marker never spans a line
/// terminator (`\n`, `\r`, U+2028, U+2029).
static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"【[^\n\r\x{2028}\x{2029}]*?】|〖[^\n\r\x{2028}\x{2029}]*?〗")
        .expect("marker pattern is valid")
});

/// Remove every non-overlapping citation marker from `text`.
///
/// Borrows the input unchanged when it contains no marker.
pub fn strip_markers(text: &str) -> Cow<'_, str> {
    MARKER_PATTERN.replace_all(text, "")
}
