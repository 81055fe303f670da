//! Single-occurrence HTML splice.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::Regex;

/// Closing head tag, any case.
pub static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("static regex"));

/// Insert `snippet` immediately before the first match of `marker`.
///
/// Returns the input borrowed and untouched when there is no match.
pub fn splice<'a>(body: &'a [u8], marker: &Regex, snippet: &str) -> Cow<'a, [u8]> {
    let Some(found) = marker.find(body) else {
        return Cow::Borrowed(body);
    };

    let mut out = Vec::with_capacity(body.len() + snippet.len());
    out.extend_from_slice(&body[..found.start()]);
    out.extend_from_slice(snippet.as_bytes());
    out.extend_from_slice(&body[found.start()..]);
    Cow::Owned(out)
}
