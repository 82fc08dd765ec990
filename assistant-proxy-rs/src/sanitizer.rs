//! Answer cleanup before it is returned to callers

use once_cell::sync::Lazy;
use regex::Regex;

/// Citation markers such as `【12:3†source】` left by file-search assistants
static CITATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"【[\d:†source]+】").expect("citation marker pattern is valid"));

/// Strip citation markers, normalise CRLF line endings and trim.
///
/// Passes repeat until nothing changes, so nested markers like
/// `【1【2】】` and runs like `\r\r\n` are fully cleaned in one call.
pub fn sanitize(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(raw: &str) -> String {
    CITATION_MARKER
        .replace_all(raw, "")
        .replace("\r\n", "\n")
        .trim()
        .to_string()
}
