/// Collapse every whitespace run (newlines included) to a single space and trim both ends.
///
/// Total for any input; the empty string maps to itself.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Number of whitespace-separated words
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
