// src/utils/chunk.rs

/// Appended to every chunk except the last.
pub const CONTINUED_SUFFIX: &str = "\n\n...(continued)";

/// Prepended to every chunk except the first.
pub const CONTINUED_PREFIX: &str = "...(continued)\n\n";

/// Message length as Telegram counts it: UTF-16 code units.
pub fn text_units(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Splits `text` into messages whose body holds at most `max_len` text units.
///
/// Text within the limit comes back as a single, unchanged chunk. Longer text is
/// cut after the last line break that fits, so Markdown entities (which never
/// span lines in a report) stay whole. A body with no line break is cut at the
/// last character that fits. The pieces are joined by continuation markers, so
/// stripping the markers and concatenating the chunks gives back the original text.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 || text_units(text) <= max_len {
        return vec![text.to_string()];
    }

    let mut bodies: Vec<&str> = Vec::new();
    let mut start = 0;
    let mut taken = 0;
    // Byte offset just past the last '\n' of the current body, and the units up to it.
    let mut line_break: Option<(usize, usize)> = None;

    for (idx, ch) in text.char_indices() {
        let width = ch.len_utf16();
        while taken > 0 && taken + width > max_len {
            match line_break.take() {
                Some((cut, used)) => {
                    bodies.push(&text[start..cut]);
                    start = cut;
                    taken -= used;
                }
                None => {
                    bodies.push(&text[start..idx]);
                    start = idx;
                    taken = 0;
                }
            }
        }
        taken += width;
        if ch == '\n' {
            line_break = Some((idx + 1, taken));
        }
    }
    bodies.push(&text[start..]);

    let last = bodies.len() - 1;
    bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| {
            let prefix = if i > 0 { CONTINUED_PREFIX } else { "" };
            let suffix = if i < last { CONTINUED_SUFFIX } else { "" };
            format!("{}{}{}", prefix, body, suffix)
        })
        .collect()
}
